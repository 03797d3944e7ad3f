//! # File System Operations Module / 文件系统操作模块
//!
//! This module manages the transient working artifact: the single-entry JSON
//! file handed to the apply step, written atomically and removed when the
//! entry is done.
//!
//! 此模块管理临时工作配置文件：交给应用步骤的单条目 JSON 文件，
//! 以原子方式写入，并在条目处理完成后删除。

use anyhow::{Context, Result};
use serde_json::Value;
use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use crate::core::error::OrchestratorError;
use crate::core::models::json_kind;

/// A working artifact on disk. The file is deleted when this guard is
/// discarded or dropped, whichever comes first.
///
/// 磁盘上的工作配置文件。当此 guard 被显式丢弃或析构时（以先发生者为准），文件会被删除。
#[derive(Debug)]
pub struct WorkingArtifact {
    path: PathBuf,
    removed: bool,
}

impl WorkingArtifact {
    /// Materializes `entry` at `path`. The entry must be a JSON object.
    ///
    /// The content is written to a temporary file in the same directory and
    /// then renamed into place, so the apply step never sees a partial file.
    pub fn create(path: &Path, index: usize, entry: &Value) -> Result<Self, OrchestratorError> {
        if !entry.is_object() {
            return Err(OrchestratorError::EntryNotAnObject {
                index,
                found: json_kind(entry),
            });
        }

        let write_err = |source: io::Error| OrchestratorError::ArtifactWrite {
            path: path.to_path_buf(),
            source,
        };

        let content = serde_json::to_string_pretty(entry)?;
        let dir = match path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        };
        let mut staged = tempfile::Builder::new()
            .prefix(".model_matrix_runner_")
            .suffix(".json")
            .tempfile_in(dir)
            .map_err(write_err)?;
        staged.write_all(content.as_bytes()).map_err(write_err)?;
        staged.persist(path).map_err(|e| write_err(e.error))?;

        tracing::debug!(path = %path.display(), index, "working artifact written");
        Ok(Self {
            path: path.to_path_buf(),
            removed: false,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Removes the artifact now, reporting any error.
    /// 立即删除工作配置文件，并报告任何错误。
    pub fn discard(mut self) -> Result<()> {
        self.removed = true;
        remove_if_exists(&self.path)
            .with_context(|| format!("Failed to remove working artifact: {}", self.path.display()))?;
        Ok(())
    }
}

impl Drop for WorkingArtifact {
    fn drop(&mut self) {
        if !self.removed {
            if let Err(e) = remove_if_exists(&self.path) {
                tracing::warn!(path = %self.path.display(), "failed to remove working artifact: {}", e);
            }
        }
    }
}

/// Removes a file, treating "not found" as success.
/// Returns whether a file was actually removed.
pub fn remove_if_exists(path: &Path) -> io::Result<bool> {
    match fs::remove_file(path) {
        Ok(()) => Ok(true),
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(false),
        Err(e) => Err(e),
    }
}

/// Ensures no artifact from an earlier, interrupted run is lying around.
///
/// 确保没有来自先前中断运行的遗留工作配置文件。
pub fn clear_stale_artifact(path: &Path) -> Result<bool> {
    let removed = remove_if_exists(path)
        .with_context(|| format!("Failed to remove stale working artifact: {}", path.display()))?;
    if removed {
        tracing::warn!(path = %path.display(), "removed stale working artifact");
    }
    Ok(removed)
}

/// Writes a text file, creating parent directories as needed.
pub fn write_creating_parents(path: &Path, content: &str) -> Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() && !parent.exists() {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create directory: {}", parent.display()))?;
        }
    }
    fs::write(path, content).with_context(|| format!("Failed to write file: {}", path.display()))
}
