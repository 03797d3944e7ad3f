//! # Data Models Module / 数据模型模块
//!
//! This module defines the core data structures used throughout the runner:
//! the configuration set, per-entry display metadata, per-entry outcomes and
//! the final run summary.
//!
//! 此模块定义了整个运行器中使用的核心数据结构：
//! 配置集合、每个条目的显示元数据、每个条目的结果以及最终的运行摘要。

use anyhow::{Context, Result};
use chrono::{DateTime, Local};
use serde::Serialize;
use serde_json::Value;
use std::fmt;
use std::fs;
use std::path::Path;
use std::time::Duration;

use crate::core::error::OrchestratorError;

/// Placeholder used for any metadata field that is absent or unreadable.
/// 任何缺失或无法读取的元数据字段所使用的占位符。
pub const UNKNOWN: &str = "unknown";

/// The ordered collection of model configurations driving one run.
/// It is loaded once and never mutated; its length is fixed for the run.
///
/// 驱动一次运行的有序模型配置集合。
/// 它只加载一次且不会被修改；其长度在整个运行期间固定。
#[derive(Debug, Clone, Default)]
pub struct ConfigurationSet {
    entries: Vec<Value>,
}

impl ConfigurationSet {
    /// Reads and parses a configuration set from a JSON file.
    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read configuration set: {}", path.display()))?;
        let set = Self::parse(&content)
            .with_context(|| format!("Failed to parse configuration set: {}", path.display()))?;
        Ok(set)
    }

    /// Parses a configuration set from JSON text. The document must be an array.
    /// 从 JSON 文本解析配置集合。文档必须是一个数组。
    pub fn parse(content: &str) -> Result<Self, OrchestratorError> {
        match serde_json::from_str::<Value>(content)? {
            Value::Array(entries) => Ok(Self { entries }),
            other => Err(OrchestratorError::NotAnArray(json_kind(&other))),
        }
    }

    pub fn from_entries(entries: Vec<Value>) -> Self {
        Self { entries }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&Value> {
        self.entries.get(index)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Value> {
        self.entries.iter()
    }
}

/// Returns a short name for the JSON type of a value, used in error messages.
pub(crate) fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

/// Display metadata derived from a single configuration entry.
/// Every field falls back to [`UNKNOWN`] instead of failing the entry.
///
/// 从单个配置条目派生的显示元数据。
/// 每个字段在缺失时都会回退为 [`UNKNOWN`]，而不会使条目失败。
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ModelMetadata {
    pub model_type: String,
    pub model_name: String,
    /// `config.model_identifier`, else `config.model_path`.
    pub model_identifier: String,
}

impl ModelMetadata {
    pub fn unknown() -> Self {
        Self {
            model_type: UNKNOWN.to_string(),
            model_name: UNKNOWN.to_string(),
            model_identifier: UNKNOWN.to_string(),
        }
    }

    /// Extracts metadata from an entry value, field by field.
    pub fn from_value(entry: &Value) -> Self {
        let text = |v: Option<&Value>| {
            v.and_then(Value::as_str)
                .map(str::to_string)
                .unwrap_or_else(|| UNKNOWN.to_string())
        };
        let config = entry.get("config");
        let identifier = config
            .and_then(|c| c.get("model_identifier"))
            .filter(|v| v.is_string())
            .or_else(|| config.and_then(|c| c.get("model_path")));

        Self {
            model_type: text(entry.get("model_type")),
            model_name: text(entry.get("model_name")),
            model_identifier: text(identifier),
        }
    }

    /// Reads metadata back from a working artifact on disk.
    ///
    /// 从磁盘上的工作配置文件读取元数据。
    pub fn read_from(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read working artifact: {}", path.display()))?;
        let value: Value = serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse working artifact: {}", path.display()))?;
        Ok(Self::from_value(&value))
    }
}

impl fmt::Display for ModelMetadata {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} ({}, {})",
            self.model_name, self.model_type, self.model_identifier
        )
    }
}

/// Enumerates the reasons an entry can fail.
/// 枚举条目可能失败的原因。
#[derive(Debug, PartialEq, Eq, Clone, Copy, Serialize)]
pub enum FailureReason {
    /// The entry could not be materialized into a working artifact.
    /// 条目无法被写入工作配置文件。
    ExtractionFailed,
    /// The "apply configuration" step exited unsuccessfully.
    /// "应用配置" 步骤执行失败。
    ConfigUpdateFailed,
    /// The "run tests" step exited unsuccessfully.
    /// "运行测试" 步骤执行失败。
    TestRunFailed,
    /// The operator stopped the run while this entry was in flight.
    /// 操作者在此条目执行期间中止了运行。
    Interrupted,
}

impl FailureReason {
    /// The i18n key of the short label for this reason.
    pub fn label_key(&self) -> &'static str {
        match self {
            FailureReason::ExtractionFailed => "reason.extraction_failed",
            FailureReason::ConfigUpdateFailed => "reason.config_update_failed",
            FailureReason::TestRunFailed => "reason.test_run_failed",
            FailureReason::Interrupted => "reason.interrupted",
        }
    }
}

/// The outcome of processing a single configuration entry.
/// 处理单个配置条目的结果。
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum RunResult {
    /// Both external steps succeeded.
    Success,
    /// One of the steps failed; `detail` holds the error chain and output tail.
    Failed {
        reason: FailureReason,
        detail: String,
    },
}

impl RunResult {
    pub fn failed(reason: FailureReason, detail: impl Into<String>) -> Self {
        RunResult::Failed {
            reason,
            detail: detail.into(),
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, RunResult::Success)
    }

    pub fn reason(&self) -> Option<FailureReason> {
        match self {
            RunResult::Success => None,
            RunResult::Failed { reason, .. } => Some(*reason),
        }
    }
}

/// A processed entry: its position, what we learned about it, and how it went.
#[derive(Debug, Clone, Serialize)]
pub struct EntryOutcome {
    /// 0-based position in the configuration set.
    pub index: usize,
    /// `None` when extraction failed before any metadata could be read.
    pub metadata: Option<ModelMetadata>,
    pub result: RunResult,
    pub duration: Duration,
}

impl EntryOutcome {
    pub fn model_name(&self) -> Option<&str> {
        self.metadata.as_ref().map(|m| m.model_name.as_str())
    }
}

/// A failure description kept for the final summary.
/// 为最终摘要保留的失败描述。
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FailureRecord {
    pub index: usize,
    pub reason: FailureReason,
    pub model_name: Option<String>,
    pub detail: String,
}

/// Accumulator folded through the orchestration loop.
///
/// 在编排循环中逐步折叠的累加器。
#[derive(Debug, Clone, Default, Serialize)]
pub struct RunTally {
    pub success_count: usize,
    pub failed_count: usize,
    pub failures: Vec<FailureRecord>,
    pub outcomes: Vec<EntryOutcome>,
}

impl RunTally {
    /// Folds one entry outcome into the tally.
    pub fn record(mut self, outcome: EntryOutcome) -> Self {
        match &outcome.result {
            RunResult::Success => self.success_count += 1,
            RunResult::Failed { reason, detail } => {
                self.failed_count += 1;
                self.failures.push(FailureRecord {
                    index: outcome.index,
                    reason: *reason,
                    model_name: outcome.model_name().map(str::to_string),
                    detail: detail.clone(),
                });
            }
        }
        self.outcomes.push(outcome);
        self
    }

    pub fn attempted(&self) -> usize {
        self.outcomes.len()
    }
}

/// Status of a post-run step (scoring or report generation).
/// 运行后步骤（评分或报告生成）的状态。
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum PostStepStatus {
    /// Not invoked, either because entries failed or a previous post-step failed.
    Skipped,
    Succeeded,
    Failed { detail: String },
}

impl PostStepStatus {
    pub fn is_failure(&self) -> bool {
        matches!(self, PostStepStatus::Failed { .. })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PostStepReport {
    pub scores: PostStepStatus,
    pub report: PostStepStatus,
}

impl PostStepReport {
    pub fn skipped() -> Self {
        Self {
            scores: PostStepStatus::Skipped,
            report: PostStepStatus::Skipped,
        }
    }

    pub fn was_invoked(&self) -> bool {
        self.scores != PostStepStatus::Skipped
    }
}

/// The immutable result of a whole run.
///
/// 整个运行的不可变结果。
#[derive(Debug, Clone, Serialize)]
pub struct RunSummary {
    pub started_at: DateTime<Local>,
    pub duration: Duration,
    /// Number of entries in the configuration set.
    pub total: usize,
    pub success_count: usize,
    pub failed_count: usize,
    pub failures: Vec<FailureRecord>,
    pub outcomes: Vec<EntryOutcome>,
    pub post_steps: PostStepReport,
    /// `true` when the operator stopped the run before every entry was attempted.
    pub interrupted: bool,
}

impl RunSummary {
    pub fn new(
        started_at: DateTime<Local>,
        duration: Duration,
        total: usize,
        tally: RunTally,
        post_steps: PostStepReport,
        interrupted: bool,
    ) -> Self {
        Self {
            started_at,
            duration,
            total,
            success_count: tally.success_count,
            failed_count: tally.failed_count,
            failures: tally.failures,
            outcomes: tally.outcomes,
            post_steps,
            interrupted,
        }
    }

    /// A run succeeds when no entry failed and it ran to completion.
    /// Post-step failures never affect this.
    pub fn is_success(&self) -> bool {
        self.failed_count == 0 && !self.interrupted
    }

    /// Process exit code suitable for CI gating.
    pub fn exit_code(&self) -> u8 {
        if self.is_success() { 0 } else { 1 }
    }
}

/// Formats an elapsed duration as `1h 02m 03s`, `2m 05s` or `4.20s`.
///
/// 将耗时格式化为 `1h 02m 03s`、`2m 05s` 或 `4.20s`。
pub fn format_elapsed(duration: Duration) -> String {
    let total = duration.as_secs();
    let (hours, minutes, seconds) = (total / 3600, (total % 3600) / 60, total % 60);
    if hours > 0 {
        format!("{hours}h {minutes:02}m {seconds:02}s")
    } else if minutes > 0 {
        format!("{minutes}m {seconds:02}s")
    } else {
        format!("{:.2}s", duration.as_secs_f64())
    }
}
