//! Typed errors raised while loading inputs and materializing entries.

use std::path::PathBuf;
use std::time::Duration;

#[derive(Debug, thiserror::Error)]
pub enum OrchestratorError {
    #[error("Invalid JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Configuration set must be a JSON array, found {0}")]
    NotAnArray(&'static str),

    #[error("Configuration entry {index} must be a JSON object, found {found}")]
    EntryNotAnObject { index: usize, found: &'static str },

    #[error("Failed to write working artifact {path}: {source}")]
    ArtifactWrite {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse command line: {0}")]
    CommandParse(String),

    #[error("Command is empty")]
    EmptyCommand,

    #[error("Step timed out after {0:?}")]
    Timeout(Duration),

    #[error("Missing input file for report generation: {0}")]
    MissingReportInput(PathBuf),
}
