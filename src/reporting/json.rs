//! Machine-readable run summary for CI pipelines.
//! 供 CI 流水线使用的机器可读运行摘要。

use anyhow::{Context, Result};
use std::path::Path;

use crate::core::models::RunSummary;
use crate::infra::fs;

/// Serializes the summary as pretty-printed JSON.
pub fn render_json_summary(summary: &RunSummary) -> Result<String> {
    serde_json::to_string_pretty(summary).context("Failed to serialize run summary")
}

/// Writes the JSON summary to `output_path`.
pub fn write_json_summary(summary: &RunSummary, output_path: &Path) -> Result<()> {
    let json = render_json_summary(summary)?;
    fs::write_creating_parents(output_path, &json)
}
