//! # HTML Reporting Module / HTML 报告模块
//!
//! Renders the run summary as a standalone HTML page with summary counters,
//! a table of entries and collapsible failure output.
//!
//! 将运行摘要渲染为独立的 HTML 页面，包含摘要计数、条目表格以及可折叠的失败输出。

use anyhow::Result;
use maud::{html, Markup, PreEscaped, DOCTYPE};
use std::path::Path;

use crate::core::models::{format_elapsed, PostStepStatus, RunResult, RunSummary, UNKNOWN};
use crate::infra::{fs, t};
use crate::reporting::console::{post_step_label, status_label};

/// Embedded CSS styles for HTML reports / HTML 报告的嵌入式 CSS 样式
const HTML_STYLE: &str = r#"
body { font-family: -apple-system, "Segoe UI", Roboto, Arial, sans-serif; margin: 40px; color: #222; }
.summary-container { display: flex; gap: 24px; margin: 20px 0; }
.summary-item { padding: 12px 20px; border-radius: 6px; background: #f5f5f5; text-align: center; }
.summary-item .count { display: block; font-size: 1.8em; font-weight: 600; }
.passed-text { color: #2e7d32; } .failed-text { color: #c62828; }
table { border-collapse: collapse; width: 100%; }
th, td { border: 1px solid #e0e0e0; padding: 8px 12px; text-align: left; }
th { background: #fafafa; }
.status-Passed { color: #2e7d32; font-weight: 600; }
.status-Failed { color: #c62828; font-weight: 600; }
.duration-cell { text-align: right; font-family: Menlo, Consolas, monospace; }
details pre { background: #1e1e1e; color: #eee; padding: 12px; overflow-x: auto; }
"#;

/// Generates an HTML report from a run summary and writes it to `output_path`.
///
/// 根据运行摘要生成 HTML 报告并写入 `output_path`。
///
/// # Errors / 错误
/// Returns an error if the file cannot be written.
pub fn generate_html_report(summary: &RunSummary, output_path: &Path, locale: &str) -> Result<()> {
    let markup = render_html_report(summary, locale);
    fs::write_creating_parents(output_path, &markup.into_string())
}

/// Builds the report markup without touching the file system.
pub fn render_html_report(summary: &RunSummary, locale: &str) -> Markup {
    html! {
        (DOCTYPE)
        html {
            head {
                meta charset="utf-8";
                title { (t!("html_report.title", locale = locale)) }
                style { (PreEscaped(HTML_STYLE)) }
            }
            body {
                h1 { (t!("html_report.title", locale = locale)) }
                p {
                    (t!("report.started_at", locale = locale, time = summary.started_at.format("%Y-%m-%d %H:%M:%S")))
                    " · "
                    (t!("report.elapsed", locale = locale, duration = format_elapsed(summary.duration)))
                }
                div class="summary-container" {
                    (summary_item(summary.total, "", &t!("html_report.total", locale = locale)))
                    (summary_item(summary.success_count, "passed-text", &t!("html_report.passed", locale = locale)))
                    (summary_item(summary.failed_count, "failed-text", &t!("html_report.failed", locale = locale)))
                }
                table {
                    thead {
                        tr {
                            th { "#" }
                            th { (t!("report.header_model", locale = locale)) }
                            th { (t!("report.header_type", locale = locale)) }
                            th { (t!("html_report.identifier", locale = locale)) }
                            th { (t!("report.header_status", locale = locale)) }
                            th class="duration-cell" { (t!("report.header_duration", locale = locale)) }
                        }
                    }
                    tbody {
                        @for outcome in &summary.outcomes {
                            @let metadata = outcome.metadata.as_ref();
                            tr {
                                td { (outcome.index + 1) }
                                td { (metadata.map_or(UNKNOWN, |m| m.model_name.as_str())) }
                                td { (metadata.map_or(UNKNOWN, |m| m.model_type.as_str())) }
                                td { (metadata.map_or(UNKNOWN, |m| m.model_identifier.as_str())) }
                                td class=(status_class(&outcome.result)) {
                                    (status_label(&outcome.result, locale))
                                    @if let RunResult::Failed { detail, .. } = &outcome.result {
                                        details {
                                            summary { (t!("html_report.toggle_output", locale = locale)) }
                                            pre { (detail) }
                                        }
                                    }
                                }
                                td class="duration-cell" { (format_elapsed(outcome.duration)) }
                            }
                        }
                    }
                }
                @if summary.post_steps.was_invoked() {
                    h2 { (t!("html_report.post_steps", locale = locale)) }
                    ul {
                        li { (t!("report.post_scores", locale = locale)) ": " (post_step_label(&summary.post_steps.scores, locale)) }
                        li { (t!("report.post_report", locale = locale)) ": " (post_step_label(&summary.post_steps.report, locale)) }
                    }
                    @for status in [&summary.post_steps.scores, &summary.post_steps.report] {
                        @if let PostStepStatus::Failed { detail } = status {
                            pre { (detail) }
                        }
                    }
                }
            }
        }
    }
}

fn summary_item(count: usize, class: &str, label: &str) -> Markup {
    html! {
        div class="summary-item" {
            span class={ "count " (class) } { (count) }
            span class="label" { (label) }
        }
    }
}

fn status_class(result: &RunResult) -> &'static str {
    match result {
        RunResult::Success => "status-Passed",
        RunResult::Failed { .. } => "status-Failed",
    }
}
