//! # Reporting Module / 报告模块
//!
//! This module handles the display and export of run summaries: a colourful
//! console table, a standalone HTML page and a JSON document for CI.
//!
//! 此模块处理运行摘要的显示和导出：彩色控制台表格、独立的 HTML 页面以及供 CI 使用的 JSON 文档。

pub mod console;
pub mod html;
pub mod json;

// Re-export common reporting functions
pub use console::{print_failure_details, print_summary, print_verdict};
pub use html::generate_html_report;
pub use json::write_json_summary;
