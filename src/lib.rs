//! # Model Matrix Runner Library / Model Matrix Runner 库
//!
//! This library provides the core functionality for the Model Matrix Runner
//! tool, which runs an external test suite once per model definition and, on a
//! clean pass, triggers the scoring and report steps.
//!
//! 此库为 Model Matrix Runner 工具提供核心功能，
//! 它为每个模型定义运行一次外部测试套件，并在全部通过后触发评分和报告步骤。
//!
//! ## Modules / 模块
//!
//! - `core` - Data models, settings, external steps and the orchestration loop
//! - `infra` - Infrastructure services like command execution and file system operations
//! - `reporting` - Run summary reporting (console, HTML, JSON)
//! - `cli` - Command-line interface and commands
//!
//! - `core` - 数据模型、设置、外部步骤和编排循环
//! - `infra` - 基础设施服务，如命令执行和文件系统操作
//! - `reporting` - 运行摘要报告（控制台、HTML、JSON）
//! - `cli` - 命令行接口和命令

pub mod cli;
pub mod core;
pub mod infra;
pub mod reporting;

// Re-export commonly used items
pub use self::core::config;
pub use self::core::execution;
pub use self::core::models;

// Initialize i18n
rust_i18n::i18n!("locales", fallback = "en");

/// Resolves the language used for output messages.
///
/// An explicit request wins, otherwise the system locale is detected. The
/// full locale (e.g., "zh-CN") is tried first, then just the language code
/// (e.g., "en" from "en-US"), and finally the default language ("en").
///
/// 解析用于输出消息的语言。显式指定优先，否则检测系统语言。
/// 先尝试完整的区域设置（如 "zh-CN"），再尝试语言代码（如 "en-US" 中的 "en"），最后回退到 "en"。
pub fn resolve_locale(requested: Option<&str>) -> String {
    let locale = requested
        .map(str::to_string)
        .or_else(sys_locale::get_locale)
        .unwrap_or_else(|| "en".to_string());
    let available_locales = rust_i18n::available_locales!();

    if available_locales.contains(&locale.as_str()) {
        return locale;
    }
    locale
        .split(['-', '_'])
        .next()
        .and_then(|lang| available_locales.iter().find(|l| l.eq_ignore_ascii_case(lang)))
        .map(|lang| lang.to_string())
        .unwrap_or_else(|| "en".to_string())
}
