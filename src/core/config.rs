//! # Configuration Module / 配置模块
//!
//! Orchestrator settings, loaded from an optional `orchestrator.toml`.
//! Every field has a default, so an empty file (or no file at all) yields a
//! working configuration.
//!
//! 编排器设置，从可选的 `orchestrator.toml` 加载。
//! 每个字段都有默认值，因此空文件（或没有文件）也能得到可用的配置。

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::core::error::OrchestratorError;
use crate::infra::command::parse_command_line;

/// The default name of the settings file looked up in the working directory.
/// 在工作目录中查找的设置文件的默认名称。
pub const SETTINGS_FILE_NAME: &str = "orchestrator.toml";

/// Placeholder replaced by the working artifact path in the apply command.
pub const CONFIG_PLACEHOLDER: &str = "{config}";

/// Top-level orchestrator settings.
/// 编排器的顶层设置。
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct OrchestratorConfig {
    /// The language for output messages (e.g., "en", "zh-CN").
    /// When absent, the system locale is used.
    ///
    /// 输出消息的语言（例如 "en", "zh-CN"）。未指定时使用系统语言。
    #[serde(skip_serializing_if = "Option::is_none")]
    pub language: Option<String>,
    /// JSON array of model configurations.
    /// 模型配置的 JSON 数组。
    pub config_set_path: PathBuf,
    /// Command that runs the test suite against the applied configuration.
    /// 针对已应用配置运行测试套件的命令。
    pub test_script: String,
    /// Where each entry is materialized before the apply step.
    /// 每个条目在应用步骤之前被写入的位置。
    pub working_artifact_path: PathBuf,
    /// Command that applies a working artifact. `{config}` is replaced with its path.
    /// 应用工作配置的命令。`{config}` 会被替换为其路径。
    pub apply_command: String,
    /// Command that computes scores after a fully successful test pass.
    /// 在测试全部通过后计算分数的命令。
    pub score_command: String,
    /// Per-step timeout in seconds. No timeout when absent.
    /// 每个步骤的超时时间（秒）。未指定时不设超时。
    #[serde(skip_serializing_if = "Option::is_none")]
    pub step_timeout_secs: Option<u64>,
    /// Treat an empty configuration set as a successful run that still
    /// triggers scoring and reporting.
    pub post_steps_on_empty: bool,
    /// Echo the output of external steps to the console while they run.
    /// 在外部步骤运行时将其输出回显到控制台。
    pub echo_output: bool,
    /// Report generation settings.
    pub report: ReportConfig,
}

impl Default for OrchestratorConfig {
    fn default() -> Self {
        Self {
            language: None,
            config_set_path: PathBuf::from("./model_configs.json"),
            test_script: "./run_all_tests.sh".to_string(),
            working_artifact_path: PathBuf::from("./temp_config.json"),
            apply_command: "python convert_models.py {config}".to_string(),
            score_command: "python calculate_weighted_scores.py".to_string(),
            step_timeout_secs: None,
            post_steps_on_empty: false,
            echo_output: true,
            report: ReportConfig::default(),
        }
    }
}

impl OrchestratorConfig {
    pub fn step_timeout(&self) -> Option<Duration> {
        self.step_timeout_secs.map(Duration::from_secs)
    }

    /// Splits the apply command and substitutes the artifact path.
    /// The path is appended as the last argument when the template has no placeholder.
    /// Only the template is environment-expanded, never the path.
    ///
    /// 拆分应用命令并代入工作配置路径。如果模板中没有占位符，则将路径作为最后一个参数追加。
    /// 只有模板会进行环境变量展开，路径不会。
    pub fn apply_command_line(&self, artifact: &Path) -> Result<Vec<String>, OrchestratorError> {
        let path = artifact.to_string_lossy();
        let mut parts = parse_command_line(&self.apply_command)?;
        if parts.iter().any(|p| p.contains(CONFIG_PLACEHOLDER)) {
            for part in &mut parts {
                *part = part.replace(CONFIG_PLACEHOLDER, &path);
            }
        } else {
            parts.push(path.into_owned());
        }
        Ok(parts)
    }
}

/// Settings for the final report generation step.
/// The scores and weights file names are fixed inputs of the external generator.
///
/// 最终报告生成步骤的设置。
/// 分数和权重文件名是外部生成器的固定输入。
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct ReportConfig {
    /// Command run inside `working_dir`. May use `{scores}`, `{weights}` and `{output}`.
    pub command: String,
    pub working_dir: PathBuf,
    /// Relative to `working_dir`.
    pub scores_file: PathBuf,
    /// Relative to `working_dir`.
    pub weights_file: PathBuf,
    /// Relative to `working_dir`.
    pub output_dir: PathBuf,
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            command: "python generate_report.py".to_string(),
            working_dir: PathBuf::from("result_analyze"),
            scores_file: PathBuf::from("scores.json"),
            weights_file: PathBuf::from("../weight_config.yaml"),
            output_dir: PathBuf::from("reports"),
        }
    }
}

impl ReportConfig {
    pub fn scores_path(&self) -> PathBuf {
        self.working_dir.join(&self.scores_file)
    }

    /// Splits the report command and substitutes `{scores}`, `{weights}` and `{output}`.
    pub fn command_line(&self) -> Result<Vec<String>, OrchestratorError> {
        let scores = self.scores_file.to_string_lossy();
        let weights = self.weights_file.to_string_lossy();
        let output = self.output_dir.to_string_lossy();
        Ok(parse_command_line(&self.command)?
            .into_iter()
            .map(|part| {
                part.replace("{scores}", &scores)
                    .replace("{weights}", &weights)
                    .replace("{output}", &output)
            })
            .collect())
    }
}

/// Loads orchestrator settings from a TOML file.
pub fn load_orchestrator_config(path: &Path) -> Result<OrchestratorConfig> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read settings file: {}", path.display()))?;
    let config: OrchestratorConfig = toml::from_str(&content)
        .with_context(|| format!("Failed to parse settings file: {}", path.display()))?;
    Ok(config)
}

/// Resolves settings: an explicit file must exist, otherwise `orchestrator.toml`
/// is used when present, otherwise the built-in defaults.
///
/// 解析设置：显式指定的文件必须存在；否则在存在时使用 `orchestrator.toml`；否则使用内置默认值。
pub fn resolve_orchestrator_config(explicit: Option<&Path>) -> Result<OrchestratorConfig> {
    match explicit {
        Some(path) => load_orchestrator_config(path),
        None => {
            let default_path = Path::new(SETTINGS_FILE_NAME);
            if default_path.is_file() {
                load_orchestrator_config(default_path)
            } else {
                Ok(OrchestratorConfig::default())
            }
        }
    }
}
