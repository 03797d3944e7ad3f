//! # Config Module Unit Tests / Config 模块单元测试
//!
//! Tests for loading `orchestrator.toml`, its defaults, and command rendering.
//!
//! 测试 `orchestrator.toml` 的加载、默认值以及命令渲染。

use model_matrix_runner::config::{
    load_orchestrator_config, resolve_orchestrator_config, OrchestratorConfig, ReportConfig,
};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tempfile::tempdir;

#[test]
fn test_defaults_match_the_conventional_layout() {
    let config = OrchestratorConfig::default();
    assert_eq!(config.config_set_path, PathBuf::from("./model_configs.json"));
    assert_eq!(config.test_script, "./run_all_tests.sh");
    assert_eq!(config.working_artifact_path, PathBuf::from("./temp_config.json"));
    assert!(!config.post_steps_on_empty);
    assert!(config.echo_output);
    assert_eq!(config.step_timeout(), None);
    assert_eq!(config.report.scores_path(), PathBuf::from("result_analyze/scores.json"));
}

#[test]
fn test_partial_file_keeps_defaults_for_missing_fields() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("orchestrator.toml");
    fs::write(
        &path,
        r#"
language = "zh-CN"
test_script = "bash ci/tests.sh"
step_timeout_secs = 90

[report]
output_dir = "out"
"#,
    )
    .unwrap();

    let config = load_orchestrator_config(&path).unwrap();
    assert_eq!(config.language.as_deref(), Some("zh-CN"));
    assert_eq!(config.test_script, "bash ci/tests.sh");
    assert_eq!(config.step_timeout(), Some(Duration::from_secs(90)));
    assert_eq!(config.report.output_dir, PathBuf::from("out"));
    assert_eq!(config.report.working_dir, PathBuf::from("result_analyze"));
    assert_eq!(config.apply_command, OrchestratorConfig::default().apply_command);
}

#[test]
fn test_empty_file_is_all_defaults() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("orchestrator.toml");
    fs::write(&path, "").unwrap();
    assert_eq!(load_orchestrator_config(&path).unwrap(), OrchestratorConfig::default());
}

#[test]
fn test_invalid_toml_reports_the_file() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("broken.toml");
    fs::write(&path, "test_script = [").unwrap();

    let err = load_orchestrator_config(&path).unwrap_err();
    assert!(format!("{err:#}").contains("broken.toml"));
}

#[test]
fn test_explicit_settings_file_must_exist() {
    let dir = tempdir().unwrap();
    let missing = dir.path().join("nope.toml");
    assert!(resolve_orchestrator_config(Some(&missing)).is_err());
}

#[test]
fn test_serialized_defaults_round_trip_through_loader() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("orchestrator.toml");
    let config = OrchestratorConfig {
        language: Some("en".to_string()),
        post_steps_on_empty: true,
        ..OrchestratorConfig::default()
    };
    fs::write(&path, toml::to_string_pretty(&config).unwrap()).unwrap();
    assert_eq!(load_orchestrator_config(&path).unwrap(), config);
}

#[cfg(test)]
mod command_line_tests {
    use super::*;

    fn args(parts: &[&str]) -> Vec<String> {
        parts.iter().map(|p| p.to_string()).collect()
    }

    #[test]
    fn test_apply_placeholder_is_replaced() {
        let config = OrchestratorConfig::default();
        assert_eq!(
            config.apply_command_line(Path::new("./temp_config.json")).unwrap(),
            args(&["python", "convert_models.py", "./temp_config.json"])
        );
    }

    #[test]
    fn test_apply_path_appended_without_placeholder() {
        let config = OrchestratorConfig {
            apply_command: "node apply.js ".to_string(),
            ..OrchestratorConfig::default()
        };
        assert_eq!(
            config.apply_command_line(Path::new("cfg.json")).unwrap(),
            args(&["node", "apply.js", "cfg.json"])
        );
    }

    #[test]
    fn test_apply_path_with_spaces_stays_one_argument() {
        let config = OrchestratorConfig::default();
        let parts = config
            .apply_command_line(Path::new("my dir/temp config.json"))
            .unwrap();
        assert_eq!(parts.len(), 3);
        assert_eq!(parts[2], "my dir/temp config.json");
    }

    #[test]
    fn test_apply_path_is_never_expanded() {
        // SAFETY: test-local variable, only read by this test.
        unsafe { std::env::set_var("MMR_CONVERTER_DIR", "/opt/convert") };
        let config = OrchestratorConfig {
            apply_command: "python $MMR_CONVERTER_DIR/convert_models.py --input={config}".to_string(),
            ..OrchestratorConfig::default()
        };
        let parts = config
            .apply_command_line(Path::new("~/$HOME/temp config.json"))
            .unwrap();
        assert_eq!(
            parts,
            args(&[
                "python",
                "/opt/convert/convert_models.py",
                "--input=~/$HOME/temp config.json"
            ])
        );
    }

    #[test]
    fn test_report_placeholders() {
        let report = ReportConfig {
            command: "python gen.py --scores {scores} --weights {weights} --out {output}"
                .to_string(),
            output_dir: PathBuf::from("$OUT dir"),
            ..ReportConfig::default()
        };
        assert_eq!(
            report.command_line().unwrap(),
            args(&[
                "python",
                "gen.py",
                "--scores",
                "scores.json",
                "--weights",
                "../weight_config.yaml",
                "--out",
                "$OUT dir"
            ])
        );
    }

    #[test]
    fn test_report_command_without_placeholders_is_unchanged() {
        let report = ReportConfig::default();
        assert_eq!(
            report.command_line().unwrap(),
            args(&["python", "generate_report.py"])
        );
    }
}
