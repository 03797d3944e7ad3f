// Shared test helpers for integration tests
#![allow(dead_code)]

use anyhow::{bail, Result};
use model_matrix_runner::core::config::OrchestratorConfig;
use model_matrix_runner::core::steps::StepExecutor;
use model_matrix_runner::models::{EntryOutcome, ModelMetadata};
use serde_json::{json, Value};
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::{tempdir, TempDir};

/// Builds a configuration entry the way the model conversion tooling expects it.
pub fn api_entry(name: &str) -> Value {
    json!({
        "model_type": "api",
        "model_name": name,
        "class": "ApiModel",
        "config": {
            "provider": "url",
            "model_identifier": format!("{name}-id"),
            "api_key": "YOUR_API_KEY",
            "base_url": "YOUR_BASE_URL",
            "concurrency": 1
        }
    })
}

pub fn local_entry(name: &str, model_path: &str) -> Value {
    json!({
        "model_type": "local",
        "model_name": name,
        "class": "LocalModel",
        "config": { "model_path": model_path }
    })
}

/// Writes a configuration set to `dir/model_configs.json`.
pub fn write_config_set(dir: &Path, entries: &[Value]) -> PathBuf {
    let path = dir.join("model_configs.json");
    fs::write(&path, serde_json::to_string_pretty(entries).unwrap()).unwrap();
    path
}

/// Settings pointing the working artifact into a temporary directory.
pub fn config_in(dir: &TempDir) -> OrchestratorConfig {
    OrchestratorConfig {
        config_set_path: dir.path().join("model_configs.json"),
        working_artifact_path: dir.path().join("temp_config.json"),
        ..OrchestratorConfig::default()
    }
}

pub fn setup_workspace() -> TempDir {
    tempdir().expect("Failed to create temporary directory")
}

/// One recorded invocation of an external step.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StepCall {
    Apply(String),
    Test(String),
    Scores,
    Report,
}

/// A step executor that records every call and fails on demand.
#[derive(Debug, Default)]
pub struct RecordingSteps {
    pub calls: Vec<StepCall>,
    /// Raw artifact contents seen by each apply call.
    pub applied_artifacts: Vec<Value>,
    /// Whether the artifact existed on disk when apply was invoked.
    pub artifact_present_on_apply: Vec<bool>,
    pub fail_apply_for: Vec<String>,
    pub fail_tests_for: Vec<String>,
    pub fail_scores: bool,
    pub fail_report: bool,
    /// Never complete the test step for these models.
    pub hang_tests_for: Vec<String>,
    /// `(index, artifact still on disk)` once each entry has finished.
    pub artifact_left_after_entry: Vec<(usize, bool)>,
    last_applied: Option<String>,
}

impl RecordingSteps {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing_apply(names: &[&str]) -> Self {
        Self {
            fail_apply_for: names.iter().map(|s| s.to_string()).collect(),
            ..Self::default()
        }
    }

    pub fn failing_tests(names: &[&str]) -> Self {
        Self {
            fail_tests_for: names.iter().map(|s| s.to_string()).collect(),
            ..Self::default()
        }
    }

    pub fn failing_scores() -> Self {
        Self {
            fail_scores: true,
            ..Self::default()
        }
    }

    pub fn failing_report() -> Self {
        Self {
            fail_report: true,
            ..Self::default()
        }
    }

    pub fn hanging_tests(names: &[&str]) -> Self {
        Self {
            hang_tests_for: names.iter().map(|s| s.to_string()).collect(),
            ..Self::default()
        }
    }

    pub fn count(&self, wanted: fn(&StepCall) -> bool) -> usize {
        self.calls.iter().filter(|c| wanted(c)).count()
    }
}

impl StepExecutor for RecordingSteps {
    async fn apply_configuration(&mut self, artifact: &Path) -> Result<()> {
        self.artifact_present_on_apply.push(artifact.is_file());
        let name = ModelMetadata::read_from(artifact)
            .map(|m| m.model_name)
            .unwrap_or_else(|_| "unreadable".to_string());
        if let Ok(content) = fs::read_to_string(artifact) {
            if let Ok(value) = serde_json::from_str(&content) {
                self.applied_artifacts.push(value);
            }
        }
        self.calls.push(StepCall::Apply(name.clone()));
        self.last_applied = Some(name.clone());
        if self.fail_apply_for.contains(&name) {
            bail!("convert failed for {name}");
        }
        Ok(())
    }

    async fn run_tests(&mut self) -> Result<()> {
        let name = self.last_applied.clone().unwrap_or_default();
        self.calls.push(StepCall::Test(name.clone()));
        if self.hang_tests_for.contains(&name) {
            std::future::pending::<()>().await;
        }
        if self.fail_tests_for.contains(&name) {
            bail!("tests failed for {name}");
        }
        Ok(())
    }

    async fn compute_scores(&mut self) -> Result<()> {
        self.calls.push(StepCall::Scores);
        if self.fail_scores {
            bail!("scoring failed");
        }
        Ok(())
    }

    async fn generate_report(&mut self) -> Result<()> {
        self.calls.push(StepCall::Report);
        if self.fail_report {
            bail!("report failed");
        }
        Ok(())
    }

    fn entry_finished(&mut self, outcome: &EntryOutcome, artifact: &Path) {
        self.artifact_left_after_entry
            .push((outcome.index, artifact.exists()));
    }
}

/// Writes the shell helpers used by the binary-level tests and a settings file
/// wiring them up. The apply step fails for models whose name contains
/// `fail-apply`; the test step fails for models whose name contains `fail-test`.
pub fn setup_script_workspace() -> TempDir {
    let dir = setup_workspace();
    let root = dir.path();

    fs::write(
        root.join("apply.sh"),
        "#!/bin/sh\nif grep -q fail-apply \"$1\"; then echo 'cannot convert' >&2; exit 3; fi\ncp \"$1\" applied.json\necho \"applied $1\"\n",
    )
    .unwrap();
    fs::write(
        root.join("run_tests.sh"),
        "#!/bin/sh\nif grep -q fail-test applied.json; then echo 'assertion failed' >&2; exit 1; fi\necho 'all tests ok'\n",
    )
    .unwrap();
    fs::write(
        root.join("score.sh"),
        "#!/bin/sh\nmkdir -p result_analyze\necho '{}' > result_analyze/scores.json\n",
    )
    .unwrap();
    fs::create_dir_all(root.join("result_analyze")).unwrap();

    let settings = r#"
language = "en"
config_set_path = "model_configs.json"
test_script = "sh run_tests.sh"
working_artifact_path = "temp_config.json"
apply_command = "sh apply.sh {config}"
score_command = "sh score.sh"
echo_output = false

[report]
command = "sh -c 'mkdir -p reports && echo done > reports/report.html'"
working_dir = "result_analyze"
scores_file = "scores.json"
"#;
    fs::write(root.join("orchestrator.toml"), settings).unwrap();
    dir
}
