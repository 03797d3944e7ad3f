//! # External Steps Module / 外部步骤模块
//!
//! The four external collaborators of a run, behind one trait so the
//! orchestration loop does not care how they are carried out.
//!
//! 一次运行中的四个外部协作者，统一在一个 trait 之后，
//! 使编排循环不关心它们的具体执行方式。

use anyhow::Result;
use std::path::Path;
use std::time::Duration;

use crate::core::config::OrchestratorConfig;
use crate::core::error::OrchestratorError;
use crate::core::models::EntryOutcome;
use crate::infra::command;

/// The external steps invoked by the orchestrator.
/// `Ok(())` means the step signalled success (exit status 0).
///
/// 编排器调用的外部步骤。`Ok(())` 表示该步骤报告成功（退出码为 0）。
#[allow(async_fn_in_trait)]
pub trait StepExecutor {
    /// Applies the working artifact at `artifact`.
    async fn apply_configuration(&mut self, artifact: &Path) -> Result<()>;
    /// Runs the test suite against whatever configuration was applied last.
    async fn run_tests(&mut self) -> Result<()>;
    /// Computes scores from the test results.
    async fn compute_scores(&mut self) -> Result<()>;
    /// Generates the final report from the computed scores.
    async fn generate_report(&mut self) -> Result<()>;

    /// Called once entry processing is over and its working artifact has been
    /// removed, before the next entry starts.
    fn entry_finished(&mut self, _outcome: &EntryOutcome, _artifact: &Path) {}
}

/// Runs each step as an external process built from the orchestrator settings.
///
/// 根据编排器设置，将每个步骤作为外部进程运行。
#[derive(Debug, Clone)]
pub struct CommandSteps {
    config: OrchestratorConfig,
    timeout: Option<Duration>,
}

impl CommandSteps {
    pub fn new(config: OrchestratorConfig) -> Self {
        let timeout = config.step_timeout();
        Self { config, timeout }
    }

    async fn run(&self, command: &str, working_dir: Option<&Path>) -> Result<()> {
        command::run_step(command, working_dir, self.timeout, self.config.echo_output).await?;
        Ok(())
    }

    async fn run_parts(&self, parts: &[String], working_dir: Option<&Path>) -> Result<()> {
        command::run_step_parts(parts, working_dir, self.timeout, self.config.echo_output)
            .await?;
        Ok(())
    }
}

impl StepExecutor for CommandSteps {
    async fn apply_configuration(&mut self, artifact: &Path) -> Result<()> {
        let parts = self.config.apply_command_line(artifact)?;
        self.run_parts(&parts, None).await
    }

    async fn run_tests(&mut self) -> Result<()> {
        self.run(&self.config.test_script, None).await
    }

    async fn compute_scores(&mut self) -> Result<()> {
        self.run(&self.config.score_command, None).await
    }

    async fn generate_report(&mut self) -> Result<()> {
        let report = &self.config.report;
        let scores = report.scores_path();
        if !scores.is_file() {
            return Err(OrchestratorError::MissingReportInput(scores).into());
        }
        self.run_parts(&report.command_line()?, Some(&report.working_dir))
            .await
    }
}
