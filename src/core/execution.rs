//! # Orchestration Engine Module / 编排引擎模块
//!
//! This module drives a run: every entry of the configuration set is
//! materialized, applied and tested in index order, one at a time, and the
//! scoring and report steps follow only when every entry passed.
//!
//! 此模块驱动一次运行：配置集合中的每个条目按索引顺序逐一被写出、应用并测试，
//! 只有当所有条目都通过时，才会继续执行评分和报告步骤。

use anyhow::Result;
use chrono::Local;
use colored::*;
use serde_json::Value;
use std::future::Future;
use std::path::{Path, PathBuf};
use std::time::Instant;
use tokio_util::sync::CancellationToken;

use crate::{
    core::{
        config::OrchestratorConfig,
        models::{
            format_elapsed, ConfigurationSet, EntryOutcome, FailureReason, ModelMetadata,
            PostStepReport, PostStepStatus, RunResult, RunSummary, RunTally,
        },
        steps::StepExecutor,
    },
    infra::{fs, fs::WorkingArtifact, t},
};

/// Either the step finished, or the run was cancelled while it was in flight.
enum Guarded<T> {
    Finished(T),
    Cancelled,
}

/// Sequentially processes a configuration set with a given step executor.
///
/// 使用给定的步骤执行器按顺序处理配置集合。
pub struct Orchestrator<S> {
    steps: S,
    working_artifact: PathBuf,
    post_steps_on_empty: bool,
    stop_token: CancellationToken,
    locale: String,
}

impl<S: StepExecutor> Orchestrator<S> {
    pub fn new(steps: S, config: &OrchestratorConfig, locale: &str) -> Self {
        Self {
            steps,
            working_artifact: config.working_artifact_path.clone(),
            post_steps_on_empty: config.post_steps_on_empty,
            stop_token: CancellationToken::new(),
            locale: locale.to_string(),
        }
    }

    /// Uses `token` to stop the run; cancelling it kills the in-flight step.
    pub fn with_stop_token(mut self, token: CancellationToken) -> Self {
        self.stop_token = token;
        self
    }

    pub fn steps(&self) -> &S {
        &self.steps
    }

    pub fn into_steps(self) -> S {
        self.steps
    }

    /// Loads the configuration set at `config_set_path` and runs it.
    pub async fn run(&mut self, config_set_path: &Path) -> Result<RunSummary> {
        let set = ConfigurationSet::load(config_set_path)?;
        println!(
            "{}",
            t!(
                "run.loaded_config_set",
                locale = &self.locale,
                path = config_set_path.display(),
                count = set.len()
            )
        );
        self.run_set(&set).await
    }

    /// Runs every entry of `set` in order, then the post-steps when warranted.
    ///
    /// 按顺序运行 `set` 中的每个条目，并在满足条件时运行后续步骤。
    pub async fn run_set(&mut self, set: &ConfigurationSet) -> Result<RunSummary> {
        let started_at = Local::now();
        let start = Instant::now();
        let total = set.len();

        fs::clear_stale_artifact(&self.working_artifact)?;

        let mut tally = RunTally::default();
        let mut interrupted = false;

        for (index, entry) in set.iter().enumerate() {
            if self.stop_token.is_cancelled() {
                interrupted = true;
                break;
            }
            let outcome = self.process_entry(index, total, entry).await;
            self.steps.entry_finished(&outcome, &self.working_artifact);
            if outcome.result.reason() == Some(FailureReason::Interrupted) {
                interrupted = true;
            }
            tally = tally.record(outcome);
            if interrupted {
                break;
            }
        }

        let post_steps = if interrupted {
            PostStepReport::skipped()
        } else if tally.failed_count > 0 {
            println!(
                "\n{}",
                t!("post.skipped_failures", locale = &self.locale, count = tally.failed_count)
                    .yellow()
            );
            PostStepReport::skipped()
        } else if total == 0 && !self.post_steps_on_empty {
            println!("\n{}", t!("post.skipped_empty", locale = &self.locale).yellow());
            PostStepReport::skipped()
        } else {
            self.run_post_steps().await
        };

        if interrupted {
            println!("\n{}", t!("run.interrupted", locale = &self.locale).yellow().bold());
        }

        Ok(RunSummary::new(
            started_at,
            start.elapsed(),
            total,
            tally,
            post_steps,
            interrupted,
        ))
    }

    /// Processes entry `index`: extract, read metadata, apply, test, clean up.
    async fn process_entry(&mut self, index: usize, total: usize, entry: &Value) -> EntryOutcome {
        let locale = self.locale.clone();
        let start = Instant::now();
        println!(
            "\n{}",
            t!("run.entry_header", locale = &locale, current = index + 1, total = total)
                .bold()
                .cyan()
        );

        // 1. Extract
        println!("  {}", t!("run.extracting", locale = &locale).blue());
        let artifact = match WorkingArtifact::create(&self.working_artifact, index, entry) {
            Ok(artifact) => artifact,
            Err(e) => {
                println!("  {} {}", t!("run.extraction_failed", locale = &locale).red(), e);
                return EntryOutcome {
                    index,
                    metadata: None,
                    result: RunResult::failed(FailureReason::ExtractionFailed, e.to_string()),
                    duration: start.elapsed(),
                };
            }
        };

        // 2. Metadata
        let metadata = ModelMetadata::read_from(artifact.path()).unwrap_or_else(|e| {
            tracing::warn!("metadata unreadable for entry {}: {:#}", index, e);
            println!("  {}", t!("run.metadata_unreadable", locale = &locale).yellow());
            ModelMetadata::unknown()
        });
        println!(
            "  {}",
            t!(
                "run.model_info",
                locale = &locale,
                model_type = &metadata.model_type,
                name = metadata.model_name.yellow(),
                identifier = &metadata.model_identifier
            )
        );

        // 3 + 4. Apply, then test
        let result = self.apply_and_test(artifact.path()).await;

        // 5. Cleanup, regardless of the outcome
        if let Err(e) = artifact.discard() {
            println!("  {} {:#}", t!("run.cleanup_failed", locale = &locale).yellow(), e);
        }

        let duration = start.elapsed();
        let elapsed = format_elapsed(duration);
        match &result {
            RunResult::Success => println!(
                "  {}",
                t!("run.entry_passed", locale = &locale, name = &metadata.model_name, duration = &elapsed)
                    .green()
                    .bold()
            ),
            RunResult::Failed { reason, .. } => println!(
                "  {}",
                t!(
                    "run.entry_failed",
                    locale = &locale,
                    name = &metadata.model_name,
                    reason = t!(reason.label_key(), locale = &locale),
                    duration = &elapsed
                )
                .red()
                .bold()
            ),
        }

        EntryOutcome {
            index,
            metadata: Some(metadata),
            result,
            duration,
        }
    }

    async fn apply_and_test(&mut self, artifact: &Path) -> RunResult {
        let locale = self.locale.clone();
        let stop = self.stop_token.clone();

        println!("  {}", t!("run.applying", locale = &locale).blue());
        match guard(&stop, self.steps.apply_configuration(artifact)).await {
            Guarded::Cancelled => return RunResult::failed(FailureReason::Interrupted, "interrupted"),
            Guarded::Finished(Err(e)) => {
                println!("  {}", t!("run.apply_failed", locale = &locale).red());
                return RunResult::failed(FailureReason::ConfigUpdateFailed, format!("{e:#}"));
            }
            Guarded::Finished(Ok(())) => {}
        }

        println!("  {}", t!("run.testing", locale = &locale).blue());
        match guard(&stop, self.steps.run_tests()).await {
            Guarded::Cancelled => RunResult::failed(FailureReason::Interrupted, "interrupted"),
            Guarded::Finished(Err(e)) => {
                println!("  {}", t!("run.tests_failed", locale = &locale).red());
                RunResult::failed(FailureReason::TestRunFailed, format!("{e:#}"))
            }
            Guarded::Finished(Ok(())) => RunResult::Success,
        }
    }

    /// Scoring, then report generation if scoring succeeded.
    /// Failures here are reported but never change the run's exit status.
    ///
    /// 先评分，评分成功后再生成报告。这里的失败会被报告，但不会改变运行的退出状态。
    async fn run_post_steps(&mut self) -> PostStepReport {
        let locale = self.locale.clone();
        let stop = self.stop_token.clone();

        println!("\n{}", t!("post.computing_scores", locale = &locale).blue().bold());
        let scores = match guard(&stop, self.steps.compute_scores()).await {
            Guarded::Finished(Ok(())) => {
                println!("  {}", t!("post.scores_done", locale = &locale).green());
                PostStepStatus::Succeeded
            }
            Guarded::Finished(Err(e)) => {
                println!("  {} {:#}", t!("post.scores_failed", locale = &locale).red(), e);
                PostStepStatus::Failed { detail: format!("{e:#}") }
            }
            Guarded::Cancelled => PostStepStatus::Failed {
                detail: "interrupted".to_string(),
            },
        };

        if scores != PostStepStatus::Succeeded {
            println!("  {}", t!("post.report_skipped", locale = &locale).yellow());
            return PostStepReport {
                scores,
                report: PostStepStatus::Skipped,
            };
        }

        println!("\n{}", t!("post.generating_report", locale = &locale).blue().bold());
        let report = match guard(&stop, self.steps.generate_report()).await {
            Guarded::Finished(Ok(())) => {
                println!("  {}", t!("post.report_done", locale = &locale).green());
                PostStepStatus::Succeeded
            }
            Guarded::Finished(Err(e)) => {
                println!("  {} {:#}", t!("post.report_failed", locale = &locale).red(), e);
                PostStepStatus::Failed { detail: format!("{e:#}") }
            }
            Guarded::Cancelled => PostStepStatus::Failed {
                detail: "interrupted".to_string(),
            },
        };

        PostStepReport { scores, report }
    }
}

/// Races a step against the stop token. Dropping the step future kills its child process.
async fn guard<T>(token: &CancellationToken, step: impl Future<Output = T>) -> Guarded<T> {
    tokio::select! {
        biased;
        _ = token.cancelled() => Guarded::Cancelled,
        value = step => Guarded::Finished(value),
    }
}
