//! # Run Command Module / 运行命令模块
//!
//! This module implements the `run` command, which processes every model
//! configuration in the configuration set and reports the outcome.
//!
//! 此模块实现了 `run` 命令，处理配置集合中的每个模型配置并报告结果。

use anyhow::{Context, Result};
use colored::*;
use std::path::PathBuf;
use tokio::signal;
use tokio_util::sync::CancellationToken;

use crate::{
    core::{
        config::{self, OrchestratorConfig},
        execution::Orchestrator,
        models::RunSummary,
        steps::CommandSteps,
    },
    infra::t,
    reporting::{
        console::{print_failure_details, print_summary, print_verdict},
        html::generate_html_report,
        json::write_json_summary,
    },
};

/// Arguments of the `run` command. `None` falls back to the settings file.
#[derive(Debug, Clone, Default)]
pub struct RunArgs {
    pub config_set: Option<PathBuf>,
    pub test_script: Option<String>,
    pub working_artifact: Option<PathBuf>,
    pub settings: Option<PathBuf>,
    pub timeout_secs: Option<u64>,
    pub html: Option<PathBuf>,
    pub json: Option<PathBuf>,
    pub lang: Option<String>,
}

/// Executes the run command with the provided arguments.
///
/// # Returns
/// The process exit code: 0 when every entry passed, 1 otherwise.
pub async fn execute(args: RunArgs) -> Result<u8> {
    let config = setup_config(&args)?;
    let locale = crate::resolve_locale(args.lang.as_deref().or(config.language.as_deref()));
    rust_i18n::set_locale(&locale);

    println!(
        "{}",
        t!("run.settings", locale = &locale, test_script = config.test_script.yellow())
    );
    println!(
        "{}",
        t!(
            "run.working_artifact",
            locale = &locale,
            path = config.working_artifact_path.display()
        )
    );

    let stop_token = setup_signal_handler(&locale);
    let mut orchestrator = Orchestrator::new(CommandSteps::new(config.clone()), &config, &locale)
        .with_stop_token(stop_token);

    let summary = orchestrator
        .run(&config.config_set_path)
        .await
        .with_context(|| t!("run.config_set_failed", locale = &locale).to_string())?;

    print_summary(&summary, &locale);
    print_failure_details(&summary, &locale);
    write_reports(&summary, &args, &locale);
    print_verdict(&summary, &locale);

    Ok(summary.exit_code())
}

/// Loads settings and applies command-line overrides.
fn setup_config(args: &RunArgs) -> Result<OrchestratorConfig> {
    let mut config = config::resolve_orchestrator_config(args.settings.as_deref())?;
    if let Some(path) = &args.config_set {
        config.config_set_path = path.clone();
    }
    if let Some(script) = &args.test_script {
        config.test_script = script.clone();
    }
    if let Some(path) = &args.working_artifact {
        config.working_artifact_path = path.clone();
    }
    if args.timeout_secs.is_some() {
        config.step_timeout_secs = args.timeout_secs;
    }
    Ok(config)
}

/// Writes the optional HTML and JSON summaries. Failures are reported, not fatal.
fn write_reports(summary: &RunSummary, args: &RunArgs, locale: &str) {
    if let Some(report_path) = &args.html {
        println!(
            "\n{}",
            t!("run.writing_html", locale = locale, path = report_path.display())
        );
        if let Err(e) = generate_html_report(summary, report_path, locale) {
            eprintln!("{} {:#}", t!("run.html_failed", locale = locale).red(), e);
        }
    }
    if let Some(json_path) = &args.json {
        println!(
            "\n{}",
            t!("run.writing_json", locale = locale, path = json_path.display())
        );
        if let Err(e) = write_json_summary(summary, json_path) {
            eprintln!("{} {:#}", t!("run.json_failed", locale = locale).red(), e);
        }
    }
}

/// Sets up a signal handler for graceful shutdown.
fn setup_signal_handler(locale: &str) -> CancellationToken {
    let token = CancellationToken::new();
    let token_clone = token.clone();
    let locale = locale.to_string();

    tokio::spawn(async move {
        match signal::ctrl_c().await {
            Ok(()) => {
                println!("\n{}", t!("shutdown_signal", locale = &locale).yellow());
                token_clone.cancel();
            }
            Err(e) => tracing::warn!("failed to listen for Ctrl-C: {}", e),
        }
    });

    token
}
