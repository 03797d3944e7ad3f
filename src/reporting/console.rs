//! # Console Reporting Module / 控制台报告模块
//!
//! This module prints the end-of-run summary: counts, elapsed time, a table of
//! every entry, the failed entries with their reasons, and the post-step status.
//!
//! 此模块打印运行结束时的摘要：计数、耗时、每个条目的表格、
//! 失败条目及其原因，以及后续步骤的状态。

use colored::*;

use crate::core::models::{
    format_elapsed, EntryOutcome, FailureRecord, PostStepStatus, RunResult, RunSummary, UNKNOWN,
};
use crate::infra::t;

/// Gets the localized status label of an entry outcome.
/// 获取条目结果的本地化状态标签。
pub fn status_label(result: &RunResult, locale: &str) -> String {
    match result {
        RunResult::Success => t!("report.status_passed", locale = locale).to_string(),
        RunResult::Failed { reason, .. } => t!(reason.label_key(), locale = locale).to_string(),
    }
}

/// Gets the localized label of a post-step status.
pub fn post_step_label(status: &PostStepStatus, locale: &str) -> String {
    match status {
        PostStepStatus::Skipped => t!("report.status_skipped", locale = locale).to_string(),
        PostStepStatus::Succeeded => t!("report.status_passed", locale = locale).to_string(),
        PostStepStatus::Failed { .. } => t!("report.status_failed", locale = locale).to_string(),
    }
}

/// Describes a failure as `#3 gpt-x: Configuration update failed`.
pub fn describe_failure(failure: &FailureRecord, locale: &str) -> String {
    let name = failure
        .model_name
        .clone()
        .unwrap_or_else(|| t!("report.no_model_name", locale = locale).to_string());
    format!(
        "#{} {}: {}",
        failure.index + 1,
        name,
        t!(failure.reason.label_key(), locale = locale)
    )
}

/// Prints a formatted summary of the run to the console.
///
/// 在控制台打印格式化的运行摘要。
///
/// # Output Format / 输出格式
/// ```text
/// --- Run Summary ---
///   #   | Model                        | Type     | Status                 | Duration
///   1   | qwen-7b                      | local    | Passed                 |    12m 03s
///   2   | gpt-4o                       | api      | Config update failed   |      1.20s
/// ```
pub fn print_summary(summary: &RunSummary, locale: &str) {
    println!("\n{}", t!("report.summary_banner", locale = locale).bold());
    println!(
        "  {}",
        t!(
            "report.started_at",
            locale = locale,
            time = summary.started_at.format("%Y-%m-%d %H:%M:%S")
        )
    );
    println!(
        "  {}",
        t!("report.elapsed", locale = locale, duration = format_elapsed(summary.duration))
    );
    println!(
        "  {}",
        t!(
            "report.counts",
            locale = locale,
            total = summary.total,
            passed = summary.success_count.to_string().green(),
            failed = summary.failed_count.to_string().red()
        )
    );

    if !summary.outcomes.is_empty() {
        println!(
            "\n  {:<5} | {:<28} | {:<8} | {:<22} | {:>10}",
            "#",
            t!("report.header_model", locale = locale),
            t!("report.header_type", locale = locale),
            t!("report.header_status", locale = locale),
            t!("report.header_duration", locale = locale)
        );
        for outcome in &summary.outcomes {
            print_outcome_row(outcome, locale);
        }
    }

    if !summary.failures.is_empty() {
        println!("\n{}", t!("report.failed_entries", locale = locale).red().bold());
        for failure in &summary.failures {
            println!("  - {}", describe_failure(failure, locale));
        }
    }

    if summary.post_steps.was_invoked() {
        println!(
            "\n  {}: {}",
            t!("report.post_scores", locale = locale),
            colorize_post(&summary.post_steps.scores, locale)
        );
        println!(
            "  {}: {}",
            t!("report.post_report", locale = locale),
            colorize_post(&summary.post_steps.report, locale)
        );
    }
}

fn print_outcome_row(outcome: &EntryOutcome, locale: &str) {
    let (name, model_type) = match &outcome.metadata {
        Some(m) => (m.model_name.as_str(), m.model_type.as_str()),
        None => (UNKNOWN, UNKNOWN),
    };
    let status = status_label(&outcome.result, locale);
    // Pad before colouring so ANSI codes do not break the alignment.
    let status = format!("{status:<22}");
    let status = match outcome.result {
        RunResult::Success => status.green(),
        RunResult::Failed { .. } => status.red(),
    };
    println!(
        "  {:<5} | {:<28} | {:<8} | {} | {:>10}",
        outcome.index + 1,
        truncate(name, 28),
        truncate(model_type, 8),
        status,
        format_elapsed(outcome.duration)
    );
}

fn colorize_post(status: &PostStepStatus, locale: &str) -> ColoredString {
    let label = post_step_label(status, locale);
    match status {
        PostStepStatus::Succeeded => label.green(),
        PostStepStatus::Failed { .. } => label.red(),
        PostStepStatus::Skipped => label.dimmed(),
    }
}

fn truncate(text: &str, width: usize) -> String {
    if text.chars().count() <= width {
        text.to_string()
    } else {
        let kept: String = text.chars().take(width.saturating_sub(1)).collect();
        format!("{kept}…")
    }
}

/// Prints the captured error output of each failed entry.
/// 打印每个失败条目捕获的错误输出。
pub fn print_failure_details(summary: &RunSummary, locale: &str) {
    if summary.failures.is_empty() {
        return;
    }

    println!("\n{}", t!("report.failure_details_banner", locale = locale).red().bold());
    println!("{}", "-".repeat(80));

    for (i, failure) in summary.failures.iter().enumerate() {
        println!(
            "[{}/{}] {}",
            i + 1,
            summary.failures.len(),
            describe_failure(failure, locale).cyan()
        );
        println!("\n{}\n", failure.detail);
        println!("{}", "-".repeat(80));
    }
}

/// Prints the final verdict line.
pub fn print_verdict(summary: &RunSummary, locale: &str) {
    if summary.is_success() {
        println!("\n{}", t!("report.all_passed", locale = locale).green().bold());
        if summary.post_steps.scores.is_failure() || summary.post_steps.report.is_failure() {
            println!("{}", t!("report.post_failed_note", locale = locale).yellow());
        }
    } else if summary.interrupted && summary.failed_count == 0 {
        println!("\n{}", t!("report.run_interrupted", locale = locale).yellow().bold());
    } else {
        println!(
            "\n{}",
            t!("report.run_failed", locale = locale, count = summary.failed_count)
                .red()
                .bold()
        );
    }
}
