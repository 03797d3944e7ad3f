//! # Command Execution Module / 命令执行模块
//!
//! Spawning external steps: parsing command strings, streaming and capturing
//! their output, and turning exit statuses into `Result`s.
//!
//! 启动外部步骤：解析命令字符串，流式读取并捕获其输出，并将退出状态转换为 `Result`。

use anyhow::{Context, Result};
use colored::*;
use std::path::Path;
use std::process::{ExitStatus, Stdio};
use std::sync::Arc;
use std::time::Duration;
use tokio::io::{AsyncBufReadExt, AsyncRead, BufReader};
use tokio::process::Command;
use tokio::task::JoinHandle;

use crate::core::error::OrchestratorError;

/// Number of trailing output lines kept in failure details.
pub const OUTPUT_TAIL_LINES: usize = 40;

/// How long to wait for output readers once the step's processes are gone.
const READER_GRACE: Duration = Duration::from_secs(2);

/// Expands environment variables and `~`, then splits with shell quoting rules.
///
/// 展开环境变量和 `~`，然后按照 shell 引号规则拆分。
pub fn parse_command_line(command: &str) -> Result<Vec<String>, OrchestratorError> {
    let expanded = shellexpand::full(command)
        .map_err(|e| OrchestratorError::CommandParse(e.to_string()))?;
    let parts = shlex::split(&expanded)
        .ok_or_else(|| OrchestratorError::CommandParse(expanded.to_string()))?;
    if parts.is_empty() {
        return Err(OrchestratorError::EmptyCommand);
    }
    Ok(parts)
}

/// Builds a `tokio::process::Command` from already split arguments.
/// On Unix the child leads its own process group, so everything it starts
/// can be killed together.
pub fn build_command_from_parts(parts: &[String], working_dir: Option<&Path>) -> Result<Command> {
    let (program, args) = parts.split_first().ok_or(OrchestratorError::EmptyCommand)?;
    let mut cmd = Command::new(program);
    cmd.args(args).kill_on_drop(true);
    #[cfg(unix)]
    cmd.process_group(0);
    if let Some(dir) = working_dir {
        cmd.current_dir(dir);
    }
    Ok(cmd)
}

/// Builds a `tokio::process::Command` from a command string.
/// The child is killed if the returned handle is dropped before it exits.
pub fn build_command(command: &str, working_dir: Option<&Path>) -> Result<Command> {
    let parts = parse_command_line(command)?;
    build_command_from_parts(&parts, working_dir)
}

/// The process group of a running step. Dropping it kills every process
/// still in the group, including grandchildren the step left behind.
///
/// 正在运行步骤的进程组。析构时会杀死组内仍存活的所有进程，包括步骤遗留的孙进程。
struct ProcessGroup {
    pgid: Option<u32>,
}

impl ProcessGroup {
    fn kill(&mut self) {
        let Some(pgid) = self.pgid.take() else {
            return;
        };
        #[cfg(unix)]
        {
            // SAFETY: killpg only sends a signal; an empty group yields ESRCH.
            let rc = unsafe { libc::killpg(pgid as libc::pid_t, libc::SIGKILL) };
            if rc == 0 {
                tracing::debug!(pgid, "killed step process group");
            }
        }
        #[cfg(not(unix))]
        let _ = pgid;
    }
}

impl Drop for ProcessGroup {
    fn drop(&mut self) {
        self.kill();
    }
}

/// Output reader tasks, aborted if the capture is abandoned.
struct OutputReaders(Vec<JoinHandle<()>>);

impl OutputReaders {
    /// Waits for the readers to drain, giving up after `READER_GRACE`.
    async fn join(mut self) {
        for mut handle in self.0.drain(..) {
            match tokio::time::timeout(READER_GRACE, &mut handle).await {
                Ok(Err(e)) => tracing::warn!("Failed to join output reader: {}", e),
                Ok(Ok(())) => {}
                Err(_) => handle.abort(),
            }
        }
    }
}

impl Drop for OutputReaders {
    fn drop(&mut self) {
        for handle in &self.0 {
            handle.abort();
        }
    }
}

/// Spawns a command, captures its stdout and stderr.
/// The output streams are read concurrently and combined into a single string.
/// When `echo` is set, every line is also printed as it arrives.
///
/// Once the direct child exits, whatever is left of its process group is
/// killed. Dropping the returned future does the same.
///
/// # Returns
/// A tuple containing:
/// - The `ExitStatus` of the process wrapped in an `io::Result`.
/// - The combined stdout and stderr as a `String`.
///
/// 派生一个命令，捕获其 stdout 和 stderr。
/// 输出流被并发读取并合并到一个字符串中。设置 `echo` 时，每一行到达时也会被打印。
/// 直接子进程退出后，其进程组中剩余的进程会被杀死；丢弃返回的 future 也会如此。
pub async fn spawn_and_capture(
    mut cmd: Command,
    echo: bool,
) -> (std::io::Result<ExitStatus>, String) {
    let mut child = match cmd.stdout(Stdio::piped()).stderr(Stdio::piped()).spawn() {
        Ok(child) => child,
        Err(e) => return (Err(e), String::new()),
    };
    let mut group = ProcessGroup { pgid: child.id() };

    let (stdout, stderr) = match (child.stdout.take(), child.stderr.take()) {
        (Some(stdout), Some(stderr)) => (stdout, stderr),
        _ => {
            return (
                Err(std::io::Error::other("Failed to capture child output")),
                String::new(),
            );
        }
    };

    let output = Arc::new(tokio::sync::Mutex::new(String::new()));
    let readers = OutputReaders(vec![
        tokio::spawn(collect_lines(stdout, Arc::clone(&output), echo)),
        tokio::spawn(collect_lines(stderr, Arc::clone(&output), echo)),
    ]);

    let status = child.wait().await;
    group.kill();
    readers.join().await;

    let captured = output.lock().await.clone();
    (status, captured)
}

async fn collect_lines<R>(reader: R, output: Arc<tokio::sync::Mutex<String>>, echo: bool)
where
    R: AsyncRead + Unpin,
{
    let mut lines = BufReader::new(reader).lines();
    while let Ok(Some(line)) = lines.next_line().await {
        if echo {
            println!("    {} {}", "│".dimmed(), line);
        }
        let mut output = output.lock().await;
        output.push_str(&line);
        output.push('\n');
    }
}

/// Runs one external step to completion and maps a non-zero exit to an error.
/// The error message carries the exit status and the tail of the output.
///
/// 运行一个外部步骤直到完成，并将非零退出映射为错误。
/// 错误消息包含退出状态和输出的末尾部分。
pub async fn run_step(
    command: &str,
    working_dir: Option<&Path>,
    timeout: Option<Duration>,
    echo: bool,
) -> Result<String> {
    let parts = parse_command_line(command)?;
    run_step_parts(&parts, working_dir, timeout, echo).await
}

/// Same as [`run_step`] for a command that is already split into arguments.
/// A timed-out step has its whole process group killed.
pub async fn run_step_parts(
    parts: &[String],
    working_dir: Option<&Path>,
    timeout: Option<Duration>,
    echo: bool,
) -> Result<String> {
    let cmd = build_command_from_parts(parts, working_dir)?;
    let command = shlex::try_join(parts.iter().map(String::as_str))
        .unwrap_or_else(|_| parts.join(" "));
    tracing::debug!(%command, ?working_dir, ?timeout, "spawning step");

    let execution = spawn_and_capture(cmd, echo);
    let (status_res, output) = match timeout {
        Some(limit) => tokio::time::timeout(limit, execution)
            .await
            .map_err(|_| OrchestratorError::Timeout(limit))?,
        None => execution.await,
    };

    let status = status_res.with_context(|| format!("Failed to execute '{command}'"))?;
    tracing::debug!(%command, code = ?status.code(), "step finished");

    if status.success() {
        Ok(output)
    } else {
        let tail = output_tail(&output, OUTPUT_TAIL_LINES);
        if tail.is_empty() {
            anyhow::bail!("'{command}' exited with {status}");
        }
        anyhow::bail!("'{command}' exited with {status}\n{tail}");
    }
}

/// Returns the last `max_lines` lines of `output`.
pub fn output_tail(output: &str, max_lines: usize) -> String {
    let lines: Vec<&str> = output.trim_end().lines().collect();
    let start = lines.len().saturating_sub(max_lines);
    lines[start..].join("\n")
}
