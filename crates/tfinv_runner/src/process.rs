//! Runner that spawns real child processes.

use std::io::ErrorKind;
use std::process::Stdio;
use std::time::Duration;

use async_trait::async_trait;
use chrono::Utc;
use tokio::process::Command;
use tracing::{debug, warn};

use crate::command::{CommandSpec, RunOptions};
use crate::error::{RunnerError, RunnerResult};
use crate::runner::{CommandOutput, CommandRunner};

/// Executes commands as local child processes.
///
/// Stdout and stderr are captured in full; stdin is closed. A child that
/// outlives the configured timeout is killed.
#[derive(Debug, Clone, Default)]
pub struct ProcessRunner {
    options: RunOptions,
}

impl ProcessRunner {
    pub fn new(options: RunOptions) -> Self {
        Self { options }
    }

    fn build_command(command: &CommandSpec) -> Command {
        let mut cmd = Command::new(&command.program);
        cmd.args(&command.args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);

        if let Some(dir) = &command.current_dir {
            cmd.current_dir(dir);
        }

        cmd
    }
}

#[async_trait]
impl CommandRunner for ProcessRunner {
    async fn run(&self, command: &CommandSpec) -> RunnerResult<CommandOutput> {
        debug!("Executing: {}", command);

        let mut cmd = Self::build_command(command);
        let started_at = Utc::now();

        let output = match self.options.timeout_seconds {
            Some(secs) => tokio::time::timeout(Duration::from_secs(secs), cmd.output())
                .await
                .map_err(|_| {
                    warn!("{} did not finish within {}s", command.program, secs);
                    RunnerError::Timeout(secs)
                })?,
            None => cmd.output().await,
        };

        let output = output.map_err(|e| match e.kind() {
            ErrorKind::NotFound => RunnerError::ProgramNotFound(command.program.clone()),
            _ => RunnerError::SpawnFailed {
                program: command.program.clone(),
                message: e.to_string(),
            },
        })?;

        let duration_ms = (Utc::now() - started_at).num_milliseconds().max(0) as u64;
        let exit_code = output.status.code().unwrap_or(-1);

        debug!(
            "{} exited with code {} after {}ms",
            command.program, exit_code, duration_ms
        );

        Ok(CommandOutput {
            exit_code,
            stdout: String::from_utf8_lossy(&output.stdout).to_string(),
            stderr: String::from_utf8_lossy(&output.stderr).to_string(),
            started_at,
            duration_ms,
        })
    }
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_captures_stdout_and_exit_code() {
        let runner = ProcessRunner::default();
        let spec = CommandSpec::new("sh").args(["-c", "echo hello; echo oops >&2; exit 3"]);

        let output = runner.run(&spec).await.unwrap();

        assert_eq!(output.exit_code, 3);
        assert_eq!(output.stdout, "hello\n");
        assert_eq!(output.stderr, "oops\n");
        assert!(!output.success());
    }

    #[tokio::test]
    async fn test_runs_in_current_dir() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("marker.txt"), "found").unwrap();

        let runner = ProcessRunner::default();
        let spec = CommandSpec::new("cat").arg("marker.txt").current_dir(dir.path());

        let output = runner.run_checked(&spec).await.unwrap();
        assert_eq!(output.stdout, "found");
    }

    #[tokio::test]
    async fn test_missing_program() {
        let runner = ProcessRunner::default();
        let spec = CommandSpec::new("tfinv-definitely-not-installed");

        let err = runner.run(&spec).await.unwrap_err();
        assert!(matches!(err, RunnerError::ProgramNotFound(p) if p == "tfinv-definitely-not-installed"));
    }

    #[tokio::test]
    async fn test_run_checked_reports_stderr() {
        let runner = ProcessRunner::default();
        let spec = CommandSpec::new("sh").args(["-c", "echo 'no state' >&2; exit 1"]);

        let err = runner.run_checked(&spec).await.unwrap_err();
        match err {
            RunnerError::CommandFailed { exit_code, stderr, .. } => {
                assert_eq!(exit_code, 1);
                assert_eq!(stderr, "no state");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[tokio::test]
    async fn test_timeout_kills_child() {
        let runner = ProcessRunner::new(RunOptions::default().timeout(1));
        let spec = CommandSpec::new("sleep").arg("5");

        let err = runner.run(&spec).await.unwrap_err();
        assert!(matches!(err, RunnerError::Timeout(1)));
    }
}
