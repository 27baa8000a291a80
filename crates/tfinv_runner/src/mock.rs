//! Mock command runner for testing.
//!
//! Provides a scripted implementation of the CommandRunner trait so that
//! callers can be exercised without terraform or the AWS CLI installed.

use std::collections::VecDeque;
use std::path::PathBuf;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use parking_lot::RwLock;

use crate::command::CommandSpec;
use crate::error::{RunnerError, RunnerResult};
use crate::runner::{CommandOutput, CommandRunner};

/// Predefined mock response for a command execution.
#[derive(Debug, Clone)]
pub struct MockResponse {
    pub exit_code: i32,
    pub stdout: String,
    pub stderr: String,
    pub duration_ms: u64,
    /// When set, the call fails before producing any output.
    pub error: Option<String>,
}

impl MockResponse {
    pub fn success(stdout: impl Into<String>) -> Self {
        Self {
            exit_code: 0,
            stdout: stdout.into(),
            stderr: String::new(),
            duration_ms: 10,
            error: None,
        }
    }

    pub fn failure(exit_code: i32, stderr: impl Into<String>) -> Self {
        Self {
            exit_code,
            stdout: String::new(),
            stderr: stderr.into(),
            duration_ms: 10,
            error: None,
        }
    }

    /// A call that cannot be executed at all (e.g. missing program).
    pub fn spawn_error(message: impl Into<String>) -> Self {
        Self {
            exit_code: -1,
            stdout: String::new(),
            stderr: String::new(),
            duration_ms: 0,
            error: Some(message.into()),
        }
    }
}

/// Captured call information for verification.
#[derive(Debug, Clone)]
pub struct CapturedCall {
    pub program: String,
    pub args: Vec<String>,
    pub current_dir: Option<PathBuf>,
}

impl CapturedCall {
    /// Check whether the call's arguments start with the given prefix.
    pub fn args_start_with(&self, prefix: &[&str]) -> bool {
        self.args.len() >= prefix.len()
            && self.args.iter().zip(prefix).all(|(arg, expected)| arg == expected)
    }
}

/// Mock command runner for testing.
///
/// Responses are consumed in the order they were added; once the queue is
/// empty every call succeeds with empty output. All calls are recorded.
#[derive(Clone, Default)]
pub struct MockRunner {
    /// Queued responses.
    responses: Arc<RwLock<VecDeque<MockResponse>>>,
    /// Captured calls for verification.
    captured_calls: Arc<RwLock<Vec<CapturedCall>>>,
}

impl MockRunner {
    /// Create a new mock runner.
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a response for the next call.
    pub fn add_response(self, response: MockResponse) -> Self {
        self.responses.write().push_back(response);
        self
    }

    /// Replace the response queue.
    pub fn with_responses(self, responses: Vec<MockResponse>) -> Self {
        *self.responses.write() = responses.into();
        self
    }

    /// Number of queued responses not yet consumed.
    pub fn pending_responses(&self) -> usize {
        self.responses.read().len()
    }

    /// Get all captured calls.
    pub fn get_calls(&self) -> Vec<CapturedCall> {
        self.captured_calls.read().clone()
    }

    /// Get the number of calls made.
    pub fn call_count(&self) -> usize {
        self.captured_calls.read().len()
    }

    /// Get calls made to a specific program.
    pub fn get_program_calls(&self, program: &str) -> Vec<CapturedCall> {
        self.captured_calls
            .read()
            .iter()
            .filter(|c| c.program == program)
            .cloned()
            .collect()
    }

    /// Check if a program was invoked with the given leading arguments.
    pub fn was_called_with(&self, program: &str, prefix: &[&str]) -> bool {
        self.captured_calls
            .read()
            .iter()
            .any(|c| c.program == program && c.args_start_with(prefix))
    }

    fn next_response(&self) -> MockResponse {
        self.responses
            .write()
            .pop_front()
            .unwrap_or_else(|| MockResponse::success(""))
    }
}

#[async_trait]
impl CommandRunner for MockRunner {
    async fn run(&self, command: &CommandSpec) -> RunnerResult<CommandOutput> {
        self.captured_calls.write().push(CapturedCall {
            program: command.program.clone(),
            args: command.args.clone(),
            current_dir: command.current_dir.clone(),
        });

        let response = self.next_response();
        if let Some(message) = response.error {
            return Err(RunnerError::ExecutionFailed(message));
        }

        Ok(CommandOutput {
            exit_code: response.exit_code,
            stdout: response.stdout,
            stderr: response.stderr,
            started_at: Utc::now(),
            duration_ms: response.duration_ms,
        })
    }
}
