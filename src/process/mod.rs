//! External tool invocation
//!
//! One call spawns exactly one child process, captures stdout and stderr
//! separately, and classifies a non-zero exit as failure no matter what the
//! tool printed. Every run is bounded by a timeout; an elapsed timeout is its
//! own failure, distinct from the tool failing. Retry and fallback policy
//! belongs to the strategy layer above.

use async_trait::async_trait;
use std::process::Stdio;
use std::time::Duration;
use thiserror::Error;
use tokio::process::Command;

#[derive(Debug, Error)]
pub enum ProcessError {
    #[error("failed to spawn {program}: {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },

    #[error("{program} exited with status {code:?}: {stderr}")]
    NonZeroExit {
        program: String,
        code: Option<i32>,
        stderr: String,
    },

    #[error("{program} timed out after {seconds}s")]
    TimedOut { program: String, seconds: u64 },
}

/// Captured output of a successful tool run
#[derive(Debug, Clone)]
pub struct ToolOutput {
    pub stdout: Vec<u8>,
    pub stderr: Vec<u8>,
}

impl ToolOutput {
    pub fn stdout_text(&self) -> String {
        String::from_utf8_lossy(&self.stdout).into_owned()
    }
}

/// Seam for running external tools, mockable in tests
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CommandRunner: Send + Sync {
    async fn run(
        &self,
        program: &str,
        args: &[String],
        timeout: Duration,
    ) -> Result<ToolOutput, ProcessError>;
}

/// Production runner backed by `tokio::process`
pub struct TokioCommandRunner;

#[async_trait]
impl CommandRunner for TokioCommandRunner {
    async fn run(
        &self,
        program: &str,
        args: &[String],
        timeout: Duration,
    ) -> Result<ToolOutput, ProcessError> {
        tracing::debug!("running: {} {}", program, args.join(" "));

        let future = Command::new(program)
            .args(args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            // an elapsed timeout must reap the child, not orphan it
            .kill_on_drop(true)
            .output();

        let output = match tokio::time::timeout(timeout, future).await {
            Ok(result) => result.map_err(|source| ProcessError::Spawn {
                program: program.to_string(),
                source,
            })?,
            Err(_) => {
                return Err(ProcessError::TimedOut {
                    program: program.to_string(),
                    seconds: timeout.as_secs(),
                })
            }
        };

        if !output.status.success() {
            return Err(ProcessError::NonZeroExit {
                program: program.to_string(),
                code: output.status.code(),
                stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
            });
        }

        Ok(ToolOutput {
            stdout: output.stdout,
            stderr: output.stderr,
        })
    }
}
