use async_trait::async_trait;
use std::io;
use std::process::{ExitStatus, Stdio};
use thiserror::Error;
use tokio::process::Command;
use tracing::debug;

use super::command::ToolInvocation;

/// Exit code a shell reports for a command it cannot run.
pub const SPAWN_FAILURE_EXIT_CODE: i32 = 127;

#[derive(Debug, Error)]
pub enum ToolError {
    #[error("Failed to run {program}: {source}")]
    Spawn {
        program: String,
        #[source]
        source: io::Error,
    },
}

/// How an external tool finished.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ToolStatus {
    code: i32,
}

impl ToolStatus {
    pub const SUCCESS: ToolStatus = ToolStatus { code: 0 };

    pub fn from_code(code: i32) -> Self {
        Self { code }
    }

    pub fn code(self) -> i32 {
        self.code
    }

    pub fn success(self) -> bool {
        self.code == 0
    }
}

impl From<ExitStatus> for ToolStatus {
    fn from(status: ExitStatus) -> Self {
        if let Some(code) = status.code() {
            return Self { code };
        }

        #[cfg(unix)]
        {
            use std::os::unix::process::ExitStatusExt;
            if let Some(signal) = status.signal() {
                return Self { code: 128 + signal };
            }
        }

        Self { code: 1 }
    }
}

/// Runs external tools to completion.
///
/// Every compiler, transform and link invocation the driver makes goes through this trait.
#[async_trait]
pub trait ToolRunner: Send + Sync {
    async fn run(&self, invocation: &ToolInvocation) -> Result<ToolStatus, ToolError>;
}

/// Spawns real processes, inheriting stdin, stdout and stderr so tool diagnostics reach the
/// caller untouched.
#[derive(Debug, Default, Clone, Copy)]
pub struct ProcessRunner;

impl ProcessRunner {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl ToolRunner for ProcessRunner {
    async fn run(&self, invocation: &ToolInvocation) -> Result<ToolStatus, ToolError> {
        debug!(command = %invocation, "Spawning tool");

        let mut command = Command::new(invocation.program());
        command
            .args(invocation.get_args())
            .stdin(Stdio::inherit())
            .stdout(Stdio::inherit())
            .stderr(Stdio::inherit());
        if let Some(dir) = invocation.cwd() {
            command.current_dir(dir);
        }

        let status = command.status().await.map_err(|source| ToolError::Spawn {
            program: invocation.program().to_string_lossy().into_owned(),
            source,
        })?;

        let status = ToolStatus::from(status);
        debug!(
            program = %invocation.program().to_string_lossy(),
            code = status.code(),
            "Tool finished"
        );
        Ok(status)
    }
}
