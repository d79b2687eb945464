//! Top-level control flow of one compiler invocation.

use crate::config::DriverConfig;
use crate::invocation::{ArgumentClassifier, Language};
use crate::mode::Mode;
use crate::passthrough;
use crate::pipeline::{BuildContext, PipelineOrchestrator, Plan};
use crate::tools::{ToolError, ToolRunner, SPAWN_FAILURE_EXIT_CODE};
use anyhow::Result;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{debug, info};

/// Exit code for failures of the driver itself.
pub const DRIVER_FAILURE_EXIT_CODE: i32 = 1;

/// Runs classified invocations with a fixed configuration and mode.
pub struct Driver {
    config: DriverConfig,
    mode: Mode,
    runner: Arc<dyn ToolRunner>,
    work_dir: PathBuf,
}

impl Driver {
    pub fn new(
        config: DriverConfig,
        mode: Mode,
        runner: Arc<dyn ToolRunner>,
        work_dir: impl Into<PathBuf>,
    ) -> Self {
        Self {
            config,
            mode,
            runner,
            work_dir: work_dir.into(),
        }
    }

    pub fn config(&self) -> &DriverConfig {
        &self.config
    }

    pub fn mode(&self) -> &Mode {
        &self.mode
    }

    /// Handles one invocation and returns the exit code the process should end with.
    ///
    /// Tool failures are reported through the exit code. An `Err` means the driver itself could
    /// not proceed; [`exit_code_for_error`] maps it to an exit code.
    pub async fn run<S: AsRef<str>>(&self, language: Language, tokens: &[S]) -> Result<i32> {
        let invocation = ArgumentClassifier::new(language).classify(tokens);
        debug!(?invocation, "Classified invocation");

        match Plan::for_invocation(&invocation, &self.mode) {
            Plan::Passthrough(reason) => {
                info!(%reason, "Passing invocation through to the compiler");
                let compiler = self.config.compiler_for(invocation.language);
                let tokens = tokens.iter().map(|t| t.as_ref());
                Ok(passthrough::forward(
                    self.runner.as_ref(),
                    compiler,
                    tokens,
                    Some(self.work_dir.as_path()),
                )
                .await)
            }
            Plan::Pipeline(stages) => {
                let mut context = BuildContext::new(
                    &self.config,
                    &self.mode,
                    self.runner.as_ref(),
                    &invocation,
                    &self.work_dir,
                );
                let outcome = PipelineOrchestrator::new()
                    .execute(&stages, &mut context)
                    .await?;
                Ok(outcome.exit_code())
            }
        }
    }
}

/// Exit code for a driver error: a tool that could not be started exits like a shell would,
/// anything else with [`DRIVER_FAILURE_EXIT_CODE`].
pub fn exit_code_for_error(err: &anyhow::Error) -> i32 {
    let spawn_failure = err
        .chain()
        .any(|cause| matches!(cause.downcast_ref::<ToolError>(), Some(ToolError::Spawn { .. })));

    if spawn_failure {
        SPAWN_FAILURE_EXIT_CODE
    } else {
        DRIVER_FAILURE_EXIT_CODE
    }
}
