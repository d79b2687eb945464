//! Forwarding an invocation to the underlying compiler untouched.
//!
//! Used when an invocation has nothing to instrument: dependency scans, compile-only calls
//! without a recognised source, and anything else with nothing to link.

use crate::tools::{ToolInvocation, ToolRunner, SPAWN_FAILURE_EXIT_CODE};
use std::ffi::OsStr;
use std::path::Path;
use tracing::{debug, error};

/// Runs `compiler` with exactly `tokens` and returns its exit code.
///
/// A compiler that cannot be started yields [`SPAWN_FAILURE_EXIT_CODE`].
pub async fn forward<I, S>(
    runner: &dyn ToolRunner,
    compiler: impl AsRef<OsStr>,
    tokens: I,
    cwd: Option<&Path>,
) -> i32
where
    I: IntoIterator<Item = S>,
    S: AsRef<OsStr>,
{
    let mut invocation = ToolInvocation::new(compiler).args(tokens);
    if let Some(dir) = cwd {
        invocation = invocation.current_dir(dir);
    }

    debug!(command = %invocation, "Passing invocation through");

    match runner.run(&invocation).await {
        Ok(status) => status.code(),
        Err(e) => {
            error!(error = %e, "Passthrough compiler failed to start");
            SPAWN_FAILURE_EXIT_CODE
        }
    }
}
