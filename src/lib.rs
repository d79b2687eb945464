//! contech-driver - drop-in C/C++ compiler driver for task-graph tracing
//!
//! `contech-cc` is invoked exactly like `clang`. For each invocation it decides whether there is
//! anything to instrument; if so it compiles the source to IR, runs the contech transform over
//! it, compiles the result back to an object and, when linking, embeds the build's state table
//! and links the tracing runtime. Anything else is handed to the real compiler untouched.
//!
//! # Core Concepts
//!
//! - **Classification**: the compiler's open-ended argument grammar is reduced to a
//!   [`CompileInvocation`] by [`ArgumentClassifier`]; unrecognized tokens are kept verbatim
//! - **Mode**: standard, mark-only, minimal or hammer instrumentation, chosen from the
//!   environment by [`ModeSelector`]
//! - **State file**: a build-wide file through which the transform tool numbers code regions
//!   uniquely across every translation unit
//! - **Tool runner**: every external program runs through [`ToolRunner`]
//!
//! # Example Usage
//!
//! ```no_run
//! use contech_driver::{Driver, DriverConfig, Language, ModeSelector, ProcessRunner};
//! use std::sync::Arc;
//!
//! # async fn example() -> anyhow::Result<()> {
//! let config = DriverConfig::from_env()?;
//! let mode = ModeSelector::select(&config)?;
//! let driver = Driver::new(config, mode, Arc::new(ProcessRunner::new()), std::env::current_dir()?);
//!
//! let exit_code = driver.run(Language::C, &["-O2", "-c", "foo.c"]).await?;
//! # let _ = exit_code;
//! # Ok(())
//! # }
//! ```
//!
//! # Project Structure
//!
//! - [`invocation`]: argument classification
//! - [`config`] and [`mode`]: environment configuration and instrumentation modes
//! - [`pipeline`]: the staged instrumented build
//! - [`embed`] and [`state`]: the shared state file and its embedding into the executable
//! - [`tools`]: external process execution
//! - [`cli`]: the `contech-config` inspection tool

pub mod cli;
pub mod config;
pub mod driver;
pub mod embed;
pub mod invocation;
pub mod mode;
pub mod passthrough;
pub mod pipeline;
pub mod state;
pub mod tools;
pub mod util;

pub use config::{ConfigError, DriverConfig};
pub use driver::{exit_code_for_error, Driver};
pub use embed::{BlobTarget, EmbedError, StateBlobEmbedder};
pub use invocation::{ArgumentClassifier, CompileInvocation, Language};
pub use mode::{Mode, ModeSelector};
pub use pipeline::{PipelineOrchestrator, PipelineOutcome, Plan};
pub use state::{StateError, StateFile};
pub use tools::{ProcessRunner, RecordingRunner, ToolRunner};
pub use util::{init_default, init_from_env, init_logging, LoggingConfig};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Library name
pub const NAME: &str = env!("CARGO_PKG_NAME");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version_exists() {
        assert!(!VERSION.is_empty());
    }

    #[test]
    fn test_name() {
        assert_eq!(NAME, "contech-driver");
    }
}
