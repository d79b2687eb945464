//! External tool execution.
//!
//! [`ToolRunner`] is the seam between the pipeline and the outside world: the production
//! [`ProcessRunner`] spawns real compilers, while [`RecordingRunner`] records what would have
//! run and imitates the tools' file side effects.

pub mod command;
pub mod recording;
pub mod runner;

pub use command::ToolInvocation;
pub use recording::RecordingRunner;
pub use runner::{ProcessRunner, ToolError, ToolRunner, ToolStatus, SPAWN_FAILURE_EXIT_CODE};
