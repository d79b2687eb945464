//! The instrumented build: front-end, transform, back-end, state embedding and link.
//!
//! [`Plan::for_invocation`] decides whether an invocation needs the pipeline at all and, if so,
//! which stages; [`PipelineOrchestrator`] runs them over a shared [`BuildContext`] and stops at
//! the first tool that fails.

pub mod artifacts;
pub mod context;
pub mod orchestrator;
pub mod stage;
pub mod stages;

pub use artifacts::{UnitArtifacts, BASE_FLAG, DEFAULT_EXECUTABLE, LINK_TAIL};
pub use context::BuildContext;
pub use orchestrator::{PassthroughReason, PipelineOrchestrator, PipelineOutcome, Plan};
pub use stage::{PipelineStage, StageStatus};
