use super::context::BuildContext;
use super::stage::{PipelineStage, StageStatus};
use super::stages::{BackendStage, EmbedStage, FrontendStage, InstrumentStage, LinkStage};
use crate::invocation::CompileInvocation;
use crate::mode::Mode;
use anyhow::{Context, Result};
use std::fmt;
use std::time::Instant;
use tracing::{debug, info, warn};

/// Why an invocation goes straight to the compiler.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PassthroughReason {
    /// Dependency generation without compilation.
    DependencyScan,
    /// Compile-only with no recognised source; the compiler reports the problem.
    CompileWithoutSource,
    /// Neither a source to compile nor objects to link.
    NothingToLink,
}

impl fmt::Display for PassthroughReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PassthroughReason::DependencyScan => write!(f, "dependency scan"),
            PassthroughReason::CompileWithoutSource => write!(f, "compile without source"),
            PassthroughReason::NothingToLink => write!(f, "nothing to link"),
        }
    }
}

/// What the driver will do with an invocation.
pub enum Plan {
    Passthrough(PassthroughReason),
    Pipeline(Vec<Box<dyn PipelineStage>>),
}

impl Plan {
    /// Decides between passthrough and the stage list for `invocation` under `mode`.
    pub fn for_invocation(invocation: &CompileInvocation, mode: &Mode) -> Self {
        if invocation.is_dependency_scan() {
            return Plan::Passthrough(PassthroughReason::DependencyScan);
        }

        if !invocation.has_source() {
            if invocation.compile_only {
                return Plan::Passthrough(PassthroughReason::CompileWithoutSource);
            }
            if invocation.objects.is_empty() {
                return Plan::Passthrough(PassthroughReason::NothingToLink);
            }
        }

        let mut stages: Vec<Box<dyn PipelineStage>> = Vec::new();
        if invocation.has_source() {
            stages.push(Box::new(FrontendStage));
            stages.push(Box::new(InstrumentStage));
            stages.push(Box::new(BackendStage));
        }
        if !invocation.compile_only {
            if mode.embeds_state() {
                stages.push(Box::new(EmbedStage));
            }
            stages.push(Box::new(LinkStage));
        }

        Plan::Pipeline(stages)
    }

    pub fn stage_names(&self) -> Vec<&'static str> {
        match self {
            Plan::Passthrough(_) => Vec::new(),
            Plan::Pipeline(stages) => stages.iter().map(|s| s.name()).collect(),
        }
    }
}

impl fmt::Debug for Plan {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Plan::Passthrough(reason) => f.debug_tuple("Passthrough").field(reason).finish(),
            Plan::Pipeline(_) => f.debug_tuple("Pipeline").field(&self.stage_names()).finish(),
        }
    }
}

/// Result of running a stage list.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PipelineOutcome {
    Completed,
    Failed { stage: &'static str, exit_code: i32 },
}

impl PipelineOutcome {
    pub fn exit_code(&self) -> i32 {
        match self {
            PipelineOutcome::Completed => 0,
            PipelineOutcome::Failed { exit_code, .. } => *exit_code,
        }
    }
}

/// Runs stages in order until one fails.
#[derive(Debug, Default)]
pub struct PipelineOrchestrator;

impl PipelineOrchestrator {
    pub fn new() -> Self {
        Self
    }

    pub async fn execute(
        &self,
        stages: &[Box<dyn PipelineStage>],
        context: &mut BuildContext<'_>,
    ) -> Result<PipelineOutcome> {
        let start = Instant::now();
        info!(
            mode = %context.mode,
            stages = stages.len(),
            "Starting instrumented build"
        );

        for stage in stages {
            let name = stage.name();
            info!("Stage: {}", name);

            let stage_start = Instant::now();
            let status = stage
                .execute(context)
                .await
                .with_context(|| format!("Stage {} failed", name))?;

            if let StageStatus::Failed(exit_code) = status {
                warn!(stage = name, exit_code, "Tool failed; skipping remaining stages");
                return Ok(PipelineOutcome::Failed {
                    stage: name,
                    exit_code,
                });
            }

            debug!("Stage {} complete in {:?}", name, stage_start.elapsed());
        }

        info!("Build complete in {:?}", start.elapsed());
        Ok(PipelineOutcome::Completed)
    }
}
