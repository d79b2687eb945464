use super::context::BuildContext;
use anyhow::Result;
use async_trait::async_trait;

/// How a stage finished.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StageStatus {
    Continue,
    /// A tool exited non-zero; the build stops with this code.
    Failed(i32),
}

#[async_trait]
pub trait PipelineStage: Send + Sync {
    fn name(&self) -> &'static str;

    async fn execute(&self, context: &mut BuildContext<'_>) -> Result<StageStatus>;
}
