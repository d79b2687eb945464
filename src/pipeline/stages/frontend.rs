use anyhow::Result;
use async_trait::async_trait;
use tracing::info;

use crate::pipeline::context::BuildContext;
use crate::pipeline::stage::{PipelineStage, StageStatus};

/// Compiles the source to IR with the caller's flags.
pub struct FrontendStage;

#[async_trait]
impl PipelineStage for FrontendStage {
    fn name(&self) -> &'static str {
        "frontend"
    }

    async fn execute(&self, context: &mut BuildContext<'_>) -> Result<StageStatus> {
        let unit = context.unit()?;
        info!(source = %unit.source.display(), ir = %unit.ir.display(), "Compiling to IR");

        let invocation = context
            .tool(context.compiler())
            .args(context.compile_flags())
            .arg(&unit.source)
            .args(["-emit-llvm", "-c", "-o"])
            .arg(&unit.ir);

        context.run(&invocation).await
    }
}
