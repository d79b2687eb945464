use anyhow::Result;
use async_trait::async_trait;
use tracing::info;

use crate::pipeline::context::BuildContext;
use crate::pipeline::stage::{PipelineStage, StageStatus};

/// Compiles the instrumented IR to an object and adds it to the link set.
pub struct BackendStage;

#[async_trait]
impl PipelineStage for BackendStage {
    fn name(&self) -> &'static str {
        "backend"
    }

    async fn execute(&self, context: &mut BuildContext<'_>) -> Result<StageStatus> {
        let unit = context.unit()?.clone();
        info!(object = %unit.object.display(), "Compiling instrumented IR");

        let invocation = context
            .tool(context.compiler())
            .args(context.compile_flags())
            .args(["-c", "-o"])
            .arg(&unit.object)
            .arg(&unit.instrumented_ir);

        let status = context.run(&invocation).await?;
        if status == StageStatus::Continue {
            context.remove_temporaries(unit.intermediates());
            context.objects.push(unit.object);
        }

        Ok(status)
    }
}
