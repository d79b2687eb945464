use anyhow::Result;
use async_trait::async_trait;
use std::path::{Path, PathBuf};
use tracing::info;

use crate::embed::{STATE_OBJECT, STATE_SNAPSHOT};
use crate::pipeline::artifacts::{DEFAULT_EXECUTABLE, LINK_TAIL};
use crate::pipeline::context::BuildContext;
use crate::pipeline::stage::{PipelineStage, StageStatus};

/// Links the runtime, every object and the state table into the executable.
pub struct LinkStage;

#[async_trait]
impl PipelineStage for LinkStage {
    fn name(&self) -> &'static str {
        "link"
    }

    async fn execute(&self, context: &mut BuildContext<'_>) -> Result<StageStatus> {
        let output = context
            .invocation
            .output
            .clone()
            .unwrap_or_else(|| PathBuf::from(DEFAULT_EXECUTABLE));
        let runtime = context.mode.runtime(context.config);

        info!(
            output = %output.display(),
            objects = context.objects.len(),
            embedded_state = context.state_object.is_some(),
            "Linking"
        );

        let mut invocation = context.tool(context.compiler());
        if let Some(artifact) = runtime.artifact() {
            invocation = invocation.arg(artifact);
        }
        invocation = invocation
            .args(&context.objects)
            .args(context.compile_flags())
            .arg("-o")
            .arg(&output)
            .args(LINK_TAIL);
        if let Some(ref state_object) = context.state_object {
            invocation = invocation.arg(state_object);
        }

        let status = context.run(&invocation).await?;
        if status == StageStatus::Continue && context.state_object.is_some() {
            context.remove_temporaries([Path::new(STATE_SNAPSHOT), Path::new(STATE_OBJECT)]);
        }

        Ok(status)
    }
}
