use anyhow::{Context, Result};
use async_trait::async_trait;

use crate::embed::StateBlobEmbedder;
use crate::pipeline::context::BuildContext;
use crate::pipeline::stage::{PipelineStage, StageStatus};

/// Converts the state file into the object the final link carries.
pub struct EmbedStage;

#[async_trait]
impl PipelineStage for EmbedStage {
    fn name(&self) -> &'static str {
        "embed"
    }

    async fn execute(&self, context: &mut BuildContext<'_>) -> Result<StageStatus> {
        let state = context.state_file();
        let object = StateBlobEmbedder::new(context.config.blob_target)
            .embed(&state, &context.work_dir)
            .context("Cannot embed the state table")?;

        context.state_object = Some(object);
        Ok(StageStatus::Continue)
    }
}
