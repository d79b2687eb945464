use anyhow::{Context, Result};
use async_trait::async_trait;
use tracing::info;

use crate::pipeline::context::BuildContext;
use crate::pipeline::stage::{PipelineStage, StageStatus};

/// Runs the transform tool over the IR, numbering code regions through the shared state file.
///
/// The state lock is held for the whole transform so concurrent driver processes in one build
/// append their identifiers one after another.
pub struct InstrumentStage;

#[async_trait]
impl PipelineStage for InstrumentStage {
    fn name(&self) -> &'static str {
        "instrument"
    }

    async fn execute(&self, context: &mut BuildContext<'_>) -> Result<StageStatus> {
        let unit = context.unit()?;
        let state = context.state_file();

        let transform = context
            .mode
            .transform(context.config, &unit.ir, &unit.instrumented_ir, state.path());
        let invocation = context
            .tool(&context.config.opt)
            .arg(transform.load_arg())
            .args(&transform.args);

        let lock = state
            .lock()
            .with_context(|| format!("Cannot serialize access to {}", state.path().display()))?;
        let before = state.len();

        let status = context.run(&invocation).await?;

        let segment = state.appended_since(before);
        drop(lock);

        info!(
            mode = %context.mode,
            offset = segment.offset,
            appended = segment.len,
            "Instrumented IR"
        );
        context.state_segment = Some(segment);

        Ok(status)
    }
}
