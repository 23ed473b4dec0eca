use super::context::{DocContext, PipelineState};
use super::error::PipelineError;
use async_trait::async_trait;

#[async_trait]
pub trait WorkflowPhase: Send + Sync {
    fn name(&self) -> &'static str;

    /// State the context is in once this phase has run
    fn completes(&self) -> PipelineState;

    async fn execute(&self, context: &mut DocContext) -> Result<(), PipelineError>;
}
