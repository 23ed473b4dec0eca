use crate::corpus::ExampleCorpus;
use crate::pipeline::context::{DocContext, PipelineState};
use crate::pipeline::error::PipelineError;
use crate::pipeline::phase_trait::WorkflowPhase;
use async_trait::async_trait;
use std::sync::Arc;
use tracing::debug;

/// Picks the reference examples shown to the refinement agent
pub struct SamplePhase {
    corpus: Arc<dyn ExampleCorpus>,
    count: usize,
}

impl SamplePhase {
    pub fn new(corpus: Arc<dyn ExampleCorpus>, count: usize) -> Self {
        Self { corpus, count }
    }
}

#[async_trait]
impl WorkflowPhase for SamplePhase {
    fn name(&self) -> &'static str {
        "SamplePhase"
    }

    fn completes(&self) -> PipelineState {
        PipelineState::CorpusSampled
    }

    async fn execute(&self, context: &mut DocContext) -> Result<(), PipelineError> {
        let corpus = self.corpus.snapshot().await?;
        context.examples = corpus.sample(self.count);
        debug!(
            "Sampled {} of {} examples from {}",
            context.examples.len(),
            corpus.len(),
            self.corpus.describe()
        );
        Ok(())
    }
}
