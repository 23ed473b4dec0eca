use crate::analysis::{analyze, CodeStructure};
use crate::pipeline::context::{DocContext, PipelineState};
use crate::pipeline::error::PipelineError;
use crate::pipeline::phase_trait::WorkflowPhase;
use async_trait::async_trait;
use tracing::{debug, warn};

pub struct AnalyzePhase;

#[async_trait]
impl WorkflowPhase for AnalyzePhase {
    fn name(&self) -> &'static str {
        "AnalyzePhase"
    }

    fn completes(&self) -> PipelineState {
        PipelineState::Analyzed
    }

    async fn execute(&self, context: &mut DocContext) -> Result<(), PipelineError> {
        let structure = analyze(&context.code);
        match &structure {
            CodeStructure::Error(e) => {
                warn!(error = %e.error, "Structure analysis failed, continuing with error record")
            }
            CodeStructure::Summary(s) => debug!(
                "Found {} functions, {} classes, {} imports",
                s.functions.len(),
                s.classes.len(),
                s.imports.len()
            ),
        }
        context.structure = Some(structure);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_invalid_code_is_recovered() {
        let mut context = DocContext::new("def broken(:");
        AnalyzePhase.execute(&mut context).await.unwrap();
        assert!(context.structure.unwrap().is_error());
    }
}
