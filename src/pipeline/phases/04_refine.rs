use crate::agents::prompts::build_refinement_prompt;
use crate::agents::{initiate_chat, ChatAgent, ChatSettings};
use crate::pipeline::context::{DocContext, PipelineState};
use crate::pipeline::error::PipelineError;
use crate::pipeline::phase_trait::WorkflowPhase;
use async_trait::async_trait;
use tracing::{debug, error};

/// Rewrites the draft into the final docstring through an agent conversation
pub struct RefinePhase {
    agent: ChatAgent,
    settings: ChatSettings,
}

impl RefinePhase {
    pub fn new(agent: ChatAgent, settings: ChatSettings) -> Self {
        Self { agent, settings }
    }
}

#[async_trait]
impl WorkflowPhase for RefinePhase {
    fn name(&self) -> &'static str {
        "RefinePhase"
    }

    fn completes(&self) -> PipelineState {
        PipelineState::Refined
    }

    async fn execute(&self, context: &mut DocContext) -> Result<(), PipelineError> {
        let structure = context.structure.as_ref().ok_or(PipelineError::PhaseOrder {
            phase: "RefinePhase",
            requires: "a code structure",
        })?;
        let draft = context.draft.as_deref().ok_or(PipelineError::PhaseOrder {
            phase: "RefinePhase",
            requires: "a draft",
        })?;

        let prompt = build_refinement_prompt(&context.code, structure, draft, &context.examples);
        debug!("Refinement prompt: {} chars", prompt.len());

        let result = initiate_chat(&self.agent, &self.agent, &prompt, &self.settings)
            .await
            .map_err(|e| {
                error!(kind = "service", error = %e, "Refinement conversation failed");
                PipelineError::Refinement(e)
            })?;

        context.refined = Some(result.summary);
        Ok(())
    }
}
