use crate::agents::prompts::build_quality_message;
use crate::agents::{initiate_chat, ChatAgent, ChatSettings};
use crate::pipeline::context::{DocContext, PipelineState};
use crate::pipeline::error::PipelineError;
use crate::pipeline::phase_trait::WorkflowPhase;
use crate::pipeline::result::QualityVerdict;
use async_trait::async_trait;
use tracing::{error, info};

pub struct QualityPhase {
    agent: ChatAgent,
    settings: ChatSettings,
}

impl QualityPhase {
    pub fn new(agent: ChatAgent, settings: ChatSettings) -> Self {
        Self { agent, settings }
    }
}

#[async_trait]
impl WorkflowPhase for QualityPhase {
    fn name(&self) -> &'static str {
        "QualityPhase"
    }

    fn completes(&self) -> PipelineState {
        PipelineState::Checked
    }

    async fn execute(&self, context: &mut DocContext) -> Result<(), PipelineError> {
        let structure = context.structure.as_ref().ok_or(PipelineError::PhaseOrder {
            phase: "QualityPhase",
            requires: "a code structure",
        })?;
        let refined = context.refined.as_deref().ok_or(PipelineError::PhaseOrder {
            phase: "QualityPhase",
            requires: "a refined docstring",
        })?;

        let message = build_quality_message(&context.code, structure, refined);
        let result = initiate_chat(&self.agent, &self.agent, &message, &self.settings)
            .await
            .map_err(|e| {
                error!(kind = "service", error = %e, "Quality check conversation failed");
                PipelineError::QualityCheck(e)
            })?;

        let verdict = QualityVerdict::classify(&result.summary);
        info!(approved = verdict.is_approved(), "Quality check complete");
        context.verdict = Some(verdict);
        Ok(())
    }
}
