use crate::error::BackendError;
use crate::llm::TextGenerator;
use crate::pipeline::context::{DocContext, PipelineState};
use crate::pipeline::error::PipelineError;
use crate::pipeline::phase_trait::WorkflowPhase;
use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};

const DRAFT_PROMPT_PREFIX: &str = "generate docstring: ";
const DRAFT_HEADER: &str = "Initial docstring from transformer model:\n";
const DRAFT_ERROR_PREFIX: &str = "Transformer model error: ";

pub fn draft_prompt(code: &str) -> String {
    format!("{}{}", DRAFT_PROMPT_PREFIX, code)
}

/// Text handed to the refinement step when the draft model fails
pub fn draft_placeholder(reason: &str) -> String {
    format!("{}{}", DRAFT_ERROR_PREFIX, reason)
}

pub fn is_draft_placeholder(draft: &str) -> bool {
    draft.starts_with(DRAFT_ERROR_PREFIX)
}

/// First-pass docstring from the local seq2seq model.
///
/// Never fails: any problem with the model becomes a placeholder draft.
pub struct DraftPhase {
    generator: Arc<dyn TextGenerator>,
    enabled: bool,
    max_length: usize,
    timeout: Duration,
}

impl DraftPhase {
    pub fn new(
        generator: Arc<dyn TextGenerator>,
        enabled: bool,
        max_length: usize,
        timeout: Duration,
    ) -> Self {
        Self {
            generator,
            enabled,
            max_length,
            timeout,
        }
    }

    async fn generate(&self, code: &str) -> Result<String, BackendError> {
        let prompt = draft_prompt(code);
        tokio::time::timeout(self.timeout, self.generator.generate(&prompt, self.max_length))
            .await
            .map_err(|_| BackendError::TimeoutError {
                seconds: self.timeout.as_secs(),
            })?
    }
}

#[async_trait]
impl WorkflowPhase for DraftPhase {
    fn name(&self) -> &'static str {
        "DraftPhase"
    }

    fn completes(&self) -> PipelineState {
        PipelineState::Drafted
    }

    async fn execute(&self, context: &mut DocContext) -> Result<(), PipelineError> {
        if !self.enabled {
            debug!("Draft generation disabled");
            context.draft = Some(draft_placeholder("draft generation disabled"));
            return Ok(());
        }

        let draft = match self.generate(&context.code).await {
            Ok(text) => {
                debug!("{} produced a {}-char draft", self.generator.name(), text.len());
                format!("{}{}", DRAFT_HEADER, text)
            }
            Err(e) => {
                warn!(generator = self.generator.name(), error = %e, "Draft generation failed, using placeholder");
                draft_placeholder(&e.to_string())
            }
        };
        context.draft = Some(draft);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm::MockTextGenerator;

    fn phase(generator: MockTextGenerator, enabled: bool) -> DraftPhase {
        DraftPhase::new(Arc::new(generator), enabled, 512, Duration::from_millis(200))
    }

    #[tokio::test]
    async fn test_successful_draft() {
        let generator = MockTextGenerator::returning("Adds two numbers.");
        let mut context = DocContext::new("def f(a, b):\n    return a + b");
        phase(generator.clone(), true).execute(&mut context).await.unwrap();

        assert_eq!(
            context.draft.as_deref(),
            Some("Initial docstring from transformer model:\nAdds two numbers.")
        );
        assert_eq!(
            generator.prompts(),
            vec!["generate docstring: def f(a, b):\n    return a + b".to_string()]
        );
    }

    #[tokio::test]
    async fn test_failure_becomes_placeholder() {
        let generator = MockTextGenerator::failing(BackendError::ModelLoadError {
            message: "no weights".into(),
        });
        let mut context = DocContext::new("x = 1");
        phase(generator, true).execute(&mut context).await.unwrap();
        assert_eq!(
            context.draft.as_deref(),
            Some("Transformer model error: Model load failed: no weights")
        );
    }

    #[tokio::test]
    async fn test_timeout_becomes_placeholder() {
        let generator =
            MockTextGenerator::returning("late").with_delay(Duration::from_secs(5));
        let mut context = DocContext::new("x = 1");
        phase(generator, true).execute(&mut context).await.unwrap();
        let draft = context.draft.unwrap();
        assert!(draft.starts_with("Transformer model error: Request timed out"));
    }

    #[tokio::test]
    async fn test_disabled_skips_generator() {
        let generator = MockTextGenerator::returning("unused");
        let mut context = DocContext::new("x = 1");
        phase(generator.clone(), false).execute(&mut context).await.unwrap();
        assert_eq!(
            context.draft.as_deref(),
            Some("Transformer model error: draft generation disabled")
        );
        assert!(generator.prompts().is_empty());
    }
}
