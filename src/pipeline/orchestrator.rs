use super::context::{DocContext, PipelineState};
use super::error::PipelineError;
use super::phase_trait::WorkflowPhase;
use super::phases::{
    is_draft_placeholder, AnalyzePhase, DraftPhase, QualityPhase, RefinePhase, SamplePhase,
};
use super::result::PipelineResult;
use crate::agents::prompts::{
    DOC_AGENT_NAME, DOC_AGENT_SYSTEM_MESSAGE, QUALITY_AGENT_NAME, QUALITY_AGENT_SYSTEM_MESSAGE,
};
use crate::agents::{ChatAgent, ChatSettings};
use crate::config::DocsmithConfig;
use crate::corpus::ExampleCorpus;
use crate::llm::{LLMClient, TextGenerator};
use crate::progress::{ProgressEvent, ProgressHandler};
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, error, info};

/// Runs analyze, sample, draft, refine and quality check for one snippet.
///
/// Holds only shared, immutable services, so one orchestrator can serve
/// concurrent requests.
pub struct PipelineOrchestrator {
    llm_client: Arc<dyn LLMClient>,
    generator: Arc<dyn TextGenerator>,
    corpus: Arc<dyn ExampleCorpus>,
    config: DocsmithConfig,
    progress_handler: Option<Arc<dyn ProgressHandler>>,
}

impl PipelineOrchestrator {
    pub fn new(
        llm_client: Arc<dyn LLMClient>,
        generator: Arc<dyn TextGenerator>,
        corpus: Arc<dyn ExampleCorpus>,
        config: DocsmithConfig,
    ) -> Self {
        Self {
            llm_client,
            generator,
            corpus,
            config,
            progress_handler: None,
        }
    }

    pub fn with_progress_handler(mut self, handler: Arc<dyn ProgressHandler>) -> Self {
        self.progress_handler = Some(handler);
        self
    }

    pub fn config(&self) -> &DocsmithConfig {
        &self.config
    }

    fn emit(&self, event: ProgressEvent) {
        if let Some(handler) = &self.progress_handler {
            handler.on_progress(&event);
        }
    }

    fn chat_settings(&self) -> ChatSettings {
        ChatSettings {
            max_turns: self.config.max_turns,
            max_tokens: self.config.max_tokens,
            timeout: self.config.request_timeout(),
        }
    }

    fn workflow_phases(&self) -> Vec<Box<dyn WorkflowPhase>> {
        let settings = self.chat_settings();
        let doc_agent = ChatAgent::new(
            DOC_AGENT_NAME,
            DOC_AGENT_SYSTEM_MESSAGE,
            Arc::clone(&self.llm_client),
        );
        let quality_agent = ChatAgent::new(
            QUALITY_AGENT_NAME,
            QUALITY_AGENT_SYSTEM_MESSAGE,
            Arc::clone(&self.llm_client),
        );

        vec![
            Box::new(AnalyzePhase),
            Box::new(SamplePhase::new(
                Arc::clone(&self.corpus),
                self.config.example_count,
            )),
            Box::new(DraftPhase::new(
                Arc::clone(&self.generator),
                self.config.draft_enabled,
                self.config.draft_max_length,
                self.config.request_timeout(),
            )),
            Box::new(RefinePhase::new(doc_agent, settings)),
            Box::new(QualityPhase::new(quality_agent, settings)),
        ]
    }

    pub async fn run(&self, code: &str) -> Result<PipelineResult, PipelineError> {
        let mut context = DocContext::new(code);
        self.execute(&mut context).await
    }

    /// Run every phase against `context`, leaving it in the last state reached
    pub async fn execute(&self, context: &mut DocContext) -> Result<PipelineResult, PipelineError> {
        let start = Instant::now();
        self.emit(ProgressEvent::Started {
            code_chars: context.code.len(),
        });

        match self.run_phases(context).await {
            Ok(result) => {
                let approved = result.doc().is_some();
                info!(
                    approved,
                    elapsed_ms = start.elapsed().as_millis() as u64,
                    "Pipeline complete"
                );
                self.emit(ProgressEvent::Completed {
                    approved,
                    total_time: start.elapsed(),
                });
                Ok(result)
            }
            Err(e) => {
                error!(kind = e.kind(), state = %context.state, error = %e, "Pipeline failed");
                self.emit(ProgressEvent::Failed {
                    error: e.to_string(),
                    kind: e.kind(),
                });
                Err(e)
            }
        }
    }

    async fn run_phases(&self, context: &mut DocContext) -> Result<PipelineResult, PipelineError> {
        for phase in self.workflow_phases() {
            let phase_name = phase.name();
            self.emit(ProgressEvent::PhaseStarted {
                phase: phase_name.to_string(),
            });

            let phase_start = Instant::now();
            phase.execute(context).await?;
            context.advance(phase.completes());

            if phase.completes() == PipelineState::Drafted {
                if let Some(draft) = context.draft.as_deref().filter(|d| is_draft_placeholder(d)) {
                    self.emit(ProgressEvent::DraftDegraded {
                        reason: draft.to_string(),
                    });
                }
            }

            self.emit(ProgressEvent::PhaseComplete {
                phase: phase_name.to_string(),
                duration: phase_start.elapsed(),
            });
            debug!("Phase {} complete, state {}", phase_name, context.state);
        }

        let result = Self::assemble(context)?;
        context.advance(PipelineState::Done);
        Ok(result)
    }

    fn assemble(context: &DocContext) -> Result<PipelineResult, PipelineError> {
        let missing = |requires: &'static str| PipelineError::PhaseOrder {
            phase: "assemble",
            requires,
        };
        let structure = context
            .structure
            .clone()
            .ok_or_else(|| missing("a code structure"))?;
        let refined = context
            .refined
            .clone()
            .ok_or_else(|| missing("a refined docstring"))?;
        let verdict = context
            .verdict
            .clone()
            .ok_or_else(|| missing("a quality verdict"))?;
        Ok(PipelineResult::from_verdict(verdict, refined, structure))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::corpus::{ExamplePair, InMemoryCorpus};
    use crate::llm::{MockLLMClient, MockResponse, MockTextGenerator};
    use std::sync::Mutex;

    #[derive(Default)]
    struct RecordingHandler {
        events: Mutex<Vec<String>>,
    }

    impl ProgressHandler for RecordingHandler {
        fn on_progress(&self, event: &ProgressEvent) {
            let label = match event {
                ProgressEvent::Started { .. } => "started".to_string(),
                ProgressEvent::PhaseStarted { phase } => format!("start:{}", phase),
                ProgressEvent::PhaseComplete { phase, .. } => format!("done:{}", phase),
                ProgressEvent::DraftDegraded { .. } => "degraded".to_string(),
                ProgressEvent::Completed { .. } => "completed".to_string(),
                ProgressEvent::Failed { kind, .. } => format!("failed:{}", kind),
            };
            self.events.lock().unwrap().push(label);
        }
    }

    fn orchestrator(client: Arc<MockLLMClient>, generator: MockTextGenerator) -> PipelineOrchestrator {
        PipelineOrchestrator::new(
            client,
            Arc::new(generator),
            Arc::new(InMemoryCorpus::new(vec![ExamplePair::new("x = 1", "Sets x.")])),
            DocsmithConfig::default(),
        )
    }

    #[tokio::test]
    async fn test_context_reaches_done() {
        let client = Arc::new(MockLLMClient::new());
        client.add_responses(vec![
            MockResponse::text("a"),
            MockResponse::text("b"),
            MockResponse::text("Adds numbers."),
            MockResponse::text("x"),
            MockResponse::text("y"),
            MockResponse::text("Docstring is good."),
        ]);
        let orchestrator = orchestrator(client, MockTextGenerator::returning("draft"));

        let mut context = DocContext::new("def f(a, b):\n    return a + b");
        let result = orchestrator.execute(&mut context).await.unwrap();

        assert_eq!(context.state, PipelineState::Done);
        assert_eq!(result.doc(), Some("Adds numbers."));
    }

    #[tokio::test]
    async fn test_progress_events_in_order() {
        let client = Arc::new(MockLLMClient::new());
        client.add_responses((0..6).map(|_| MockResponse::text("Docstring is good.")));
        let handler = Arc::new(RecordingHandler::default());
        let orchestrator = orchestrator(
            client,
            MockTextGenerator::failing(crate::error::BackendError::other("offline")),
        )
        .with_progress_handler(handler.clone());

        orchestrator.run("x = 1").await.unwrap();

        let events = handler.events.lock().unwrap().clone();
        assert_eq!(events.first().map(String::as_str), Some("started"));
        assert_eq!(events.last().map(String::as_str), Some("completed"));
        assert!(events.contains(&"degraded".to_string()));
        let starts: Vec<&str> = events
            .iter()
            .filter_map(|e| e.strip_prefix("start:"))
            .collect();
        assert_eq!(
            starts,
            vec!["AnalyzePhase", "SamplePhase", "DraftPhase", "RefinePhase", "QualityPhase"]
        );
    }

    #[tokio::test]
    async fn test_failure_leaves_state_at_last_completed_phase() {
        let client = Arc::new(MockLLMClient::new());
        client.add_response(MockResponse::error(crate::error::BackendError::TimeoutError {
            seconds: 60,
        }));
        let orchestrator = orchestrator(client, MockTextGenerator::returning("draft"));

        let mut context = DocContext::new("x = 1");
        let err = orchestrator.execute(&mut context).await.unwrap_err();

        assert!(matches!(err, PipelineError::Refinement(_)));
        assert_eq!(context.state, PipelineState::Drafted);
        assert!(context.refined.is_none());
    }
}
