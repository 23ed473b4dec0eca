use super::result::QualityVerdict;
use crate::analysis::CodeStructure;
use crate::corpus::ExamplePair;
use serde::Serialize;

/// Stages of one run, in the only order they can be reached
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
pub enum PipelineState {
    Start,
    Analyzed,
    CorpusSampled,
    Drafted,
    Refined,
    Checked,
    Done,
}

impl std::fmt::Display for PipelineState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            PipelineState::Start => "start",
            PipelineState::Analyzed => "analyzed",
            PipelineState::CorpusSampled => "corpus_sampled",
            PipelineState::Drafted => "drafted",
            PipelineState::Refined => "refined",
            PipelineState::Checked => "checked",
            PipelineState::Done => "done",
        };
        f.write_str(name)
    }
}

/// Per-request working state, filled in phase by phase
#[derive(Debug, Clone, Serialize)]
pub struct DocContext {
    pub code: String,
    pub state: PipelineState,
    pub structure: Option<CodeStructure>,
    pub examples: Vec<ExamplePair>,
    pub draft: Option<String>,
    pub refined: Option<String>,
    pub verdict: Option<QualityVerdict>,
}

impl DocContext {
    pub fn new(code: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            state: PipelineState::Start,
            structure: None,
            examples: Vec::new(),
            draft: None,
            refined: None,
            verdict: None,
        }
    }

    /// Move forward to `next`. Returns false, leaving the state alone, when
    /// `next` is not strictly ahead.
    pub fn advance(&mut self, next: PipelineState) -> bool {
        if next > self.state {
            self.state = next;
            true
        } else {
            false
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_states_only_move_forward() {
        let mut context = DocContext::new("x = 1");
        assert_eq!(context.state, PipelineState::Start);
        assert!(context.advance(PipelineState::Analyzed));
        assert!(context.advance(PipelineState::Drafted));
        assert!(!context.advance(PipelineState::CorpusSampled));
        assert!(!context.advance(PipelineState::Drafted));
        assert_eq!(context.state, PipelineState::Drafted);
    }

    #[test]
    fn test_state_display() {
        assert_eq!(PipelineState::CorpusSampled.to_string(), "corpus_sampled");
    }
}
