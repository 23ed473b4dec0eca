use crate::corpus::CorpusError;
use crate::error::BackendError;
use thiserror::Error;

/// Failures that stop a pipeline run.
///
/// Analysis errors and draft failures never show up here; they are folded
/// into the result.
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error(transparent)]
    Corpus(#[from] CorpusError),

    #[error("Docstring refinement failed: {0}")]
    Refinement(BackendError),

    #[error("Quality check failed: {0}")]
    QualityCheck(BackendError),

    #[error("{phase} needs {requires}, which no earlier phase produced")]
    PhaseOrder {
        phase: &'static str,
        requires: &'static str,
    },
}

impl PipelineError {
    /// True when the operator has to fix the installation (e.g. create the corpus)
    pub fn is_setup_error(&self) -> bool {
        matches!(self, PipelineError::Corpus(_))
    }

    /// `"setup"` or `"service"`, attached to error logs
    pub fn kind(&self) -> &'static str {
        match self {
            PipelineError::Corpus(_) => "setup",
            PipelineError::Refinement(_) | PipelineError::QualityCheck(_) => "service",
            PipelineError::PhaseOrder { .. } => "internal",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn test_setup_errors_are_distinguishable() {
        let missing = PipelineError::from(CorpusError::Missing {
            path: PathBuf::from("corpus.json"),
        });
        assert!(missing.is_setup_error());
        assert_eq!(missing.kind(), "setup");

        let refinement = PipelineError::Refinement(BackendError::TimeoutError { seconds: 60 });
        assert!(!refinement.is_setup_error());
        assert_eq!(refinement.kind(), "service");
        assert_eq!(
            refinement.to_string(),
            "Docstring refinement failed: Request timed out after 60 seconds"
        );
    }
}
