use crate::analysis::CodeStructure;
use serde::{Deserialize, Serialize};

/// Outcome of the quality check
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum QualityVerdict {
    Approved,
    Suggestions(String),
}

impl QualityVerdict {
    /// Any reply mentioning "good" (in any case) approves the docstring.
    ///
    /// Coarse on purpose: "not good enough" also approves.
    pub fn classify(response: &str) -> Self {
        if response.to_lowercase().contains("good") {
            QualityVerdict::Approved
        } else {
            QualityVerdict::Suggestions(response.to_string())
        }
    }

    pub fn is_approved(&self) -> bool {
        matches!(self, QualityVerdict::Approved)
    }
}

/// What a caller gets back: the docstring, or the reviewer's suggestions
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PipelineResult {
    Doc {
        doc: String,
        code_structure: CodeStructure,
    },
    Suggestions {
        suggestions: String,
        code_structure: CodeStructure,
    },
}

impl PipelineResult {
    pub fn from_verdict(verdict: QualityVerdict, doc: String, code_structure: CodeStructure) -> Self {
        match verdict {
            QualityVerdict::Approved => PipelineResult::Doc {
                doc,
                code_structure,
            },
            QualityVerdict::Suggestions(suggestions) => PipelineResult::Suggestions {
                suggestions,
                code_structure,
            },
        }
    }

    pub fn code_structure(&self) -> &CodeStructure {
        match self {
            PipelineResult::Doc { code_structure, .. }
            | PipelineResult::Suggestions { code_structure, .. } => code_structure,
        }
    }

    pub fn doc(&self) -> Option<&str> {
        match self {
            PipelineResult::Doc { doc, .. } => Some(doc),
            PipelineResult::Suggestions { .. } => None,
        }
    }

    pub fn suggestions(&self) -> Option<&str> {
        match self {
            PipelineResult::Suggestions { suggestions, .. } => Some(suggestions),
            PipelineResult::Doc { .. } => None,
        }
    }
}
