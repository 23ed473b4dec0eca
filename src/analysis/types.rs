use serde::{Deserialize, Serialize};

/// Result of analyzing a snippet: either a summary or an error record.
///
/// Serialized untagged, so callers see either
/// `{"functions": .., "classes": .., "imports": ..}` or
/// `{"error": .., "raw_code": ..}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum CodeStructure {
    Summary(StructuralSummary),
    Error(AnalysisError),
}

impl CodeStructure {
    pub fn is_error(&self) -> bool {
        matches!(self, CodeStructure::Error(_))
    }

    pub fn summary(&self) -> Option<&StructuralSummary> {
        match self {
            CodeStructure::Summary(summary) => Some(summary),
            CodeStructure::Error(_) => None,
        }
    }

    /// Indented JSON, as embedded in prompts
    pub fn to_pretty_json(&self) -> String {
        serde_json::to_string_pretty(self).unwrap_or_else(|_| "{}".to_string())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StructuralSummary {
    pub functions: Vec<FunctionInfo>,
    pub classes: Vec<ClassInfo>,
    pub imports: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FunctionInfo {
    pub name: String,
    pub args: Vec<String>,
    /// Return annotation, only when it is a bare name
    pub returns: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClassInfo {
    pub name: String,
    pub methods: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnalysisError {
    pub error: String,
    pub raw_code: String,
}

impl AnalysisError {
    pub const SYNTAX: &'static str = "Syntax error in code";

    pub fn syntax(code: &str) -> Self {
        Self {
            error: Self::SYNTAX.to_string(),
            raw_code: code.to_string(),
        }
    }
}
