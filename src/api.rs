//! Transport-agnostic request handling
//!
//! A request carries an optional `code` field. The handler validates it, runs
//! the pipeline and maps the outcome onto a status code and a JSON body, so
//! any transport (the `serve-request` command, an HTTP layer) only has to move
//! bytes.

use crate::pipeline::{PipelineOrchestrator, PipelineResult};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tracing::{error, info, warn};

pub const MISSING_CODE_MESSAGE: &str = "No code snippet provided.";
pub const NO_DOCUMENTATION_MESSAGE: &str = "No documentation returned.";

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GenerateDocRequest {
    #[serde(default)]
    pub code: Option<String>,
}

impl GenerateDocRequest {
    pub fn new(code: impl Into<String>) -> Self {
        Self {
            code: Some(code.into()),
        }
    }

    /// Lenient parse: anything that is not an object with a string `code`
    /// becomes a request without code.
    pub fn from_json(body: &str) -> Self {
        let value: Value = serde_json::from_str(body).unwrap_or(Value::Null);
        let code = value
            .get("code")
            .and_then(Value::as_str)
            .map(str::to_string);
        Self { code }
    }

    /// The snippet, if present and non-empty. Whitespace-only code is a
    /// snippet like any other.
    pub fn snippet(&self) -> Option<&str> {
        self.code.as_deref().filter(|code| !code.is_empty())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApiResponse {
    pub status: u16,
    pub body: Value,
}

impl ApiResponse {
    pub fn ok(body: Value) -> Self {
        Self { status: 200, body }
    }

    pub fn bad_request(message: &str) -> Self {
        Self {
            status: 400,
            body: json!({ "error": message }),
        }
    }

    pub fn internal_error(message: impl Into<String>) -> Self {
        Self {
            status: 500,
            body: json!({ "error": message.into() }),
        }
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    pub fn error_message(&self) -> Option<&str> {
        self.body.get("error").and_then(Value::as_str)
    }

    /// What a simple frontend shows: the docstring, else the suggestions
    pub fn display_text(&self) -> &str {
        self.body
            .get("doc")
            .and_then(Value::as_str)
            .or_else(|| self.body.get("suggestions").and_then(Value::as_str))
            .unwrap_or(NO_DOCUMENTATION_MESSAGE)
    }
}

fn result_body(result: &PipelineResult) -> ApiResponse {
    match serde_json::to_value(result) {
        Ok(body) => ApiResponse::ok(body),
        Err(e) => ApiResponse::internal_error(format!("Failed to serialize result: {}", e)),
    }
}

pub async fn handle_generate_doc(
    orchestrator: &PipelineOrchestrator,
    request: &GenerateDocRequest,
) -> ApiResponse {
    let Some(code) = request.snippet() else {
        warn!("Rejected request without code");
        return ApiResponse::bad_request(MISSING_CODE_MESSAGE);
    };

    info!(code_chars = code.len(), "Handling generate-doc request");
    match orchestrator.run(code).await {
        Ok(result) => result_body(&result),
        Err(e) => {
            error!(kind = e.kind(), error = %e, "Request failed");
            ApiResponse::internal_error(e.to_string())
        }
    }
}
