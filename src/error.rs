use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors raised by model services (chat backends and local generators).
#[derive(Debug, Clone, Error, Serialize, Deserialize)]
pub enum BackendError {
    #[error("{}", format_api_error(.message, .status_code))]
    ApiError {
        message: String,
        status_code: Option<u16>,
    },

    #[error("Authentication failed: {message}")]
    AuthenticationError { message: String },

    #[error("Request timed out after {seconds} seconds")]
    TimeoutError { seconds: u64 },

    #[error("Invalid response from model: {message}")]
    InvalidResponse {
        message: String,
        raw_response: Option<String>,
    },

    #[error("Configuration error: {message}")]
    ConfigurationError { message: String },

    #[error("Network error: {message}")]
    NetworkError { message: String },

    #[error("Model load failed: {message}")]
    ModelLoadError { message: String },

    #[error("Inference failed: {message}")]
    InferenceError { message: String },

    #[error("Error: {message}")]
    Other { message: String },
}

fn format_api_error(message: &str, status_code: &Option<u16>) -> String {
    match status_code {
        Some(code) => format!("API error ({}): {}", code, message),
        None => format!("API error: {}", message),
    }
}

impl BackendError {
    pub fn other(message: impl Into<String>) -> Self {
        BackendError::Other {
            message: message.into(),
        }
    }

    /// True for failures that a later identical call could plausibly avoid.
    pub fn is_transient(&self) -> bool {
        matches!(
            self,
            BackendError::TimeoutError { .. }
                | BackendError::NetworkError { .. }
                | BackendError::ApiError {
                    status_code: Some(500..=599) | None,
                    ..
                }
        )
    }
}
