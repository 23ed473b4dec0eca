//! Configuration management for docsmith
//!
//! Settings are read from environment variables with sensible defaults. The
//! binary loads a `.env` file first, so the same variables can live there.
//!
//! # Environment Variables
//!
//! - `DOCSMITH_PROVIDER`: chat provider (ollama|openai|claude|gemini|grok|groq) - default: "openai"
//! - `DOCSMITH_MODEL`: chat model name - default: "gpt-4o-mini" ("qwen2.5-coder:7b" for ollama)
//! - `DOCSMITH_REQUEST_TIMEOUT`: per-call timeout in seconds - default: "60"
//! - `DOCSMITH_LOG_LEVEL`: logging level - default: "info"
//! - `DOCSMITH_CORPUS_PATH`: reference corpus file - default: "processed_code_doc_pairs.json"
//! - `DOCSMITH_EXAMPLE_COUNT`: examples sampled per request - default: "3"
//! - `DOCSMITH_MAX_TURNS`: turn cap of each agent conversation - default: "2"
//! - `DOCSMITH_DRAFT_MODEL`: HuggingFace repo of the draft model - default: "Salesforce/codet5-small-ntp"
//! - `DOCSMITH_DRAFT_MAX_LENGTH`: max generated draft tokens - default: "512"
//! - `DOCSMITH_DRAFT_ENABLED`: run the local draft model (true|false) - default: "true"
//! - `DOCSMITH_MAX_TOKENS`: max tokens per chat reply - default: "2048"
//!
//! Provider credentials are read by the genai library itself
//! (`OPENAI_API_KEY`, `ANTHROPIC_API_KEY`, `OLLAMA_HOST`, ...).

use crate::error::BackendError;
use genai::adapter::AdapterKind;
use std::env;
use std::fmt;
use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

const DEFAULT_OPENAI_MODEL: &str = "gpt-4o-mini";
const DEFAULT_OLLAMA_MODEL: &str = "qwen2.5-coder:7b";
const DEFAULT_LOG_LEVEL: &str = "info";
const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 60;
const DEFAULT_CORPUS_PATH: &str = "processed_code_doc_pairs.json";
const DEFAULT_EXAMPLE_COUNT: usize = 3;
const DEFAULT_MAX_TURNS: usize = 2;
const DEFAULT_DRAFT_MODEL: &str = "Salesforce/codet5-small-ntp";
const DEFAULT_DRAFT_MAX_LENGTH: usize = 512;
const DEFAULT_DRAFT_ENABLED: bool = true;
const DEFAULT_MAX_TOKENS: u32 = 2048;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid provider: {0}. Valid options: ollama, openai, claude, gemini, grok, groq")]
    InvalidProvider(String),

    #[error("Configuration validation failed: {0}")]
    ValidationFailed(String),

    #[error("Backend initialization failed: {0}")]
    BackendInitError(#[from] BackendError),
}

/// Parses a user-facing provider name into a genai adapter
pub fn parse_provider(name: &str) -> Result<AdapterKind, ConfigError> {
    match name.to_lowercase().as_str() {
        "ollama" => Ok(AdapterKind::Ollama),
        "openai" => Ok(AdapterKind::OpenAI),
        "claude" | "anthropic" => Ok(AdapterKind::Anthropic),
        "gemini" => Ok(AdapterKind::Gemini),
        "grok" | "xai" => Ok(AdapterKind::Xai),
        "groq" => Ok(AdapterKind::Groq),
        other => Err(ConfigError::InvalidProvider(other.to_string())),
    }
}

/// Model used when `DOCSMITH_MODEL` is unset
pub fn default_model(provider: AdapterKind) -> &'static str {
    match provider {
        AdapterKind::Ollama => DEFAULT_OLLAMA_MODEL,
        _ => DEFAULT_OPENAI_MODEL,
    }
}

#[derive(Debug, Clone)]
pub struct DocsmithConfig {
    pub provider: AdapterKind,
    pub model: String,
    pub request_timeout_secs: u64,
    pub log_level: String,
    pub corpus_path: PathBuf,
    pub example_count: usize,
    pub max_turns: usize,
    pub draft_model: String,
    pub draft_max_length: usize,
    pub draft_enabled: bool,
    pub max_tokens: u32,
}

impl Default for DocsmithConfig {
    fn default() -> Self {
        let provider = env::var("DOCSMITH_PROVIDER")
            .ok()
            .and_then(|s| parse_provider(&s).ok())
            .unwrap_or(AdapterKind::OpenAI);

        let model = env::var("DOCSMITH_MODEL")
            .ok()
            .unwrap_or_else(|| default_model(provider).to_string());

        let request_timeout_secs = env::var("DOCSMITH_REQUEST_TIMEOUT")
            .ok()
            .and_then(|v| v.parse::<u64>().ok())
            .unwrap_or(DEFAULT_REQUEST_TIMEOUT_SECS);

        let log_level = env::var("DOCSMITH_LOG_LEVEL")
            .unwrap_or_else(|_| DEFAULT_LOG_LEVEL.to_string())
            .to_lowercase();

        let corpus_path = env::var("DOCSMITH_CORPUS_PATH")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from(DEFAULT_CORPUS_PATH));

        let example_count = env::var("DOCSMITH_EXAMPLE_COUNT")
            .ok()
            .and_then(|v| v.parse::<usize>().ok())
            .unwrap_or(DEFAULT_EXAMPLE_COUNT);

        let max_turns = env::var("DOCSMITH_MAX_TURNS")
            .ok()
            .and_then(|v| v.parse::<usize>().ok())
            .unwrap_or(DEFAULT_MAX_TURNS);

        let draft_model =
            env::var("DOCSMITH_DRAFT_MODEL").unwrap_or_else(|_| DEFAULT_DRAFT_MODEL.to_string());

        let draft_max_length = env::var("DOCSMITH_DRAFT_MAX_LENGTH")
            .ok()
            .and_then(|v| v.parse::<usize>().ok())
            .unwrap_or(DEFAULT_DRAFT_MAX_LENGTH);

        let draft_enabled = env::var("DOCSMITH_DRAFT_ENABLED")
            .ok()
            .and_then(|v| v.parse::<bool>().ok())
            .unwrap_or(DEFAULT_DRAFT_ENABLED);

        let max_tokens = env::var("DOCSMITH_MAX_TOKENS")
            .ok()
            .and_then(|v| v.parse::<u32>().ok())
            .unwrap_or(DEFAULT_MAX_TOKENS);

        Self {
            provider,
            model,
            request_timeout_secs,
            log_level,
            corpus_path,
            example_count,
            max_turns,
            draft_model,
            draft_max_length,
            draft_enabled,
            max_tokens,
        }
    }
}

impl DocsmithConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.request_timeout_secs == 0 {
            return Err(ConfigError::ValidationFailed(
                "Request timeout must be at least 1 second".to_string(),
            ));
        }
        if self.request_timeout_secs > 3600 {
            return Err(ConfigError::ValidationFailed(
                "Request timeout cannot exceed 1 hour".to_string(),
            ));
        }

        match self.log_level.as_str() {
            "trace" | "debug" | "info" | "warn" | "error" => {}
            _ => {
                return Err(ConfigError::ValidationFailed(format!(
                    "Invalid log level: {}. Valid options: trace, debug, info, warn, error",
                    self.log_level
                )))
            }
        }

        if self.example_count > 10 {
            return Err(ConfigError::ValidationFailed(
                "Example count cannot exceed 10".to_string(),
            ));
        }

        if self.max_turns == 0 {
            return Err(ConfigError::ValidationFailed(
                "Max turns must be at least 1".to_string(),
            ));
        }
        if self.max_turns > 10 {
            return Err(ConfigError::ValidationFailed(
                "Max turns cannot exceed 10".to_string(),
            ));
        }

        if self.draft_max_length < 16 {
            return Err(ConfigError::ValidationFailed(
                "Draft max length must be at least 16".to_string(),
            ));
        }
        if self.draft_max_length > 2048 {
            return Err(ConfigError::ValidationFailed(
                "Draft max length cannot exceed 2048".to_string(),
            ));
        }

        if self.max_tokens < 64 {
            return Err(ConfigError::ValidationFailed(
                "Max tokens must be at least 64".to_string(),
            ));
        }
        if self.max_tokens > 128_000 {
            return Err(ConfigError::ValidationFailed(
                "Max tokens cannot exceed 128000".to_string(),
            ));
        }

        if self.draft_model.trim().is_empty() {
            return Err(ConfigError::ValidationFailed(
                "Draft model repository cannot be empty".to_string(),
            ));
        }

        Ok(())
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    pub fn to_display_map(&self) -> std::collections::BTreeMap<String, String> {
        let mut map = std::collections::BTreeMap::new();

        map.insert("provider".to_string(), format!("{:?}", self.provider));
        map.insert("model".to_string(), self.model.clone());
        map.insert(
            "request_timeout_secs".to_string(),
            self.request_timeout_secs.to_string(),
        );
        map.insert("log_level".to_string(), self.log_level.clone());
        map.insert(
            "corpus_path".to_string(),
            self.corpus_path.display().to_string(),
        );
        map.insert("example_count".to_string(), self.example_count.to_string());
        map.insert("max_turns".to_string(), self.max_turns.to_string());
        map.insert("draft_model".to_string(), self.draft_model.clone());
        map.insert(
            "draft_max_length".to_string(),
            self.draft_max_length.to_string(),
        );
        map.insert("draft_enabled".to_string(), self.draft_enabled.to_string());
        map.insert("max_tokens".to_string(), self.max_tokens.to_string());

        map
    }
}

impl fmt::Display for DocsmithConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Docsmith Configuration:")?;
        writeln!(f, "  Provider: {:?}", self.provider)?;
        writeln!(f, "  Model: {}", self.model)?;
        writeln!(f, "  Request Timeout: {}s", self.request_timeout_secs)?;
        writeln!(f, "  Log Level: {}", self.log_level)?;
        writeln!(f, "  Corpus: {}", self.corpus_path.display())?;
        writeln!(f, "  Examples per request: {}", self.example_count)?;
        writeln!(f, "  Max Turns: {}", self.max_turns)?;
        writeln!(f, "  Draft Model: {}", self.draft_model)?;
        writeln!(f, "  Draft Max Length: {}", self.draft_max_length)?;
        writeln!(f, "  Draft Enabled: {}", self.draft_enabled)?;
        writeln!(f, "  Max Tokens: {}", self.max_tokens)?;
        Ok(())
    }
}
