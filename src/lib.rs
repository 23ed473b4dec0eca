//! docsmith - docstring generation for Python snippets
//!
//! A snippet goes through five steps: static structure analysis, sampling of
//! reference `(code, docstring)` pairs, a draft from a local sequence model,
//! refinement by a chat agent and a review by a second agent. The caller gets
//! either the approved docstring or the reviewer's suggestions, always with
//! the structural summary attached.
//!
//! # Example Usage
//!
//! ```ignore
//! use docsmith::{DocsmithConfig, FileCorpus, LazyLLMClient, PipelineOrchestrator, Seq2SeqGenerator};
//! use std::sync::Arc;
//!
//! async fn document(code: &str) -> anyhow::Result<()> {
//!     let config = DocsmithConfig::default();
//!     let orchestrator = PipelineOrchestrator::new(
//!         Arc::new(LazyLLMClient::new(config.clone())),
//!         Arc::new(Seq2SeqGenerator::new(config.draft_model.clone())),
//!         Arc::new(FileCorpus::new(config.corpus_path.clone())),
//!         config,
//!     );
//!
//!     let result = orchestrator.run(code).await?;
//!     println!("{}", serde_json::to_string_pretty(&result)?);
//!     Ok(())
//! }
//! ```
//!
//! # Project Structure
//!
//! - [`analysis`]: tree-sitter based structure extraction
//! - [`corpus`]: the reference pair corpus and its preparation
//! - [`llm`]: chat and draft model backends
//! - [`agents`]: bounded two-agent conversations and their prompts
//! - [`pipeline`]: phases and the orchestrator
//! - [`api`]: transport-agnostic request handling

pub mod agents;
pub mod analysis;
pub mod api;
pub mod cli;
pub mod config;
pub mod corpus;
pub mod error;
pub mod llm;
pub mod pipeline;
pub mod progress;
pub mod util;

pub use analysis::{analyze, AnalysisError, CodeStructure, StructuralSummary};
pub use api::{handle_generate_doc, ApiResponse, GenerateDocRequest};
pub use config::{ConfigError, DocsmithConfig};
pub use corpus::{Corpus, CorpusError, ExampleCorpus, ExamplePair, FileCorpus, InMemoryCorpus};
pub use error::BackendError;
pub use llm::{
    GenAIClient, LLMClient, LazyLLMClient, MockLLMClient, MockResponse, MockTextGenerator,
    Seq2SeqGenerator, TextGenerator,
};
pub use pipeline::{PipelineError, PipelineOrchestrator, PipelineResult, QualityVerdict};
pub use progress::{LoggingHandler, ProgressEvent, ProgressHandler};
pub use util::{init_from_env, init_logging, LoggingConfig};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Library name
pub const NAME: &str = env!("CARGO_PKG_NAME");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version_exists() {
        assert!(!VERSION.is_empty());
    }

    #[test]
    fn test_name_is_docsmith() {
        assert_eq!(NAME, "docsmith");
    }
}
