//! Model backends
//!
//! Two seams: [`LLMClient`] for the chat agents and [`TextGenerator`] for the
//! draft model. Remote providers, Ollama, the embedded models and the test
//! mocks all sit behind one of them.

mod client;
pub mod embedded;
mod genai;
mod lazy;
mod mock;
mod selector;
mod types;

pub use client::{LLMClient, TextGenerator};
pub use embedded::{EmbeddedClient, Seq2SeqGenerator};
pub use genai::GenAIClient;
pub use lazy::LazyLLMClient;
pub use mock::{MockLLMClient, MockResponse, MockTextGenerator};
pub use selector::{
    is_ollama_available, ollama_base_url, provider_has_credentials, select_llm_client,
    SelectedClient,
};
pub use types::{ChatMessage, LLMRequest, LLMResponse, MessageRole};
