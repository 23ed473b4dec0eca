use super::types::{LLMRequest, LLMResponse};
use crate::error::BackendError;
use async_trait::async_trait;

/// A conversational model: a list of messages in, one reply out.
#[async_trait]
pub trait LLMClient: Send + Sync {
    async fn chat(&self, request: LLMRequest) -> Result<LLMResponse, BackendError>;

    fn name(&self) -> &str;

    fn model_info(&self) -> Option<String> {
        None
    }
}

/// A sequence-to-sequence generator: one prompt in, generated text out.
///
/// Used for the draft docstring, where the model has no notion of roles or
/// conversation history.
#[async_trait]
pub trait TextGenerator: Send + Sync {
    async fn generate(&self, prompt: &str, max_length: usize) -> Result<String, BackendError>;

    fn name(&self) -> &str;
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    struct EchoClient;

    #[async_trait]
    impl LLMClient for EchoClient {
        async fn chat(&self, request: LLMRequest) -> Result<LLMResponse, BackendError> {
            let last = request
                .messages
                .last()
                .map(|m| m.content.clone())
                .unwrap_or_default();
            Ok(LLMResponse::text(last, Duration::from_millis(1)))
        }

        fn name(&self) -> &str {
            "EchoClient"
        }
    }

    struct UpperGenerator;

    #[async_trait]
    impl TextGenerator for UpperGenerator {
        async fn generate(&self, prompt: &str, max_length: usize) -> Result<String, BackendError> {
            Ok(prompt.to_uppercase().chars().take(max_length).collect())
        }

        fn name(&self) -> &str {
            "UpperGenerator"
        }
    }

    #[tokio::test]
    async fn test_client_trait_defaults() {
        let client = EchoClient;
        assert_eq!(client.name(), "EchoClient");
        assert!(client.model_info().is_none());

        let reply = client
            .chat(LLMRequest::new(vec![crate::llm::ChatMessage::user("ping")]))
            .await
            .unwrap();
        assert_eq!(reply.content, "ping");
    }

    #[tokio::test]
    async fn test_generator_trait_object() {
        let generator: Box<dyn TextGenerator> = Box::new(UpperGenerator);
        let out = generator.generate("abcdef", 3).await.unwrap();
        assert_eq!(out, "ABC");
    }
}
