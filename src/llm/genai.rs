//! Chat client backed by the `genai` crate
//!
//! One client type covers Ollama, OpenAI, Anthropic, Gemini, xAI and Groq.
//! Setting `DOCSMITH_API_BASE_URL` routes requests to a custom endpoint
//! (an OpenAI-compatible proxy, a remote Ollama, ...).

use super::client::LLMClient;
use super::types::{ChatMessage, LLMRequest, LLMResponse, MessageRole};
use crate::error::BackendError;
use async_trait::async_trait;
use genai::adapter::AdapterKind;
use genai::chat::{ChatMessage as GenAIChatMessage, ChatOptions, ChatRequest as GenAIChatRequest};
use genai::resolver::{AuthData, Endpoint, ServiceTargetResolver};
use genai::{Client, ModelIden, ServiceTarget};
use std::time::{Duration, Instant};
use tracing::{debug, error};

pub struct GenAIClient {
    client: Client,
    model: String,
    provider: AdapterKind,
    timeout: Duration,
}

impl GenAIClient {
    pub fn new(provider: AdapterKind, model: String, timeout: Duration) -> Self {
        let client = match std::env::var("DOCSMITH_API_BASE_URL").ok() {
            Some(endpoint_url) => {
                debug!(
                    "Using custom endpoint for {}: {}",
                    provider.as_str(),
                    endpoint_url
                );
                Self::client_for_endpoint(provider, model.clone(), endpoint_url)
            }
            None => Client::default(),
        };

        debug!(
            "Creating GenAI client: provider={}, model={}",
            provider.as_str(),
            model,
        );

        Self {
            client,
            model,
            provider,
            timeout,
        }
    }

    fn client_for_endpoint(provider: AdapterKind, model: String, endpoint_url: String) -> Client {
        let resolver = ServiceTargetResolver::from_resolver_fn(
            move |_service_target: ServiceTarget| -> Result<ServiceTarget, genai::resolver::Error> {
                let auth = match provider.default_key_env_name() {
                    Some(api_key_var) => AuthData::from_env(api_key_var),
                    None => AuthData::from_single(""),
                };

                Ok(ServiceTarget {
                    endpoint: Endpoint::from_owned(endpoint_url.clone()),
                    auth,
                    model: ModelIden::new(provider, &model),
                })
            },
        );

        Client::builder()
            .with_service_target_resolver(resolver)
            .build()
    }

    fn convert_message(msg: &ChatMessage) -> GenAIChatMessage {
        match msg.role {
            MessageRole::System => GenAIChatMessage::system(&msg.content),
            MessageRole::User => GenAIChatMessage::user(&msg.content),
            MessageRole::Assistant => GenAIChatMessage::assistant(&msg.content),
        }
    }

    fn chat_options(request: &LLMRequest) -> ChatOptions {
        let mut options = ChatOptions::default();
        if let Some(temp) = request.temperature {
            options = options.with_temperature(temp as f64);
        }
        if let Some(max_tokens) = request.max_tokens {
            options = options.with_max_tokens(max_tokens);
        }
        if let Some(ref sequences) = request.stop_sequences {
            options = options.with_stop_sequences(sequences.clone());
        }
        options
    }
}

#[async_trait]
impl LLMClient for GenAIClient {
    async fn chat(&self, request: LLMRequest) -> Result<LLMResponse, BackendError> {
        let start = Instant::now();

        let messages: Vec<GenAIChatMessage> =
            request.messages.iter().map(Self::convert_message).collect();
        let genai_request = GenAIChatRequest::new(messages);
        let options = Self::chat_options(&request);

        let response = match tokio::time::timeout(
            self.timeout,
            self.client
                .exec_chat(&self.model, genai_request, Some(&options)),
        )
        .await
        {
            Ok(Ok(resp)) => resp,
            Ok(Err(e)) => {
                error!("{} API error: {}", self.provider.as_str(), e);
                return Err(BackendError::ApiError {
                    message: format!("{} request failed: {}", self.provider.as_str(), e),
                    status_code: None,
                });
            }
            Err(_) => {
                error!(
                    "{} request timed out after {}s",
                    self.provider.as_str(),
                    self.timeout.as_secs()
                );
                return Err(BackendError::TimeoutError {
                    seconds: self.timeout.as_secs(),
                });
            }
        };

        let content = response.first_text().unwrap_or_default().to_string();
        if content.trim().is_empty() {
            return Err(BackendError::InvalidResponse {
                message: format!("{} returned an empty reply", self.provider.as_str()),
                raw_response: None,
            });
        }

        Ok(LLMResponse::text(content, start.elapsed()))
    }

    fn name(&self) -> &str {
        self.provider.as_str()
    }

    fn model_info(&self) -> Option<String> {
        Some(self.model.clone())
    }
}

impl std::fmt::Debug for GenAIClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GenAIClient")
            .field("provider", &self.provider)
            .field("model", &self.model)
            .field("timeout", &self.timeout)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_genai_client_creation() {
        let client = GenAIClient::new(
            AdapterKind::OpenAI,
            "gpt-4o-mini".to_string(),
            Duration::from_secs(30),
        );

        assert_eq!(client.name(), "OpenAI");
        assert_eq!(client.model_info(), Some("gpt-4o-mini".to_string()));
    }

    #[test]
    fn test_chat_options_carry_limits() {
        let request = LLMRequest::new(vec![ChatMessage::user("hi")]).with_max_tokens(256);
        let options = GenAIClient::chat_options(&request);
        assert_eq!(options.max_tokens, Some(256));
        assert!(options.temperature.is_none());
    }
}
