use super::client::LLMClient;
use super::selector::select_llm_client;
use super::types::{LLMRequest, LLMResponse};
use crate::config::DocsmithConfig;
use crate::error::BackendError;
use async_trait::async_trait;
use std::sync::Arc;
use tokio::sync::OnceCell;
use tracing::debug;

/// Defers backend selection until the first chat call, so commands that never
/// talk to a model (analyze, prepare-corpus) do not probe providers.
pub struct LazyLLMClient {
    client: OnceCell<Arc<dyn LLMClient>>,
    config: DocsmithConfig,
}

impl LazyLLMClient {
    pub fn new(config: DocsmithConfig) -> Self {
        debug!("Creating LazyLLMClient - client selection deferred until first chat() call");
        Self {
            client: OnceCell::new(),
            config,
        }
    }

    async fn ensure_initialized(&self) -> Result<Arc<dyn LLMClient>, BackendError> {
        let client = self
            .client
            .get_or_try_init(|| async {
                debug!("Lazy initialization triggered - selecting LLM client now");
                let selected = select_llm_client(&self.config).await.map_err(|e| {
                    BackendError::ConfigurationError {
                        message: format!("Failed to initialize LLM client: {}", e),
                    }
                })?;
                debug!("LLM client selected: {}", selected.description);
                Ok::<_, BackendError>(selected.client)
            })
            .await?;

        Ok(client.clone())
    }
}

#[async_trait]
impl LLMClient for LazyLLMClient {
    async fn chat(&self, request: LLMRequest) -> Result<LLMResponse, BackendError> {
        let client = self.ensure_initialized().await?;
        client.chat(request).await
    }

    fn name(&self) -> &str {
        "LazyLLMClient"
    }

    fn model_info(&self) -> Option<String> {
        Some(self.config.model.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lazy_client_reports_configured_model() {
        let config = DocsmithConfig {
            model: "gpt-4o-mini".to_string(),
            ..Default::default()
        };
        let client = LazyLLMClient::new(config);

        assert_eq!(client.name(), "LazyLLMClient");
        assert_eq!(client.model_info(), Some("gpt-4o-mini".to_string()));
        assert!(client.client.get().is_none());
    }
}
