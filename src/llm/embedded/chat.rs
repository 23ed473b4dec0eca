//! Quantized Qwen chat model running in-process through candle

use super::download::ModelDownloader;
use super::hardware::{Accelerator, HostResources};
use super::models::ChatModel;
use crate::error::BackendError;
use crate::llm::client::LLMClient;
use crate::llm::types::{LLMRequest, LLMResponse, MessageRole};
use anyhow::{Context, Result};
use async_trait::async_trait;
use candle_core::quantized::gguf_file;
use candle_core::{Device, Tensor};
use candle_transformers::generation::LogitsProcessor;
use candle_transformers::models::quantized_qwen2::ModelWeights as QuantizedQwen2;
use std::path::Path;
use std::sync::{Arc, Mutex};
use std::time::Instant;
use tokenizers::Tokenizer;
use tracing::{debug, info, warn};

const QWEN_EOS_TOKENS: [u32; 2] = [151645, 151643];

pub struct EmbeddedClient {
    model: Arc<Mutex<QuantizedQwen2>>,
    tokenizer: Arc<Tokenizer>,
    device: Device,
    spec: &'static ChatModel,
    max_tokens: usize,
}

impl EmbeddedClient {
    /// Select a model that fits this host, download it if needed and load it
    pub async fn new(max_tokens: usize) -> Result<Self> {
        let host = HostResources::probe();
        let spec = ChatModel::select(&host).ok_or_else(|| {
            anyhow::anyhow!(
                "Insufficient RAM for the embedded model ({:.1}GB available)",
                host.available_ram_gb()
            )
        })?;
        let accelerator = host.accelerator();

        tokio::task::spawn_blocking(move || Self::load(spec, accelerator, max_tokens))
            .await
            .context("Embedded model loader panicked")?
    }

    fn load(spec: &'static ChatModel, accelerator: Accelerator, max_tokens: usize) -> Result<Self> {
        let (weights_path, tokenizer_path) = ModelDownloader::new()?.fetch_chat_model(spec)?;
        let tokenizer = Tokenizer::from_file(&tokenizer_path)
            .map_err(|e| anyhow::anyhow!("Failed to load tokenizer: {}", e))?;

        let device = accelerator.device();
        info!("Loading {} on {}", spec.display_name, accelerator);

        let (model, device) = match Self::load_gguf(&weights_path, &device) {
            Ok(model) => (model, device),
            Err(e) if !device.is_cpu() => {
                warn!("Loading on {} failed ({}), retrying on CPU", accelerator, e);
                let model = Self::load_gguf(&weights_path, &Device::Cpu)
                    .context("Failed to load GGUF model on CPU")?;
                (model, Device::Cpu)
            }
            Err(e) => return Err(e),
        };

        Ok(Self {
            model: Arc::new(Mutex::new(model)),
            tokenizer: Arc::new(tokenizer),
            device,
            spec,
            max_tokens,
        })
    }

    fn load_gguf(path: &Path, device: &Device) -> Result<QuantizedQwen2> {
        debug!("Reading GGUF weights from {}", path.display());
        let mut file = std::fs::File::open(path).context("Failed to open GGUF model file")?;
        let content = gguf_file::Content::read(&mut file)
            .map_err(|e| anyhow::anyhow!("Failed to read GGUF file: {}", e))?;
        QuantizedQwen2::from_gguf(content, &mut file, device)
            .context("Failed to load model weights from GGUF")
    }

    /// ChatML rendering of the conversation, ending with an open assistant turn
    fn format_prompt(request: &LLMRequest) -> String {
        let mut prompt = String::new();
        for msg in &request.messages {
            let role = match msg.role {
                MessageRole::System => "system",
                MessageRole::User => "user",
                MessageRole::Assistant => "assistant",
            };
            prompt.push_str("<|im_start|>");
            prompt.push_str(role);
            prompt.push('\n');
            prompt.push_str(&msg.content);
            prompt.push_str("<|im_end|>\n");
        }
        prompt.push_str("<|im_start|>assistant\n");
        prompt
    }

    fn sample(
        model: &mut QuantizedQwen2,
        tokenizer: &Tokenizer,
        device: &Device,
        prompt: &str,
        max_new_tokens: usize,
    ) -> Result<String> {
        let encoding = tokenizer
            .encode(prompt, true)
            .map_err(|e| anyhow::anyhow!("Tokenization failed: {}", e))?;
        let prompt_ids = encoding.get_ids().to_vec();
        let mut logits_processor = LogitsProcessor::new(42, Some(0.7), Some(0.9));
        let mut generated: Vec<u32> = Vec::new();

        let mut input = Tensor::new(prompt_ids.as_slice(), device)?.unsqueeze(0)?;
        let mut offset = 0;
        for _ in 0..max_new_tokens {
            let logits = model.forward(&input, offset)?.squeeze(0)?;
            let next = logits_processor.sample(&logits)?;
            if QWEN_EOS_TOKENS.contains(&next) {
                break;
            }
            offset += input.dim(1)?;
            generated.push(next);
            input = Tensor::new(&[next], device)?.unsqueeze(0)?;
        }

        tokenizer
            .decode(&generated, true)
            .map_err(|e| anyhow::anyhow!("Decoding failed: {}", e))
    }
}

#[async_trait]
impl LLMClient for EmbeddedClient {
    async fn chat(&self, request: LLMRequest) -> Result<LLMResponse, BackendError> {
        let start = Instant::now();
        let prompt = Self::format_prompt(&request);
        let max_new_tokens = request
            .max_tokens
            .map(|t| t as usize)
            .unwrap_or(self.max_tokens);
        debug!("Embedded chat: {} prompt chars, up to {} tokens", prompt.len(), max_new_tokens);

        let model = Arc::clone(&self.model);
        let tokenizer = Arc::clone(&self.tokenizer);
        let device = self.device.clone();

        let output = tokio::task::spawn_blocking(move || {
            let mut model = model.lock().unwrap_or_else(|e| e.into_inner());
            Self::sample(&mut model, &tokenizer, &device, &prompt, max_new_tokens)
        })
        .await
        .map_err(|e| BackendError::InferenceError {
            message: format!("generation task failed: {}", e),
        })?
        .map_err(|e| BackendError::InferenceError {
            message: format!("Embedded LLM generation failed: {}", e),
        })?;

        Ok(LLMResponse::text(output, start.elapsed()))
    }

    fn name(&self) -> &str {
        "EmbeddedLLM"
    }

    fn model_info(&self) -> Option<String> {
        Some(format!("{} ({})", self.spec.display_name, self.spec.params))
    }
}

impl std::fmt::Debug for EmbeddedClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EmbeddedClient")
            .field("model", &self.spec.display_name)
            .field("device", &format!("{:?}", self.device))
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm::ChatMessage;

    #[test]
    fn test_chatml_prompt() {
        let request = LLMRequest::new(vec![
            ChatMessage::system("Be brief."),
            ChatMessage::user("Document this."),
            ChatMessage::assistant("Adds numbers."),
        ]);
        let prompt = EmbeddedClient::format_prompt(&request);
        assert_eq!(
            prompt,
            "<|im_start|>system\nBe brief.<|im_end|>\n\
             <|im_start|>user\nDocument this.<|im_end|>\n\
             <|im_start|>assistant\nAdds numbers.<|im_end|>\n\
             <|im_start|>assistant\n"
        );
    }
}
