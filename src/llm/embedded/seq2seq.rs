//! Encoder-decoder draft generator (CodeT5 family) on candle
//!
//! The model is loaded on first use and kept for the life of the process.
//! Decoding is greedy: one sequence, stop at EOS or `max_length` tokens.

use super::download::{DraftModelPaths, DraftWeights, ModelDownloader, TokenizerSource};
use super::hardware::HostResources;
use super::models::DraftModelFiles;
use crate::error::BackendError;
use crate::llm::client::TextGenerator;
use anyhow::{Context, Result};
use async_trait::async_trait;
use candle_core::{DType, Device, Tensor};
use candle_nn::VarBuilder;
use candle_transformers::generation::LogitsProcessor;
use candle_transformers::models::t5;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use tokenizers::decoders::byte_level::ByteLevel;
use tokenizers::models::bpe::BPE;
use tokenizers::processors::roberta::RobertaProcessing;
use tokenizers::Tokenizer;
use tokio::sync::OnceCell;
use tracing::{debug, info};

/// Longest encoder input the draft model accepts
pub const MAX_INPUT_TOKENS: usize = 512;

struct LoadedDraft {
    model: t5::T5ForConditionalGeneration,
    tokenizer: Tokenizer,
    config: t5::Config,
    device: Device,
}

pub struct Seq2SeqGenerator {
    files: DraftModelFiles,
    loaded: OnceCell<Arc<Mutex<LoadedDraft>>>,
}

impl Seq2SeqGenerator {
    pub fn new(repo_id: impl Into<String>) -> Self {
        Self {
            files: DraftModelFiles::new(repo_id),
            loaded: OnceCell::new(),
        }
    }

    pub fn repo_id(&self) -> &str {
        &self.files.repo_id
    }

    /// True once the model's files are in the local Hub cache
    pub fn is_cached(&self) -> bool {
        ModelDownloader::is_draft_cached(&self.files)
    }

    async fn ensure_loaded(&self) -> Result<Arc<Mutex<LoadedDraft>>, BackendError> {
        let loaded = self
            .loaded
            .get_or_try_init(|| async {
                let files = self.files.clone();
                let draft = tokio::task::spawn_blocking(move || load_draft(&files))
                    .await
                    .map_err(|e| BackendError::ModelLoadError {
                        message: format!("draft model loader panicked: {}", e),
                    })?
                    .map_err(|e| BackendError::ModelLoadError {
                        message: format!("{:#}", e),
                    })?;
                Ok::<_, BackendError>(Arc::new(Mutex::new(draft)))
            })
            .await?;
        Ok(Arc::clone(loaded))
    }
}

fn load_draft(files: &DraftModelFiles) -> Result<LoadedDraft> {
    let paths: DraftModelPaths = ModelDownloader::new()?.fetch_draft_model(files)?;
    let device = HostResources::probe().accelerator().device();
    info!("Loading draft model {} on {:?}", files.repo_id, device);

    let config_text = std::fs::read_to_string(&paths.config)
        .with_context(|| format!("Failed to read {}", paths.config.display()))?;
    let mut config: t5::Config =
        serde_json::from_str(&config_text).context("Invalid draft model config.json")?;
    config.use_cache = true;

    let vb = match &paths.weights {
        DraftWeights::Safetensors(path) => unsafe {
            VarBuilder::from_mmaped_safetensors(&[path], DType::F32, &device)?
        },
        DraftWeights::Pytorch(path) => VarBuilder::from_pth(path, DType::F32, &device)?,
    };
    let model = t5::T5ForConditionalGeneration::load(vb, &config)
        .context("Failed to build T5 model from weights")?;

    let tokenizer = load_tokenizer(&paths.tokenizer)?;

    Ok(LoadedDraft {
        model,
        tokenizer,
        config,
        device,
    })
}

fn load_tokenizer(source: &TokenizerSource) -> Result<Tokenizer> {
    match source {
        TokenizerSource::Json(path) => Tokenizer::from_file(path)
            .map_err(|e| anyhow::anyhow!("Failed to load tokenizer.json: {}", e)),
        TokenizerSource::VocabMerges { vocab, merges } => {
            let vocab = vocab.to_string_lossy();
            let merges = merges.to_string_lossy();
            let bpe = BPE::from_file(&vocab, &merges)
                .build()
                .map_err(|e| anyhow::anyhow!("Failed to build BPE tokenizer: {}", e))?;
            let mut tokenizer = Tokenizer::new(bpe);
            tokenizer.with_pre_tokenizer(Some(ByteLevel::new(false, true, true)));
            tokenizer.with_decoder(Some(ByteLevel::default()));
            tokenizer.with_post_processor(Some(RobertaProcessing::new(
                ("</s>".to_string(), 2),
                ("<s>".to_string(), 0),
            )));
            Ok(tokenizer)
        }
    }
}

/// Keep the first tokens and the closing special token
fn truncate_input(mut ids: Vec<u32>, limit: usize) -> Vec<u32> {
    if ids.len() > limit {
        let last = ids[ids.len() - 1];
        ids.truncate(limit - 1);
        ids.push(last);
    }
    ids
}

/// Raised when the caller dropped the request, e.g. on timeout.
///
/// Flips a shared flag on drop so the blocking decode stops between steps and
/// releases the model lock.
struct CancelOnDrop {
    flag: Arc<AtomicBool>,
    armed: bool,
}

impl CancelOnDrop {
    fn new() -> Self {
        Self {
            flag: Arc::new(AtomicBool::new(false)),
            armed: true,
        }
    }

    fn flag(&self) -> Arc<AtomicBool> {
        Arc::clone(&self.flag)
    }

    fn disarm(mut self) {
        self.armed = false;
    }
}

impl Drop for CancelOnDrop {
    fn drop(&mut self) {
        if self.armed {
            self.flag.store(true, Ordering::Relaxed);
        }
    }
}

fn ensure_not_cancelled(cancelled: &AtomicBool) -> Result<()> {
    if cancelled.load(Ordering::Relaxed) {
        anyhow::bail!("draft generation cancelled");
    }
    Ok(())
}

fn greedy_decode(
    draft: &mut LoadedDraft,
    prompt: &str,
    max_length: usize,
    cancelled: &AtomicBool,
) -> Result<String> {
    let encoding = draft
        .tokenizer
        .encode(prompt, true)
        .map_err(|e| anyhow::anyhow!("Tokenization failed: {}", e))?;
    let input_ids = truncate_input(encoding.get_ids().to_vec(), MAX_INPUT_TOKENS);
    debug!("Draft input: {} tokens", input_ids.len());

    let device = draft.device.clone();
    draft.model.clear_kv_cache();

    let input = Tensor::new(input_ids.as_slice(), &device)?.unsqueeze(0)?;
    let encoder_output = draft.model.encode(&input)?;

    let start_token = draft
        .config
        .decoder_start_token_id
        .unwrap_or(draft.config.pad_token_id) as u32;
    let eos_token = draft.config.eos_token_id as u32;
    let mut output_ids = vec![start_token];
    let mut logits_processor = LogitsProcessor::new(0, None, None);

    while output_ids.len() < max_length {
        if let Err(e) = ensure_not_cancelled(cancelled) {
            draft.model.clear_kv_cache();
            return Err(e);
        }
        let decoder_input = if output_ids.len() == 1 {
            Tensor::new(output_ids.as_slice(), &device)?.unsqueeze(0)?
        } else {
            let last = output_ids[output_ids.len() - 1];
            Tensor::new(&[last], &device)?.unsqueeze(0)?
        };
        let logits = draft
            .model
            .decode(&decoder_input, &encoder_output)?
            .squeeze(0)?;
        let next = logits_processor.sample(&logits)?;
        if next == eos_token {
            break;
        }
        output_ids.push(next);
    }
    draft.model.clear_kv_cache();

    draft
        .tokenizer
        .decode(&output_ids[1..], true)
        .map(|text| text.trim().to_string())
        .map_err(|e| anyhow::anyhow!("Decoding failed: {}", e))
}

#[async_trait]
impl TextGenerator for Seq2SeqGenerator {
    async fn generate(&self, prompt: &str, max_length: usize) -> Result<String, BackendError> {
        let draft = self.ensure_loaded().await?;
        let prompt = prompt.to_string();
        let guard = CancelOnDrop::new();
        let cancelled = guard.flag();

        let result = tokio::task::spawn_blocking(move || {
            let mut draft = draft.lock().unwrap_or_else(|e| e.into_inner());
            ensure_not_cancelled(&cancelled)?;
            greedy_decode(&mut draft, &prompt, max_length, &cancelled)
        })
        .await;
        guard.disarm();

        result
            .map_err(|e| BackendError::InferenceError {
                message: format!("draft generation task failed: {}", e),
            })?
            .map_err(|e| BackendError::InferenceError {
                message: format!("{:#}", e),
            })
    }

    fn name(&self) -> &str {
        &self.files.repo_id
    }
}

impl std::fmt::Debug for Seq2SeqGenerator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Seq2SeqGenerator")
            .field("repo_id", &self.files.repo_id)
            .field("loaded", &self.loaded.initialized())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_truncate_keeps_closing_token() {
        let ids: Vec<u32> = (0..600).collect();
        let truncated = truncate_input(ids, MAX_INPUT_TOKENS);
        assert_eq!(truncated.len(), MAX_INPUT_TOKENS);
        assert_eq!(truncated[0], 0);
        assert_eq!(truncated[MAX_INPUT_TOKENS - 1], 599);
    }

    #[test]
    fn test_short_input_untouched() {
        assert_eq!(truncate_input(vec![0, 5, 2], MAX_INPUT_TOKENS), vec![0, 5, 2]);
    }

    #[test]
    fn test_dropped_request_cancels_decode() {
        let guard = CancelOnDrop::new();
        let cancelled = guard.flag();
        assert!(ensure_not_cancelled(&cancelled).is_ok());

        drop(guard);
        let err = ensure_not_cancelled(&cancelled).unwrap_err();
        assert!(err.to_string().contains("cancelled"));
    }

    #[test]
    fn test_completed_request_is_not_cancelled() {
        let guard = CancelOnDrop::new();
        let cancelled = guard.flag();
        guard.disarm();
        assert!(ensure_not_cancelled(&cancelled).is_ok());
    }

    #[tokio::test]
    async fn test_timed_out_future_flags_blocking_work() {
        let guard = CancelOnDrop::new();
        let cancelled = guard.flag();
        let pending = async move {
            let _guard = guard;
            std::future::pending::<()>().await;
        };

        let timed_out = tokio::time::timeout(std::time::Duration::from_millis(10), pending).await;
        assert!(timed_out.is_err());
        assert!(cancelled.load(Ordering::Relaxed));
    }

    #[test]
    fn test_generator_starts_unloaded() {
        let generator = Seq2SeqGenerator::new("Salesforce/codet5-small-ntp");
        assert_eq!(generator.repo_id(), "Salesforce/codet5-small-ntp");
        assert_eq!(generator.name(), "Salesforce/codet5-small-ntp");
        assert!(!generator.loaded.initialized());
    }
}
