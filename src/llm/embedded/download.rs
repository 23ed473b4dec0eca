//! Fetching model files from the HuggingFace Hub cache

use super::models::{ChatModel, DraftModelFiles};
use anyhow::{Context, Result};
use hf_hub::api::sync::{Api, ApiRepo};
use hf_hub::{Repo, RepoType};
use std::path::PathBuf;
use tracing::{debug, info};

/// Resolved local paths for a seq2seq draft model
#[derive(Debug, Clone)]
pub struct DraftModelPaths {
    pub config: PathBuf,
    pub weights: DraftWeights,
    pub tokenizer: TokenizerSource,
}

#[derive(Debug, Clone)]
pub enum DraftWeights {
    Safetensors(PathBuf),
    Pytorch(PathBuf),
}

#[derive(Debug, Clone)]
pub enum TokenizerSource {
    Json(PathBuf),
    VocabMerges { vocab: PathBuf, merges: PathBuf },
}

pub struct ModelDownloader {
    api: Api,
}

impl ModelDownloader {
    pub fn new() -> Result<Self> {
        let api = Api::new().context("Failed to initialize HuggingFace Hub API")?;
        Ok(Self { api })
    }

    /// Directory hf-hub stores files under
    pub fn cache_dir() -> PathBuf {
        std::env::var("HF_HOME")
            .map(|home| PathBuf::from(home).join("hub"))
            .ok()
            .or_else(|| dirs::cache_dir().map(|d| d.join("huggingface").join("hub")))
            .unwrap_or_else(|| PathBuf::from(".cache/huggingface/hub"))
    }

    fn repo(&self, repo_id: &str) -> ApiRepo {
        self.api.repo(Repo::new(repo_id.to_string(), RepoType::Model))
    }

    /// GGUF weights and tokenizer for an embedded chat model
    pub fn fetch_chat_model(&self, model: &ChatModel) -> Result<(PathBuf, PathBuf)> {
        info!("Fetching {} from {}", model.display_name, model.repo_id);
        let weights = self
            .repo(model.repo_id)
            .get(model.filename)
            .with_context(|| format!("Failed to download {}", model.filename))?;
        let tokenizer = self
            .repo(model.tokenizer_repo)
            .get("tokenizer.json")
            .with_context(|| format!("Failed to download tokenizer.json from {}", model.tokenizer_repo))?;
        Ok((weights, tokenizer))
    }

    /// Config, weights and tokenizer for a draft model. Safetensors are
    /// preferred; older checkpoints only ship `pytorch_model.bin`, and some
    /// only ship `vocab.json` + `merges.txt` instead of `tokenizer.json`.
    pub fn fetch_draft_model(&self, files: &DraftModelFiles) -> Result<DraftModelPaths> {
        let repo = self.repo(&files.repo_id);
        info!("Fetching draft model {}", files.repo_id);

        let config = repo
            .get(DraftModelFiles::CONFIG)
            .with_context(|| format!("{} has no {}", files.repo_id, DraftModelFiles::CONFIG))?;

        let weights = match repo.get(DraftModelFiles::SAFETENSORS) {
            Ok(path) => DraftWeights::Safetensors(path),
            Err(e) => {
                debug!("No safetensors in {}: {}", files.repo_id, e);
                let path = repo.get(DraftModelFiles::PYTORCH).with_context(|| {
                    format!("{} has neither safetensors nor pytorch weights", files.repo_id)
                })?;
                DraftWeights::Pytorch(path)
            }
        };

        let tokenizer = match repo.get(DraftModelFiles::TOKENIZER) {
            Ok(path) => TokenizerSource::Json(path),
            Err(e) => {
                debug!("No tokenizer.json in {}: {}", files.repo_id, e);
                TokenizerSource::VocabMerges {
                    vocab: repo.get(DraftModelFiles::VOCAB).context("Failed to download vocab.json")?,
                    merges: repo.get(DraftModelFiles::MERGES).context("Failed to download merges.txt")?,
                }
            }
        };

        Ok(DraftModelPaths {
            config,
            weights,
            tokenizer,
        })
    }

    /// Whether the draft model's config is already in the local cache
    pub fn is_draft_cached(files: &DraftModelFiles) -> bool {
        let cache = hf_hub::Cache::new(Self::cache_dir());
        cache
            .repo(Repo::new(files.repo_id.clone(), RepoType::Model))
            .get(DraftModelFiles::CONFIG)
            .is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cache_dir_is_set() {
        assert!(!ModelDownloader::cache_dir().as_os_str().is_empty());
    }

    #[test]
    fn test_unknown_repo_is_not_cached() {
        let files = DraftModelFiles::new("docsmith-tests/definitely-not-a-model");
        assert!(!ModelDownloader::is_draft_cached(&files));
    }
}
