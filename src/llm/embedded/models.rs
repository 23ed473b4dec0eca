//! Catalog of locally runnable models

use super::hardware::HostResources;
use tracing::{debug, info, warn};

/// Quantized chat model used when no remote provider or Ollama is reachable
#[derive(Debug, Clone)]
pub struct ChatModel {
    pub repo_id: &'static str,
    pub filename: &'static str,
    pub tokenizer_repo: &'static str,
    pub ram_required_gb: f64,
    pub display_name: &'static str,
    pub params: &'static str,
}

impl ChatModel {
    pub const QWEN_1_5B: ChatModel = ChatModel {
        repo_id: "Qwen/Qwen2.5-Coder-1.5B-Instruct-GGUF",
        filename: "qwen2.5-coder-1.5b-instruct-q4_k_m.gguf",
        tokenizer_repo: "Qwen/Qwen2.5-Coder-1.5B-Instruct",
        ram_required_gb: 2.5,
        display_name: "Qwen2.5-Coder 1.5B GGUF",
        params: "1.5B",
    };

    pub const QWEN_3B: ChatModel = ChatModel {
        repo_id: "Qwen/Qwen2.5-Coder-3B-Instruct-GGUF",
        filename: "qwen2.5-coder-3b-instruct-q4_k_m.gguf",
        tokenizer_repo: "Qwen/Qwen2.5-Coder-3B-Instruct",
        ram_required_gb: 4.0,
        display_name: "Qwen2.5-Coder 3B GGUF",
        params: "3B",
    };

    pub const QWEN_7B: ChatModel = ChatModel {
        repo_id: "Qwen/Qwen2.5-Coder-7B-Instruct-GGUF",
        filename: "qwen2.5-coder-7b-instruct-q4_k_m.gguf",
        tokenizer_repo: "Qwen/Qwen2.5-Coder-7B-Instruct",
        ram_required_gb: 5.5,
        display_name: "Qwen2.5-Coder 7B GGUF",
        params: "7B",
    };

    /// Largest first
    pub const ALL: &'static [ChatModel] = &[Self::QWEN_7B, Self::QWEN_3B, Self::QWEN_1_5B];

    pub fn by_params(params: &str) -> Option<&'static ChatModel> {
        Self::ALL.iter().find(|m| m.params == params)
    }

    /// Pick the largest model that leaves a reserve of free memory.
    ///
    /// `DOCSMITH_MODEL_SIZE` (e.g. "3B") forces a size regardless of headroom.
    pub fn select(host: &HostResources) -> Option<&'static ChatModel> {
        let usable_gb = usable_ram_gb(host);

        if let Ok(size) = std::env::var("DOCSMITH_MODEL_SIZE") {
            match Self::by_params(&size) {
                Some(model) => {
                    if model.ram_required_gb > usable_gb {
                        warn!(
                            "{} needs {:.1}GB but only {:.1}GB is usable; it may not fit",
                            model.display_name, model.ram_required_gb, usable_gb
                        );
                    }
                    info!("Using {} (forced by DOCSMITH_MODEL_SIZE)", model.display_name);
                    return Some(model);
                }
                None => warn!(
                    "Unknown DOCSMITH_MODEL_SIZE '{}' (expected 1.5B, 3B or 7B), selecting automatically",
                    size
                ),
            }
        }

        debug!("{:.1}GB usable for an embedded model", usable_gb);
        let selected = Self::ALL.iter().find(|m| m.ram_required_gb <= usable_gb);
        match selected {
            Some(model) => info!(
                "Selected {} ({} params, ~{:.1}GB)",
                model.display_name, model.params, model.ram_required_gb
            ),
            None => info!("No embedded chat model fits in {:.1}GB", usable_gb),
        }
        selected
    }
}

/// Keep at least 2GB, or a quarter of what is free, for everything else
fn usable_ram_gb(host: &HostResources) -> f64 {
    let available = host.available_ram_gb();
    let reserve = (available * 0.25).max(2.0);
    (available - reserve).max(0.0)
}

/// Files that make up a seq2seq draft model on the Hub
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DraftModelFiles {
    pub repo_id: String,
}

impl DraftModelFiles {
    pub const CONFIG: &'static str = "config.json";
    pub const SAFETENSORS: &'static str = "model.safetensors";
    pub const PYTORCH: &'static str = "pytorch_model.bin";
    pub const TOKENIZER: &'static str = "tokenizer.json";
    pub const VOCAB: &'static str = "vocab.json";
    pub const MERGES: &'static str = "merges.txt";

    pub fn new(repo_id: impl Into<String>) -> Self {
        Self {
            repo_id: repo_id.into(),
        }
    }
}
