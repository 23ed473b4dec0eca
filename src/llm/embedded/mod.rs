//! In-process inference with candle
//!
//! Two kinds of local model live here: a quantized Qwen chat model used when
//! no provider or Ollama is reachable, and the seq2seq model that writes the
//! draft docstring.

mod chat;
mod download;
mod hardware;
mod models;
mod seq2seq;

pub use chat::EmbeddedClient;
pub use download::{DraftModelPaths, DraftWeights, ModelDownloader, TokenizerSource};
pub use hardware::{Accelerator, HostResources};
pub use models::{ChatModel, DraftModelFiles};
pub use seq2seq::{Seq2SeqGenerator, MAX_INPUT_TOKENS};
