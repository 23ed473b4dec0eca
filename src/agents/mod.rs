//! Bounded two-agent conversations over a chat backend

mod conversation;
pub mod prompts;

pub use conversation::{initiate_chat, ChatAgent, ChatResult, ChatSettings, Side, Turn};
