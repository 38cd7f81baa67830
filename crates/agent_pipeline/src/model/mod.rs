//! Model client module for chat inference
//!
//! This module provides:
//! - `client`: OpenAI-compatible model client and the `ChatModel` seam
//! - `message`: Conversation message types

mod client;
mod message;

pub use client::{ChatModel, MessageBuilder, ModelClient, ModelConfig, ModelResponse};
pub use message::{ChatMessage, Role};
