//! Supervisor agent that decides the next pipeline step

use std::sync::Arc;
use tracing::debug;

use crate::config::SUPERVISOR_PROMPT;
use crate::error::Result;
use crate::model::{ChatMessage, ChatModel};

pub struct Supervisor {
    model: Arc<dyn ChatModel>,
    system_prompt: String,
}

impl Supervisor {
    pub fn new(model: Arc<dyn ChatModel>) -> Self {
        Self {
            model,
            system_prompt: SUPERVISOR_PROMPT.to_string(),
        }
    }

    /// Set custom system prompt
    pub fn with_system_prompt(mut self, prompt: impl Into<String>) -> Self {
        self.system_prompt = prompt.into();
        self
    }

    pub fn model_name(&self) -> &str {
        self.model.model_name()
    }

    /// Ask the model for a decision over the whole conversation
    pub async fn decide(&self, history: &[ChatMessage]) -> Result<String> {
        let mut messages = Vec::with_capacity(history.len() + 1);
        messages.push(ChatMessage::system(self.system_prompt.as_str()));
        messages.extend_from_slice(history);

        let response = self.model.chat(&messages).await?;
        debug!("Supervisor decision: {}", response.content);
        Ok(response.content)
    }
}
