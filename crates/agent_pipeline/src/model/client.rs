//! Model client for chat completions using an OpenAI-compatible API

use async_openai::{
    config::OpenAIConfig,
    types::{
        ChatCompletionRequestAssistantMessageArgs, ChatCompletionRequestMessage,
        ChatCompletionRequestSystemMessageArgs, ChatCompletionRequestUserMessageArgs,
        CreateChatCompletionRequest, CreateChatCompletionRequestArgs, Stop,
    },
    Client,
};
use async_trait::async_trait;
use futures::StreamExt;
use serde::{Deserialize, Serialize};
use std::io::{self, Write};
use std::time::Instant;
use tracing::debug;

use super::message::{ChatMessage, Role};
use crate::config::SETTINGS;
use crate::error::{PipelineError, Result};

/// Configuration for the chat model
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelConfig {
    pub base_url: String,
    pub api_key: String,
    pub model_name: String,
    pub max_tokens: u32,
    pub temperature: f32,
    /// Stop sequences sent with every request
    pub stop: Vec<String>,
    /// Echo tokens to stdout as they arrive
    pub stream: bool,
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            base_url: SETTINGS.services.llm_base_url.clone(),
            api_key: "not-needed".to_string(),
            model_name: "qwen2.5:7b".to_string(),
            max_tokens: 4096,
            temperature: 0.0,
            stop: Vec::new(),
            stream: false,
        }
    }
}

impl ModelConfig {
    /// Create a new ModelConfig with custom settings
    pub fn new(base_url: impl Into<String>, model_name: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            model_name: model_name.into(),
            ..Default::default()
        }
    }

    /// Set the API key
    pub fn with_api_key(mut self, api_key: impl Into<String>) -> Self {
        self.api_key = api_key.into();
        self
    }

    /// Set the model name
    pub fn with_model(mut self, model_name: impl Into<String>) -> Self {
        self.model_name = model_name.into();
        self
    }

    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = temperature;
        self
    }

    pub fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = max_tokens;
        self
    }

    /// Add a stop sequence
    pub fn with_stop(mut self, stop: impl Into<String>) -> Self {
        self.stop.push(stop.into());
        self
    }

    /// Enable or disable token streaming to stdout
    pub fn with_stream(mut self, stream: bool) -> Self {
        self.stream = stream;
        self
    }
}

/// Response from the model
#[derive(Debug, Clone, Default)]
pub struct ModelResponse {
    /// Reasoning wrapped in `<think>` tags, if the model produced any
    pub thinking: String,
    /// Answer text with the reasoning removed
    pub content: String,
    pub raw_content: String,
    /// Total inference time (seconds)
    pub total_time: Option<f64>,
}

impl ModelResponse {
    /// Split raw model output into reasoning and answer
    pub fn from_raw(raw: impl Into<String>) -> Self {
        let raw_content = raw.into();

        let (thinking, content) = if let Some((head, tail)) = raw_content.split_once("</think>") {
            let thinking = head.replace("<think>", "").trim().to_string();
            (thinking, tail.trim().to_string())
        } else {
            (String::new(), raw_content.trim().to_string())
        };

        Self {
            thinking,
            content,
            raw_content,
            total_time: None,
        }
    }

    /// Answer text as the model wrote it: the reasoning block and trailing
    /// whitespace removed, leading spaces kept
    pub fn answer(&self) -> &str {
        let text = match self.raw_content.split_once("</think>") {
            Some((_, tail)) => tail.trim_start_matches(['\r', '\n']),
            None => self.raw_content.as_str(),
        };
        text.trim_end()
    }
}

/// Anything that can answer a chat conversation
#[async_trait]
pub trait ChatModel: Send + Sync {
    async fn chat(&self, messages: &[ChatMessage]) -> Result<ModelResponse>;

    fn model_name(&self) -> &str;
}

/// Client for OpenAI-compatible chat endpoints (Ollama, vLLM, LiteLLM)
pub struct ModelClient {
    config: ModelConfig,
    client: Client<OpenAIConfig>,
}

impl ModelClient {
    /// Create a new ModelClient
    pub fn new(config: ModelConfig) -> Self {
        let openai_config = OpenAIConfig::new()
            .with_api_base(&config.base_url)
            .with_api_key(&config.api_key);

        let client = Client::with_config(openai_config);

        Self { config, client }
    }

    pub fn config(&self) -> &ModelConfig {
        &self.config
    }

    /// Test connection to the model API by sending a simple request
    pub async fn test_connection(&self) -> Result<()> {
        let request = CreateChatCompletionRequestArgs::default()
            .model(&self.config.model_name)
            .max_tokens(5_u32)
            .temperature(0.0_f32)
            .messages(vec![ChatCompletionRequestUserMessageArgs::default()
                .content("Hi")
                .build()?
                .into()])
            .build()?;

        let response = self.client.chat().create(request).await?;

        if response.choices.is_empty() {
            return Err(PipelineError::Parse(
                "Received empty response from API".to_string(),
            ));
        }

        Ok(())
    }

    /// List the model ids served by the endpoint
    pub async fn list_models(&self) -> Result<Vec<String>> {
        let response = self.client.models().list().await?;
        Ok(response.data.into_iter().map(|m| m.id).collect())
    }

    /// Send a conversation to the model
    pub async fn request(&self, messages: &[ChatMessage]) -> Result<ModelResponse> {
        let start_time = Instant::now();
        let request = self.build_request(messages)?;

        let raw_content = if self.config.stream {
            self.collect_stream(request).await?
        } else {
            let response = self.client.chat().create(request).await?;
            response
                .choices
                .into_iter()
                .next()
                .and_then(|c| c.message.content)
                .ok_or_else(|| {
                    PipelineError::Parse("Model returned no message content".to_string())
                })?
        };

        let total_time = start_time.elapsed().as_secs_f64();
        debug!(
            model = %self.config.model_name,
            chars = raw_content.len(),
            "Model responded in {:.3}s",
            total_time
        );

        let mut response = ModelResponse::from_raw(raw_content);
        response.total_time = Some(total_time);
        Ok(response)
    }

    fn build_request(&self, messages: &[ChatMessage]) -> Result<CreateChatCompletionRequest> {
        let mut args = CreateChatCompletionRequestArgs::default();
        args.model(&self.config.model_name)
            .max_tokens(self.config.max_tokens)
            .temperature(self.config.temperature)
            .messages(MessageBuilder::build_all(messages)?)
            .stream(self.config.stream);

        if !self.config.stop.is_empty() {
            args.stop(Stop::StringArray(self.config.stop.clone()));
        }

        Ok(args.build()?)
    }

    async fn collect_stream(&self, request: CreateChatCompletionRequest) -> Result<String> {
        let mut stream = self.client.chat().create_stream(request).await?;
        let mut raw_content = String::new();

        while let Some(result) = stream.next().await {
            let response = result?;
            for choice in response.choices {
                if let Some(content) = choice.delta.content {
                    print!("{}", content);
                    io::stdout().flush().ok();
                    raw_content.push_str(&content);
                }
            }
        }
        println!();

        Ok(raw_content)
    }
}

#[async_trait]
impl ChatModel for ModelClient {
    async fn chat(&self, messages: &[ChatMessage]) -> Result<ModelResponse> {
        self.request(messages).await
    }

    fn model_name(&self) -> &str {
        &self.config.model_name
    }
}

/// Helper for converting conversation messages into request messages
pub struct MessageBuilder;

impl MessageBuilder {
    /// Convert one message
    pub fn build(message: &ChatMessage) -> Result<ChatCompletionRequestMessage> {
        let content = message.content.as_str();
        let built = match message.role {
            Role::System => ChatCompletionRequestSystemMessageArgs::default()
                .content(content)
                .build()?
                .into(),
            Role::User => ChatCompletionRequestUserMessageArgs::default()
                .content(content)
                .build()?
                .into(),
            Role::Assistant => ChatCompletionRequestAssistantMessageArgs::default()
                .content(content)
                .build()?
                .into(),
        };
        Ok(built)
    }

    /// Convert a whole conversation
    pub fn build_all(messages: &[ChatMessage]) -> Result<Vec<ChatCompletionRequestMessage>> {
        messages.iter().map(Self::build).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_model_config_builder() {
        let config = ModelConfig::new("http://custom:8080/v1", "custom-model")
            .with_api_key("test-key")
            .with_temperature(0.7)
            .with_stop("\nObservation:")
            .with_stream(true);

        assert_eq!(config.base_url, "http://custom:8080/v1");
        assert_eq!(config.model_name, "custom-model");
        assert_eq!(config.api_key, "test-key");
        assert_eq!(config.stop, vec!["\nObservation:".to_string()]);
        assert!(config.stream);
    }

    #[test]
    fn test_response_splits_think_block() {
        let response = ModelResponse::from_raw("<think>plan it</think>\n\nresearch");
        assert_eq!(response.thinking, "plan it");
        assert_eq!(response.content, "research");
    }

    #[test]
    fn test_response_without_think_block() {
        let response = ModelResponse::from_raw("  coding \n");
        assert!(response.thinking.is_empty());
        assert_eq!(response.content, "coding");
        assert_eq!(response.raw_content, "  coding \n");
        assert_eq!(response.answer(), "  coding");
    }

    #[test]
    fn test_answer_keeps_leading_space() {
        let response = ModelResponse::from_raw("<think>hm</think>\n I should search.\n");
        assert_eq!(response.answer(), " I should search.");
        assert_eq!(response.content, "I should search.");
    }

    #[test]
    fn test_build_request_messages() {
        let messages = vec![
            ChatMessage::system("sys"),
            ChatMessage::user("hi"),
            ChatMessage::assistant("hello"),
        ];
        let built = MessageBuilder::build_all(&messages).unwrap();
        assert!(matches!(built[0], ChatCompletionRequestMessage::System(_)));
        assert!(matches!(built[1], ChatCompletionRequestMessage::User(_)));
        assert!(matches!(built[2], ChatCompletionRequestMessage::Assistant(_)));
    }

    #[test]
    fn test_stop_sequences_in_request() {
        let client = ModelClient::new(
            ModelConfig::new("http://localhost:11434/v1", "qwen2.5:7b").with_stop("\nObservation:"),
        );
        let request = client.build_request(&[ChatMessage::user("hi")]).unwrap();
        assert!(matches!(request.stop, Some(Stop::StringArray(ref s)) if s.len() == 1));
        assert_eq!(request.model, "qwen2.5:7b");
    }
}
