//! Error types for the agent pipeline

use async_openai::error::OpenAIError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Model request failed: {0}")]
    Model(#[from] OpenAIError),

    #[error("{service} returned {status}: {message}")]
    Service {
        service: &'static str,
        status: u16,
        message: String,
    },

    #[error("Timed out: {0}")]
    Timeout(String),

    #[error("Parse error: {0}")]
    Parse(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Command execution failed: {0}")]
    CommandFailed(String),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, PipelineError>;
