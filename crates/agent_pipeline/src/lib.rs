//! agent_pipeline: agent orchestration over a local LLM runtime
//!
//! This library ties a local OpenAI-compatible model runtime to a handful of
//! HTTP services:
//! - Task router that classifies a request and dispatches it to a handler
//! - ReAct tool agent driving news search and research workflow tools
//! - Supervisor pipeline delegating to a researcher and a code-running developer
//! - Clients for the news, agent wrapper, workflow engine and research services
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//! use agent_pipeline::{ModelClient, ModelConfig, NewsClient, RouterAgent, SETTINGS};
//!
//! #[tokio::main]
//! async fn main() {
//!     let model_config = ModelConfig::new(SETTINGS.services.llm_base_url.as_str(), "qwen2.5:7b");
//!     let model = Arc::new(ModelClient::new(model_config));
//!
//!     let router = RouterAgent::new(model, NewsClient::default());
//!     let state = router.route("Latest developments in battery chemistry").await;
//!     println!("Result: {:?}", state);
//! }
//! ```

// Core modules
pub mod error;

// Configuration module
pub mod config;

// Model access and external services
pub mod model;
pub mod services;

// Agents
pub mod pipeline;
pub mod react;
pub mod router;
pub mod tools;

// Re-export commonly used types and functions
pub use error::{PipelineError, Result};

// Config re-exports
pub use config::{
    get_role_prompt, DeveloperConfig, PipelineSettings, SafeMode, ServiceConfig, TimeoutConfig,
    SETTINGS,
};

// Model re-exports
pub use model::{ChatMessage, ChatModel, MessageBuilder, ModelClient, ModelConfig, ModelResponse, Role};

// Service re-exports
pub use services::{
    check_all, AgentTaskRequest, AgentWrapperClient, Article, HealthStatus, NewsClient,
    NewsSearchRequest, NewsSearchResponse, ResearchClient, WorkflowClient,
};

// Agent re-exports
pub use pipeline::{
    DeveloperAgent, NextAction, Pipeline, PipelineConfig, PipelineOutcome, ResearcherAgent,
    StopReason, Supervisor, TranscriptSaver, Worker,
};
pub use react::{AgentRun, AgentStep, ToolAgent};
pub use router::{RouterAgent, RouterState, TaskType};
pub use tools::{NewsSearchTool, ResearchWorkflowTool, Tool, ToolRegistry};
