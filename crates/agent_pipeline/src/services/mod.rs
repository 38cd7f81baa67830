//! HTTP clients for the external services
//!
//! This module provides:
//! - `news`: News search service (GDELT wrapper)
//! - `agent_task`: Agent coordination wrapper
//! - `workflow`: Workflow engine webhooks
//! - `research`: Research report service
//! - `health`: Reachability checks

pub mod agent_task;
pub mod health;
pub mod news;
pub mod research;
pub mod workflow;

pub use agent_task::{AgentTaskRequest, AgentWrapperClient};
pub use health::{check_all, check_service, HealthStatus};
pub use news::{Article, NewsClient, NewsSearchRequest, NewsSearchResponse};
pub use research::ResearchClient;
pub use workflow::WorkflowClient;

use reqwest::Response;

use crate::error::{PipelineError, Result};

/// Join a base URL and a path without doubling slashes
pub(crate) fn join_url(base: &str, path: &str) -> String {
    format!(
        "{}/{}",
        base.trim_end_matches('/'),
        path.trim_start_matches('/')
    )
}

/// Turn a non-2xx response into a service error carrying the body text
pub(crate) async fn ensure_success(service: &'static str, response: Response) -> Result<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let message = response.text().await.unwrap_or_default();
    Err(PipelineError::Service {
        service,
        status: status.as_u16(),
        message: message.trim().to_string(),
    })
}

/// Map reqwest timeouts to the pipeline's timeout error
pub(crate) fn map_transport(service: &'static str, err: reqwest::Error) -> PipelineError {
    if err.is_timeout() {
        PipelineError::Timeout(format!("{} request timed out", service))
    } else {
        PipelineError::Http(err)
    }
}
