//! Client for the agent coordination wrapper that hosts workflow-backed agents

use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::time::Duration;
use tracing::debug;

use super::{ensure_success, join_url, map_transport};
use crate::config::{TimeoutConfig, SETTINGS};
use crate::error::Result;

const SERVICE: &str = "agent-wrapper";

/// Task submitted to a hosted agent
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AgentTaskRequest {
    pub agent_type: String,
    pub task: String,
    #[serde(default)]
    pub context: Value,
}

impl AgentTaskRequest {
    pub fn new(agent_type: impl Into<String>, task: impl Into<String>) -> Self {
        Self {
            agent_type: agent_type.into(),
            task: task.into(),
            context: json!({}),
        }
    }

    pub fn with_context(mut self, context: Value) -> Self {
        self.context = context;
        self
    }

    /// Detailed research request for a topic
    pub fn research(topic: &str) -> Self {
        Self::new("researcher", format!("Research {}", topic))
            .with_context(json!({"depth": "detailed"}))
    }
}

#[derive(Debug, Clone)]
pub struct AgentWrapperClient {
    client: Client,
    base_url: String,
    timeout: Duration,
}

impl Default for AgentWrapperClient {
    fn default() -> Self {
        Self::new(&SETTINGS.services.agent_wrapper_url)
    }
}

impl AgentWrapperClient {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            base_url: base_url.into(),
            timeout: TimeoutConfig::duration(SETTINGS.timeouts.agent_task),
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Submit a task and return the wrapper's JSON reply
    pub async fn submit_task(&self, request: &AgentTaskRequest) -> Result<Value> {
        debug!(agent_type = %request.agent_type, "Submitting agent task");

        let response = self
            .client
            .post(join_url(&self.base_url, "agent/task"))
            .json(request)
            .timeout(self.timeout)
            .send()
            .await
            .map_err(|e| map_transport(SERVICE, e))?;

        let response = ensure_success(SERVICE, response).await?;
        Ok(response.json().await?)
    }
}
