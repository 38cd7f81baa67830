//! Workflow engine webhook trigger, used for agent-to-agent handoffs

use reqwest::Client;
use serde_json::Value;
use std::time::Duration;
use tracing::info;

use super::{ensure_success, join_url, map_transport};
use crate::config::{TimeoutConfig, SETTINGS};
use crate::error::Result;

const SERVICE: &str = "workflow-engine";

#[derive(Debug, Clone)]
pub struct WorkflowClient {
    client: Client,
    base_url: String,
    timeout: Duration,
}

impl Default for WorkflowClient {
    fn default() -> Self {
        Self::new(&SETTINGS.services.workflow_engine_url)
    }
}

impl WorkflowClient {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            base_url: base_url.into(),
            timeout: TimeoutConfig::duration(SETTINGS.timeouts.webhook),
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// URL of a production webhook path
    pub fn webhook_url(&self, path: &str) -> String {
        join_url(&self.base_url, &format!("webhook/{}", path.trim_start_matches('/')))
    }

    /// POST a payload to a webhook and return its reply
    ///
    /// Workflows may answer with plain text; that is returned as a JSON string.
    pub async fn trigger_webhook(&self, path: &str, payload: &Value) -> Result<Value> {
        let url = self.webhook_url(path);
        info!("Triggering workflow webhook {}", url);

        let response = self
            .client
            .post(&url)
            .json(payload)
            .timeout(self.timeout)
            .send()
            .await
            .map_err(|e| map_transport(SERVICE, e))?;

        let response = ensure_success(SERVICE, response).await?;
        let body = response.text().await?;

        Ok(serde_json::from_str(&body).unwrap_or(Value::String(body)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_webhook_url() {
        let client = WorkflowClient::new("http://localhost:5678/");
        assert_eq!(
            client.webhook_url("/a2a-handoff"),
            "http://localhost:5678/webhook/a2a-handoff"
        );
    }
}
