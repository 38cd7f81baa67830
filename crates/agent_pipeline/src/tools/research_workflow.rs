use async_trait::async_trait;
use serde_json::Value;
use tracing::warn;

use super::Tool;
use crate::services::{AgentTaskRequest, AgentWrapperClient};

/// Hands a topic to the workflow-hosted research agent
#[derive(Debug, Clone, Default)]
pub struct ResearchWorkflowTool {
    client: AgentWrapperClient,
}

impl ResearchWorkflowTool {
    pub fn new(client: AgentWrapperClient) -> Self {
        Self { client }
    }
}

/// Text of the wrapper's `response` field
pub fn render_response(data: &Value) -> String {
    match data.get("response") {
        Some(Value::String(s)) => s.clone(),
        Some(Value::Null) | None => "Research completed".to_string(),
        Some(other) => other.to_string(),
    }
}

#[async_trait]
impl Tool for ResearchWorkflowTool {
    fn name(&self) -> &str {
        "n8n_research_workflow"
    }

    fn description(&self) -> &str {
        "Trigger n8n research workflow for in-depth analysis"
    }

    async fn call(&self, input: &str) -> String {
        let request = AgentTaskRequest::research(input);
        match self.client.submit_task(&request).await {
            Ok(data) => render_response(&data),
            Err(e) => {
                warn!("Research workflow failed: {}", e);
                format!("Error: {}", e)
            }
        }
    }
}
