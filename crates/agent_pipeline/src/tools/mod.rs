//! Tools the ReAct agent can call
//!
//! This module provides:
//! - `Tool`: the tool contract
//! - `ToolRegistry`: ordered set of tools with prompt rendering
//! - `NewsSearchTool`, `ResearchWorkflowTool`: tools over the local services

mod news_search;
mod research_workflow;

pub use news_search::NewsSearchTool;
pub use research_workflow::ResearchWorkflowTool;

use async_trait::async_trait;
use std::sync::Arc;

/// A named capability with a text-in, text-out contract
///
/// Tools report failures in their output (`"Error: ..."`) instead of
/// returning them, so the agent can read and react to them.
#[async_trait]
pub trait Tool: Send + Sync {
    fn name(&self) -> &str;

    fn description(&self) -> &str;

    async fn call(&self, input: &str) -> String;
}

/// Ordered collection of tools
#[derive(Clone, Default)]
pub struct ToolRegistry {
    tools: Vec<Arc<dyn Tool>>,
}

impl ToolRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a tool; a tool with the same name is replaced in place
    pub fn register(&mut self, tool: Arc<dyn Tool>) {
        if let Some(slot) = self.tools.iter_mut().find(|t| t.name() == tool.name()) {
            *slot = tool;
        } else {
            self.tools.push(tool);
        }
    }

    pub fn with_tool(mut self, tool: Arc<dyn Tool>) -> Self {
        self.register(tool);
        self
    }

    pub fn get(&self, name: &str) -> Option<Arc<dyn Tool>> {
        self.tools.iter().find(|t| t.name() == name).cloned()
    }

    pub fn names(&self) -> Vec<&str> {
        self.tools.iter().map(|t| t.name()).collect()
    }

    pub fn len(&self) -> usize {
        self.tools.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }

    /// `name: description` lines for the prompt
    pub fn render_descriptions(&self) -> String {
        self.tools
            .iter()
            .map(|t| format!("{}: {}", t.name(), t.description()))
            .collect::<Vec<_>>()
            .join("\n")
    }

    /// Comma separated tool names for the prompt
    pub fn render_names(&self) -> String {
        self.names().join(", ")
    }

    /// The news search and research workflow tools against the configured services
    pub fn local_services() -> Self {
        Self::new()
            .with_tool(Arc::new(NewsSearchTool::default()))
            .with_tool(Arc::new(ResearchWorkflowTool::default()))
    }
}
