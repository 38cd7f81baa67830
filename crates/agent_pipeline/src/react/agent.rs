//! Tool-calling agent using the zero-shot ReAct loop

use std::sync::Arc;
use tracing::{debug, info, warn};

use super::parser::{parse_step, truncate_observation, ReactStep, OBSERVATION_MARKER};
use crate::config::REACT_TEMPLATE;
use crate::error::Result;
use crate::model::{ChatMessage, ChatModel};
use crate::tools::ToolRegistry;

pub const ITERATION_LIMIT_ANSWER: &str = "Agent stopped due to iteration limit.";

/// A tool call and what it returned
#[derive(Debug, Clone)]
pub struct AgentStep {
    pub tool: String,
    pub input: String,
    pub log: String,
    pub observation: String,
}

/// Result of a full agent run
#[derive(Debug, Clone)]
pub struct AgentRun {
    pub answer: String,
    pub steps: Vec<AgentStep>,
    /// True when the iteration limit ended the run
    pub stopped_early: bool,
}

/// Answers questions by alternating model reasoning with tool calls
pub struct ToolAgent {
    model: Arc<dyn ChatModel>,
    tools: ToolRegistry,
    max_iterations: usize,
    verbose: bool,
}

impl ToolAgent {
    pub fn new(model: Arc<dyn ChatModel>, tools: ToolRegistry) -> Self {
        Self {
            model,
            tools,
            max_iterations: 15,
            verbose: false,
        }
    }

    pub fn with_max_iterations(mut self, max_iterations: usize) -> Self {
        self.max_iterations = max_iterations;
        self
    }

    pub fn with_verbose(mut self, verbose: bool) -> Self {
        self.verbose = verbose;
        self
    }

    pub fn tools(&self) -> &ToolRegistry {
        &self.tools
    }

    /// Render the prompt for the question and the steps taken so far
    pub fn build_prompt(&self, question: &str, steps: &[AgentStep]) -> String {
        let mut scratchpad = String::new();
        for step in steps {
            scratchpad.push_str(&step.log);
            scratchpad.push_str(&format!(
                "{} {}\nThought:",
                OBSERVATION_MARKER, step.observation
            ));
        }

        REACT_TEMPLATE
            .replace("{tools}", &self.tools.render_descriptions())
            .replace("{tool_names}", &self.tools.render_names())
            .replace("{input}", question)
            .replace("{scratchpad}", &scratchpad)
    }

    /// Run until the model gives a final answer or the iteration limit is hit
    pub async fn run(&self, question: &str) -> Result<AgentRun> {
        let mut steps: Vec<AgentStep> = Vec::new();

        for iteration in 1..=self.max_iterations {
            let prompt = self.build_prompt(question, &steps);
            let response = self.model.chat(&[ChatMessage::user(prompt)]).await?;
            let text = truncate_observation(response.answer());
            debug!(iteration, "ReAct output: {}", text);

            if self.verbose {
                println!("{}", text.trim_end());
            }

            let step = match parse_step(text) {
                Ok(ReactStep::Finish { answer, .. }) => {
                    info!(iterations = iteration, "Agent finished");
                    return Ok(AgentRun {
                        answer,
                        steps,
                        stopped_early: false,
                    });
                }
                Ok(ReactStep::Act { tool, input, log }) => {
                    let observation = self.call_tool(&tool, &input).await;
                    AgentStep {
                        tool,
                        input,
                        log,
                        observation,
                    }
                }
                Err(e) => {
                    warn!("Could not parse model output: {}", e);
                    AgentStep {
                        tool: "_Exception".to_string(),
                        input: String::new(),
                        log: text.to_string(),
                        observation: e,
                    }
                }
            };

            if self.verbose {
                println!("Observation: {}", step.observation);
            }
            steps.push(step);
        }

        warn!(
            max_iterations = self.max_iterations,
            "Agent stopped before a final answer"
        );
        Ok(AgentRun {
            answer: ITERATION_LIMIT_ANSWER.to_string(),
            steps,
            stopped_early: true,
        })
    }

    async fn call_tool(&self, name: &str, input: &str) -> String {
        match self.tools.get(name) {
            Some(tool) => {
                info!(tool = name, "Calling tool");
                tool.call(input).await
            }
            None => format!(
                "{} is not a valid tool, try one of [{}].",
                name,
                self.tools.render_names()
            ),
        }
    }
}
