//! Zero-shot ReAct tool-calling agent
//!
//! This module provides:
//! - `parser`: Action / final answer parsing of model output
//! - `agent`: The Thought/Action/Observation loop

mod agent;
mod parser;

pub use agent::{AgentRun, AgentStep, ToolAgent, ITERATION_LIMIT_ANSWER};
pub use parser::{parse_step, truncate_observation, ReactStep};
