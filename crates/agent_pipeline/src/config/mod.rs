//! Configuration module for agent_pipeline
//!
//! This module contains:
//! - `services`: Service endpoints, timeouts and developer settings
//! - `prompts`: System prompts for the agents

mod prompts;
mod services;

pub use prompts::{
    get_role_prompt, CLASSIFY_PROMPT, DEVELOPER_PROMPT, REACT_TEMPLATE, ROLE_PROMPTS,
    SUPERVISOR_PROMPT,
};
pub use services::{
    DeveloperConfig, PipelineSettings, SafeMode, ServiceConfig, TimeoutConfig, SETTINGS,
};
