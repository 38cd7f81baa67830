//! Service endpoints, timeouts and developer execution settings

use lazy_static::lazy_static;
use std::env;
use std::str::FromStr;
use std::time::Duration;
use tracing::warn;

use crate::error::PipelineError;

fn env_or(key: &str, default: &str) -> String {
    env::var(key)
        .ok()
        .filter(|v| !v.trim().is_empty())
        .unwrap_or_else(|| default.to_string())
}

/// Seconds from the environment; anything but a finite non-negative number
/// falls back to the default
fn env_secs(key: &str, default: f64) -> f64 {
    env::var(key)
        .ok()
        .and_then(|v| v.trim().parse::<f64>().ok())
        .filter(|v| v.is_finite() && *v >= 0.0)
        .unwrap_or(default)
}

/// Base URLs of the external services the agents talk to
#[derive(Debug, Clone)]
pub struct ServiceConfig {
    /// OpenAI-compatible endpoint of the local LLM runtime
    pub llm_base_url: String,
    pub news_url: String,
    pub agent_wrapper_url: String,
    pub workflow_engine_url: String,
    pub research_url: String,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            llm_base_url: env_or("OLLAMA_BASE_URL", "http://localhost:11434/v1"),
            news_url: env_or("NEWS_SERVICE_URL", "http://localhost:8004"),
            agent_wrapper_url: env_or("AGENT_WRAPPER_URL", "http://localhost:8005"),
            workflow_engine_url: env_or("WORKFLOW_ENGINE_URL", "http://localhost:5678"),
            research_url: env_or("RESEARCH_SERVICE_URL", "http://localhost:8002"),
        }
    }
}

impl ServiceConfig {
    /// Named service URLs in health check order
    pub fn endpoints(&self) -> Vec<(&'static str, &str)> {
        vec![
            ("llm-runtime", self.llm_base_url.as_str()),
            ("news-search", self.news_url.as_str()),
            ("agent-wrapper", self.agent_wrapper_url.as_str()),
            ("workflow-engine", self.workflow_engine_url.as_str()),
            ("research", self.research_url.as_str()),
        ]
    }
}

/// Request timeouts in seconds
#[derive(Debug, Clone)]
pub struct TimeoutConfig {
    pub news_search: f64,
    pub agent_task: f64,
    pub research: f64,
    pub webhook: f64,
    pub health_check: f64,
    pub code_execution: f64,
}

impl Default for TimeoutConfig {
    fn default() -> Self {
        Self {
            news_search: env_secs("PIPELINE_NEWS_TIMEOUT", 30.0),
            agent_task: env_secs("PIPELINE_AGENT_TASK_TIMEOUT", 60.0),
            research: env_secs("PIPELINE_RESEARCH_TIMEOUT", 600.0),
            webhook: env_secs("PIPELINE_WEBHOOK_TIMEOUT", 60.0),
            health_check: env_secs("PIPELINE_HEALTH_TIMEOUT", 5.0),
            code_execution: env_secs("DEVELOPER_EXEC_TIMEOUT", 120.0),
        }
    }
}

impl TimeoutConfig {
    /// Negative values clamp to zero; values too large for a `Duration`
    /// (including infinity and NaN) mean no limit
    pub fn duration(secs: f64) -> Duration {
        if secs <= 0.0 {
            return Duration::ZERO;
        }
        Duration::try_from_secs_f64(secs).unwrap_or(Duration::MAX)
    }
}

/// How generated code may be executed by the developer agent
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SafeMode {
    /// Never execute unless auto-run is on
    Off,
    /// Confirm every code block before running it
    #[default]
    Ask,
    /// Execute without confirmation
    Auto,
}

impl FromStr for SafeMode {
    type Err = PipelineError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "off" => Ok(Self::Off),
            "ask" => Ok(Self::Ask),
            "auto" => Ok(Self::Auto),
            other => Err(PipelineError::Config(format!(
                "unknown safe mode '{}', expected off, ask or auto",
                other
            ))),
        }
    }
}

/// `DEVELOPER_SAFE_MODE`, warning about and ignoring values it does not know
fn env_safe_mode() -> SafeMode {
    match env::var("DEVELOPER_SAFE_MODE") {
        Ok(value) => value.parse().unwrap_or_else(|e: PipelineError| {
            warn!("Ignoring DEVELOPER_SAFE_MODE: {}", e);
            SafeMode::default()
        }),
        Err(_) => SafeMode::default(),
    }
}

/// Developer agent execution settings
#[derive(Debug, Clone)]
pub struct DeveloperConfig {
    pub auto_run: bool,
    pub safe_mode: SafeMode,
    pub python: String,
    pub shell: String,
}

impl Default for DeveloperConfig {
    fn default() -> Self {
        Self {
            auto_run: env::var("DEVELOPER_AUTO_RUN")
                .map(|v| v.eq_ignore_ascii_case("true"))
                .unwrap_or(false),
            safe_mode: env_safe_mode(),
            python: env_or("DEVELOPER_PYTHON", "python3"),
            shell: env_or("DEVELOPER_SHELL", "sh"),
        }
    }
}

/// Master pipeline configuration
#[derive(Debug, Clone, Default)]
pub struct PipelineSettings {
    pub services: ServiceConfig,
    pub timeouts: TimeoutConfig,
    pub developer: DeveloperConfig,
}

lazy_static! {
    /// Global settings read once from the environment
    pub static ref SETTINGS: PipelineSettings = PipelineSettings::default();
}
