//! Research-code pipeline: a supervisor delegating to researcher and developer
//!
//! ```text
//! query → supervisor ─┬─ call_researcher → researcher ─┐
//!            ▲        ├─ call_developer  → developer  ─┤
//!            │        └─ finish → done                 │
//!            └─────────────────────────────────────────┘
//! ```

pub mod decision;
pub mod interpreter;
mod supervisor;
mod transcript;
mod workers;

pub use decision::{
    extract_instruction, parse_decision, route_supervisor, NextAction, SupervisorDecision,
};
pub use interpreter::{CodeBlock, CodeRunner, ExecutionOutput};
pub use supervisor::Supervisor;
pub use transcript::TranscriptSaver;
pub use workers::{ConfirmationCallback, DeveloperAgent, ResearcherAgent, Worker};

use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{info, info_span, warn, Instrument};
use uuid::Uuid;

use crate::error::Result;
use crate::model::ChatMessage;

/// Why a run ended
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StopReason {
    /// The supervisor chose to finish (or gave an unreadable decision)
    Finished,
    /// The node budget ran out first
    StepLimit,
}

/// Result of one pipeline run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineOutcome {
    pub run_id: Uuid,
    pub query: String,
    pub messages: Vec<ChatMessage>,
    pub final_message: String,
    pub stop_reason: StopReason,
    /// Node executions, supervisor turns included
    pub steps: usize,
}

/// Configuration for the pipeline loop
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    pub max_steps: usize,
    pub verbose: bool,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            max_steps: 25,
            verbose: true,
        }
    }
}

impl PipelineConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_max_steps(mut self, max_steps: usize) -> Self {
        self.max_steps = max_steps;
        self
    }

    pub fn with_verbose(mut self, verbose: bool) -> Self {
        self.verbose = verbose;
        self
    }
}

pub struct Pipeline {
    supervisor: Supervisor,
    researcher: Arc<dyn Worker>,
    developer: Arc<dyn Worker>,
    config: PipelineConfig,
    transcript: Option<TranscriptSaver>,
}

impl Pipeline {
    pub fn new(
        supervisor: Supervisor,
        researcher: Arc<dyn Worker>,
        developer: Arc<dyn Worker>,
        config: Option<PipelineConfig>,
    ) -> Self {
        Self {
            supervisor,
            researcher,
            developer,
            config: config.unwrap_or_default(),
            transcript: None,
        }
    }

    /// Save every run's transcript through this saver
    pub fn with_transcript(mut self, saver: TranscriptSaver) -> Self {
        self.transcript = Some(saver);
        self
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// Run the pipeline on a query until the supervisor finishes
    pub async fn run(&mut self, query: &str) -> Result<PipelineOutcome> {
        let run_id = Uuid::new_v4();
        let span = info_span!("pipeline", run_id = %run_id);

        let outcome = self.execute(run_id, query).instrument(span).await?;

        if let Some(ref mut saver) = self.transcript {
            if let Err(e) = saver.save(&outcome).await {
                warn!("Failed to save transcript: {}", e);
            }
        }

        Ok(outcome)
    }

    async fn execute(&self, run_id: Uuid, query: &str) -> Result<PipelineOutcome> {
        info!("Pipeline started with query: {}", query.trim());

        let mut messages = vec![ChatMessage::user(query)];
        let mut steps = 0;

        let stop_reason = loop {
            if steps >= self.config.max_steps {
                break StopReason::StepLimit;
            }
            steps += 1;

            self.banner("SUPERVISOR");
            let decision = self.supervisor.decide(&messages).await?;
            if self.config.verbose {
                println!("Decision: {}", decision);
            }
            messages.push(ChatMessage::assistant(decision));

            let worker = match route_supervisor(&messages) {
                NextAction::Finish => break StopReason::Finished,
                NextAction::CallResearcher => &self.researcher,
                NextAction::CallDeveloper => &self.developer,
            };

            if steps >= self.config.max_steps {
                break StopReason::StepLimit;
            }
            steps += 1;

            let instruction = match messages.last() {
                Some(last) => extract_instruction(&last.content),
                None => query.to_string(),
            };
            let report = self.delegate(worker.as_ref(), &instruction).await;
            messages.push(ChatMessage::assistant(report));
        };

        if stop_reason == StopReason::StepLimit {
            warn!(max_steps = self.config.max_steps, "Pipeline hit its step limit");
        }
        info!(steps, ?stop_reason, "Pipeline finished");

        let final_message = messages
            .last()
            .map(|m| m.content.clone())
            .unwrap_or_default();

        Ok(PipelineOutcome {
            run_id,
            query: query.to_string(),
            messages,
            final_message,
            stop_reason,
            steps,
        })
    }

    /// Run a worker; its failure becomes its report so the supervisor can react
    async fn delegate(&self, worker: &dyn Worker, instruction: &str) -> String {
        self.banner(&worker.name().to_uppercase());

        let body = match worker.handle(instruction).await {
            Ok(body) => body,
            Err(e) => {
                warn!(worker = worker.name(), "Worker failed: {}", e);
                format!("Error: {}", e)
            }
        };

        format!("{}:\n{}", worker.heading(), body)
    }

    fn banner(&self, name: &str) {
        if self.config.verbose {
            println!("=== {} ===", name);
        }
    }
}
