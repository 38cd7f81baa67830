//! Router agent: classify a task and dispatch it to a specialist handler

use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;
use tracing::{info, warn};

use crate::config::{get_role_prompt, CLASSIFY_PROMPT};
use crate::error::{PipelineError, Result};
use crate::model::{ChatMessage, ChatModel};
use crate::services::{NewsClient, NewsSearchRequest, NewsSearchResponse};

const RESEARCH_MAX_RESULTS: usize = 10;
const RESEARCH_SHOWN: usize = 5;

/// Category a task is routed by
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TaskType {
    Research,
    Analysis,
    Coding,
    Writing,
}

impl TaskType {
    pub const ALL: [TaskType; 4] = [
        TaskType::Research,
        TaskType::Analysis,
        TaskType::Coding,
        TaskType::Writing,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            TaskType::Research => "research",
            TaskType::Analysis => "analysis",
            TaskType::Coding => "coding",
            TaskType::Writing => "writing",
        }
    }

    pub fn from_label(label: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|t| t.label() == label)
    }

    /// Interpret a classification reply
    ///
    /// The first word naming a category wins; replies naming none fall back
    /// to analysis.
    pub fn from_reply(reply: &str) -> Self {
        reply
            .to_lowercase()
            .split(|c: char| !c.is_ascii_alphabetic())
            .find_map(Self::from_label)
            .unwrap_or(TaskType::Analysis)
    }

    fn icon(&self) -> &'static str {
        match self {
            TaskType::Research => "\u{1F50D}",
            TaskType::Analysis => "\u{1F4CA}",
            TaskType::Coding => "\u{1F4BB}",
            TaskType::Writing => "\u{270D}\u{FE0F}",
        }
    }
}

impl fmt::Display for TaskType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// State carried through one routed task
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RouterState {
    pub task: String,
    pub task_type: Option<TaskType>,
    pub result: String,
    pub error: Option<String>,
}

impl RouterState {
    pub fn new(task: impl Into<String>) -> Self {
        Self {
            task: task.into(),
            ..Default::default()
        }
    }
}

/// Classifies tasks with the model and hands them to one of four handlers
pub struct RouterAgent {
    model: Arc<dyn ChatModel>,
    news: NewsClient,
    verbose: bool,
}

impl RouterAgent {
    pub fn new(model: Arc<dyn ChatModel>, news: NewsClient) -> Self {
        Self {
            model,
            news,
            verbose: false,
        }
    }

    pub fn with_verbose(mut self, verbose: bool) -> Self {
        self.verbose = verbose;
        self
    }

    /// Classify, then run the matching handler
    pub async fn route(&self, task: &str) -> Result<RouterState> {
        let state = self.classify(RouterState::new(task)).await?;
        let task_type = state.task_type.unwrap_or(TaskType::Analysis);

        if self.verbose {
            println!(
                "{} {} agent activated",
                task_type.icon(),
                capitalize(task_type.label())
            );
        }

        Ok(match task_type {
            TaskType::Research => self.research(state).await,
            other => self.respond(state, other).await,
        })
    }

    /// Ask the model which category the task belongs to
    pub async fn classify(&self, mut state: RouterState) -> Result<RouterState> {
        let messages = [
            ChatMessage::system(CLASSIFY_PROMPT),
            ChatMessage::user(state.task.as_str()),
        ];
        let response = self.model.chat(&messages).await?;
        let task_type = TaskType::from_reply(&response.content);

        info!(task_type = %task_type, reply = %response.content, "Task classified");
        if self.verbose {
            println!("\u{1F4CB} Task classified as: {}", task_type);
        }

        state.task_type = Some(task_type);
        Ok(state)
    }

    /// Research handler backed by the news search service
    async fn research(&self, mut state: RouterState) -> RouterState {
        let request = NewsSearchRequest::recent(state.task.as_str(), RESEARCH_MAX_RESULTS);
        let outcome = match self.news.search(&request).await {
            Err(e) => match search_verdict(&e) {
                Some(data) => Ok(data),
                None => Err(e),
            },
            ok => ok,
        };
        match outcome {
            Ok(data) if data.success => state.result = format_research(&data),
            Ok(_) => state.error = Some("Research failed".to_string()),
            Err(e) => {
                warn!("Research handler failed: {}", e);
                state.error = Some(format!("Research error: {}", e));
            }
        }
        state
    }

    /// Model-backed handler using the role prompt for the task type
    async fn respond(&self, mut state: RouterState, task_type: TaskType) -> RouterState {
        let prompt = get_role_prompt(task_type.label())
            .unwrap_or("You are a helpful assistant.");
        let messages = [
            ChatMessage::system(prompt),
            ChatMessage::user(state.task.as_str()),
        ];

        match self.model.chat(&messages).await {
            Ok(response) => state.result = response.content,
            Err(e) => {
                warn!("{} handler failed: {}", task_type, e);
                state.error = Some(format!("{} error: {}", capitalize(task_type.label()), e));
            }
        }
        state
    }
}

/// Search verdict carried in the body of a non-2xx reply, if any
fn search_verdict(err: &PipelineError) -> Option<NewsSearchResponse> {
    let PipelineError::Service { message, .. } = err else {
        return None;
    };
    let body: serde_json::Value = serde_json::from_str(message).ok()?;
    if body.get("success").is_none() {
        return None;
    }
    serde_json::from_value(body).ok()
}

fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// Summary of the top articles with their source
pub fn format_research(data: &NewsSearchResponse) -> String {
    let mut result = format!(
        "Found {} articles.\n\nTop {}:\n",
        data.count, RESEARCH_SHOWN
    );
    for (i, article) in data.articles.iter().take(RESEARCH_SHOWN).enumerate() {
        result.push_str(&format!(
            "{}. {}\n   Source: {}\n   URL: {}\n\n",
            i + 1,
            article.title.as_deref().unwrap_or("No title"),
            article.domain.as_deref().unwrap_or("Unknown"),
            article.url.as_deref().unwrap_or(""),
        ));
    }
    result
}
