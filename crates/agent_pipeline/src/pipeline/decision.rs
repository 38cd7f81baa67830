//! Supervisor decisions and routing

use lazy_static::lazy_static;
use regex::Regex;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;

use crate::error::{PipelineError, Result};
use crate::model::ChatMessage;

lazy_static! {
    static ref FENCED_BODY_RE: Regex =
        Regex::new(r"(?s)```[A-Za-z0-9_+-]*[ \t]*\r?\n?(.*?)```").expect("valid fence regex");
}

/// Where the pipeline goes after a supervisor turn
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NextAction {
    CallResearcher,
    CallDeveloper,
    Finish,
}

impl NextAction {
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "call_researcher" => Some(Self::CallResearcher),
            "call_developer" => Some(Self::CallDeveloper),
            "finish" => Some(Self::Finish),
            _ => None,
        }
    }
}

impl fmt::Display for NextAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::CallResearcher => "call_researcher",
            Self::CallDeveloper => "call_developer",
            Self::Finish => "finish",
        };
        f.write_str(s)
    }
}

/// The JSON object the supervisor is asked to answer with
#[derive(Debug, Clone, Deserialize)]
pub struct SupervisorDecision {
    pub next_action: String,
    #[serde(default)]
    pub content: Value,
}

impl SupervisorDecision {
    pub fn action(&self) -> Option<NextAction> {
        NextAction::parse(self.next_action.trim())
    }
}

/// Body of the first Markdown code fence, or the whole text when unfenced
///
/// Prose around the fence and single-line fences are tolerated.
pub fn strip_code_fence(text: &str) -> &str {
    match FENCED_BODY_RE.captures(text).and_then(|caps| caps.get(1)) {
        Some(body) => body.as_str().trim(),
        None => text.trim(),
    }
}

pub fn parse_decision(text: &str) -> Result<SupervisorDecision> {
    serde_json::from_str(text.trim())
        .or_else(|_| serde_json::from_str(strip_code_fence(text)))
        .map_err(|e| PipelineError::Parse(format!("supervisor decision: {}", e)))
}

/// Next node for the conversation; anything unreadable ends the run
pub fn route_supervisor(messages: &[ChatMessage]) -> NextAction {
    let Some(last) = messages.last() else {
        return NextAction::Finish;
    };
    if !last.is_assistant() {
        return NextAction::Finish;
    }

    match parse_decision(&last.content) {
        Ok(decision) => decision.action().unwrap_or(NextAction::Finish),
        Err(e) => {
            tracing::warn!("Error parsing supervisor decision: {}", e);
            NextAction::Finish
        }
    }
}

/// Instruction for a worker: the decision's `content`, else the raw message
pub fn extract_instruction(message: &str) -> String {
    match parse_decision(message) {
        Ok(decision) => match decision.content {
            Value::String(s) => s,
            Value::Null => message.to_string(),
            other => other.to_string(),
        },
        Err(_) => message.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assistant(text: &str) -> Vec<ChatMessage> {
        vec![ChatMessage::user("task"), ChatMessage::assistant(text)]
    }

    #[test]
    fn test_route_each_action() {
        for (action, expected) in [
            ("call_researcher", NextAction::CallResearcher),
            ("call_developer", NextAction::CallDeveloper),
            ("finish", NextAction::Finish),
        ] {
            let text = format!(r#"{{"next_action": "{}", "content": "x"}}"#, action);
            assert_eq!(route_supervisor(&assistant(&text)), expected);
        }
    }

    #[test]
    fn test_route_fenced_json() {
        let text = "```json\n{\"next_action\": \"call_developer\", \"content\": \"code it\"}\n```";
        assert_eq!(route_supervisor(&assistant(text)), NextAction::CallDeveloper);
    }

    #[test]
    fn test_route_garbage_finishes() {
        assert_eq!(
            route_supervisor(&assistant("I think we should research")),
            NextAction::Finish
        );
        assert_eq!(
            route_supervisor(&assistant(r#"{"next_action": "dance"}"#)),
            NextAction::Finish
        );
    }

    #[test]
    fn test_route_requires_assistant_message() {
        let messages = vec![ChatMessage::user(r#"{"next_action": "call_researcher"}"#)];
        assert_eq!(route_supervisor(&messages), NextAction::Finish);
        assert_eq!(route_supervisor(&[]), NextAction::Finish);
    }

    #[test]
    fn test_extract_instruction() {
        assert_eq!(
            extract_instruction(r#"{"next_action": "call_researcher", "content": "RSI strategies"}"#),
            "RSI strategies"
        );
        assert_eq!(extract_instruction("plain text"), "plain text");

        let no_content = r#"{"next_action": "call_developer"}"#;
        assert_eq!(extract_instruction(no_content), no_content);
    }

    #[test]
    fn test_strip_code_fence() {
        assert_eq!(strip_code_fence("```\n{}\n```"), "{}");
        assert_eq!(strip_code_fence("  {\"a\": 1} "), "{\"a\": 1}");
        assert_eq!(strip_code_fence("```json {\"a\": 1}```"), "{\"a\": 1}");
    }

    #[test]
    fn test_route_fence_with_surrounding_prose() {
        let trailing = "```json\n{\"next_action\": \"call_researcher\", \"content\": \"x\"}\n```\nLet me know.";
        assert_eq!(route_supervisor(&assistant(trailing)), NextAction::CallResearcher);

        let leading = "Decision below.\n```json\n{\"next_action\": \"call_developer\", \"content\": \"y\"}\n```";
        assert_eq!(route_supervisor(&assistant(leading)), NextAction::CallDeveloper);

        let single_line = "```json {\"next_action\": \"call_developer\", \"content\": \"z\"}```";
        assert_eq!(route_supervisor(&assistant(single_line)), NextAction::CallDeveloper);
        assert_eq!(extract_instruction(single_line), "z");
    }

    #[test]
    fn test_unfenced_decision_with_code_in_content() {
        let text = r#"{"next_action": "call_developer", "content": "Fix this:\n```python\nprint(1)\n```"}"#;
        assert_eq!(route_supervisor(&assistant(text)), NextAction::CallDeveloper);
        assert_eq!(extract_instruction(text), "Fix this:\n```python\nprint(1)\n```");
    }
}
