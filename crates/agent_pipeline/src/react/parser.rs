//! Parser for zero-shot ReAct model output

use lazy_static::lazy_static;
use regex::Regex;

pub const FINAL_ANSWER: &str = "Final Answer:";
pub const OBSERVATION_MARKER: &str = "\nObservation:";

lazy_static! {
    static ref ACTION_RE: Regex =
        Regex::new(r"(?s)Action\s*\d*\s*:[\s]*(.*?)[\s]*Action\s*\d*\s*Input\s*\d*\s*:[\s]*(.*)")
            .expect("valid action regex");
    static ref ACTION_ONLY_RE: Regex =
        Regex::new(r"(?s)Action\s*\d*\s*:[\s]*(.*?)").expect("valid action regex");
}

/// One decision made by the model
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReactStep {
    /// Call a tool; `log` is the model text that led to the call
    Act {
        tool: String,
        input: String,
        log: String,
    },
    /// Answer the question
    Finish { answer: String, log: String },
}

/// Cut model output at the first observation the model tried to invent
pub fn truncate_observation(text: &str) -> &str {
    match text.find(OBSERVATION_MARKER) {
        Some(pos) => &text[..pos],
        None => text,
    }
}

/// Parse model output into an action or a final answer
pub fn parse_step(text: &str) -> Result<ReactStep, String> {
    let includes_answer = text.contains(FINAL_ANSWER);

    if let Some(caps) = ACTION_RE.captures(text) {
        if includes_answer {
            return Err(format!(
                "Parsing LLM output produced both a final answer and a parse-able action: {}",
                text.trim()
            ));
        }

        let tool = caps[1].trim().to_string();
        let input = caps[2].trim().trim_matches(' ').trim_matches('"').to_string();

        return Ok(ReactStep::Act {
            tool,
            input,
            log: text.to_string(),
        });
    }

    if includes_answer {
        let answer = text
            .rsplit(FINAL_ANSWER)
            .next()
            .unwrap_or_default()
            .trim()
            .to_string();
        return Ok(ReactStep::Finish {
            answer,
            log: text.to_string(),
        });
    }

    if !ACTION_ONLY_RE.is_match(text) {
        return Err("Invalid Format: Missing 'Action:' after 'Thought:'".to_string());
    }

    Err("Invalid Format: Missing 'Action Input:' after 'Action:'".to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_action() {
        let text = " I should search the news.\nAction: gdelt_news_search\nAction Input: \"AI\"";
        let step = parse_step(text).unwrap();
        assert_eq!(
            step,
            ReactStep::Act {
                tool: "gdelt_news_search".to_string(),
                input: "AI".to_string(),
                log: text.to_string(),
            }
        );
    }

    #[test]
    fn test_parse_multiline_input() {
        let text = "Action: n8n_research_workflow\nAction Input: quantum\ncomputing\n";
        match parse_step(text).unwrap() {
            ReactStep::Act { input, .. } => assert_eq!(input, "quantum\ncomputing"),
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn test_parse_final_answer() {
        let text = " I now know the final answer\nFinal Answer: Three AI stories today.";
        match parse_step(text).unwrap() {
            ReactStep::Finish { answer, .. } => assert_eq!(answer, "Three AI stories today."),
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn test_both_action_and_answer_is_error() {
        let text = "Action: x\nAction Input: y\nFinal Answer: z";
        assert!(parse_step(text).unwrap_err().contains("both a final answer"));
    }

    #[test]
    fn test_missing_action() {
        let err = parse_step("I am not sure what to do").unwrap_err();
        assert!(err.contains("Missing 'Action:'"));
    }

    #[test]
    fn test_missing_action_input() {
        let err = parse_step("Action: gdelt_news_search").unwrap_err();
        assert!(err.contains("Missing 'Action Input:'"));
    }

    #[test]
    fn test_truncate_observation() {
        let text = "Action: a\nAction Input: b\nObservation: made up\nThought: more";
        assert_eq!(truncate_observation(text), "Action: a\nAction Input: b");
        assert_eq!(truncate_observation("no marker"), "no marker");
    }
}
