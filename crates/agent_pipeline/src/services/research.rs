//! Client for the research report service

use reqwest::Client;
use serde::Serialize;
use serde_json::Value;
use std::time::Duration;
use tracing::info;

use super::{ensure_success, join_url, map_transport};
use crate::config::{TimeoutConfig, SETTINGS};
use crate::error::Result;

const SERVICE: &str = "research";

pub const DEFAULT_REPORT_TYPE: &str = "research_report";

#[derive(Debug, Serialize)]
struct ReportRequest<'a> {
    task: &'a str,
    report_type: &'a str,
    report_source: &'a str,
    tone: &'a str,
    generate_in_background: bool,
}

#[derive(Debug, Clone)]
pub struct ResearchClient {
    client: Client,
    base_url: String,
    timeout: Duration,
}

impl Default for ResearchClient {
    fn default() -> Self {
        Self::new(&SETTINGS.services.research_url)
    }
}

impl ResearchClient {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            base_url: base_url.into(),
            timeout: TimeoutConfig::duration(SETTINGS.timeouts.research),
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Run a research job and return the written report
    pub async fn write_report(&self, query: &str, report_type: &str) -> Result<String> {
        info!("Requesting {} for: {}", report_type, query);

        let request = ReportRequest {
            task: query,
            report_type,
            report_source: "web",
            tone: "Objective",
            generate_in_background: false,
        };

        let response = self
            .client
            .post(join_url(&self.base_url, "report/"))
            .json(&request)
            .timeout(self.timeout)
            .send()
            .await
            .map_err(|e| map_transport(SERVICE, e))?;

        let response = ensure_success(SERVICE, response).await?;
        let body = response.text().await?;

        Ok(extract_report(&body))
    }
}

/// The `report` field of a JSON reply, or the body itself
fn extract_report(body: &str) -> String {
    match serde_json::from_str::<Value>(body) {
        Ok(Value::Object(map)) => match map.get("report") {
            Some(Value::String(report)) => report.clone(),
            Some(other) => other.to_string(),
            None => body.to_string(),
        },
        Ok(Value::String(report)) => report,
        _ => body.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extract_report_field() {
        assert_eq!(
            extract_report(r#"{"report": "RSI works", "research_id": "1"}"#),
            "RSI works"
        );
    }

    #[test]
    fn test_extract_report_plain_text() {
        assert_eq!(extract_report("# Report\nbody"), "# Report\nbody");
    }

    #[test]
    fn test_extract_report_json_without_field() {
        let body = r#"{"status": "done"}"#;
        assert_eq!(extract_report(body), body);
    }
}
