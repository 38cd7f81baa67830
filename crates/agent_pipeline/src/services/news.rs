//! Client for the news search service

use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::debug;

use super::{ensure_success, join_url, map_transport};
use crate::config::{TimeoutConfig, SETTINGS};
use crate::error::Result;

const SERVICE: &str = "news-search";

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct NewsSearchRequest {
    pub keywords: Vec<String>,
    pub timespan: String,
    pub max_results: usize,
}

impl NewsSearchRequest {
    /// Search the last seven days for a single query
    pub fn recent(query: impl Into<String>, max_results: usize) -> Self {
        Self {
            keywords: vec![query.into()],
            timespan: "7d".to_string(),
            max_results,
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Article {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub domain: Option<String>,
    #[serde(default)]
    pub seendate: Option<String>,
    #[serde(default)]
    pub language: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct NewsSearchResponse {
    #[serde(default)]
    pub success: bool,
    #[serde(default)]
    pub count: usize,
    #[serde(default)]
    pub articles: Vec<Article>,
}

#[derive(Debug, Clone)]
pub struct NewsClient {
    client: Client,
    base_url: String,
    timeout: Duration,
}

impl Default for NewsClient {
    fn default() -> Self {
        Self::new(&SETTINGS.services.news_url)
    }
}

impl NewsClient {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            base_url: base_url.into(),
            timeout: TimeoutConfig::duration(SETTINGS.timeouts.news_search),
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub async fn search(&self, request: &NewsSearchRequest) -> Result<NewsSearchResponse> {
        debug!(keywords = ?request.keywords, "Searching news");

        let response = self
            .client
            .post(join_url(&self.base_url, "search"))
            .json(request)
            .timeout(self.timeout)
            .send()
            .await
            .map_err(|e| map_transport(SERVICE, e))?;

        let response = ensure_success(SERVICE, response).await?;
        Ok(response.json().await?)
    }
}
