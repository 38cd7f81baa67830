//! Reachability checks for the external services

use futures::future::join_all;
use reqwest::Client;
use std::time::{Duration, Instant};
use tracing::debug;

use crate::config::ServiceConfig;

/// Outcome of checking one service
#[derive(Debug, Clone)]
pub struct HealthStatus {
    pub name: String,
    pub url: String,
    pub reachable: bool,
    pub status: Option<u16>,
    pub latency: Duration,
    pub error: Option<String>,
}

/// GET the URL; any HTTP answer, even an error status, counts as reachable
pub async fn check_service(
    client: &Client,
    name: &str,
    url: &str,
    timeout: Duration,
) -> HealthStatus {
    let start = Instant::now();
    let outcome = client.get(url).timeout(timeout).send().await;
    let latency = start.elapsed();

    match outcome {
        Ok(response) => {
            debug!(service = name, status = %response.status(), "Service answered");
            HealthStatus {
                name: name.to_string(),
                url: url.to_string(),
                reachable: true,
                status: Some(response.status().as_u16()),
                latency,
                error: None,
            }
        }
        Err(e) => {
            let error = if e.is_timeout() {
                "timed out".to_string()
            } else if e.is_connect() {
                "connection refused".to_string()
            } else {
                e.to_string()
            };
            HealthStatus {
                name: name.to_string(),
                url: url.to_string(),
                reachable: false,
                status: None,
                latency,
                error: Some(error),
            }
        }
    }
}

/// Check every configured service concurrently, in configuration order
pub async fn check_all(services: &ServiceConfig, timeout: Duration) -> Vec<HealthStatus> {
    let client = Client::new();
    let checks = services
        .endpoints()
        .into_iter()
        .map(|(name, url)| {
            let client = &client;
            async move { check_service(client, name, url, timeout).await }
        });

    join_all(checks).await
}
