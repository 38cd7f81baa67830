use agent_pipeline::services::{check_all, AgentTaskRequest};
use agent_pipeline::{
    AgentWrapperClient, NewsClient, NewsSearchRequest, PipelineError, ResearchClient,
    ServiceConfig, WorkflowClient,
};
use anyhow::Result;
use httpmock::prelude::*;
use serde_json::json;
use std::time::Duration;

#[tokio::test]
async fn test_news_search_contract() -> Result<()> {
    let server = MockServer::start_async().await;

    let search_mock = server
        .mock_async(|when, then| {
            when.method(POST)
                .path("/search")
                .json_body(json!({"keywords": ["fusion energy"], "timespan": "7d", "max_results": 5}));
            then.status(200).json_body(json!({
                "success": true,
                "count": 2,
                "articles": [
                    {"title": "Reactor milestone", "url": "https://a.example/1", "domain": "a.example"},
                    {"title": "Grid plans", "url": "https://b.example/2", "domain": "b.example", "language": "English"}
                ]
            }));
        })
        .await;

    let client = NewsClient::new(server.base_url());
    let response = client
        .search(&NewsSearchRequest::recent("fusion energy", 5))
        .await?;

    search_mock.assert_async().await;
    assert!(response.success);
    assert_eq!(response.count, 2);
    assert_eq!(response.articles[1].domain.as_deref(), Some("b.example"));
    assert_eq!(response.articles[1].language.as_deref(), Some("English"));

    Ok(())
}

#[tokio::test]
async fn test_news_search_error_status() -> Result<()> {
    let server = MockServer::start_async().await;

    server
        .mock_async(|when, then| {
            when.method(POST).path("/search");
            then.status(503).body("upstream unavailable");
        })
        .await;

    let client = NewsClient::new(server.base_url());
    let err = client
        .search(&NewsSearchRequest::recent("x", 5))
        .await
        .unwrap_err();

    match err {
        PipelineError::Service {
            service,
            status,
            message,
        } => {
            assert_eq!(service, "news-search");
            assert_eq!(status, 503);
            assert_eq!(message, "upstream unavailable");
        }
        other => panic!("unexpected error: {other}"),
    }

    Ok(())
}

#[tokio::test]
async fn test_news_search_timeout() -> Result<()> {
    let server = MockServer::start_async().await;

    server
        .mock_async(|when, then| {
            when.method(POST).path("/search");
            then.status(200)
                .delay(Duration::from_secs(2))
                .json_body(json!({"success": true, "count": 0, "articles": []}));
        })
        .await;

    let client = NewsClient::new(server.base_url()).with_timeout(Duration::from_millis(200));
    let err = client
        .search(&NewsSearchRequest::recent("x", 5))
        .await
        .unwrap_err();

    assert!(matches!(err, PipelineError::Timeout(_)), "got {err}");
    Ok(())
}

#[tokio::test]
async fn test_agent_task_submission() -> Result<()> {
    let server = MockServer::start_async().await;

    let task_mock = server
        .mock_async(|when, then| {
            when.method(POST).path("/agent/task").json_body(json!({
                "agent_type": "researcher",
                "task": "Research solar storage",
                "context": {"depth": "detailed"}
            }));
            then.status(200)
                .json_body(json!({"status": "ok", "response": "Storage costs fell."}));
        })
        .await;

    let client = AgentWrapperClient::new(server.base_url());
    let reply = client
        .submit_task(&AgentTaskRequest::research("solar storage"))
        .await?;

    task_mock.assert_async().await;
    assert_eq!(reply["response"], "Storage costs fell.");
    Ok(())
}

#[tokio::test]
async fn test_research_report() -> Result<()> {
    let server = MockServer::start_async().await;

    let report_mock = server
        .mock_async(|when, then| {
            when.method(POST).path("/report/").json_body(json!({
                "task": "Mean reversion strategies",
                "report_type": "research_report",
                "report_source": "web",
                "tone": "Objective",
                "generate_in_background": false
            }));
            then.status(200)
                .json_body(json!({"report": "# Report\nMean reversion works in ranges."}));
        })
        .await;

    let client = ResearchClient::new(server.base_url());
    let report = client
        .write_report("Mean reversion strategies", "research_report")
        .await?;

    report_mock.assert_async().await;
    assert_eq!(report, "# Report\nMean reversion works in ranges.");
    Ok(())
}

#[tokio::test]
async fn test_webhook_json_and_text_replies() -> Result<()> {
    let server = MockServer::start_async().await;

    let json_mock = server
        .mock_async(|when, then| {
            when.method(POST)
                .path("/webhook/a2a-handoff")
                .json_body(json!({"from": "router", "task": "summarize"}));
            then.status(200).json_body(json!({"accepted": true}));
        })
        .await;

    server
        .mock_async(|when, then| {
            when.method(POST).path("/webhook/plain");
            then.status(200).body("Workflow was started");
        })
        .await;

    let client = WorkflowClient::new(server.base_url());

    let reply = client
        .trigger_webhook("a2a-handoff", &json!({"from": "router", "task": "summarize"}))
        .await?;
    json_mock.assert_async().await;
    assert_eq!(reply, json!({"accepted": true}));

    let reply = client.trigger_webhook("plain", &json!({})).await?;
    assert_eq!(reply, json!("Workflow was started"));

    Ok(())
}

#[tokio::test]
async fn test_webhook_not_registered() -> Result<()> {
    let server = MockServer::start_async().await;

    server
        .mock_async(|when, then| {
            when.method(POST).path("/webhook/missing");
            then.status(404)
                .json_body(json!({"message": "webhook not registered"}));
        })
        .await;

    let err = WorkflowClient::new(server.base_url())
        .trigger_webhook("missing", &json!({}))
        .await
        .unwrap_err();

    assert!(matches!(
        err,
        PipelineError::Service {
            service: "workflow-engine",
            status: 404,
            ..
        }
    ));
    Ok(())
}

#[tokio::test]
async fn test_health_checks() -> Result<()> {
    let server = MockServer::start_async().await;

    server
        .mock_async(|when, then| {
            when.method(GET).path("/");
            then.status(404);
        })
        .await;

    let up = server.base_url();
    let services = ServiceConfig {
        llm_base_url: up.clone(),
        news_url: up.clone(),
        agent_wrapper_url: up.clone(),
        workflow_engine_url: up.clone(),
        // Nothing listens on port 9 locally
        research_url: "http://127.0.0.1:9".to_string(),
    };

    let results = check_all(&services, Duration::from_secs(2)).await;

    assert_eq!(results.len(), 5);
    assert_eq!(results[0].name, "llm-runtime");
    for result in &results[..4] {
        assert!(result.reachable, "{} should be reachable", result.name);
        assert_eq!(result.status, Some(404));
    }
    assert_eq!(results[4].name, "research");
    assert!(!results[4].reachable);
    assert!(results[4].error.is_some());

    Ok(())
}
