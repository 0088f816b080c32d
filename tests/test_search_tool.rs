//! Integration tests for the Google search tool
//!
//! Drives initialize/execute against a mock Serper backend, covering header
//! authentication, payload shape, result formatting, and the context budget.

use concierge::config::Config;
use concierge::tools::builtin::GoogleSearchTool;
use concierge::tools::{Tool, ToolError};
use serde_json::json;
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn search_config(base_url: &str, key_env: &str) -> Config {
    let mut config = Config::default();
    config.search.base_url = Some(base_url.to_string());
    config.search.api_key_env = key_env.to_string();
    config
}

async fn ready_tool(config: &Config, key_env: &str, key: &str) -> GoogleSearchTool {
    std::env::set_var(key_env, key);
    let mut tool = GoogleSearchTool::new();
    let result = tool.initialize(config).await;
    std::env::remove_var(key_env);
    result.unwrap();
    tool
}

#[tokio::test]
async fn test_search_sends_authenticated_request_and_formats_results() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/search"))
        .and(header("X-API-KEY", "serper-test-key"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "organic": [
                {"title": "AI breakthrough announced", "link": "https://news.example/ai", "snippet": "A new model shows strong results."},
                {"title": "Funding roundup", "link": "https://news.example/funding", "snippet": "Startups raised record sums."}
            ]
        })))
        .mount(&mock_server)
        .await;

    let key_env = "CONCIERGE_TEST_SERPER_KEY_OK";
    let config = search_config(&mock_server.uri(), key_env);
    let tool = ready_tool(&config, key_env, "serper-test-key").await;

    let payload = tool
        .execute(&json!({"query": "latest AI news", "num_results": 2}))
        .await
        .unwrap();

    let text = payload.as_str().unwrap();
    assert!(text.starts_with("Search results for 'latest AI news':"));
    assert!(text.contains("1. AI breakthrough announced"));
    assert!(text.contains("   A new model shows strong results."));
    assert!(text.contains("   https://news.example/ai"));
    assert!(text.contains("2. Funding roundup"));

    let requests = mock_server.received_requests().await.unwrap();
    assert_eq!(requests.len(), 1);
    let body: serde_json::Value = serde_json::from_slice(&requests[0].body).unwrap();
    assert_eq!(body["q"], "latest AI news");
    assert_eq!(body["num"], 2);
    assert_eq!(body["gl"], "us");
    assert_eq!(body["hl"], "en");
    assert!(body.get("location").is_none());
}

#[tokio::test]
async fn test_search_forwards_configured_location() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/search"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"organic": []})))
        .mount(&mock_server)
        .await;

    let key_env = "CONCIERGE_TEST_SERPER_KEY_LOCATION";
    let mut config = search_config(&mock_server.uri(), key_env);
    config.search.location = Some("India".to_string());
    let tool = ready_tool(&config, key_env, "serper-test-key").await;

    let payload = tool.execute(&json!({"query": "weather"})).await.unwrap();
    assert_eq!(payload.as_str().unwrap(), "No results found for 'weather'");

    let requests = mock_server.received_requests().await.unwrap();
    let body: serde_json::Value = serde_json::from_slice(&requests[0].body).unwrap();
    assert_eq!(body["location"], "India");
    assert_eq!(body["num"], 5);
}

#[tokio::test]
async fn test_search_truncates_long_responses() {
    let mock_server = MockServer::start().await;

    let long_snippet = "a".repeat(2000);
    Mock::given(method("POST"))
        .and(path("/search"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "organic": [
                {"title": "Very long page", "link": "https://long.example", "snippet": long_snippet}
            ]
        })))
        .mount(&mock_server)
        .await;

    let key_env = "CONCIERGE_TEST_SERPER_KEY_TRUNC";
    let config = search_config(&mock_server.uri(), key_env);
    let tool = ready_tool(&config, key_env, "serper-test-key").await;

    let payload = tool.execute(&json!({"query": "long"})).await.unwrap();

    assert_eq!(payload.as_str().unwrap().chars().count(), 1000);
}

#[tokio::test]
async fn test_search_reports_api_errors() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/search"))
        .respond_with(ResponseTemplate::new(403).set_body_string("Invalid API key"))
        .mount(&mock_server)
        .await;

    let key_env = "CONCIERGE_TEST_SERPER_KEY_ERR";
    let config = search_config(&mock_server.uri(), key_env);
    let tool = ready_tool(&config, key_env, "bad-key").await;

    let error = tool.execute(&json!({"query": "anything"})).await.unwrap_err();

    match error {
        ToolError::ExecutionError(message) => {
            assert!(message.contains("Serper API error"));
            assert!(message.contains("403"));
            assert!(message.contains("Invalid API key"));
        }
        other => panic!("Expected ExecutionError, got {other:?}"),
    }
}

#[tokio::test]
async fn test_search_initialize_requires_api_key_env() {
    let mut tool = GoogleSearchTool::new();
    let config = search_config("http://localhost:9", "CONCIERGE_TEST_SERPER_KEY_UNSET");

    let error = tool.initialize(&config).await.unwrap_err();

    match error {
        ToolError::InitializationError(message) => {
            assert!(message.contains("CONCIERGE_TEST_SERPER_KEY_UNSET"));
        }
        other => panic!("Expected InitializationError, got {other:?}"),
    }
}
