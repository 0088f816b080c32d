//! Google search tool implementation
//!
//! Searches the web through the Serper API and hands the agent loop a
//! compact text block of top results. Pure formatting and parsing are
//! separated from the HTTP call so they can be tested without a network.

use crate::config::Config;
use crate::tools::{Tool, ToolDescription, ToolError};
use async_trait::async_trait;
use serde_json::{json, Value};

/// Results returned when the model does not ask for a count
const DEFAULT_NUM_RESULTS: usize = 5;

/// Upper bound on results per query, mirrored in the parameter schema
const MAX_NUM_RESULTS: usize = 10;

/// Search text is cut at this length before it re-enters the model context
const MAX_RESPONSE_CHARS: usize = 1000;

/// Default Serper endpoint, overridable through `[search] base_url`
const DEFAULT_BASE_URL: &str = "https://google.serper.dev";

/// One parsed organic search result
#[derive(Debug, Clone, PartialEq)]
struct SearchResult {
    title: String,
    url: String,
    snippet: String,
}

/// Web search tool backed by the Serper API
pub struct GoogleSearchTool {
    client: Option<reqwest::Client>,
    api_key: Option<String>,
    base_url: String,
    location: Option<String>,
}

impl Default for GoogleSearchTool {
    fn default() -> Self {
        Self::new()
    }
}

impl GoogleSearchTool {
    pub fn new() -> Self {
        Self {
            client: None,
            api_key: None,
            base_url: DEFAULT_BASE_URL.to_string(),
            location: None,
        }
    }

    /// Build the Serper request payload (pure function)
    fn build_search_payload(query: &str, num_results: usize, location: Option<&str>) -> Value {
        let mut payload = json!({
            "q": query,
            "num": num_results,
            "gl": "us",
            "hl": "en"
        });

        if let Some(location) = location {
            payload["location"] = json!(location);
        }

        payload
    }

    /// Extract the requested result count, clamped to schema bounds (pure function)
    fn extract_num_results(parameters: &Value) -> usize {
        parameters
            .get("num_results")
            .and_then(|v| v.as_u64())
            .map(|n| n as usize)
            .unwrap_or(DEFAULT_NUM_RESULTS)
            .clamp(1, MAX_NUM_RESULTS)
    }

    /// Pull titles, links, and snippets out of a Serper response (pure function)
    fn parse_search_results(response: &Value, num_results: usize) -> Vec<SearchResult> {
        response
            .get("organic")
            .and_then(|v| v.as_array())
            .map(|results| {
                results
                    .iter()
                    .take(num_results)
                    .map(|result| SearchResult {
                        title: result
                            .get("title")
                            .and_then(|v| v.as_str())
                            .unwrap_or("")
                            .to_string(),
                        url: result
                            .get("link")
                            .and_then(|v| v.as_str())
                            .unwrap_or("")
                            .to_string(),
                        snippet: result
                            .get("snippet")
                            .and_then(|v| v.as_str())
                            .unwrap_or("")
                            .to_string(),
                    })
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Format results as numbered text for the model (pure function)
    fn format_search_results(query: &str, results: &[SearchResult]) -> String {
        if results.is_empty() {
            return format!("No results found for '{query}'");
        }

        let mut text = format!("Search results for '{query}':\n");
        for (index, result) in results.iter().enumerate() {
            text.push_str(&format!(
                "\n{}. {}\n   {}\n   {}\n",
                index + 1,
                result.title,
                result.snippet,
                result.url
            ));
        }
        text
    }

    /// Hard-cut a response to the context budget (pure function)
    fn truncate_response(text: String) -> String {
        if text.chars().count() <= MAX_RESPONSE_CHARS {
            text
        } else {
            text.chars().take(MAX_RESPONSE_CHARS).collect()
        }
    }
}

#[async_trait]
impl Tool for GoogleSearchTool {
    fn describe(&self) -> ToolDescription {
        ToolDescription {
            name: "google_search".to_string(),
            description: "Search Google for current information. Use this tool to find recent news, information, or facts. Returns top search results with titles and snippets.".to_string(),
            parameters: json!({
                "type": "object",
                "properties": {
                    "query": {
                        "type": "string",
                        "description": "The search query (e.g., 'latest AI news 2025')"
                    },
                    "num_results": {
                        "type": "integer",
                        "description": "Number of results to return (1-10, default: 5)",
                        "minimum": 1,
                        "maximum": 10
                    }
                },
                "required": ["query"],
                "additionalProperties": false
            }),
        }
    }

    async fn initialize(&mut self, config: &Config) -> Result<(), ToolError> {
        let api_key = config
            .get_search_api_key()
            .map_err(|e| ToolError::InitializationError(e.to_string()))?;
        self.api_key = Some(api_key);

        if let Some(base_url) = &config.search.base_url {
            self.base_url = base_url.trim_end_matches('/').to_string();
        }
        self.location = config.search.location.clone();

        self.client = Some(
            reqwest::Client::builder()
                .build()
                .map_err(|e| ToolError::InitializationError(e.to_string()))?,
        );

        Ok(())
    }

    async fn execute(&self, parameters: &Value) -> Result<Value, ToolError> {
        let client = self
            .client
            .as_ref()
            .ok_or_else(|| ToolError::ExecutionError("Tool not initialized".to_string()))?;
        let api_key = self
            .api_key
            .as_ref()
            .ok_or_else(|| ToolError::ExecutionError("Tool not initialized".to_string()))?;

        let query = parameters
            .get("query")
            .and_then(|v| v.as_str())
            .ok_or_else(|| {
                ToolError::ExecutionError("Missing required parameter: query".to_string())
            })?;
        let num_results = Self::extract_num_results(parameters);

        tracing::debug!(query = %query, num_results, "Executing web search");

        let payload = Self::build_search_payload(query, num_results, self.location.as_deref());

        let response = client
            .post(format!("{}/search", self.base_url))
            .header("X-API-KEY", api_key)
            .json(&payload)
            .send()
            .await
            .map_err(|e| ToolError::ExecutionError(format!("Request failed: {e}")))?;

        if !response.status().is_success() {
            let status = response.status();
            let error_body = response.text().await.unwrap_or_default();
            return Err(ToolError::ExecutionError(format!(
                "Serper API error ({status}): {error_body}"
            )));
        }

        let body: Value = response
            .json()
            .await
            .map_err(|e| ToolError::ExecutionError(format!("Failed to parse response: {e}")))?;

        let results = Self::parse_search_results(&body, num_results);
        let text = Self::truncate_response(Self::format_search_results(query, &results));

        Ok(Value::String(text))
    }

    async fn shutdown(&mut self) -> Result<(), ToolError> {
        self.client = None;
        self.api_key = None;
        Ok(())
    }
}
