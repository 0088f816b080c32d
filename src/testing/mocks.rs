//! Mock implementations for testing without live model or network access

use crate::llm::provider::{
    CompletionRequest, CompletionResponse, FinishReason, LlmError, LlmProvider, TokenUsage,
    ToolCall,
};
use async_trait::async_trait;
use serde_json::Value;
use std::sync::Arc;
use tokio::sync::Mutex;
use uuid::Uuid;

/// Mock LLM provider with scripted responses
///
/// Responses are served in order and cycle once exhausted, so a single
/// scripted answer also covers follow-up completions in a tool loop.
#[derive(Debug)]
pub struct MockLlmProvider {
    pub responses: Vec<CompletionResponse>,
    pub current_response: Arc<Mutex<usize>>,
    pub should_fail: bool,
    pub requests: Arc<Mutex<Vec<CompletionRequest>>>,
}

impl MockLlmProvider {
    pub fn new(responses: Vec<CompletionResponse>) -> Self {
        Self {
            responses,
            current_response: Arc::new(Mutex::new(0)),
            should_fail: false,
            requests: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Provider whose every completion fails
    pub fn with_failure() -> Self {
        Self {
            responses: vec![],
            current_response: Arc::new(Mutex::new(0)),
            should_fail: true,
            requests: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Provider that always answers with the given text
    pub fn single_text(response: impl Into<String>) -> Self {
        Self::new(vec![Self::text_response(response)])
    }

    /// Build a plain text completion response
    pub fn text_response(content: impl Into<String>) -> CompletionResponse {
        CompletionResponse {
            content: Some(content.into()),
            model: "mock-model".to_string(),
            usage: TokenUsage {
                prompt_tokens: 10,
                completion_tokens: 5,
                total_tokens: 15,
            },
            finish_reason: FinishReason::Stop,
            tool_calls: None,
        }
    }

    /// Build a response that asks for one tool call
    pub fn tool_call_response(name: impl Into<String>, arguments: Value) -> CompletionResponse {
        CompletionResponse {
            content: None,
            model: "mock-model".to_string(),
            usage: TokenUsage {
                prompt_tokens: 10,
                completion_tokens: 5,
                total_tokens: 15,
            },
            finish_reason: FinishReason::Stop,
            tool_calls: Some(vec![ToolCall {
                id: format!("call_{}", Uuid::new_v4()),
                name: name.into(),
                arguments,
            }]),
        }
    }

    /// Requests captured across all completions, in call order
    pub async fn recorded_requests(&self) -> Vec<CompletionRequest> {
        self.requests.lock().await.clone()
    }
}

#[async_trait]
impl LlmProvider for MockLlmProvider {
    fn name(&self) -> &str {
        "mock"
    }

    fn available_models(&self) -> Vec<String> {
        vec!["mock-model".to_string()]
    }

    async fn complete(&self, request: CompletionRequest) -> Result<CompletionResponse, LlmError> {
        self.requests.lock().await.push(request);

        if self.should_fail {
            return Err(LlmError::RequestFailed("Mock LLM failure".to_string()));
        }

        let mut current = self.current_response.lock().await;
        let response_idx = *current % self.responses.len().max(1);
        *current += 1;

        if self.responses.is_empty() {
            return Ok(Self::text_response("Mock response"));
        }

        Ok(self.responses[response_idx].clone())
    }

    async fn health_check(&self) -> Result<(), LlmError> {
        if self.should_fail {
            Err(LlmError::RequestFailed(
                "Mock health check failure".to_string(),
            ))
        } else {
            Ok(())
        }
    }
}
