//! Gemini provider implementation
//!
//! This module provides Google Gemini API integration for the LLM provider
//! system. Requests go to the REST `generateContent` endpoint; the API key
//! travels as the `key` query parameter, so any error text that can embed a
//! request URL is sanitized before it leaves this module.

use crate::error::sanitize_error_message;
use crate::llm::provider::{
    CompletionRequest, CompletionResponse, FinishReason, LlmError, LlmProvider, Message,
    MessageRole, TokenUsage, ToolCall as ProviderToolCall,
};
use crate::tools::ToolDescription;
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, error, warn};
use uuid::Uuid;

/// Gemini provider configuration
#[derive(Debug, Clone)]
pub struct GeminiConfig {
    pub api_key: String,
    pub base_url: String,
    /// No timeout by default: a hung completion call waits indefinitely,
    /// matching the behavior of the services this provider backs.
    pub timeout: Option<Duration>,
}

impl Default for GeminiConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            base_url: "https://generativelanguage.googleapis.com/v1beta".to_string(),
            timeout: None,
        }
    }
}

impl GeminiConfig {
    /// Build provider settings from the shared configuration
    ///
    /// The API key is resolved from the environment variable the
    /// configuration names, never from the file itself.
    pub fn from_config(config: &crate::config::Config) -> Result<Self, crate::config::ConfigError> {
        let mut settings = Self {
            api_key: config.get_gemini_api_key()?,
            ..Default::default()
        };

        if let Some(base_url) = &config.llm.base_url {
            settings.base_url = base_url.trim_end_matches('/').to_string();
        }
        settings.timeout = config.llm.timeout_secs.map(Duration::from_secs);

        Ok(settings)
    }
}

/// Gemini provider implementation
pub struct GeminiProvider {
    config: GeminiConfig,
    client: Client,
}

impl GeminiProvider {
    /// Create a new Gemini provider
    pub fn new(config: GeminiConfig) -> Result<Self, LlmError> {
        if config.api_key.is_empty() {
            return Err(LlmError::NotConfigured(
                "Gemini API key is required".to_string(),
            ));
        }

        let mut builder = Client::builder();
        if let Some(timeout) = config.timeout {
            builder = builder.timeout(timeout);
        }
        let client = builder
            .build()
            .map_err(|e| LlmError::NetworkError(e.to_string()))?;

        Ok(Self { config, client })
    }

    /// Normalize a model identifier to its REST resource path (pure function)
    fn model_path(model: &str) -> String {
        if model.starts_with("models/") {
            model.to_string()
        } else {
            format!("models/{model}")
        }
    }

    /// Estimate token count for request contents (pure function)
    fn estimate_token_count(contents: &[GeminiContent]) -> usize {
        contents
            .iter()
            .flat_map(|c| c.parts.iter())
            .map(|p| p.text.as_ref().map(|t| t.len()).unwrap_or(0) / 4)
            .sum()
    }

    /// Split conversation messages into contents and system instruction (pure function)
    ///
    /// Gemini carries the system prompt out of band: system messages become
    /// the `systemInstruction` block, user messages map to role `user` and
    /// assistant messages to role `model`.
    fn convert_messages(messages: &[Message]) -> (Vec<GeminiContent>, Option<GeminiContent>) {
        let mut contents = Vec::new();
        let mut system_parts: Vec<String> = Vec::new();

        for message in messages {
            match message.role {
                MessageRole::System => system_parts.push(message.content.clone()),
                MessageRole::User => contents.push(Self::text_content("user", &message.content)),
                MessageRole::Assistant => {
                    contents.push(Self::text_content("model", &message.content))
                }
            }
        }

        let system_instruction = if system_parts.is_empty() {
            None
        } else {
            Some(GeminiContent {
                role: None,
                parts: vec![GeminiPart {
                    text: Some(system_parts.join("\n\n")),
                    function_call: None,
                }],
            })
        };

        (contents, system_instruction)
    }

    /// Build a single-part text content entry (pure function)
    fn text_content(role: &str, text: &str) -> GeminiContent {
        GeminiContent {
            role: Some(role.to_string()),
            parts: vec![GeminiPart {
                text: Some(text.to_string()),
                function_call: None,
            }],
        }
    }

    /// Convert completion request to Gemini format (pure function)
    fn convert_to_gemini_request(
        request: &CompletionRequest,
        contents: Vec<GeminiContent>,
        system_instruction: Option<GeminiContent>,
        tools: Option<Vec<GeminiToolDeclarations>>,
    ) -> GeminiGenerateRequest {
        let generation_config = if request.temperature.is_some() || request.max_tokens.is_some() {
            Some(GeminiGenerationConfig {
                temperature: request.temperature,
                max_output_tokens: request.max_tokens,
            })
        } else {
            None
        };

        GeminiGenerateRequest {
            contents,
            system_instruction,
            generation_config,
            tools,
        }
    }

    /// Parse Gemini completion response (pure function)
    fn parse_completion_response(
        gemini_response: GeminiGenerateResponse,
        request_model: &str,
    ) -> Result<CompletionResponse, LlmError> {
        if gemini_response.candidates.is_empty() {
            return Err(LlmError::ApiError(
                "No candidates returned from Gemini".to_string(),
            ));
        }

        let candidate = &gemini_response.candidates[0];
        let usage = gemini_response
            .usage_metadata
            .map(|u| TokenUsage {
                prompt_tokens: u.prompt_token_count,
                completion_tokens: u.candidates_token_count,
                total_tokens: u.total_token_count,
            })
            .unwrap_or_default();

        let parts: &[GeminiPart] = candidate
            .content
            .as_ref()
            .map(|c| c.parts.as_slice())
            .unwrap_or_default();

        let text = parts
            .iter()
            .filter_map(|p| p.text.as_deref())
            .collect::<Vec<_>>()
            .join("");
        let content = if text.is_empty() { None } else { Some(text) };

        let calls = Self::extract_tool_calls(parts);
        let tool_calls = if calls.is_empty() { None } else { Some(calls) };

        let finish_reason = Self::convert_finish_reason_pure(candidate.finish_reason.clone());

        Ok(CompletionResponse {
            content,
            model: gemini_response
                .model_version
                .unwrap_or_else(|| request_model.to_string()),
            usage,
            finish_reason,
            tool_calls,
        })
    }

    /// Extract tool calls from response parts (pure function)
    ///
    /// Gemini does not assign call identifiers, so one is synthesized per
    /// call to keep downstream bookkeeping uniform.
    fn extract_tool_calls(parts: &[GeminiPart]) -> Vec<ProviderToolCall> {
        parts
            .iter()
            .filter_map(|part| {
                part.function_call.as_ref().map(|call| ProviderToolCall {
                    id: format!("call_{}", Uuid::new_v4()),
                    name: call.name.clone(),
                    arguments: call.args.clone(),
                })
            })
            .collect()
    }

    /// Convert Gemini finish reason to internal format (pure function)
    fn convert_finish_reason_pure(reason: Option<String>) -> FinishReason {
        match reason.as_deref() {
            Some("STOP") => FinishReason::Stop,
            Some("MAX_TOKENS") => FinishReason::Length,
            Some("SAFETY") => FinishReason::ContentFilter,
            _ => FinishReason::Error,
        }
    }

    /// Convert tool description to Gemini function declaration
    fn convert_tool(tool_desc: &ToolDescription) -> GeminiFunctionDeclaration {
        GeminiFunctionDeclaration {
            name: tool_desc.name.clone(),
            description: tool_desc.description.clone(),
            parameters: tool_desc.parameters.clone(),
        }
    }
}

#[async_trait]
impl LlmProvider for GeminiProvider {
    fn name(&self) -> &str {
        "gemini"
    }

    fn available_models(&self) -> Vec<String> {
        vec![
            "models/gemini-2.5-flash".to_string(),
            "models/gemini-2.5-pro".to_string(),
            "models/gemini-2.0-flash".to_string(),
        ]
    }

    async fn complete(&self, request: CompletionRequest) -> Result<CompletionResponse, LlmError> {
        let (contents, system_instruction) = Self::convert_messages(&request.messages);

        let tools = request.tools.as_ref().map(|tool_descriptions| {
            vec![GeminiToolDeclarations {
                function_declarations: tool_descriptions.iter().map(Self::convert_tool).collect(),
            }]
        });

        let estimated_tokens = Self::estimate_token_count(&contents);
        self.log_request_info(&contents, estimated_tokens);

        let gemini_request =
            Self::convert_to_gemini_request(&request, contents, system_instruction, tools);

        let gemini_response = self
            .make_api_request(&request.model, &gemini_request)
            .await?;
        let response = Self::parse_completion_response(gemini_response, &request.model)?;
        self.log_response_info(&response);
        Ok(response)
    }

    async fn health_check(&self) -> Result<(), LlmError> {
        let response = self
            .client
            .get(format!("{}/models", self.config.base_url))
            .query(&[("key", self.config.api_key.as_str())])
            .send()
            .await
            .map_err(|e| LlmError::NetworkError(sanitize_error_message(&e.to_string())))?;

        if response.status().is_success() {
            Ok(())
        } else {
            Err(LlmError::AuthenticationFailed(
                "Gemini API authentication failed".to_string(),
            ))
        }
    }
}

impl GeminiProvider {
    /// Log request information (impure)
    fn log_request_info(&self, contents: &[GeminiContent], estimated_tokens: usize) {
        debug!(
            "Gemini request: {} contents, estimated ~{} tokens",
            contents.len(),
            estimated_tokens
        );

        if estimated_tokens > 500_000 {
            warn!(
                "Large request detected: estimated {} tokens, may exceed model limits",
                estimated_tokens
            );
        }
    }

    /// Make single API request (impure I/O)
    async fn make_api_request(
        &self,
        model: &str,
        gemini_request: &GeminiGenerateRequest,
    ) -> Result<GeminiGenerateResponse, LlmError> {
        let url = format!(
            "{}/{}:generateContent",
            self.config.base_url,
            Self::model_path(model)
        );

        let response = self
            .client
            .post(url)
            .query(&[("key", self.config.api_key.as_str())])
            .header("Content-Type", "application/json")
            .json(gemini_request)
            .send()
            .await
            .map_err(|e| {
                let error_msg = sanitize_error_message(&format!(
                    "HTTP request failed: {} (is_connect: {}, is_timeout: {}, is_request: {})",
                    e,
                    e.is_connect(),
                    e.is_timeout(),
                    e.is_request()
                ));
                warn!("Gemini network error details: {}", error_msg);
                LlmError::NetworkError(error_msg)
            })?;

        let status = response.status();

        if status.is_server_error() {
            let error_text = response.text().await.unwrap_or_default();
            let error_msg = format!("Gemini API server error: {status} - {error_text}");
            warn!("Gemini server error: {}", error_msg);
            return Err(LlmError::ApiError(error_msg));
        }

        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            error!(
                "Gemini API client error - Status: {}, Response: {}",
                status, error_text
            );

            return Err(match status.as_u16() {
                401 | 403 => LlmError::AuthenticationFailed(format!(
                    "Gemini API error: {status} - {error_text}"
                )),
                404 => LlmError::ModelNotFound(format!("Gemini API error: {status} - {error_text}")),
                429 => LlmError::RateLimitExceeded(format!(
                    "Gemini API error: {status} - {error_text}"
                )),
                _ => LlmError::ApiError(format!("Gemini API error: {status} - {error_text}")),
            });
        }

        response
            .json()
            .await
            .map_err(|e| LlmError::RequestFailed(e.to_string()))
    }

    /// Log response information (impure)
    fn log_response_info(&self, response: &CompletionResponse) {
        debug!(
            "Gemini response: {} tokens used (prompt: {}, completion: {}), finish_reason: {:?}, tool_calls: {}",
            response.usage.total_tokens,
            response.usage.prompt_tokens,
            response.usage.completion_tokens,
            response.finish_reason,
            response.tool_calls.as_ref().map(|tc| tc.len()).unwrap_or(0)
        );
    }
}

#[derive(Debug, Serialize)]
struct GeminiGenerateRequest {
    contents: Vec<GeminiContent>,
    #[serde(rename = "systemInstruction", skip_serializing_if = "Option::is_none")]
    system_instruction: Option<GeminiContent>,
    #[serde(rename = "generationConfig", skip_serializing_if = "Option::is_none")]
    generation_config: Option<GeminiGenerationConfig>,
    #[serde(skip_serializing_if = "Option::is_none")]
    tools: Option<Vec<GeminiToolDeclarations>>,
}

#[derive(Debug, Serialize, Deserialize)]
struct GeminiContent {
    #[serde(skip_serializing_if = "Option::is_none")]
    role: Option<String>,
    #[serde(default)]
    parts: Vec<GeminiPart>,
}

#[derive(Debug, Serialize, Deserialize)]
struct GeminiPart {
    #[serde(skip_serializing_if = "Option::is_none")]
    text: Option<String>,
    #[serde(rename = "functionCall", skip_serializing_if = "Option::is_none")]
    function_call: Option<GeminiFunctionCall>,
}

#[derive(Debug, Serialize, Deserialize)]
struct GeminiFunctionCall {
    name: String,
    #[serde(default)]
    args: serde_json::Value,
}

#[derive(Debug, Serialize)]
struct GeminiGenerationConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
    #[serde(rename = "maxOutputTokens", skip_serializing_if = "Option::is_none")]
    max_output_tokens: Option<u32>,
}

#[derive(Debug, Serialize)]
struct GeminiToolDeclarations {
    #[serde(rename = "functionDeclarations")]
    function_declarations: Vec<GeminiFunctionDeclaration>,
}

#[derive(Debug, Serialize)]
struct GeminiFunctionDeclaration {
    name: String,
    description: String,
    parameters: serde_json::Value,
}

#[derive(Debug, Deserialize)]
struct GeminiGenerateResponse {
    #[serde(default)]
    candidates: Vec<GeminiCandidate>,
    #[serde(rename = "usageMetadata")]
    usage_metadata: Option<GeminiUsageMetadata>,
    #[serde(rename = "modelVersion")]
    model_version: Option<String>,
}

#[derive(Debug, Deserialize)]
struct GeminiCandidate {
    content: Option<GeminiContent>,
    #[serde(rename = "finishReason")]
    finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
struct GeminiUsageMetadata {
    #[serde(rename = "promptTokenCount", default)]
    prompt_token_count: u32,
    #[serde(rename = "candidatesTokenCount", default)]
    candidates_token_count: u32,
    #[serde(rename = "totalTokenCount", default)]
    total_token_count: u32,
}
