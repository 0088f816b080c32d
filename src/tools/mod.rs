//! Tool system for model-invocable callbacks
//!
//! Each service registers a fixed set of tools. Parameters are validated
//! against the declared JSON Schema before execution, and failures stay
//! structured until a boundary turns them into response text.

use crate::config::Config;
use async_trait::async_trait;
use serde_json::Value;
use std::collections::HashMap;
use thiserror::Error;

pub mod builtin;

/// Interface every model-invocable tool implements
#[async_trait]
pub trait Tool: Send + Sync {
    /// Returns name, description, and a JSON Schema for the parameters
    ///
    /// The description is the only signal the model has for when to invoke
    /// the tool, so it carries the full usage guidance.
    fn describe(&self) -> ToolDescription;

    /// Receives the shared configuration, called once at startup
    ///
    /// Credentials are resolved here from the environment variables the
    /// configuration names; they never appear in the configuration itself.
    async fn initialize(&mut self, config: &Config) -> Result<(), ToolError>;

    /// Receives parameters matching the schema from describe()
    ///
    /// Parameters have been validated against the schema before this is
    /// called. Failures are returned structured, never pre-rendered text.
    async fn execute(&self, parameters: &Value) -> Result<Value, ToolError>;

    /// Render a successful payload as response text
    ///
    /// Serialization boundaries (the JSON-RPC server, the agent loop) call
    /// this to turn structured payloads into the text a caller sees.
    fn render(&self, payload: &Value) -> String {
        render_payload(payload)
    }

    /// Performs cleanup (close connections, release resources)
    async fn shutdown(&mut self) -> Result<(), ToolError> {
        Ok(())
    }
}

/// Default text rendering for tool payloads
///
/// String payloads pass through unquoted; anything structured is
/// pretty-printed JSON.
pub fn render_payload(payload: &Value) -> String {
    match payload {
        Value::String(text) => text.clone(),
        other => serde_json::to_string_pretty(other).unwrap_or_else(|_| other.to_string()),
    }
}

/// Tool description surfaced to models and protocol clients
#[derive(Debug, Clone)]
pub struct ToolDescription {
    pub name: String,
    pub description: String,
    pub parameters: Value,
}

/// Registry for the tools a service exposes
pub struct ToolSet {
    tools: HashMap<String, Box<dyn Tool>>,
}

impl ToolSet {
    pub fn new() -> Self {
        Self {
            tools: HashMap::new(),
        }
    }

    /// Register a tool under the name it describes itself with
    pub fn register(&mut self, tool: Box<dyn Tool>) {
        let name = tool.describe().name;
        self.tools.insert(name, tool);
    }

    /// Initialize all registered tools with the shared configuration
    pub async fn initialize(&mut self, config: &Config) -> Result<(), ToolError> {
        for tool in self.tools.values_mut() {
            tool.initialize(config).await?;
        }
        Ok(())
    }

    /// Get tool description
    pub fn describe_tool(&self, tool_name: &str) -> Option<ToolDescription> {
        self.tools.get(tool_name).map(|tool| tool.describe())
    }

    /// Get descriptions of every registered tool, sorted by name
    ///
    /// Sorted so protocol listings and model tool declarations are stable
    /// across runs.
    pub fn describe_all(&self) -> Vec<ToolDescription> {
        let mut descriptions: Vec<ToolDescription> =
            self.tools.values().map(|tool| tool.describe()).collect();
        descriptions.sort_by(|a, b| a.name.cmp(&b.name));
        descriptions
    }

    /// Execute tool with validated parameters
    pub async fn execute_tool(
        &self,
        tool_name: &str,
        parameters: &Value,
    ) -> Result<Value, ToolError> {
        let tool = self
            .tools
            .get(tool_name)
            .ok_or_else(|| ToolError::UnknownTool(tool_name.to_string()))?;

        // Parameters MUST be validated against the schema before execution
        self.validate_parameters(tool_name, parameters)?;

        tool.execute(parameters).await
    }

    /// Validate parameters against the tool's declared schema
    fn validate_parameters(&self, tool_name: &str, parameters: &Value) -> Result<(), ToolError> {
        let tool = self
            .tools
            .get(tool_name)
            .ok_or_else(|| ToolError::UnknownTool(tool_name.to_string()))?;

        let description = tool.describe();
        let validator = jsonschema::validator_for(&description.parameters)
            .map_err(|e| ToolError::SchemaError(format!("Schema compilation error: {e}")))?;

        validator.validate(parameters).map_err(|errors| {
            let error_messages: Vec<String> = errors
                .map(|e| format!("At '{}': {}", e.instance_path, e))
                .collect();
            ToolError::ValidationError(error_messages.join("; "))
        })
    }

    /// Render a tool's successful payload as response text
    pub fn render_result(&self, tool_name: &str, payload: &Value) -> String {
        self.tools
            .get(tool_name)
            .map(|tool| tool.render(payload))
            .unwrap_or_else(|| render_payload(payload))
    }

    /// Get list of available tools
    pub fn list_tools(&self) -> Vec<String> {
        self.tools.keys().cloned().collect()
    }

    /// Shutdown all tools
    pub async fn shutdown(&mut self) -> Result<(), ToolError> {
        for tool in self.tools.values_mut() {
            tool.shutdown().await?;
        }
        Ok(())
    }
}

impl Default for ToolSet {
    fn default() -> Self {
        Self::new()
    }
}

/// Tool system errors
#[derive(Debug, Error)]
pub enum ToolError {
    #[error("Unknown tool: {0}")]
    UnknownTool(String),
    #[error("Tool initialization failed: {0}")]
    InitializationError(String),
    #[error("Parameter validation failed: {0}")]
    ValidationError(String),
    #[error("Schema error: {0}")]
    SchemaError(String),
    #[error("Tool execution failed: {0}")]
    ExecutionError(String),
}

impl ToolError {
    /// The bare message without the variant prefix
    ///
    /// Protocol responses carry this form; the prefixed [`std::fmt::Display`]
    /// form is for logs.
    pub fn message(&self) -> &str {
        match self {
            Self::UnknownTool(message)
            | Self::InitializationError(message)
            | Self::ValidationError(message)
            | Self::SchemaError(message)
            | Self::ExecutionError(message) => message,
        }
    }
}
