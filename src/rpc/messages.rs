//! Wire types for the newline-delimited JSON-RPC tool protocol
//!
//! Frames follow JSON-RPC 2.0. Tool results use the Model Context Protocol
//! result shape: a list of typed content blocks, where success and failure
//! differ only in the text, never in structure.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// JSON-RPC protocol version carried on every frame
pub const JSONRPC_VERSION: &str = "2.0";

/// Protocol revision reported to clients during initialization
pub const PROTOCOL_VERSION: &str = "2024-11-05";

/// Frame could not be parsed as JSON
pub const PARSE_ERROR: i64 = -32700;
/// Requested method is not exposed by this server
pub const METHOD_NOT_FOUND: i64 = -32601;
/// Request parameters are missing or malformed
pub const INVALID_PARAMS: i64 = -32602;
/// Server-side failure unrelated to the request contents
pub const INTERNAL_ERROR: i64 = -32603;

/// A single incoming request or notification frame
///
/// # Examples
/// ```
/// use concierge::rpc::RpcRequest;
///
/// let frame = r#"{"jsonrpc":"2.0","id":1,"method":"tools/list"}"#;
/// let request: RpcRequest = serde_json::from_str(frame).unwrap();
/// assert_eq!(request.method, "tools/list");
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RpcRequest {
    pub jsonrpc: String,
    /// Absent for notifications, which get no response
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<Value>,
    pub method: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub params: Option<Value>,
}

/// A response frame carrying either a result or an error, never both
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RpcResponse {
    pub jsonrpc: String,
    pub id: Value,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<RpcError>,
}

impl RpcResponse {
    pub fn success(id: Value, result: Value) -> Self {
        Self {
            jsonrpc: JSONRPC_VERSION.to_string(),
            id,
            result: Some(result),
            error: None,
        }
    }

    pub fn error(id: Value, code: i64, message: impl Into<String>) -> Self {
        Self {
            jsonrpc: JSONRPC_VERSION.to_string(),
            id,
            result: None,
            error: Some(RpcError {
                code,
                message: message.into(),
            }),
        }
    }
}

/// JSON-RPC error object
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RpcError {
    pub code: i64,
    pub message: String,
}

/// Result payload for the initialize handshake
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InitializeResult {
    pub protocol_version: String,
    pub capabilities: ServerCapabilities,
    pub server_info: ServerInfo,
}

/// Capabilities advertised during initialization
///
/// The `tools` object is empty today; its presence tells clients the server
/// answers `tools/list` and `tools/call`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerCapabilities {
    pub tools: Value,
}

/// Server identity reported to clients
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ServerInfo {
    pub name: String,
    pub version: String,
}

/// One entry in a tools/list result
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ToolListing {
    pub name: String,
    pub description: String,
    pub input_schema: Value,
}

/// Result payload for tools/list
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolListResult {
    pub tools: Vec<ToolListing>,
}

/// A text block inside a tool call result
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ContentBlock {
    #[serde(rename = "type")]
    pub content_type: String,
    pub text: String,
}

impl ContentBlock {
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            content_type: "text".to_string(),
            text: text.into(),
        }
    }
}

/// Result payload for tools/call
///
/// Callers distinguish success from failure by the text prefix alone; there
/// is no status field.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolCallResult {
    pub content: Vec<ContentBlock>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_request_without_id_is_notification() {
        let request: RpcRequest =
            serde_json::from_str(r#"{"jsonrpc":"2.0","method":"notifications/initialized"}"#)
                .unwrap();

        assert!(request.id.is_none());
        assert_eq!(request.method, "notifications/initialized");
    }

    #[test]
    fn test_request_with_params() {
        let request: RpcRequest = serde_json::from_str(
            r#"{"jsonrpc":"2.0","id":7,"method":"tools/call","params":{"name":"convert_currency"}}"#,
        )
        .unwrap();

        assert_eq!(request.id, Some(json!(7)));
        assert_eq!(request.params.unwrap()["name"], "convert_currency");
    }

    #[test]
    fn test_success_response_omits_error_key() {
        let response = RpcResponse::success(json!(1), json!({"ok": true}));
        let encoded = serde_json::to_string(&response).unwrap();

        assert!(encoded.contains("\"result\""));
        assert!(!encoded.contains("\"error\""));
    }

    #[test]
    fn test_error_response_omits_result_key() {
        let response = RpcResponse::error(json!(2), METHOD_NOT_FOUND, "Method not found: ping");
        let encoded = serde_json::to_string(&response).unwrap();

        assert!(encoded.contains("-32601"));
        assert!(!encoded.contains("\"result\""));
    }

    #[test]
    fn test_initialize_result_uses_camel_case() {
        let result = InitializeResult {
            protocol_version: PROTOCOL_VERSION.to_string(),
            capabilities: ServerCapabilities { tools: json!({}) },
            server_info: ServerInfo {
                name: "Currency Converter MCP Server".to_string(),
                version: "1.0.0".to_string(),
            },
        };

        let encoded = serde_json::to_value(&result).unwrap();
        assert_eq!(encoded["protocolVersion"], "2024-11-05");
        assert_eq!(encoded["serverInfo"]["name"], "Currency Converter MCP Server");
        assert_eq!(encoded["capabilities"]["tools"], json!({}));
    }

    #[test]
    fn test_tool_listing_uses_input_schema_key() {
        let listing = ToolListing {
            name: "convert_currency".to_string(),
            description: "Convert amount from one currency to another currency".to_string(),
            input_schema: json!({"type": "object"}),
        };

        let encoded = serde_json::to_value(&listing).unwrap();
        assert!(encoded.get("inputSchema").is_some());
        assert!(encoded.get("input_schema").is_none());
    }

    #[test]
    fn test_content_block_tagged_as_text() {
        let block = ContentBlock::text("✔ Converted 100 USD → 8300.00 INR");
        let encoded = serde_json::to_value(&block).unwrap();

        assert_eq!(encoded["type"], "text");
        assert!(encoded["text"].as_str().unwrap().starts_with('✔'));
    }

    #[test]
    fn test_tool_call_result_has_no_status_field() {
        let result = ToolCallResult {
            content: vec![ContentBlock::text("✖ Error occurred: Invalid target currency: xyz")],
        };

        let encoded = serde_json::to_value(&result).unwrap();
        assert!(encoded.get("isError").is_none());
        assert_eq!(encoded["content"][0]["type"], "text");
    }
}
