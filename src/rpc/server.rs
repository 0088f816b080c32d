//! JSON-RPC server loop over a byte transport
//!
//! Reads one frame per line, writes one response per request. Tool execution
//! failures stay inside well-formed tool results; protocol-level errors are
//! reserved for frames the server cannot honor at all.

use crate::error::{sanitize_error_message, ConciergeError, ConciergeResult};
use crate::rpc::messages::{
    ContentBlock, InitializeResult, RpcRequest, RpcResponse, ServerCapabilities, ServerInfo,
    ToolCallResult, ToolListResult, ToolListing, INTERNAL_ERROR, INVALID_PARAMS, METHOD_NOT_FOUND,
    PARSE_ERROR, PROTOCOL_VERSION,
};
use crate::tools::{ToolError, ToolSet};
use serde::Serialize;
use serde_json::{json, Value};
use tokio::io::{AsyncBufReadExt, AsyncRead, AsyncWrite, AsyncWriteExt, BufReader};
use tracing::{debug, warn};

/// Serves a fixed tool set over newline-delimited JSON-RPC
pub struct RpcServer {
    tools: ToolSet,
    server_info: ServerInfo,
}

impl RpcServer {
    pub fn new(name: impl Into<String>, version: impl Into<String>, tools: ToolSet) -> Self {
        Self {
            tools,
            server_info: ServerInfo {
                name: name.into(),
                version: version.into(),
            },
        }
    }

    /// Serve requests until the reader reaches end of input
    ///
    /// One request is handled at a time; the transport owns any queueing of
    /// concurrent writers.
    pub async fn serve<R, W>(&self, reader: R, mut writer: W) -> ConciergeResult<()>
    where
        R: AsyncRead + Unpin,
        W: AsyncWrite + Unpin,
    {
        let mut lines = BufReader::new(reader).lines();

        while let Some(line) = lines.next_line().await? {
            if line.trim().is_empty() {
                continue;
            }

            let Some(response) = self.handle_line(&line).await else {
                continue;
            };

            let frame = serde_json::to_string(&response).map_err(|e| {
                ConciergeError::internal_error(format!("Failed to encode response: {e}"))
            })?;
            writer.write_all(frame.as_bytes()).await?;
            writer.write_all(b"\n").await?;
            writer.flush().await?;
        }

        debug!("Transport closed, server loop ending");
        Ok(())
    }

    /// Release tool resources once the transport has closed
    pub async fn shutdown(&mut self) -> ConciergeResult<()> {
        self.tools.shutdown().await?;
        Ok(())
    }

    /// Turn one frame into at most one response
    ///
    /// Notifications (frames without an id) produce no response.
    async fn handle_line(&self, line: &str) -> Option<RpcResponse> {
        let request: RpcRequest = match serde_json::from_str(line) {
            Ok(request) => request,
            Err(e) => {
                warn!(error = %e, "Discarding unparseable frame");
                return Some(RpcResponse::error(
                    Value::Null,
                    PARSE_ERROR,
                    format!("Parse error: {e}"),
                ));
            }
        };

        let Some(id) = request.id.clone() else {
            debug!(method = %request.method, "Ignoring notification");
            return None;
        };

        Some(self.dispatch(id, &request).await)
    }

    async fn dispatch(&self, id: Value, request: &RpcRequest) -> RpcResponse {
        debug!(method = %request.method, "Handling request");

        match request.method.as_str() {
            "initialize" => self.handle_initialize(id),
            "tools/list" => self.handle_tools_list(id),
            "tools/call" => self.handle_tools_call(id, request.params.as_ref()).await,
            method => {
                RpcResponse::error(id, METHOD_NOT_FOUND, format!("Method not found: {method}"))
            }
        }
    }

    fn handle_initialize(&self, id: Value) -> RpcResponse {
        let result = InitializeResult {
            protocol_version: PROTOCOL_VERSION.to_string(),
            capabilities: ServerCapabilities { tools: json!({}) },
            server_info: self.server_info.clone(),
        };

        Self::success(id, &result)
    }

    fn handle_tools_list(&self, id: Value) -> RpcResponse {
        let tools = self
            .tools
            .describe_all()
            .into_iter()
            .map(|description| ToolListing {
                name: description.name,
                description: description.description,
                input_schema: description.parameters,
            })
            .collect();

        Self::success(id, &ToolListResult { tools })
    }

    async fn handle_tools_call(&self, id: Value, params: Option<&Value>) -> RpcResponse {
        let Some(params) = params else {
            return RpcResponse::error(id, INVALID_PARAMS, "Missing params");
        };
        let Some(name) = params.get("name").and_then(|v| v.as_str()) else {
            return RpcResponse::error(id, INVALID_PARAMS, "Missing tool name");
        };
        let arguments = params
            .get("arguments")
            .cloned()
            .unwrap_or_else(|| json!({}));

        match self.tools.execute_tool(name, &arguments).await {
            Ok(payload) => {
                let text = self.tools.render_result(name, &payload);
                Self::success(
                    id,
                    &ToolCallResult {
                        content: vec![ContentBlock::text(text)],
                    },
                )
            }
            Err(ToolError::UnknownTool(tool_name)) => RpcResponse::error(
                id,
                INVALID_PARAMS,
                format!("Tool {tool_name} not found"),
            ),
            Err(ToolError::ValidationError(message)) => RpcResponse::error(
                id,
                INVALID_PARAMS,
                format!("Invalid arguments: {message}"),
            ),
            Err(ToolError::SchemaError(message)) => {
                RpcResponse::error(id, INTERNAL_ERROR, message)
            }
            Err(error) => {
                // Execution failures are still well-formed results; the
                // caller tells them apart by the text prefix alone.
                warn!(tool = %name, error = %error, "Tool call failed");
                let text = format!(
                    "✖ Error occurred: {}",
                    sanitize_error_message(error.message())
                );
                Self::success(
                    id,
                    &ToolCallResult {
                        content: vec![ContentBlock::text(text)],
                    },
                )
            }
        }
    }

    fn success<T: Serialize>(id: Value, result: &T) -> RpcResponse {
        match serde_json::to_value(result) {
            Ok(value) => RpcResponse::success(id, value),
            Err(e) => RpcResponse::error(
                id,
                INTERNAL_ERROR,
                format!("Failed to encode result: {e}"),
            ),
        }
    }
}
