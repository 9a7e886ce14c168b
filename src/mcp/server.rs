//! JSON-RPC dispatch for the ledger's MCP surface.
//!
//! [`McpServer`] turns one inbound message into at most one reply. It is
//! transport-agnostic; the stdio loop and the HTTP route both feed it raw
//! bytes.

use std::sync::Arc;

use serde_json::{json, Value};

use super::errors::McpError;
use super::tools::{
    decode_args, tool_catalogue, FullContextArgs, LogActivityArgs, LogDelegationArgs,
    MemoryStatusArgs, ToolName, TrackProgressArgs, UpdateFeatureArgs,
};
use super::types::{
    CallToolParams, CallToolResult, InitializeResult, JsonRpcReply, JsonRpcRequest,
    JsonRpcResponse, ListToolsResult, ResourcesCapability, ServerCapabilities, ServerInfo,
    ToolsCapability, JSONRPC_VERSION, MCP_PROTOCOL_VERSION, SERVER_NAME,
};
use crate::ledger::Ledger;
use crate::report;

/// Routes JSON-RPC requests to ledger operations.
#[derive(Debug, Clone)]
pub struct McpServer {
    ledger: Arc<Ledger>,
}

impl McpServer {
    pub fn new(ledger: Arc<Ledger>) -> Self {
        Self { ledger }
    }

    pub fn ledger(&self) -> &Arc<Ledger> {
        &self.ledger
    }

    /// Handle one raw message: a single request or a batch.
    ///
    /// Returns `None` when nothing should be written back (notifications).
    pub fn handle_json(&self, raw: &[u8]) -> Option<JsonRpcReply> {
        let message: Value = match serde_json::from_slice(raw) {
            Ok(message) => message,
            Err(e) => {
                tracing::warn!(error = %e, "unparseable JSON-RPC message");
                return Some(JsonRpcReply::Single(JsonRpcResponse::failure(
                    Value::Null,
                    McpError::parse_error(e.to_string()),
                )));
            }
        };

        match message {
            Value::Array(items) if items.is_empty() => Some(JsonRpcReply::Single(
                JsonRpcResponse::failure(Value::Null, McpError::invalid_request("empty batch")),
            )),
            Value::Array(items) => {
                let replies: Vec<_> = items
                    .into_iter()
                    .filter_map(|item| self.handle_value(item))
                    .collect();
                (!replies.is_empty()).then_some(JsonRpcReply::Batch(replies))
            }
            single => self.handle_value(single).map(JsonRpcReply::Single),
        }
    }

    fn handle_value(&self, message: Value) -> Option<JsonRpcResponse> {
        let id = message.get("id").cloned().unwrap_or(Value::Null);
        match serde_json::from_value::<JsonRpcRequest>(message) {
            Ok(request) => self.handle(request),
            Err(e) => Some(JsonRpcResponse::failure(
                id,
                McpError::invalid_request(e.to_string()),
            )),
        }
    }

    /// Handle a decoded request.
    pub fn handle(&self, request: JsonRpcRequest) -> Option<JsonRpcResponse> {
        if let Some(version) = request.jsonrpc.as_deref() {
            if version != JSONRPC_VERSION {
                return Some(JsonRpcResponse::failure(
                    request.id.unwrap_or(Value::Null),
                    McpError::invalid_request(format!("unsupported jsonrpc version '{}'", version)),
                ));
            }
        }

        let Some(id) = request.id else {
            tracing::debug!(method = %request.method, "notification received");
            return None;
        };

        let response = match self.dispatch(&request.method, request.params) {
            Ok(result) => JsonRpcResponse::success(id, result),
            Err(error) => {
                tracing::warn!(
                    method = %request.method,
                    code = error.code,
                    message = %error.message,
                    "request failed"
                );
                JsonRpcResponse::failure(id, error)
            }
        };
        Some(response)
    }

    fn dispatch(&self, method: &str, params: Value) -> Result<Value, McpError> {
        match method {
            "initialize" => Ok(serde_json::to_value(self.initialize())?),
            "ping" => Ok(json!({})),
            "tools/list" => Ok(serde_json::to_value(ListToolsResult {
                tools: tool_catalogue(),
            })?),
            "tools/call" => {
                let params: CallToolParams = serde_json::from_value(params)
                    .map_err(|e| McpError::invalid_params(e.to_string()))?;
                let result = self.call_tool(&params.name, params.arguments)?;
                Ok(serde_json::to_value(result)?)
            }
            "resources/list" => Ok(json!({ "resources": [] })),
            other => Err(McpError::unknown_method(other)),
        }
    }

    pub fn initialize(&self) -> InitializeResult {
        tracing::info!(project_id = %self.ledger.project_id(), "MCP session initialized");
        InitializeResult {
            protocol_version: MCP_PROTOCOL_VERSION.to_string(),
            capabilities: ServerCapabilities {
                tools: ToolsCapability { list_changed: false },
                resources: ResourcesCapability::default(),
            },
            server_info: ServerInfo {
                name: SERVER_NAME.to_string(),
                version: crate::VERSION.to_string(),
            },
        }
    }

    /// Run one tool against the ledger.
    ///
    /// Unknown names fail with method-not-found, bad arguments with
    /// invalid-params, and ledger failures with internal-error.
    pub fn call_tool(&self, name: &str, arguments: Value) -> Result<CallToolResult, McpError> {
        let tool: ToolName = name.parse()?;
        tracing::debug!(tool = %tool, "tool call");

        let result = match tool {
            ToolName::LogAgentActivity => {
                let args: LogActivityArgs = decode_args(tool, arguments)?;
                let activity = self.ledger.log_agent_activity(args.into());
                CallToolResult::new(report::activity_logged(&activity), serde_json::to_value(&activity)?)
            }
            ToolName::LogTaskDelegation => {
                let args: LogDelegationArgs = decode_args(tool, arguments)?;
                args.validate()?;
                let delegation = self.ledger.log_task_delegation(args.into());
                CallToolResult::new(
                    report::delegation_logged(&delegation),
                    serde_json::to_value(&delegation)?,
                )
            }
            ToolName::TrackTaskProgress => {
                let args: TrackProgressArgs = decode_args(tool, arguments)?;
                args.validate()?;
                let task = self.ledger.track_task_progress(args.into())?;
                CallToolResult::new(report::progress_tracked(&task), serde_json::to_value(&task)?)
            }
            ToolName::UpdateFeatureProgress => {
                let args: UpdateFeatureArgs = decode_args(tool, arguments)?;
                let update = self.ledger.update_feature_progress(args.into());
                CallToolResult::new(report::feature_updated(&update), serde_json::to_value(&update)?)
            }
            ToolName::GetMemoryStatus => {
                let args: MemoryStatusArgs = decode_args(tool, arguments)?;
                args.validate()?;
                let status = self.ledger.memory_status(&args.into());
                CallToolResult::new(report::memory_status(&status), serde_json::to_value(&status)?)
            }
            ToolName::GetFullContext => {
                let args: FullContextArgs = decode_args(tool, arguments)?;
                let context = self.ledger.full_context(&args.into());
                CallToolResult::new(report::project_context(&context), serde_json::to_value(&context)?)
            }
        };
        Ok(result)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
