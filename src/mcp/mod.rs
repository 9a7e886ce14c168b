//! Model Context Protocol (MCP) surface of the ledger.
//!
//! This is the RPC boundary: it maps tool names to ledger operations,
//! decodes and validates arguments against the tool schemas, renders results
//! through [`crate::report`], and reports failures as JSON-RPC errors.

pub mod errors;
pub mod server;
pub mod tools;
pub mod transports;
pub mod types;

// Re-export main types.
pub use errors::{McpError, McpErrorCode};
pub use server::McpServer;
pub use tools::{tool_catalogue, ToolName};
pub use types::{CallToolResult, JsonRpcReply, JsonRpcRequest, JsonRpcResponse, Tool};
