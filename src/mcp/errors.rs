//! JSON-RPC error codes and the boundary error type.
//!
//! Codes follow JSON-RPC 2.0:
//! - -32700: the message is not valid JSON
//! - -32600: the message is not a valid request object
//! - -32601: unknown method or unknown tool
//! - -32602: tool arguments failed decoding or validation
//! - -32603: an operation failed while executing

use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

use crate::ledger::LedgerError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(i32)]
pub enum McpErrorCode {
    /// Invalid JSON was received by the server.
    ParseError = -32700,
    /// The JSON sent is not a valid Request object.
    InvalidRequest = -32600,
    /// The method or tool does not exist.
    MethodNotFound = -32601,
    /// Invalid method parameter(s).
    InvalidParams = -32602,
    /// Internal JSON-RPC error.
    InternalError = -32603,
}

/// A JSON-RPC error object.
#[derive(Debug, Error, Clone, PartialEq, Serialize, Deserialize)]
#[error("[{code}] {message}")]
pub struct McpError {
    pub code: i32,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
}

impl McpError {
    pub fn new(code: McpErrorCode, message: impl Into<String>) -> Self {
        Self {
            code: code as i32,
            message: message.into(),
            data: None,
        }
    }

    pub fn parse_error(message: impl Into<String>) -> Self {
        Self::new(McpErrorCode::ParseError, message)
    }

    pub fn invalid_request(message: impl Into<String>) -> Self {
        Self::new(McpErrorCode::InvalidRequest, message)
    }

    pub fn unknown_method(method: &str) -> Self {
        Self::new(
            McpErrorCode::MethodNotFound,
            format!("Unknown method: {}", method),
        )
    }

    pub fn unknown_tool(name: &str) -> Self {
        Self::new(McpErrorCode::MethodNotFound, format!("Unknown tool: {}", name))
    }

    pub fn invalid_params(message: impl Into<String>) -> Self {
        Self::new(McpErrorCode::InvalidParams, message)
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(McpErrorCode::InternalError, message)
    }

    pub fn is(&self, code: McpErrorCode) -> bool {
        self.code == code as i32
    }
}

impl From<LedgerError> for McpError {
    fn from(err: LedgerError) -> Self {
        McpError::internal(err.to_string())
    }
}

impl From<serde_json::Error> for McpError {
    fn from(err: serde_json::Error) -> Self {
        McpError::internal(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_codes() {
        assert_eq!(McpError::unknown_tool("x").code, -32601);
        assert_eq!(McpError::invalid_params("x").code, -32602);
        assert_eq!(McpError::internal("x").code, -32603);
        assert_eq!(McpError::parse_error("x").code, -32700);
    }

    #[test]
    fn test_ledger_error_becomes_internal_with_message() {
        let err: McpError = LedgerError::ProgressOutOfRange(101.0).into();
        assert!(err.is(McpErrorCode::InternalError));
        assert!(err.message.contains("101"));
    }

    #[test]
    fn test_serialization_omits_empty_data() {
        let json = serde_json::to_value(McpError::unknown_tool("nope")).unwrap();
        assert_eq!(json["code"], -32601);
        assert_eq!(json["message"], "Unknown tool: nope");
        assert!(json.get("data").is_none());
    }
}
