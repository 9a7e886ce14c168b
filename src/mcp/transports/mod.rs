//! Transports that carry JSON-RPC messages to an [`McpServer`](super::McpServer).
//!
//! - **Stdio** (`stdio`): newline-delimited messages on stdin/stdout, for
//!   hosts that spawn the ledger as a child process.
//!
//! The HTTP transport lives in [`crate::server`] since it is an axum router.

pub mod stdio;

pub use stdio::serve_stdio;
