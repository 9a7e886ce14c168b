//! HTTP transport for the ledger's MCP surface.
//!
//! Serves the same JSON-RPC dispatcher as the stdio transport, for hosts that
//! run the ledger as a network service.
//!
//! # Endpoints
//!
//! - `GET  /health`: Liveness probe
//! - `POST /mcp`   : JSON-RPC request or batch

pub mod routes;

pub use routes::{app_router, AppState};
