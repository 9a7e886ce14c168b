//! # AppIQ Memory
//!
//! An in-process coordination ledger for a team of cooperating agents working
//! on one project. Agents log activities, delegations, task progress and
//! feature snapshots; the ledger keeps bounded history, derives each agent's
//! status, and answers status and context queries.
//!
//! - [`ledger`]: the stores, the [`Ledger`] orchestrator and read-side queries
//! - [`mcp`]: the MCP tool surface (JSON-RPC dispatch and stdio transport)
//! - [`report`]: text rendering of query results
//! - [`server`]: HTTP transport
//! - [`config`]: environment-driven configuration

pub mod config;
pub mod ledger;
pub mod mcp;
pub mod report;
pub mod server;

pub use config::{LedgerConfig, ServerConfig};
pub use ledger::{Ledger, LedgerError};
pub use mcp::{McpError, McpServer};

/// Crate version, reported in `initialize` and `/health`.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
