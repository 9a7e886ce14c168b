//! appiq-memory server binary.
//!
//! Runs the coordination ledger behind its MCP tool surface, over stdio (the
//! default, for agent hosts that spawn the process) or HTTP.
//!
//! # Environment Variables
//!
//! - `APPIQ_TRANSPORT`: `stdio` (default) or `http`
//! - `PORT`: HTTP port (default: 8080)
//! - `CLAUDE_PROJECT_DIR`: project directory; its last segment is the project id
//! - `RUST_LOG`: Tracing filter (default: "info,appiq_memory=debug")
//!
//! # Usage
//!
//! ```bash
//! cargo run --bin server
//! # or over HTTP:
//! APPIQ_TRANSPORT=http PORT=8080 cargo run --bin server
//! ```

use std::sync::Arc;

use anyhow::Context;
use appiq_memory::config::{ServerConfig, TransportKind};
use appiq_memory::ledger::Ledger;
use appiq_memory::mcp::{transports::stdio, McpServer};
use appiq_memory::server::{app_router, AppState};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Logs go to stderr: stdout is the protocol channel under stdio.
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,appiq_memory=debug".into()),
        )
        .with_writer(std::io::stderr)
        .init();

    let config = ServerConfig::from_env().context("invalid server configuration")?;
    let ledger = Arc::new(Ledger::new(config.ledger.clone()));

    tracing::info!(
        project_id = %ledger.project_id(),
        transport = ?config.transport,
        version = appiq_memory::VERSION,
        "appiq-memory starting"
    );

    match config.transport {
        TransportKind::Stdio => {
            let server = McpServer::new(ledger);
            stdio::serve_stdio(&server)
                .await
                .context("stdio transport failed")?;
        }
        TransportKind::Http => {
            let app = app_router(AppState::new(ledger));
            let listener = tokio::net::TcpListener::bind(config.bind_addr)
                .await
                .with_context(|| format!("failed to bind {}", config.bind_addr))?;

            tracing::info!("listening on {}", config.bind_addr);
            tracing::info!("  GET  /health — liveness probe");
            tracing::info!("  POST /mcp    — JSON-RPC tool calls");

            axum::serve(listener, app)
                .with_graceful_shutdown(shutdown_signal())
                .await
                .context("HTTP server failed")?;
        }
    }

    tracing::info!("appiq-memory stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    tracing::info!("shutdown signal received");
}
