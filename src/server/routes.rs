//! Axum route handlers for the HTTP transport.
//!
//! # Routes
//!
//! - `GET  /health`: Returns `{"status": "ok", "version": ..., "projectId": ...}`
//! - `POST /mcp`   : One JSON-RPC message (or batch); `202 Accepted` with no
//!   body for notifications

use std::sync::Arc;

use axum::{
    body::Bytes,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::ledger::Ledger;
use crate::mcp::McpServer;

/// Shared application state for the HTTP server.
#[derive(Clone)]
pub struct AppState {
    pub mcp: Arc<McpServer>,
}

impl AppState {
    pub fn new(ledger: Arc<Ledger>) -> Self {
        Self {
            mcp: Arc::new(McpServer::new(ledger)),
        }
    }
}

/// Build the axum router with all routes.
pub fn app_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health_handler))
        .route("/mcp", post(mcp_handler))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// GET /health: liveness probe.
async fn health_handler(State(state): State<AppState>) -> impl IntoResponse {
    Json(serde_json::json!({
        "status": "ok",
        "version": crate::VERSION,
        "service": "appiq-memory",
        "projectId": state.mcp.ledger().project_id(),
    }))
}

/// POST /mcp: JSON-RPC over HTTP.
///
/// JSON-RPC failures are carried in the response body with status 200, as
/// the protocol expects; only notifications change the status code.
async fn mcp_handler(State(state): State<AppState>, body: Bytes) -> Response {
    match state.mcp.handle_json(&body) {
        Some(reply) => Json(reply).into_response(),
        None => StatusCode::ACCEPTED.into_response(),
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::LedgerConfig;
    use axum::body::Body;
    use axum::http::Request;
    use serde_json::Value;
    use tower::ServiceExt;

    fn state() -> AppState {
        AppState::new(Arc::new(Ledger::new(LedgerConfig::new("shop"))))
    }

    fn post_mcp(body: &str) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri("/mcp")
            .header("Content-Type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    async fn json_body(response: Response) -> Value {
        let body = axum::body::to_bytes(response.into_body(), 1 << 20)
            .await
            .unwrap();
        serde_json::from_slice(&body).unwrap()
    }

    #[tokio::test]
    async fn test_health_endpoint() {
        let app = app_router(state());

        let request = Request::builder()
            .uri("/health")
            .body(Body::empty())
            .unwrap();

        let response = app.oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let json = json_body(response).await;
        assert_eq!(json["status"], "ok");
        assert_eq!(json["version"], crate::VERSION);
        assert_eq!(json["projectId"], "shop");
    }

    #[tokio::test]
    async fn test_tool_call_writes_to_shared_ledger() {
        let state = state();
        let app = app_router(state.clone());

        let response = app
            .oneshot(post_mcp(
                r#"{"jsonrpc":"2.0","id":1,"method":"tools/call","params":{"name":"log_task_delegation","arguments":{"toAgent":"test-agent","taskType":"testing","taskDescription":"widget tests","priority":"high"}}}"#,
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let json = json_body(response).await;
        assert_eq!(json["result"]["structuredContent"]["status"], "delegated");
        assert_eq!(json["result"]["structuredContent"]["priority"], "high");

        assert_eq!(state.mcp.ledger().snapshot().events.delegation_count(), 1);
    }

    #[tokio::test]
    async fn test_unknown_tool_over_http() {
        let app = app_router(state());
        let response = app
            .oneshot(post_mcp(
                r#"{"jsonrpc":"2.0","id":1,"method":"tools/call","params":{"name":"format_disk"}}"#,
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let json = json_body(response).await;
        assert_eq!(json["error"]["code"], -32601);
    }

    #[tokio::test]
    async fn test_notification_is_accepted_without_body() {
        let app = app_router(state());
        let response = app
            .oneshot(post_mcp(r#"{"jsonrpc":"2.0","method":"notifications/initialized"}"#))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::ACCEPTED);
    }
}
