// SPDX-FileCopyrightText: 2026 Wagate Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Gateway HTTP server built on axum.
//!
//! Sets up routes, middleware, and shared state. The API key is checked
//! per request against the request body/query (the dashboard frontend
//! sends it as a field, not a header), so there is no auth middleware.

use std::sync::Arc;

use axum::{
    Router,
    routing::{get, post},
};
use tower_http::cors::CorsLayer;

use wagate_attendance::AttendanceService;
use wagate_core::WagateError;
use wagate_whatsapp::{Dispatcher, SessionManager};

use crate::handlers;
use crate::ws;

/// Shared state for axum request handlers.
#[derive(Clone)]
pub struct GatewayState {
    /// Single-writer session lifecycle manager.
    pub session: Arc<SessionManager>,
    /// Message dispatcher over the session's socket.
    pub dispatcher: Dispatcher,
    /// Attendance recorder service.
    pub attendance: Arc<AttendanceService>,
    /// Shared API secret for send endpoints (None rejects all).
    pub api_key: Option<String>,
}

/// Gateway server configuration (mirrors GatewayConfig from wagate-config).
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Host address to bind.
    pub host: String,
    /// Port to bind.
    pub port: u16,
}

/// Build the gateway router. Exposed separately so tests can serve it on
/// an ephemeral listener.
pub fn router(state: GatewayState) -> Router {
    Router::new()
        .route("/send-personal", post(handlers::send_personal))
        .route("/send-group", post(handlers::send_group))
        .route("/groups", get(handlers::list_groups))
        .route("/disconnect", post(handlers::disconnect))
        .route("/send-group-image", post(handlers::send_group_image))
        .route("/send-image", get(handlers::send_image))
        .route("/send-url", get(handlers::send_url))
        .route("/send-ad-message", get(handlers::send_ad_message))
        .route("/add-absen", post(handlers::add_absen))
        .route("/health", get(handlers::get_health))
        .route("/ws", get(ws::ws_handler))
        .with_state(state)
        .layer(CorsLayer::permissive())
}

/// Start the gateway HTTP/WebSocket server and serve until the task is
/// aborted.
pub async fn start_server(config: &ServerConfig, state: GatewayState) -> Result<(), WagateError> {
    let app = router(state);

    let addr = format!("{}:{}", config.host, config.port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .map_err(|e| WagateError::Channel {
            message: format!("failed to bind gateway to {addr}: {e}"),
            source: Some(Box::new(e)),
        })?;

    tracing::info!("gateway listening on {addr}");

    axum::serve(listener, app)
        .await
        .map_err(|e| WagateError::Channel {
            message: format!("gateway server error: {e}"),
            source: Some(Box::new(e)),
        })?;

    Ok(())
}
