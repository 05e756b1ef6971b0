// SPDX-FileCopyrightText: 2026 Wagate Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! WebSocket push channel for connection-state and QR events.
//!
//! Server -> Client (JSON):
//! ```json
//! {"type": "connection-status", "data": true}
//! {"type": "qr", "data": "data:image/svg+xml;base64,..."}
//! {"type": "qr", "data": null}
//! ```
//!
//! The channel is one-way: observers only listen. A new subscriber
//! immediately receives the current connection status, plus the pending
//! QR when there is one.

use axum::{
    extract::{
        State,
        ws::{Message, WebSocket, WebSocketUpgrade},
    },
    response::Response,
};
use futures::{SinkExt, StreamExt, stream::SplitSink};
use tracing::debug;

use wagate_core::SessionStatus;

use crate::server::GatewayState;

/// WebSocket message type constants for server -> client events.
pub mod event_types {
    /// Rendered pairing challenge (data URL) or null once cleared.
    pub const QR: &str = "qr";
    /// Boolean connection state.
    pub const CONNECTION_STATUS: &str = "connection-status";
}

/// WebSocket upgrade handler.
pub async fn ws_handler(ws: WebSocketUpgrade, State(state): State<GatewayState>) -> Response {
    ws.on_upgrade(|socket| handle_socket(socket, state))
}

/// Forward status broadcasts to one observer until it hangs up.
async fn handle_socket(socket: WebSocket, state: GatewayState) {
    let (mut sender, mut receiver) = socket.split();
    let mut status_rx = state.session.subscribe();

    debug!("dashboard observer connected");

    // New observers get the current state before any transition happens.
    let current = status_rx.borrow_and_update().clone();
    if send_current(&mut sender, &current, true).await.is_err() {
        return;
    }

    loop {
        tokio::select! {
            changed = status_rx.changed() => {
                if changed.is_err() {
                    break; // session manager dropped
                }
                let status = status_rx.borrow_and_update().clone();
                if send_current(&mut sender, &status, false).await.is_err() {
                    break;
                }
            }
            incoming = receiver.next() => {
                match incoming {
                    Some(Ok(Message::Close(_))) | Some(Err(_)) | None => break,
                    // The push channel is one-way; ignore everything else.
                    Some(Ok(_)) => {}
                }
            }
        }
    }

    debug!("dashboard observer disconnected");
}

/// Push the status as wire events. On the initial send the QR event is
/// only emitted when a challenge is pending; on transitions it is always
/// emitted so a cleared challenge removes the image from the dashboard.
async fn send_current(
    sender: &mut SplitSink<WebSocket, Message>,
    status: &SessionStatus,
    initial: bool,
) -> Result<(), axum::Error> {
    if !initial || status.qr.is_some() {
        let qr_event = serde_json::json!({
            "type": event_types::QR,
            "data": status.qr,
        });
        sender.send(Message::Text(qr_event.to_string().into())).await?;
    }

    let status_event = serde_json::json!({
        "type": event_types::CONNECTION_STATUS,
        "data": status.connected(),
    });
    sender
        .send(Message::Text(status_event.to_string().into()))
        .await
}
