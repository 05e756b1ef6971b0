// SPDX-FileCopyrightText: 2026 Wagate Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Single-writer lifecycle manager for the one device session.
//!
//! The `SessionManager` is the only code in the process that replaces or
//! clears the socket handle. Consumers borrow the handle read-only via
//! [`SessionManager::socket`] and must fail fast with `NoActiveSession`
//! while it is absent (between a logout and the completion of the
//! follow-up restart).
//!
//! State transitions are broadcast on a `watch` channel; new subscribers
//! observe the current status immediately.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{RwLock, mpsc, watch};
use tracing::{debug, error, info, warn};

use wagate_config::model::WhatsappConfig;
use wagate_core::{
    ConnectionState, SessionStatus, WaEvent, WaSocket, WaTransport, WagateError,
};

use crate::qr;

/// Credential material file inside the auth directory.
const CREDS_FILE: &str = "creds.json";

/// Owns the process-wide socket handle and drives connect, reconnect,
/// and logout.
pub struct SessionManager {
    transport: Arc<dyn WaTransport>,
    auth_dir: PathBuf,
    device_name: String,
    reconnect_initial: Duration,
    reconnect_max_delay: Duration,
    reconnect_max_attempts: u32,
    socket: RwLock<Option<Arc<dyn WaSocket>>>,
    status_tx: watch::Sender<SessionStatus>,
}

impl SessionManager {
    /// Create a manager in the disconnected state. Nothing connects until
    /// [`start`](Self::start) is called.
    pub fn new(transport: Arc<dyn WaTransport>, config: &WhatsappConfig) -> Arc<Self> {
        let (status_tx, _status_rx) = watch::channel(SessionStatus::disconnected());
        Arc::new(SessionManager {
            transport,
            auth_dir: PathBuf::from(&config.auth_dir),
            device_name: config.bot_name.clone(),
            reconnect_initial: Duration::from_millis(config.reconnect_initial_ms),
            reconnect_max_delay: Duration::from_millis(config.reconnect_max_delay_ms),
            reconnect_max_attempts: config.reconnect_max_attempts,
            socket: RwLock::new(None),
            status_tx,
        })
    }

    /// Subscribe to status broadcasts. The receiver's initial value is the
    /// current status.
    pub fn subscribe(&self) -> watch::Receiver<SessionStatus> {
        self.status_tx.subscribe()
    }

    /// The current status snapshot.
    pub fn status(&self) -> SessionStatus {
        self.status_tx.borrow().clone()
    }

    /// Read-only access to the socket handle for the duration of a send.
    pub async fn socket(&self) -> Result<Arc<dyn WaSocket>, WagateError> {
        self.socket
            .read()
            .await
            .clone()
            .ok_or(WagateError::NoActiveSession)
    }

    /// Open a connection: load persisted credentials, negotiate the
    /// protocol version, connect, and spawn the event consumer.
    pub async fn start(self: Arc<Self>) -> Result<(), WagateError> {
        self.publish(ConnectionState::Connecting, None);

        let creds = self.load_creds().await;
        let version = match self.transport.latest_version().await {
            Ok(v) => v,
            Err(e) => {
                self.publish(ConnectionState::Disconnected, None);
                return Err(e);
            }
        };
        debug!(version = %version, "negotiated protocol version");

        let connection = match self
            .transport
            .connect(version, creds, &self.device_name)
            .await
        {
            Ok(c) => c,
            Err(e) => {
                self.publish(ConnectionState::Disconnected, None);
                return Err(e);
            }
        };

        let socket = connection.socket.clone();
        *self.socket.write().await = Some(socket.clone());

        let manager = Arc::clone(&self);
        tokio::spawn(async move {
            manager.run_events(socket, connection.events).await;
        });

        Ok(())
    }

    /// Log out, wipe auth storage, and restart so a fresh pairing
    /// challenge becomes available.
    ///
    /// Fails with `NoActiveSession` when no socket exists and with the
    /// upstream error when the logout call itself fails; in the latter
    /// case local state is left untouched for the caller to retry.
    pub async fn disconnect(self: Arc<Self>) -> Result<(), WagateError> {
        let socket = self
            .socket
            .read()
            .await
            .clone()
            .ok_or(WagateError::NoActiveSession)?;

        socket.logout().await?;

        *self.socket.write().await = None;
        self.wipe_auth().await?;
        self.publish(ConnectionState::Disconnected, None);
        info!("logged out, auth storage wiped");

        // Restart immediately so observers get a new QR. A restart failure
        // must not undo the logout.
        if let Err(e) = Arc::clone(&self).start().await {
            warn!(error = %e, "restart after logout failed");
        }
        Ok(())
    }

    /// Consume the event stream of one connection until it closes.
    async fn run_events(
        self: Arc<Self>,
        my_socket: Arc<dyn WaSocket>,
        mut events: mpsc::Receiver<WaEvent>,
    ) {
        while let Some(event) = events.recv().await {
            match event {
                WaEvent::CredsUpdate(data) => {
                    if let Err(e) = self.persist_creds(&data).await {
                        warn!(error = %e, "failed to persist credentials");
                    }
                }
                WaEvent::Qr(payload) => match qr::render_qr_data_url(&payload) {
                    Ok(data_url) => {
                        info!("pairing challenge received");
                        self.publish(ConnectionState::Connecting, Some(data_url));
                    }
                    Err(e) => warn!(error = %e, "failed to render pairing challenge"),
                },
                WaEvent::Open => {
                    info!("connected to WhatsApp");
                    self.publish(ConnectionState::Connected, None);
                }
                WaEvent::Close { reason } => {
                    // Only clear the handle if it is still ours; a logout
                    // path or a reconnect may already have replaced it.
                    {
                        let mut guard = self.socket.write().await;
                        match guard.as_ref() {
                            Some(current) if Arc::ptr_eq(current, &my_socket) => {
                                *guard = None;
                            }
                            _ => {
                                debug!("stale close event for a superseded socket");
                                return;
                            }
                        }
                    }
                    self.publish(ConnectionState::Disconnected, None);

                    if reason.is_logged_out() {
                        info!("connection closed: logged out, not reconnecting");
                    } else {
                        warn!(reason = ?reason, "connection lost, reconnecting");
                        Arc::clone(&self).reconnect_with_backoff().await;
                    }
                    return;
                }
            }
        }
        debug!("event stream ended without close event");
    }

    /// Supervised reconnect: exponential backoff with an attempt ceiling.
    ///
    /// Returns a boxed future rather than being an `async fn` to break the
    /// auto-trait inference cycle formed by the mutual recursion
    /// `start` → spawn `run_events` → `reconnect_with_backoff` → `start`;
    /// the erased `Send` future lets the compiler prove the spawned task is
    /// `Send`. Behaviour is identical to the equivalent `async fn`.
    fn reconnect_with_backoff(
        self: Arc<Self>,
    ) -> std::pin::Pin<Box<dyn std::future::Future<Output = ()> + Send>> {
        Box::pin(async move {
            let mut delay = self.reconnect_initial;
            for attempt in 1..=self.reconnect_max_attempts {
                tokio::time::sleep(delay).await;
                match Arc::clone(&self).start().await {
                    Ok(()) => {
                        info!(attempt, "reconnected");
                        return;
                    }
                    Err(e) => {
                        warn!(attempt, error = %e, "reconnect attempt failed");
                        delay = std::cmp::min(delay.saturating_mul(2), self.reconnect_max_delay);
                    }
                }
            }
            error!(
                attempts = self.reconnect_max_attempts,
                "giving up on reconnection, session stays disconnected"
            );
        })
    }

    fn publish(&self, state: ConnectionState, qr: Option<String>) {
        self.status_tx.send_replace(SessionStatus { state, qr });
    }

    async fn load_creds(&self) -> Option<Vec<u8>> {
        match tokio::fs::read(self.auth_dir.join(CREDS_FILE)).await {
            Ok(data) => Some(data),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => None,
            Err(e) => {
                warn!(error = %e, "failed to read auth storage, starting fresh pairing");
                None
            }
        }
    }

    async fn persist_creds(&self, data: &[u8]) -> Result<(), WagateError> {
        tokio::fs::create_dir_all(&self.auth_dir)
            .await
            .map_err(|e| WagateError::Internal(format!("failed to create auth dir: {e}")))?;
        tokio::fs::write(self.auth_dir.join(CREDS_FILE), data)
            .await
            .map_err(|e| WagateError::Internal(format!("failed to write credentials: {e}")))?;
        debug!("credentials persisted");
        Ok(())
    }

    async fn wipe_auth(&self) -> Result<(), WagateError> {
        match tokio::fs::remove_dir_all(&self.auth_dir).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(WagateError::Internal(format!(
                "failed to wipe auth storage: {e}"
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wagate_test_utils::MockTransport;

    fn test_config(dir: &std::path::Path) -> WhatsappConfig {
        WhatsappConfig {
            bot_name: "test-bot".into(),
            auth_dir: dir.join("auth").to_string_lossy().into_owned(),
            reconnect_initial_ms: 1,
            reconnect_max_delay_ms: 5,
            reconnect_max_attempts: 3,
        }
    }

    #[tokio::test]
    async fn socket_absent_before_start() {
        let dir = tempfile::tempdir().unwrap();
        let transport = MockTransport::new();
        let manager = SessionManager::new(transport, &test_config(dir.path()));

        let err = manager.socket().await.unwrap_err();
        assert!(matches!(err, WagateError::NoActiveSession));
    }

    #[tokio::test]
    async fn disconnect_without_session_fails_fast() {
        let dir = tempfile::tempdir().unwrap();
        let transport = MockTransport::new();
        let manager = SessionManager::new(transport, &test_config(dir.path()));

        let err = manager.disconnect().await.unwrap_err();
        assert!(matches!(err, WagateError::NoActiveSession));
    }

    #[tokio::test]
    async fn initial_status_is_disconnected() {
        let dir = tempfile::tempdir().unwrap();
        let transport = MockTransport::new();
        let manager = SessionManager::new(transport, &test_config(dir.path()));

        let status = manager.status();
        assert_eq!(status.state, ConnectionState::Disconnected);
        assert!(status.qr.is_none());
    }

    #[tokio::test]
    async fn start_makes_socket_available() {
        let dir = tempfile::tempdir().unwrap();
        let transport = MockTransport::new();
        let manager = SessionManager::new(transport.clone(), &test_config(dir.path()));

        Arc::clone(&manager).start().await.unwrap();
        assert!(manager.socket().await.is_ok());
        assert_eq!(manager.status().state, ConnectionState::Connecting);
    }

    #[tokio::test]
    async fn failed_start_reverts_to_disconnected() {
        let dir = tempfile::tempdir().unwrap();
        let transport = MockTransport::new();
        transport.set_fail_connect(true);
        let manager = SessionManager::new(transport, &test_config(dir.path()));

        let result = Arc::clone(&manager).start().await;
        assert!(result.is_err());
        assert_eq!(manager.status().state, ConnectionState::Disconnected);
        assert!(manager.socket().await.is_err());
    }
}
