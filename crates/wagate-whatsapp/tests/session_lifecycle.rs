// SPDX-FileCopyrightText: 2026 Wagate Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! End-to-end session lifecycle tests against the mock transport.
//!
//! Each test owns an isolated auth directory and transport; events are
//! injected through the mock connection handle and observed via the
//! status watch channel.

use std::sync::Arc;
use std::time::Duration;

use wagate_config::model::WhatsappConfig;
use wagate_core::{CloseReason, ConnectionState, SessionStatus, WaEvent, WagateError};
use wagate_test_utils::MockTransport;
use wagate_whatsapp::SessionManager;

fn test_config(dir: &std::path::Path) -> WhatsappConfig {
    WhatsappConfig {
        bot_name: "test-bot".into(),
        auth_dir: dir.join("auth").to_string_lossy().into_owned(),
        reconnect_initial_ms: 1,
        reconnect_max_delay_ms: 4,
        reconnect_max_attempts: 3,
    }
}

async fn wait_for_status(
    rx: &mut tokio::sync::watch::Receiver<SessionStatus>,
    predicate: impl FnMut(&SessionStatus) -> bool,
) -> SessionStatus {
    tokio::time::timeout(Duration::from_secs(2), rx.wait_for(predicate))
        .await
        .expect("timed out waiting for status")
        .expect("status channel closed")
        .clone()
}

async fn wait_until(mut condition: impl AsyncFnMut() -> bool) {
    let deadline = tokio::time::Instant::now() + Duration::from_secs(2);
    loop {
        if condition().await {
            return;
        }
        assert!(
            tokio::time::Instant::now() < deadline,
            "timed out waiting for condition"
        );
        tokio::time::sleep(Duration::from_millis(5)).await;
    }
}

#[tokio::test]
async fn qr_event_publishes_challenge_and_not_connected() {
    let dir = tempfile::tempdir().unwrap();
    let transport = MockTransport::new();
    let manager = SessionManager::new(transport.clone(), &test_config(dir.path()));
    let mut rx = manager.subscribe();

    Arc::clone(&manager).start().await.unwrap();
    let handle = transport.last_handle().await.unwrap();
    handle.emit(WaEvent::Qr("2@pairing-payload".into())).await;

    let status = wait_for_status(&mut rx, |s| s.qr.is_some()).await;
    assert!(!status.connected());
    assert!(status.qr.unwrap().starts_with("data:image/svg+xml;base64,"));
}

#[tokio::test]
async fn open_event_publishes_connected_and_clears_qr() {
    let dir = tempfile::tempdir().unwrap();
    let transport = MockTransport::new();
    let manager = SessionManager::new(transport.clone(), &test_config(dir.path()));
    let mut rx = manager.subscribe();

    Arc::clone(&manager).start().await.unwrap();
    let handle = transport.last_handle().await.unwrap();
    handle.emit(WaEvent::Qr("2@pairing-payload".into())).await;
    wait_for_status(&mut rx, |s| s.qr.is_some()).await;

    handle.emit(WaEvent::Open).await;
    let status = wait_for_status(&mut rx, |s| s.connected()).await;
    assert_eq!(status.state, ConnectionState::Connected);
    assert!(status.qr.is_none(), "QR must be cleared on open");
}

#[tokio::test]
async fn new_subscriber_receives_current_status_immediately() {
    let dir = tempfile::tempdir().unwrap();
    let transport = MockTransport::new();
    let manager = SessionManager::new(transport.clone(), &test_config(dir.path()));

    Arc::clone(&manager).start().await.unwrap();
    let handle = transport.last_handle().await.unwrap();
    handle.emit(WaEvent::Open).await;

    let mut early = manager.subscribe();
    wait_for_status(&mut early, |s| s.connected()).await;

    // A subscriber joining now must see "connected" without any new event.
    let late = manager.subscribe();
    assert!(late.borrow().connected());
}

#[tokio::test]
async fn lost_connection_reconnects_automatically() {
    let dir = tempfile::tempdir().unwrap();
    let transport = MockTransport::new();
    let manager = SessionManager::new(transport.clone(), &test_config(dir.path()));
    let mut rx = manager.subscribe();

    Arc::clone(&manager).start().await.unwrap();
    let handle = transport.last_handle().await.unwrap();
    handle.emit(WaEvent::Open).await;
    wait_for_status(&mut rx, |s| s.connected()).await;

    handle
        .emit(WaEvent::Close {
            reason: CloseReason::Lost("stream errored".into()),
        })
        .await;

    let transport_poll = transport.clone();
    wait_until(async || transport_poll.connect_count().await == 2).await;

    // The replacement connection opens and the session is usable again.
    let new_handle = transport.last_handle().await.unwrap();
    new_handle.emit(WaEvent::Open).await;
    wait_for_status(&mut rx, |s| s.connected()).await;
    assert!(manager.socket().await.is_ok());
}

#[tokio::test]
async fn logged_out_close_does_not_reconnect() {
    let dir = tempfile::tempdir().unwrap();
    let transport = MockTransport::new();
    let manager = SessionManager::new(transport.clone(), &test_config(dir.path()));
    let mut rx = manager.subscribe();

    Arc::clone(&manager).start().await.unwrap();
    let handle = transport.last_handle().await.unwrap();
    handle.emit(WaEvent::Open).await;
    wait_for_status(&mut rx, |s| s.connected()).await;

    handle
        .emit(WaEvent::Close {
            reason: CloseReason::LoggedOut,
        })
        .await;
    wait_for_status(&mut rx, |s| !s.connected()).await;

    // Give any (incorrect) reconnect a chance to happen, then check it didn't.
    tokio::time::sleep(Duration::from_millis(50)).await;
    assert_eq!(transport.connect_count().await, 1);
    assert!(manager.socket().await.is_err());
}

#[tokio::test]
async fn reconnect_gives_up_after_max_attempts() {
    let dir = tempfile::tempdir().unwrap();
    let transport = MockTransport::new();
    let manager = SessionManager::new(transport.clone(), &test_config(dir.path()));
    let mut rx = manager.subscribe();

    Arc::clone(&manager).start().await.unwrap();
    let handle = transport.last_handle().await.unwrap();
    handle.emit(WaEvent::Open).await;
    wait_for_status(&mut rx, |s| s.connected()).await;

    // Every further connect fails; the supervisor must stop at the ceiling.
    transport.set_fail_connect(true);
    handle
        .emit(WaEvent::Close {
            reason: CloseReason::Lost("gone".into()),
        })
        .await;

    tokio::time::sleep(Duration::from_millis(100)).await;
    assert_eq!(transport.connect_count().await, 1);
    assert_eq!(manager.status().state, ConnectionState::Disconnected);
}

#[tokio::test]
async fn creds_update_persists_and_feeds_next_connect() {
    let dir = tempfile::tempdir().unwrap();
    let config = test_config(dir.path());
    let transport = MockTransport::new();
    let manager = SessionManager::new(transport.clone(), &config);
    let mut rx = manager.subscribe();

    Arc::clone(&manager).start().await.unwrap();
    let handle = transport.last_handle().await.unwrap();
    handle.emit(WaEvent::CredsUpdate(b"device-creds".to_vec())).await;
    handle.emit(WaEvent::Open).await;
    wait_for_status(&mut rx, |s| s.connected()).await;

    let creds_path = std::path::Path::new(&config.auth_dir).join("creds.json");
    wait_until(async || creds_path.exists()).await;

    // Drop the connection; the reconnect must load the persisted creds.
    handle
        .emit(WaEvent::Close {
            reason: CloseReason::Lost("restart".into()),
        })
        .await;
    let transport_poll = transport.clone();
    wait_until(async || transport_poll.connect_count().await == 2).await;

    let history = transport.creds_history().await;
    assert!(history[0].is_none(), "first connect starts without creds");
    assert_eq!(
        history[1].as_deref(),
        Some(b"device-creds".as_ref()),
        "reconnect must reuse persisted creds"
    );
}

#[tokio::test]
async fn disconnect_wipes_auth_and_restarts_for_fresh_pairing() {
    let dir = tempfile::tempdir().unwrap();
    let config = test_config(dir.path());
    let transport = MockTransport::new();
    let manager = SessionManager::new(transport.clone(), &config);
    let mut rx = manager.subscribe();

    Arc::clone(&manager).start().await.unwrap();
    let handle = transport.last_handle().await.unwrap();
    handle.emit(WaEvent::CredsUpdate(b"device-creds".to_vec())).await;
    handle.emit(WaEvent::Open).await;
    wait_for_status(&mut rx, |s| s.connected()).await;

    let auth_dir = std::path::Path::new(&config.auth_dir).to_path_buf();
    wait_until(async || auth_dir.exists()).await;

    Arc::clone(&manager).disconnect().await.unwrap();

    assert!(!auth_dir.exists(), "auth storage must be wiped on logout");
    assert_eq!(transport.connect_count().await, 2, "restart must follow logout");
    let history = transport.creds_history().await;
    assert!(
        history[1].is_none(),
        "restart after logout must begin a fresh pairing"
    );
}

#[tokio::test]
async fn disconnect_clears_state_even_when_restart_fails() {
    let dir = tempfile::tempdir().unwrap();
    let config = test_config(dir.path());
    let transport = MockTransport::new();
    let manager = SessionManager::new(transport.clone(), &config);
    let mut rx = manager.subscribe();

    Arc::clone(&manager).start().await.unwrap();
    let handle = transport.last_handle().await.unwrap();
    handle.emit(WaEvent::CredsUpdate(b"device-creds".to_vec())).await;
    handle.emit(WaEvent::Open).await;
    wait_for_status(&mut rx, |s| s.connected()).await;
    let auth_dir = std::path::Path::new(&config.auth_dir).to_path_buf();
    wait_until(async || auth_dir.exists()).await;

    // Logout succeeds but the follow-up restart cannot connect.
    transport.set_fail_connect(true);
    Arc::clone(&manager).disconnect().await.unwrap();

    assert!(manager.socket().await.is_err());
    assert!(!auth_dir.exists());
    assert_eq!(manager.status().state, ConnectionState::Disconnected);
}

#[tokio::test]
async fn failed_logout_leaves_state_untouched() {
    let dir = tempfile::tempdir().unwrap();
    let config = test_config(dir.path());
    let transport = MockTransport::new();
    let manager = SessionManager::new(transport.clone(), &config);
    let mut rx = manager.subscribe();

    Arc::clone(&manager).start().await.unwrap();
    let handle = transport.last_handle().await.unwrap();
    handle.emit(WaEvent::CredsUpdate(b"device-creds".to_vec())).await;
    handle.emit(WaEvent::Open).await;
    wait_for_status(&mut rx, |s| s.connected()).await;
    let auth_dir = std::path::Path::new(&config.auth_dir).to_path_buf();
    wait_until(async || auth_dir.exists()).await;

    handle.socket.set_fail_logout(true);
    let err = Arc::clone(&manager).disconnect().await.unwrap_err();
    assert!(matches!(err, WagateError::Channel { .. }));

    // The caller can retry: socket still present, auth intact, no restart.
    assert!(manager.socket().await.is_ok());
    assert!(auth_dir.exists());
    assert_eq!(transport.connect_count().await, 1);
    assert!(manager.status().connected());
}
