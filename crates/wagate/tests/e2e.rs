// SPDX-FileCopyrightText: 2026 Wagate Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! End-to-end tests for the complete gateway pipeline.
//!
//! Each test assembles an isolated harness (temp SQLite, mock transport,
//! full router on an ephemeral port) and exercises the REST surface with
//! a real HTTP client. Tests are independent and order-insensitive.

use std::sync::Arc;
use std::time::Duration;

use wagate_attendance::AttendanceService;
use wagate_config::model::{StorageConfig, WhatsappConfig};
use wagate_core::{GroupInfo, WaEvent};
use wagate_gateway::{GatewayState, router};
use wagate_storage::queries::identity;
use wagate_storage::Database;
use wagate_test_utils::{MockHandle, MockTransport};
use wagate_whatsapp::{Dispatcher, SessionManager};

const API_KEY: &str = "rahasia-sekolah";

struct Harness {
    base_url: String,
    client: reqwest::Client,
    transport: Arc<MockTransport>,
    session: Arc<SessionManager>,
    db: Database,
    auth_dir: std::path::PathBuf,
    _dir: tempfile::TempDir,
}

impl Harness {
    /// Handle of the most recent mock connection.
    async fn handle(&self) -> MockHandle {
        self.transport.last_handle().await.expect("no connection yet")
    }

    fn url(&self, path: &str) -> String {
        format!("{}{path}", self.base_url)
    }
}

/// Build a harness; with `connected` the session is started and opened.
async fn spawn_harness(connected: bool) -> Harness {
    let dir = tempfile::tempdir().unwrap();

    let storage_config = StorageConfig {
        database_path: dir.path().join("e2e.db").to_string_lossy().into_owned(),
        wal_mode: true,
    };
    let db = Database::open(&storage_config).await.unwrap();

    let auth_dir = dir.path().join("auth");
    let whatsapp_config = WhatsappConfig {
        bot_name: "SekolahBot".into(),
        auth_dir: auth_dir.to_string_lossy().into_owned(),
        reconnect_initial_ms: 1,
        reconnect_max_delay_ms: 4,
        reconnect_max_attempts: 2,
    };

    let transport = MockTransport::new();
    let session = SessionManager::new(transport.clone(), &whatsapp_config);

    if connected {
        let mut status = session.subscribe();
        Arc::clone(&session).start().await.unwrap();
        let handle = transport.last_handle().await.unwrap();
        handle.emit(WaEvent::Open).await;
        tokio::time::timeout(Duration::from_secs(2), status.wait_for(|s| s.connected()))
            .await
            .unwrap()
            .unwrap();
    }

    let dispatcher = Dispatcher::new(Arc::clone(&session));
    let attendance = Arc::new(AttendanceService::new(
        db.clone(),
        dispatcher.clone(),
        API_KEY.to_string(),
        "SekolahBot".to_string(),
    ));

    let state = GatewayState {
        session: Arc::clone(&session),
        dispatcher,
        attendance,
        api_key: Some(API_KEY.to_string()),
    };

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let app = router(state);
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    Harness {
        base_url: format!("http://{addr}"),
        client: reqwest::Client::new(),
        transport,
        session,
        db,
        auth_dir,
        _dir: dir,
    }
}

async fn wait_for_sends(handle: &MockHandle, n: usize) {
    let deadline = tokio::time::Instant::now() + Duration::from_secs(2);
    while handle.socket.sent_count().await < n {
        assert!(
            tokio::time::Instant::now() < deadline,
            "timed out waiting for {n} sends"
        );
        tokio::time::sleep(Duration::from_millis(5)).await;
    }
}

// ---- Send endpoints ----

#[tokio::test]
async fn send_personal_rejects_missing_api_key() {
    let h = spawn_harness(true).await;

    let resp = h
        .client
        .post(h.url("/send-personal"))
        .json(&serde_json::json!({"number": "0812", "message": "halo"}))
        .send()
        .await
        .unwrap();

    assert_eq!(resp.status(), 400);
    let body: serde_json::Value = resp.json().await.unwrap();
    assert_eq!(body["status"], false);
}

#[tokio::test]
async fn send_personal_acks_immediately_and_delivers() {
    let h = spawn_harness(true).await;

    let resp = h
        .client
        .post(h.url("/send-personal"))
        .json(&serde_json::json!({
            "number": "081234567890",
            "message": "Halo dari e2e",
            "apiKey": API_KEY,
        }))
        .send()
        .await
        .unwrap();

    assert_eq!(resp.status(), 200);
    let body: serde_json::Value = resp.json().await.unwrap();
    assert_eq!(body["status"], true);

    let handle = h.handle().await;
    wait_for_sends(&handle, 1).await;
    let sent = handle.socket.sent().await;
    assert_eq!(sent[0].0.as_str(), "6281234567890@s.whatsapp.net");
}

#[tokio::test]
async fn send_personal_missing_params_is_400() {
    let h = spawn_harness(true).await;

    let resp = h
        .client
        .post(h.url("/send-personal"))
        .json(&serde_json::json!({"apiKey": API_KEY}))
        .send()
        .await
        .unwrap();

    assert_eq!(resp.status(), 400);
    let body: serde_json::Value = resp.json().await.unwrap();
    assert_eq!(body["status"], false);
    assert!(body["message"].as_str().unwrap().contains("wajib diisi"));
}

#[tokio::test]
async fn send_group_appends_group_suffix() {
    let h = spawn_harness(true).await;

    let resp = h
        .client
        .post(h.url("/send-group"))
        .json(&serde_json::json!({
            "groupId": "120363012345",
            "message": "Pengumuman",
            "apiKey": API_KEY,
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);

    let handle = h.handle().await;
    wait_for_sends(&handle, 1).await;
    let sent = handle.socket.sent().await;
    assert_eq!(sent[0].0.as_str(), "120363012345@g.us");
}

#[tokio::test]
async fn send_failure_is_not_surfaced_on_fire_and_forget() {
    let h = spawn_harness(true).await;
    h.handle().await.socket.set_fail_sends(true);

    let resp = h
        .client
        .post(h.url("/send-personal"))
        .json(&serde_json::json!({
            "number": "0812",
            "message": "halo",
            "apiKey": API_KEY,
        }))
        .send()
        .await
        .unwrap();

    // The ack is positive even though delivery will fail.
    assert_eq!(resp.status(), 200);
}

#[tokio::test]
async fn send_ad_message_missing_params_is_400() {
    let h = spawn_harness(true).await;

    let resp = h
        .client
        .get(h.url("/send-ad-message?number=0812&title=PPDB"))
        .send()
        .await
        .unwrap();

    assert_eq!(resp.status(), 400);
}

#[tokio::test]
async fn send_group_image_fetch_failure_is_500() {
    let h = spawn_harness(true).await;

    let server = wiremock::MockServer::start().await;
    wiremock::Mock::given(wiremock::matchers::method("GET"))
        .respond_with(wiremock::ResponseTemplate::new(404))
        .mount(&server)
        .await;

    let resp = h
        .client
        .post(h.url("/send-group-image"))
        .json(&serde_json::json!({
            "groupId": "120363012345",
            "imageUrl": format!("{}/x.jpg", server.uri()),
        }))
        .send()
        .await
        .unwrap();

    assert_eq!(resp.status(), 500);
    let body: serde_json::Value = resp.json().await.unwrap();
    assert_eq!(body["status"], false);
}

// ---- Groups ----

#[tokio::test]
async fn groups_requires_connection() {
    let h = spawn_harness(false).await;

    let resp = h.client.get(h.url("/groups")).send().await.unwrap();
    assert_eq!(resp.status(), 400);
    let body: serde_json::Value = resp.json().await.unwrap();
    assert_eq!(body["status"], false);
}

#[tokio::test]
async fn groups_lists_participating_groups() {
    let h = spawn_harness(true).await;
    h.handle()
        .await
        .socket
        .set_groups(vec![GroupInfo {
            id: "120363012345@g.us".into(),
            subject: "Kelas 7A".into(),
            participants: 32,
        }])
        .await;

    let resp = h.client.get(h.url("/groups")).send().await.unwrap();
    assert_eq!(resp.status(), 200);
    let body: serde_json::Value = resp.json().await.unwrap();
    assert_eq!(body["status"], true);
    assert_eq!(body["data"][0]["subject"], "Kelas 7A");
}

// ---- Disconnect ----

#[tokio::test]
async fn disconnect_resets_session_and_wipes_auth() {
    let h = spawn_harness(true).await;
    let handle = h.handle().await;
    handle.emit(WaEvent::CredsUpdate(b"creds".to_vec())).await;

    let deadline = tokio::time::Instant::now() + Duration::from_secs(2);
    while !h.auth_dir.exists() {
        assert!(tokio::time::Instant::now() < deadline, "creds never persisted");
        tokio::time::sleep(Duration::from_millis(5)).await;
    }

    let resp = h.client.post(h.url("/disconnect")).send().await.unwrap();
    assert_eq!(resp.status(), 200);
    let body: serde_json::Value = resp.json().await.unwrap();
    assert_eq!(body["status"], true);

    assert!(!h.auth_dir.exists(), "auth storage must be wiped");
    assert_eq!(
        h.transport.connect_count().await,
        2,
        "a fresh connection must follow logout"
    );
}

#[tokio::test]
async fn disconnect_without_session_is_400() {
    let h = spawn_harness(false).await;

    let resp = h.client.post(h.url("/disconnect")).send().await.unwrap();
    assert_eq!(resp.status(), 400);
    let body: serde_json::Value = resp.json().await.unwrap();
    assert_eq!(body["status"], false);
}

// ---- Attendance ----

#[tokio::test]
async fn add_absen_rejects_bad_api_key() {
    let h = spawn_harness(true).await;

    let resp = h
        .client
        .post(h.url("/add-absen"))
        .json(&serde_json::json!({"kode_guru": "GR-01", "apiKey": "salah"}))
        .send()
        .await
        .unwrap();

    assert_eq!(resp.status(), 401);
    let body: serde_json::Value = resp.json().await.unwrap();
    assert_eq!(body["success"], false);
}

#[tokio::test]
async fn add_absen_unknown_code_is_404() {
    let h = spawn_harness(true).await;

    let resp = h
        .client
        .post(h.url("/add-absen"))
        .json(&serde_json::json!({"kode_guru": "ZZ-999", "apiKey": API_KEY}))
        .send()
        .await
        .unwrap();

    assert_eq!(resp.status(), 404);
    let body: serde_json::Value = resp.json().await.unwrap();
    assert_eq!(body["success"], false);
}

#[tokio::test]
async fn add_absen_missing_code_is_400() {
    let h = spawn_harness(true).await;

    let resp = h
        .client
        .post(h.url("/add-absen"))
        .json(&serde_json::json!({"apiKey": API_KEY}))
        .send()
        .await
        .unwrap();

    assert_eq!(resp.status(), 400);
}

#[tokio::test]
async fn teacher_check_in_twice_notifies_once() {
    let h = spawn_harness(true).await;
    identity::create_teacher(&h.db, "GR-77", "Bu Sari", "081234567890")
        .await
        .unwrap();

    // First check-in: roll call recorded, one welcome dispatched.
    let resp = h
        .client
        .post(h.url("/add-absen"))
        .json(&serde_json::json!({"kode_guru": "GR-77", "apiKey": API_KEY}))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);
    let body: serde_json::Value = resp.json().await.unwrap();
    assert_eq!(body["success"], true);
    assert_eq!(body["tipe"], "guru");
    assert_eq!(body["status"], "dicatat");

    let handle = h.handle().await;
    wait_for_sends(&handle, 1).await;

    // Second check-in the same day: no new row, no new notification.
    let resp = h
        .client
        .post(h.url("/add-absen"))
        .json(&serde_json::json!({"kode_guru": "GR-77", "apiKey": API_KEY}))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);
    let body: serde_json::Value = resp.json().await.unwrap();
    assert_eq!(body["status"], "sudah ada");

    tokio::time::sleep(Duration::from_millis(50)).await;
    assert_eq!(handle.socket.sent_count().await, 1);
}

#[tokio::test]
async fn student_check_in_roundtrip() {
    let h = spawn_harness(true).await;
    identity::create_student(&h.db, "SW-42", "Andi").await.unwrap();

    let resp = h
        .client
        .post(h.url("/add-absen"))
        .json(&serde_json::json!({"kode_guru": "SW-42", "apiKey": API_KEY}))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);
    let body: serde_json::Value = resp.json().await.unwrap();
    assert_eq!(body["tipe"], "siswa");
    assert_eq!(body["status"], "dicatat");

    let resp = h
        .client
        .post(h.url("/add-absen"))
        .json(&serde_json::json!({"kode_guru": "SW-42", "apiKey": API_KEY}))
        .send()
        .await
        .unwrap();
    let body: serde_json::Value = resp.json().await.unwrap();
    assert_eq!(body["status"], "sudah ada");
}

// ---- Health ----

#[tokio::test]
async fn health_reports_connection_state() {
    let h = spawn_harness(true).await;

    let resp = h.client.get(h.url("/health")).send().await.unwrap();
    assert_eq!(resp.status(), 200);
    let body: serde_json::Value = resp.json().await.unwrap();
    assert_eq!(body["status"], "ok");
    assert_eq!(body["connected"], true);

    // The session field is shared with the server state.
    assert!(h.session.status().connected());
}
