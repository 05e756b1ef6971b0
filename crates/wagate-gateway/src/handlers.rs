// SPDX-FileCopyrightText: 2026 Wagate Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! HTTP request handlers for the gateway REST API.
//!
//! Wire field names (`apiKey`, `groupId`, `kode_guru`) and the
//! Indonesian response strings are the observable contract of the
//! dashboard frontend and are preserved as-is. Missing parameters are
//! validated by hand so every failure renders as `{status:false,message}`
//! with the right status code instead of an extractor rejection.

use axum::{
    Json,
    extract::{Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::{Deserialize, Serialize};

use wagate_attendance::{AttendanceOutcome, RecordOutcome};
use wagate_core::WagateError;
use wagate_whatsapp::jid;

use crate::server::GatewayState;

/// Standard response body for the messaging endpoints.
#[derive(Debug, Serialize)]
pub struct StatusResponse {
    pub status: bool,
    pub message: String,
}

/// Response body for GET /groups.
#[derive(Debug, Serialize)]
pub struct GroupListResponse {
    pub status: bool,
    pub data: Vec<wagate_core::GroupInfo>,
}

/// Response body for GET /health.
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub connected: bool,
}

/// Success body for POST /add-absen.
#[derive(Debug, Serialize)]
pub struct AbsenResponse {
    pub success: bool,
    pub tipe: String,
    pub status: String,
}

/// Error body for POST /add-absen.
#[derive(Debug, Serialize)]
pub struct AbsenError {
    pub success: bool,
    pub message: String,
}

fn ok(message: &str) -> Response {
    (
        StatusCode::OK,
        Json(StatusResponse {
            status: true,
            message: message.to_string(),
        }),
    )
        .into_response()
}

fn fail(code: StatusCode, message: String) -> Response {
    (
        code,
        Json(StatusResponse {
            status: false,
            message,
        }),
    )
        .into_response()
}

/// Map a workspace error onto the HTTP failure taxonomy.
fn error_status(err: &WagateError) -> StatusCode {
    match err {
        WagateError::Validation(_) => StatusCode::BAD_REQUEST,
        WagateError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
        WagateError::NotFound(_) => StatusCode::NOT_FOUND,
        WagateError::NoActiveSession => StatusCode::BAD_REQUEST,
        _ => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

fn error_response(err: &WagateError) -> Response {
    fail(error_status(err), err.to_string())
}

/// Per-request API key check for the send endpoints. The spec renders a
/// bad or missing key as 400 here (only /add-absen uses 401).
fn check_api_key(state: &GatewayState, provided: Option<&str>) -> Result<(), WagateError> {
    match (&state.api_key, provided) {
        (Some(expected), Some(key)) if key == expected => Ok(()),
        _ => Err(WagateError::Validation("apiKey tidak valid".into())),
    }
}

// ---- POST /send-personal ----

#[derive(Debug, Deserialize)]
pub struct SendPersonalRequest {
    #[serde(default)]
    pub number: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default, rename = "apiKey")]
    pub api_key: Option<String>,
}

/// Fire-and-forget personal text send: the response is an immediate ack,
/// delivery outcome is only logged.
pub async fn send_personal(
    State(state): State<GatewayState>,
    Json(body): Json<SendPersonalRequest>,
) -> Response {
    if let Err(e) = check_api_key(&state, body.api_key.as_deref()) {
        return error_response(&e);
    }
    let (Some(number), Some(message)) = (body.number, body.message) else {
        return fail(
            StatusCode::BAD_REQUEST,
            "Parameter number dan message wajib diisi.".into(),
        );
    };
    if number.is_empty() || message.is_empty() {
        return fail(
            StatusCode::BAD_REQUEST,
            "Parameter number dan message wajib diisi.".into(),
        );
    }

    state.dispatcher.dispatch_text(jid::ensure_personal(&number), message);
    ok("Pesan sedang dikirim.")
}

// ---- POST /send-group ----

#[derive(Debug, Deserialize)]
pub struct SendGroupRequest {
    #[serde(default, rename = "groupId")]
    pub group_id: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default, rename = "apiKey")]
    pub api_key: Option<String>,
}

/// Fire-and-forget group text send.
pub async fn send_group(
    State(state): State<GatewayState>,
    Json(body): Json<SendGroupRequest>,
) -> Response {
    if let Err(e) = check_api_key(&state, body.api_key.as_deref()) {
        return error_response(&e);
    }
    let (Some(group_id), Some(message)) = (body.group_id, body.message) else {
        return fail(
            StatusCode::BAD_REQUEST,
            "Parameter groupId dan message wajib diisi.".into(),
        );
    };
    if group_id.is_empty() || message.is_empty() {
        return fail(
            StatusCode::BAD_REQUEST,
            "Parameter groupId dan message wajib diisi.".into(),
        );
    }

    state.dispatcher.dispatch_text(jid::ensure_group(&group_id), message);
    ok("Pesan grup sedang dikirim.")
}

// ---- GET /groups ----

pub async fn list_groups(State(state): State<GatewayState>) -> Response {
    if !state.session.status().connected() {
        return fail(
            StatusCode::BAD_REQUEST,
            "Belum terkoneksi ke WhatsApp.".into(),
        );
    }
    let socket = match state.session.socket().await {
        Ok(socket) => socket,
        Err(e) => return error_response(&e),
    };
    match socket.fetch_groups().await {
        Ok(groups) => (
            StatusCode::OK,
            Json(GroupListResponse {
                status: true,
                data: groups,
            }),
        )
            .into_response(),
        Err(e) => error_response(&e),
    }
}

// ---- POST /disconnect ----

pub async fn disconnect(State(state): State<GatewayState>) -> Response {
    match state.session.clone().disconnect().await {
        Ok(()) => ok("Berhasil logout & reset koneksi."),
        Err(WagateError::NoActiveSession) => {
            fail(StatusCode::BAD_REQUEST, "Tidak ada koneksi aktif.".into())
        }
        Err(e) => fail(
            StatusCode::INTERNAL_SERVER_ERROR,
            format!("Gagal disconnect: {e}"),
        ),
    }
}

// ---- POST /send-group-image ----

#[derive(Debug, Deserialize)]
pub struct SendGroupImageRequest {
    #[serde(default, rename = "groupId")]
    pub group_id: Option<String>,
    #[serde(default, rename = "imageUrl")]
    pub image_url: Option<String>,
    #[serde(default)]
    pub caption: Option<String>,
}

/// Synchronous group image send: awaits the fetch and the send, surfacing
/// failures to the caller.
pub async fn send_group_image(
    State(state): State<GatewayState>,
    Json(body): Json<SendGroupImageRequest>,
) -> Response {
    let (Some(group_id), Some(image_url)) = (body.group_id, body.image_url) else {
        return fail(
            StatusCode::BAD_REQUEST,
            "Parameter groupId dan imageUrl wajib diisi.".into(),
        );
    };

    let to = jid::ensure_group(&group_id);
    match state
        .dispatcher
        .send_image_url(&to, &image_url, body.caption.as_deref().unwrap_or(""))
        .await
    {
        Ok(_) => ok("Gambar berhasil dikirim ke grup."),
        Err(e) => error_response(&e),
    }
}

// ---- GET /send-image ----

#[derive(Debug, Deserialize)]
pub struct SendImageQuery {
    #[serde(default)]
    pub number: Option<String>,
    #[serde(default, rename = "imageUrl")]
    pub image_url: Option<String>,
    #[serde(default)]
    pub caption: Option<String>,
}

pub async fn send_image(
    State(state): State<GatewayState>,
    Query(query): Query<SendImageQuery>,
) -> Response {
    let (Some(number), Some(image_url)) = (query.number, query.image_url) else {
        return fail(
            StatusCode::BAD_REQUEST,
            "Parameter number dan imageUrl wajib diisi.".into(),
        );
    };

    let to = jid::ensure_personal(&number);
    match state
        .dispatcher
        .send_image_url(&to, &image_url, query.caption.as_deref().unwrap_or(""))
        .await
    {
        Ok(_) => ok("Gambar berhasil dikirim."),
        Err(e) => error_response(&e),
    }
}

// ---- GET /send-url ----

#[derive(Debug, Deserialize)]
pub struct SendUrlQuery {
    #[serde(default)]
    pub number: Option<String>,
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
}

pub async fn send_url(
    State(state): State<GatewayState>,
    Query(query): Query<SendUrlQuery>,
) -> Response {
    let (Some(number), Some(url)) = (query.number, query.url) else {
        return fail(
            StatusCode::BAD_REQUEST,
            "Parameter number dan url wajib diisi.".into(),
        );
    };

    let to = jid::ensure_personal(&number);
    match state
        .dispatcher
        .send_link(&to, &url, query.message.as_deref())
        .await
    {
        Ok(_) => ok("URL berhasil dikirim dengan preview (jika tersedia)."),
        Err(e) => error_response(&e),
    }
}

// ---- GET /send-ad-message ----

#[derive(Debug, Deserialize)]
pub struct SendAdQuery {
    #[serde(default)]
    pub number: Option<String>,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub body: Option<String>,
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub image: Option<String>,
}

pub async fn send_ad_message(
    State(state): State<GatewayState>,
    Query(query): Query<SendAdQuery>,
) -> Response {
    let (Some(number), Some(title), Some(body), Some(url), Some(image)) = (
        query.number,
        query.title,
        query.body,
        query.url,
        query.image,
    ) else {
        return fail(
            StatusCode::BAD_REQUEST,
            "Parameter number, title, body, url, dan image wajib diisi.".into(),
        );
    };

    let to = jid::ensure_personal(&number);
    match state
        .dispatcher
        .send_ad(&to, &title, &body, &url, &image)
        .await
    {
        Ok(_) => ok("Pesan gambar & adReply berhasil dikirim."),
        Err(e) => error_response(&e),
    }
}

// ---- POST /add-absen ----

#[derive(Debug, Deserialize)]
pub struct AddAbsenRequest {
    #[serde(default)]
    pub kode_guru: Option<String>,
    #[serde(default, rename = "apiKey")]
    pub api_key: Option<String>,
}

fn outcome_label(outcome: RecordOutcome) -> &'static str {
    match outcome {
        RecordOutcome::Recorded => "dicatat",
        RecordOutcome::AlreadyRecorded => "sudah ada",
    }
}

pub async fn add_absen(
    State(state): State<GatewayState>,
    Json(body): Json<AddAbsenRequest>,
) -> Response {
    let result = state
        .attendance
        .record(
            body.kode_guru.as_deref().unwrap_or(""),
            body.api_key.as_deref().unwrap_or(""),
        )
        .await;

    match result {
        Ok(AttendanceOutcome::Student { presence }) => (
            StatusCode::OK,
            Json(AbsenResponse {
                success: true,
                tipe: "siswa".into(),
                status: outcome_label(presence).into(),
            }),
        )
            .into_response(),
        Ok(AttendanceOutcome::Teacher { day }) => (
            StatusCode::OK,
            Json(AbsenResponse {
                success: true,
                tipe: "guru".into(),
                status: outcome_label(day.roll_call).into(),
            }),
        )
            .into_response(),
        Err(e) => (
            error_status(&e),
            Json(AbsenError {
                success: false,
                message: e.to_string(),
            }),
        )
            .into_response(),
    }
}

// ---- GET /health ----

pub async fn get_health(State(state): State<GatewayState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        connected: state.session.status().connected(),
    })
}
