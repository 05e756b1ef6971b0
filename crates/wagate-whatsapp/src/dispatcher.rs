// SPDX-FileCopyrightText: 2026 Wagate Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Message dispatch on top of the session manager.
//!
//! Two delivery modes:
//! - fire-and-forget ([`Dispatcher::dispatch_text`]): the caller gets an
//!   immediate ack; the outcome is logged only, at-most-once, no retry.
//! - synchronous (`send_*`): the caller awaits completion and receives
//!   upstream errors.
//!
//! Every completed dispatch is also reported to an optional observer
//! channel so tests can assert outcomes deterministically.

use std::sync::Arc;

use tokio::sync::mpsc;
use tracing::{error, info};

use wagate_core::{Address, MessageId, OutboundPayload, WagateError};

use crate::session::SessionManager;

/// Outcome of one dispatch, for the diagnostics observer.
#[derive(Debug, Clone)]
pub struct DispatchReport {
    pub to: Address,
    pub kind: &'static str,
    pub outcome: Result<MessageId, String>,
}

/// Sends messages through the session manager's socket handle.
#[derive(Clone)]
pub struct Dispatcher {
    session: Arc<SessionManager>,
    http: reqwest::Client,
    observer: Option<mpsc::UnboundedSender<DispatchReport>>,
}

impl Dispatcher {
    pub fn new(session: Arc<SessionManager>) -> Self {
        Dispatcher {
            session,
            http: reqwest::Client::new(),
            observer: None,
        }
    }

    /// Attach a diagnostics observer receiving a report per dispatch.
    pub fn with_observer(mut self, observer: mpsc::UnboundedSender<DispatchReport>) -> Self {
        self.observer = Some(observer);
        self
    }

    /// Fire-and-forget text send. Returns immediately; failures are
    /// logged, never surfaced, and never retried.
    pub fn dispatch_text(&self, to: Address, body: String) {
        let session = Arc::clone(&self.session);
        let observer = self.observer.clone();
        tokio::spawn(async move {
            let result = match session.socket().await {
                Ok(socket) => socket.send(&to, OutboundPayload::Text { body }).await,
                Err(e) => Err(e),
            };
            match &result {
                Ok(id) => info!(to = %to, message_id = %id.0, "message sent"),
                Err(e) => error!(to = %to, error = %e, "message send failed"),
            }
            report(&observer, &to, "text", &result);
        });
    }

    /// Synchronous text send.
    pub async fn send_text(&self, to: &Address, body: &str) -> Result<MessageId, WagateError> {
        let result = async {
            self.session
                .socket()
                .await?
                .send(
                    to,
                    OutboundPayload::Text {
                        body: body.to_string(),
                    },
                )
                .await
        }
        .await;
        report(&self.observer, to, "text", &result);
        result
    }

    /// Fetch an image from a URL and send it with a caption.
    pub async fn send_image_url(
        &self,
        to: &Address,
        image_url: &str,
        caption: &str,
    ) -> Result<MessageId, WagateError> {
        let result = async {
            let data = self.fetch_image(image_url).await?;
            self.session
                .socket()
                .await?
                .send(
                    to,
                    OutboundPayload::Image {
                        data,
                        caption: caption.to_string(),
                    },
                )
                .await
        }
        .await;
        report(&self.observer, to, "image", &result);
        result
    }

    /// Send a URL with optional lead-in text; the client renders the
    /// preview from the link itself.
    pub async fn send_link(
        &self,
        to: &Address,
        url: &str,
        message: Option<&str>,
    ) -> Result<MessageId, WagateError> {
        let body = match message {
            Some(text) if !text.is_empty() => format!("{text}\n\n{url}"),
            _ => url.to_string(),
        };
        let result = async {
            self.session
                .socket()
                .await?
                .send(to, OutboundPayload::Text { body })
                .await
        }
        .await;
        report(&self.observer, to, "link", &result);
        result
    }

    /// Composite ad-style send: an image with a clickable caption first,
    /// then a text message carrying the external ad-reply card.
    pub async fn send_ad(
        &self,
        to: &Address,
        title: &str,
        body: &str,
        url: &str,
        image_url: &str,
    ) -> Result<MessageId, WagateError> {
        let result = async {
            let data = self.fetch_image(image_url).await?;
            let socket = self.session.socket().await?;

            socket
                .send(
                    to,
                    OutboundPayload::Image {
                        data: data.clone(),
                        caption: format!("{body}\n\n👉 {url}"),
                    },
                )
                .await?;

            socket
                .send(
                    to,
                    OutboundPayload::AdReply {
                        body: body.to_string(),
                        title: title.to_string(),
                        source_url: url.to_string(),
                        thumbnail: data,
                    },
                )
                .await
        }
        .await;
        report(&self.observer, to, "ad", &result);
        result
    }

    /// Fixed-template roll-call welcome for a teacher.
    ///
    /// Fire-and-forget: attendance recording must not block on delivery.
    pub fn dispatch_welcome(&self, phone: &str, name: &str, bot_name: &str) {
        let to = crate::jid::ensure_personal(phone);
        let body = format!(
            "Halo {name}, absensi piket Anda hari ini sudah dicatat. Selamat bertugas!\n\n({bot_name})"
        );
        self.dispatch_text(to, body);
    }

    async fn fetch_image(&self, url: &str) -> Result<Vec<u8>, WagateError> {
        let response = self
            .http
            .get(url)
            .send()
            .await
            .map_err(|e| WagateError::Channel {
                message: format!("failed to fetch image from {url}: {e}"),
                source: Some(Box::new(e)),
            })?
            .error_for_status()
            .map_err(|e| WagateError::Channel {
                message: format!("image fetch returned error status: {e}"),
                source: Some(Box::new(e)),
            })?;
        let bytes = response.bytes().await.map_err(|e| WagateError::Channel {
            message: format!("failed to read image body: {e}"),
            source: Some(Box::new(e)),
        })?;
        Ok(bytes.to_vec())
    }
}

fn report(
    observer: &Option<mpsc::UnboundedSender<DispatchReport>>,
    to: &Address,
    kind: &'static str,
    result: &Result<MessageId, WagateError>,
) {
    if let Some(tx) = observer {
        let outcome = match result {
            Ok(id) => Ok(id.clone()),
            Err(e) => Err(e.to_string()),
        };
        let _ = tx.send(DispatchReport {
            to: to.clone(),
            kind,
            outcome,
        });
    }
}
