// SPDX-FileCopyrightText: 2026 Wagate Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Common types shared across the Wagate workspace.

use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

/// Domain suffix for personal chats.
pub const PERSONAL_SUFFIX: &str = "@s.whatsapp.net";

/// Domain suffix for group chats.
pub const GROUP_SUFFIX: &str = "@g.us";

/// Unique identifier for a sent message, assigned by the upstream client.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MessageId(pub String);

/// A fully normalized destination address: country-coded digits plus exactly
/// one domain suffix (personal or group).
///
/// Construction goes through the canonicalizer in `wagate-whatsapp::jid`;
/// this type only carries the invariant-holding string.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Address(String);

impl Address {
    /// Wrap an already-suffixed JID string.
    pub fn new(jid: impl Into<String>) -> Self {
        Address(jid.into())
    }

    /// The full JID string, e.g. `6281234567890@s.whatsapp.net`.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Whether this address targets a group chat.
    pub fn is_group(&self) -> bool {
        self.0.ends_with(GROUP_SUFFIX)
    }
}

impl std::fmt::Display for Address {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Connection state of the single device session.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Display, EnumString, Serialize, Deserialize,
)]
#[strum(serialize_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum ConnectionState {
    Disconnected,
    Connecting,
    Connected,
}

/// Snapshot of the session published to observers on every transition.
///
/// New subscribers receive the current value immediately; `qr` carries the
/// rendered pairing challenge (a data URL) while one is pending.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionStatus {
    pub state: ConnectionState,
    pub qr: Option<String>,
}

impl SessionStatus {
    /// Initial status before the first connection attempt.
    pub fn disconnected() -> Self {
        SessionStatus {
            state: ConnectionState::Disconnected,
            qr: None,
        }
    }

    /// Whether the session is currently usable for sends.
    pub fn connected(&self) -> bool {
        self.state == ConnectionState::Connected
    }
}

/// Protocol version negotiated with the upstream client library.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProtoVersion(pub u32, pub u32, pub u32);

impl std::fmt::Display for ProtoVersion {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}.{}.{}", self.0, self.1, self.2)
    }
}

/// A group the connected account participates in.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GroupInfo {
    /// Full group JID, e.g. `1203630xxxx@g.us`.
    pub id: String,
    /// Group subject line.
    pub subject: String,
    /// Participant count.
    pub participants: usize,
}

/// Outbound message payload accepted by the upstream socket.
#[derive(Debug, Clone)]
pub enum OutboundPayload {
    /// Plain text. Link sends are plain text carrying the URL; the client
    /// renders the preview.
    Text { body: String },
    /// Image bytes with an optional caption.
    Image { data: Vec<u8>, caption: String },
    /// Text message carrying external ad-reply metadata (rendered as a
    /// large link preview card).
    AdReply {
        body: String,
        title: String,
        source_url: String,
        thumbnail: Vec<u8>,
    },
}

/// Why the upstream connection closed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CloseReason {
    /// The user logged the device out; the session must not reconnect.
    LoggedOut,
    /// Any other close (network drop, server restart, stream error).
    Lost(String),
}

impl CloseReason {
    pub fn is_logged_out(&self) -> bool {
        matches!(self, CloseReason::LoggedOut)
    }
}

/// Events emitted by the upstream client over a connection's lifetime.
#[derive(Debug, Clone)]
pub enum WaEvent {
    /// New credential material to persist to auth storage.
    CredsUpdate(Vec<u8>),
    /// A pairing challenge payload to present to the user.
    Qr(String),
    /// The connection is open and authenticated.
    Open,
    /// The connection closed.
    Close { reason: CloseReason },
}
