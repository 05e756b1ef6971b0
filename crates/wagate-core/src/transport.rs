// SPDX-FileCopyrightText: 2026 Wagate Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Trait seam between the gateway and the external multi-device client.
//!
//! The wire protocol, session cryptography, and pairing all live behind
//! these traits. The session manager owns the only `Arc<dyn WaSocket>` in
//! the process; everything else borrows it read-only for the duration of
//! a send.

use async_trait::async_trait;
use std::sync::Arc;
use tokio::sync::mpsc;

use crate::error::WagateError;
use crate::types::{Address, GroupInfo, MessageId, OutboundPayload, ProtoVersion, WaEvent};

/// A live, possibly not-yet-authenticated connection to the messaging
/// network. Events arrive on `events` until the connection closes.
pub struct WaConnection {
    pub socket: Arc<dyn WaSocket>,
    pub events: mpsc::Receiver<WaEvent>,
}

/// Handle to an open upstream socket.
#[async_trait]
pub trait WaSocket: Send + Sync + 'static {
    /// Send a payload to a canonical address. At-most-once; the upstream
    /// client does not retry.
    async fn send(
        &self,
        to: &Address,
        payload: OutboundPayload,
    ) -> Result<MessageId, WagateError>;

    /// Fetch all groups the connected account participates in.
    async fn fetch_groups(&self) -> Result<Vec<GroupInfo>, WagateError>;

    /// Log the device out, invalidating the persisted credentials upstream.
    async fn logout(&self) -> Result<(), WagateError>;
}

/// Factory for upstream connections.
#[async_trait]
pub trait WaTransport: Send + Sync + 'static {
    /// Negotiate the latest supported protocol version.
    async fn latest_version(&self) -> Result<ProtoVersion, WagateError>;

    /// Open a connection using previously persisted credentials, if any.
    /// With `creds = None` the connection starts a fresh pairing and emits
    /// a [`WaEvent::Qr`].
    async fn connect(
        &self,
        version: ProtoVersion,
        creds: Option<Vec<u8>>,
        device_name: &str,
    ) -> Result<WaConnection, WagateError>;
}
