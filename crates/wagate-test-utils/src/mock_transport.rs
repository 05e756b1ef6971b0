// SPDX-FileCopyrightText: 2026 Wagate Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Mock transport and socket for deterministic testing.
//!
//! `MockTransport` implements [`WaTransport`] and hands out `MockSocket`s
//! whose sends are captured for assertion. Tests drive the session
//! lifecycle by emitting [`WaEvent`]s through the handle of a connection.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use tokio::sync::{Mutex, mpsc};

use wagate_core::{
    Address, GroupInfo, MessageId, OutboundPayload, ProtoVersion, WaConnection, WaEvent,
    WaSocket, WaTransport, WagateError,
};

/// A mock upstream socket capturing everything sent through it.
pub struct MockSocket {
    sent: Mutex<Vec<(Address, OutboundPayload)>>,
    groups: Mutex<Vec<GroupInfo>>,
    fail_sends: AtomicBool,
    fail_logout: AtomicBool,
}

impl MockSocket {
    fn new() -> Arc<Self> {
        Arc::new(MockSocket {
            sent: Mutex::new(Vec::new()),
            groups: Mutex::new(Vec::new()),
            fail_sends: AtomicBool::new(false),
            fail_logout: AtomicBool::new(false),
        })
    }

    /// All payloads sent through this socket, in order.
    pub async fn sent(&self) -> Vec<(Address, OutboundPayload)> {
        self.sent.lock().await.clone()
    }

    /// Count of sends so far.
    pub async fn sent_count(&self) -> usize {
        self.sent.lock().await.len()
    }

    /// Make subsequent sends fail with a channel error.
    pub fn set_fail_sends(&self, fail: bool) {
        self.fail_sends.store(fail, Ordering::SeqCst);
    }

    /// Make the next logout call fail.
    pub fn set_fail_logout(&self, fail: bool) {
        self.fail_logout.store(fail, Ordering::SeqCst);
    }

    /// Set the group list returned by `fetch_groups`.
    pub async fn set_groups(&self, groups: Vec<GroupInfo>) {
        *self.groups.lock().await = groups;
    }
}

#[async_trait]
impl WaSocket for MockSocket {
    async fn send(
        &self,
        to: &Address,
        payload: OutboundPayload,
    ) -> Result<MessageId, WagateError> {
        if self.fail_sends.load(Ordering::SeqCst) {
            return Err(WagateError::channel("mock send failure"));
        }
        self.sent.lock().await.push((to.clone(), payload));
        Ok(MessageId(format!("mock-msg-{}", uuid::Uuid::new_v4())))
    }

    async fn fetch_groups(&self) -> Result<Vec<GroupInfo>, WagateError> {
        Ok(self.groups.lock().await.clone())
    }

    async fn logout(&self) -> Result<(), WagateError> {
        if self.fail_logout.load(Ordering::SeqCst) {
            return Err(WagateError::channel("mock logout failure"));
        }
        Ok(())
    }
}

/// Handle to one mock connection: the socket plus the event injector.
#[derive(Clone)]
pub struct MockHandle {
    pub socket: Arc<MockSocket>,
    events: mpsc::Sender<WaEvent>,
}

impl MockHandle {
    /// Inject an event into the session manager's event loop.
    pub async fn emit(&self, event: WaEvent) {
        let _ = self.events.send(event).await;
    }
}

/// Mock transport recording every connection it hands out.
pub struct MockTransport {
    handles: Mutex<Vec<MockHandle>>,
    creds_seen: Mutex<Vec<Option<Vec<u8>>>>,
    fail_connect: AtomicBool,
    version: ProtoVersion,
}

impl MockTransport {
    pub fn new() -> Arc<Self> {
        Arc::new(MockTransport {
            handles: Mutex::new(Vec::new()),
            creds_seen: Mutex::new(Vec::new()),
            fail_connect: AtomicBool::new(false),
            version: ProtoVersion(2, 3000, 0),
        })
    }

    /// Make subsequent connect calls fail.
    pub fn set_fail_connect(&self, fail: bool) {
        self.fail_connect.store(fail, Ordering::SeqCst);
    }

    /// Number of successful connections handed out.
    pub async fn connect_count(&self) -> usize {
        self.handles.lock().await.len()
    }

    /// Handle for the most recent connection.
    pub async fn last_handle(&self) -> Option<MockHandle> {
        self.handles.lock().await.last().cloned()
    }

    /// Credential material passed to each connect call, in order.
    pub async fn creds_history(&self) -> Vec<Option<Vec<u8>>> {
        self.creds_seen.lock().await.clone()
    }
}

#[async_trait]
impl WaTransport for MockTransport {
    async fn latest_version(&self) -> Result<ProtoVersion, WagateError> {
        Ok(self.version)
    }

    async fn connect(
        &self,
        _version: ProtoVersion,
        creds: Option<Vec<u8>>,
        _device_name: &str,
    ) -> Result<WaConnection, WagateError> {
        if self.fail_connect.load(Ordering::SeqCst) {
            return Err(WagateError::channel("mock connect failure"));
        }

        self.creds_seen.lock().await.push(creds);

        let socket = MockSocket::new();
        let (tx, rx) = mpsc::channel(32);
        self.handles.lock().await.push(MockHandle {
            socket: socket.clone(),
            events: tx,
        });

        Ok(WaConnection {
            socket,
            events: rx,
        })
    }
}
