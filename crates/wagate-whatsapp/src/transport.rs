// SPDX-FileCopyrightText: 2026 Wagate Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Protocol transport binding point.
//!
//! The multi-device wire protocol (handshake, session cryptography,
//! pairing) belongs to an external client library; the `whatsapp-web`
//! feature reserves the slot for that binding. The rest of the workspace
//! only ever talks to the [`WaTransport`]/[`WaSocket`](wagate_core::WaSocket)
//! traits, so a binding drops in here without touching any other crate.

use std::sync::Arc;

use wagate_core::{WaTransport, WagateError};

/// The transport compiled into this build.
///
/// No binding ships in this workspace yet, so `serve` reports the missing
/// transport instead of starting a live session. Tests exercise the full
/// façade through the mock transport in `wagate-test-utils`.
pub fn compiled_transport() -> Result<Arc<dyn WaTransport>, WagateError> {
    Err(WagateError::Config(
        "no protocol binding compiled in; a live session needs the external client behind the `whatsapp-web` feature".into(),
    ))
}
