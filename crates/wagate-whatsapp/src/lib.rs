// SPDX-FileCopyrightText: 2026 Wagate Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! WhatsApp channel glue for the Wagate gateway.
//!
//! Provides address canonicalization, the single-session lifecycle
//! manager, pairing-challenge rendering, and the message dispatcher. The
//! wire protocol itself lives behind the transport traits in
//! `wagate-core`.

pub mod dispatcher;
pub mod jid;
pub mod qr;
pub mod session;
pub mod transport;

pub use dispatcher::{DispatchReport, Dispatcher};
pub use session::SessionManager;
