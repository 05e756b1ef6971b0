// SPDX-FileCopyrightText: 2026 Wagate Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Core library for the Wagate WhatsApp gateway.
//!
//! This crate provides the error type, the common types, and the transport
//! trait seam behind which the external multi-device protocol client lives.
//! Everything else in the workspace is written against these definitions.

pub mod error;
pub mod transport;
pub mod types;

// Re-export key items at crate root for ergonomic imports.
pub use error::WagateError;
pub use transport::{WaConnection, WaSocket, WaTransport};
pub use types::{
    Address, CloseReason, ConnectionState, GroupInfo, MessageId, OutboundPayload, ProtoVersion,
    SessionStatus, WaEvent,
};
