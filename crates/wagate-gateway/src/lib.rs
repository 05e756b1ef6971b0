// SPDX-FileCopyrightText: 2026 Wagate Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! HTTP/WebSocket gateway for Wagate.
//!
//! REST endpoints cover sending (personal, group, image, link, ad
//! composite), group listing, session disconnect, and attendance
//! check-in; the WebSocket channel pushes connection-state and QR events
//! to dashboard observers.

pub mod handlers;
pub mod server;
pub mod ws;

pub use server::{GatewayState, ServerConfig, router, start_server};
