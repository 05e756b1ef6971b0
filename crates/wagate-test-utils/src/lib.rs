// SPDX-FileCopyrightText: 2026 Wagate Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Test utilities for Wagate integration tests.

pub mod mock_transport;

pub use mock_transport::{MockHandle, MockSocket, MockTransport};
