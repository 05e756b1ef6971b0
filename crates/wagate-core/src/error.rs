// SPDX-FileCopyrightText: 2026 Wagate Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Error types for the Wagate gateway.

use thiserror::Error;

/// The primary error type used across the Wagate workspace.
///
/// Variants map onto the HTTP failure taxonomy: `Validation` renders as 400,
/// `Unauthorized` as 401, `NotFound` as 404, `NoActiveSession` as 400, and
/// `Channel`/`Storage` as 500 with the message passed through as diagnostic
/// text. The mapping itself lives in the gateway crate.
#[derive(Debug, Error)]
pub enum WagateError {
    /// Configuration errors (invalid TOML, missing required fields, type mismatches).
    #[error("configuration error: {0}")]
    Config(String),

    /// Storage backend errors (database open, query failure, migration).
    #[error("storage error: {source}")]
    Storage {
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// Upstream messaging client errors (send failure, logout failure, image fetch).
    #[error("channel error: {message}")]
    Channel {
        message: String,
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Missing or malformed request fields.
    #[error("validation error: {0}")]
    Validation(String),

    /// API key mismatch.
    #[error("unauthorized: {0}")]
    Unauthorized(String),

    /// Attendance code resolves to neither a student nor a teacher.
    #[error("not found: {0}")]
    NotFound(String),

    /// An operation required a connected session and none exists.
    #[error("no active session")]
    NoActiveSession,

    /// Internal or unexpected errors.
    #[error("internal error: {0}")]
    Internal(String),
}

impl WagateError {
    /// Wrap an upstream client error with context.
    pub fn channel(message: impl Into<String>) -> Self {
        WagateError::Channel {
            message: message.into(),
            source: None,
        }
    }
}
