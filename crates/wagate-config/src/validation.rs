// SPDX-FileCopyrightText: 2026 Wagate Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Post-deserialization validation for configuration values.
//!
//! Validates presence constraints that cannot be expressed via serde
//! attributes. Formats (e.g. the API key shape) are deliberately not
//! checked; only presence and basic plausibility are.

use crate::diagnostic::ConfigError;
use crate::model::WagateConfig;

/// Validate a deserialized configuration.
///
/// Returns `Ok(())` if all validations pass, or `Err(Vec<ConfigError>)` with
/// all collected validation errors (does not fail fast).
pub fn validate_config(config: &WagateConfig) -> Result<(), Vec<ConfigError>> {
    let mut errors = Vec::new();

    // Validate gateway.host is not empty and looks like an IP or hostname.
    let host = config.gateway.host.trim();
    if host.is_empty() {
        errors.push(ConfigError::Validation {
            message: "gateway.host must not be empty".to_string(),
        });
    } else {
        let is_valid_ip = host.parse::<std::net::IpAddr>().is_ok();
        let is_valid_hostname = host
            .chars()
            .all(|c| c.is_alphanumeric() || c == '.' || c == '-' || c == ':');
        if !is_valid_ip && !is_valid_hostname {
            errors.push(ConfigError::Validation {
                message: format!("gateway.host `{host}` is not a valid IP address or hostname"),
            });
        }
    }

    // Validate storage.database_path is not empty.
    if config.storage.database_path.trim().is_empty() {
        errors.push(ConfigError::Validation {
            message: "storage.database_path must not be empty".to_string(),
        });
    }

    // Validate whatsapp.auth_dir is not empty.
    if config.whatsapp.auth_dir.trim().is_empty() {
        errors.push(ConfigError::Validation {
            message: "whatsapp.auth_dir must not be empty".to_string(),
        });
    }

    // An API key that is set but blank would silently reject every request.
    if let Some(key) = &config.gateway.api_key
        && key.trim().is_empty()
    {
        errors.push(ConfigError::Validation {
            message: "gateway.api_key must not be empty when set".to_string(),
        });
    }

    // Reconnect policy sanity.
    if config.whatsapp.reconnect_max_attempts == 0 {
        errors.push(ConfigError::Validation {
            message: "whatsapp.reconnect_max_attempts must be at least 1".to_string(),
        });
    }

    if config.whatsapp.reconnect_initial_ms > config.whatsapp.reconnect_max_delay_ms {
        errors.push(ConfigError::Validation {
            message: format!(
                "whatsapp.reconnect_initial_ms ({}) must not exceed reconnect_max_delay_ms ({})",
                config.whatsapp.reconnect_initial_ms, config.whatsapp.reconnect_max_delay_ms
            ),
        });
    }

    if errors.is_empty() { Ok(()) } else { Err(errors) }
}
