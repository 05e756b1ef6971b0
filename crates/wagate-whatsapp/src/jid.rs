// SPDX-FileCopyrightText: 2026 Wagate Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Phone number canonicalization into messaging addresses.
//!
//! Destination numbers arrive in whatever shape a form field produced:
//! `+62 812-3456-7890`, `081234567890`, `81234567890`. All of them must
//! resolve to the same JID. The country-code rule is a single idempotent
//! transformation: a leading national-trunk `0` is equivalent to the
//! country code, and the prefix is never applied twice.

use wagate_core::types::{GROUP_SUFFIX, PERSONAL_SUFFIX};
use wagate_core::Address;

/// Canonicalize a loosely formatted phone number into a personal address.
///
/// Pipeline: strip non-digits, normalize the `62` country prefix, append
/// the personal domain suffix. Inputs already carrying a domain suffix are
/// out of scope here; use [`ensure_personal`] for those.
pub fn canonicalize(raw: &str) -> Address {
    let digits: String = raw.chars().filter(|c| c.is_ascii_digit()).collect();
    Address::new(format!("{}{PERSONAL_SUFFIX}", ensure_country_code(&digits)))
}

/// Ensure the digit string begins with the `62` country code exactly once.
///
/// A leading trunk `0` is replaced by `62`; a bare local number gains the
/// prefix; an already-prefixed number passes through unchanged.
fn ensure_country_code(digits: &str) -> String {
    if let Some(rest) = digits.strip_prefix('0') {
        format!("62{rest}")
    } else if digits.starts_with("62") {
        digits.to_string()
    } else {
        format!("62{digits}")
    }
}

/// Resolve a destination that may already be a full JID.
///
/// Callers that hold a suffixed address skip canonicalization entirely and
/// use it as-is; bare numbers go through [`canonicalize`].
pub fn ensure_personal(raw: &str) -> Address {
    if raw.contains('@') {
        Address::new(raw)
    } else {
        canonicalize(raw)
    }
}

/// Resolve a group destination, appending the group suffix when missing.
pub fn ensure_group(raw: &str) -> Address {
    if raw.ends_with(GROUP_SUFFIX) {
        Address::new(raw)
    } else {
        Address::new(format!("{raw}{GROUP_SUFFIX}"))
    }
}
