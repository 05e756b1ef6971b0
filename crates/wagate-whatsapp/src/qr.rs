// SPDX-FileCopyrightText: 2026 Wagate Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Pairing challenge rendering.
//!
//! The raw QR payload from the upstream client is rendered to an SVG data
//! URL that the dashboard can drop into an `<img>` tag unchanged.

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD;
use qrcode::QrCode;
use qrcode::render::svg;

use wagate_core::WagateError;

/// Render a pairing payload as a `data:image/svg+xml;base64,…` URL.
pub fn render_qr_data_url(payload: &str) -> Result<String, WagateError> {
    let code = QrCode::new(payload.as_bytes())
        .map_err(|e| WagateError::Internal(format!("QR encoding failed: {e}")))?;
    let image = code
        .render::<svg::Color>()
        .min_dimensions(256, 256)
        .dark_color(svg::Color("#000000"))
        .light_color(svg::Color("#ffffff"))
        .build();
    Ok(format!(
        "data:image/svg+xml;base64,{}",
        STANDARD.encode(image)
    ))
}
