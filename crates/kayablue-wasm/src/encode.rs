//! Image encoding WASM bindings.
//!
//! # Functions
//!
//! - [`encode`] - Encode a JsPixelBuffer to png, jpeg or webp bytes
//! - [`mime_type`] - MIME type for a format name
//! - [`download_file_name`] - Suggested file name for a download
//! - [`format_size`] - Human-readable byte count
//!
//! # Example
//!
//! ```typescript
//! import { encode, mime_type, download_file_name } from '@kayablue/wasm';
//!
//! const bytes = encode(image, 'jpeg', 0.8);
//! const blob = new Blob([bytes], { type: mime_type('jpeg') });
//! link.download = download_file_name('kayablue-image', 'jpeg', Date.now());
//! ```

use kayablue_core::encode::{self as core_encode, EncodeSpec, OutputFormat};
use wasm_bindgen::prelude::*;

use crate::to_js_error;
use crate::types::JsPixelBuffer;

fn parse_format(format: &str) -> Result<OutputFormat, JsValue> {
    format.parse::<OutputFormat>().map_err(to_js_error)
}

/// Encode an image.
///
/// `format` is a short name (`png`, `jpg`, `jpeg`, `webp`) or a MIME type.
/// `quality` runs from 0 to 1 and affects JPEG and WebP; PNG ignores it.
///
/// # Errors
///
/// Throws for an unknown format, a NaN/infinite quality, or a codec failure.
#[wasm_bindgen]
pub fn encode(image: &JsPixelBuffer, format: &str, quality: f32) -> Result<Vec<u8>, JsValue> {
    let spec = EncodeSpec::new(parse_format(format)?, quality);
    core_encode::encode(image.inner(), &spec)
        .map(|encoded| encoded.into_bytes())
        .map_err(to_js_error)
}

/// MIME type for a format name, e.g. `image/jpeg` for `jpg`.
#[wasm_bindgen]
pub fn mime_type(format: &str) -> Result<String, JsValue> {
    Ok(parse_format(format)?.mime_type().to_string())
}

/// Suggested download name: `<prefix>-<timestamp>.<ext>`.
#[wasm_bindgen]
pub fn download_file_name(prefix: &str, format: &str, timestamp_ms: f64) -> Result<String, JsValue> {
    let format = parse_format(format)?;
    Ok(core_encode::download_file_name(
        prefix,
        format,
        timestamp_ms.max(0.0) as u64,
    ))
}

/// Human-readable byte count, e.g. `1.5 KB`.
#[wasm_bindgen]
pub fn format_size(bytes: usize) -> String {
    core_encode::format_size(bytes)
}
