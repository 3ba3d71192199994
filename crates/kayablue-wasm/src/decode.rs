//! Image decoding WASM bindings.
//!
//! # Example
//!
//! ```typescript
//! import { decode_image, probe_image } from '@kayablue/wasm';
//!
//! const bytes = new Uint8Array(await file.arrayBuffer());
//! const info = probe_image(bytes);      // { width, height, format, ... }
//! const image = decode_image(bytes);    // throws on bad or oversized input
//! console.log(`Decoded ${image.width}x${image.height} image`);
//! ```

use kayablue_core::decode;
use wasm_bindgen::prelude::*;

use crate::to_js_error;
use crate::types::JsPixelBuffer;

/// Decode PNG, JPEG, WebP or GIF bytes with the 10 MiB upload limit.
///
/// EXIF orientation is applied, so the result matches what an `<img>` shows.
#[wasm_bindgen]
pub fn decode_image(bytes: &[u8]) -> Result<JsPixelBuffer, JsValue> {
    decode::decode_image(bytes)
        .map(JsPixelBuffer::from_core)
        .map_err(to_js_error)
}

/// Decode with a custom upload limit in bytes.
#[wasm_bindgen]
pub fn decode_image_with_limit(bytes: &[u8], max_bytes: usize) -> Result<JsPixelBuffer, JsValue> {
    decode::decode_image_with_limit(bytes, max_bytes)
        .map(JsPixelBuffer::from_core)
        .map_err(to_js_error)
}

/// Read dimensions, format and orientation without decoding pixels.
///
/// Returns a plain object `{ width, height, format, orientation, fileSize }`.
#[wasm_bindgen]
pub fn probe_image(bytes: &[u8]) -> Result<JsValue, JsValue> {
    let metadata = decode::probe_image(bytes).map_err(to_js_error)?;
    serde_wasm_bindgen::to_value(&metadata).map_err(to_js_error)
}
