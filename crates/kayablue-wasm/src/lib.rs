//! Kayablue WASM - WebAssembly bindings for Kayablue
//!
//! This crate provides WASM bindings to expose the kayablue-core pipeline
//! to the browser application.
//!
//! # Module Structure
//!
//! - `types` - WASM-compatible wrapper type for RGBA buffers
//! - `decode` - Upload decoding (PNG, JPEG, WebP, GIF)
//! - `transform` - Rotate, crop and resize
//! - `filters` - Color filters and blur
//! - `encode` - PNG/JPEG/WebP encoding and download naming
//! - `session` - The preview/commit edit session
//!
//! # Usage
//!
//! ```typescript
//! import init, { EditSession } from '@kayablue/wasm';
//!
//! await init();
//!
//! const session = new EditSession();
//! session.load(new Uint8Array(await file.arrayBuffer()));
//! const preview = session.preview_rotate(90);
//! session.commit();
//! const bytes = session.export();
//! ```

use std::fmt::Display;

use wasm_bindgen::prelude::*;

mod decode;
mod encode;
mod filters;
mod session;
mod transform;
mod types;

// Re-export public types
pub use decode::{decode_image, decode_image_with_limit, probe_image};
pub use encode::{download_file_name, encode, format_size, mime_type};
pub use filters::{apply_filters, FilterParameters};
pub use session::EditSession;
pub use transform::{
    crop, fit_within, height_for_width, resize, rotate, rotated_bounds, width_for_height,
};
pub use types::JsPixelBuffer;

/// Initialize the WASM module (called automatically on load)
#[wasm_bindgen(start)]
pub fn init() {}

/// Get the version of the WASM module
#[wasm_bindgen]
pub fn version() -> String {
    env!("CARGO_PKG_VERSION").to_string()
}

/// Convert a core error into the string `JsValue` thrown to JavaScript.
///
/// On wasm32 the message is also written to the browser console.
pub(crate) fn to_js_error<E: Display>(err: E) -> JsValue {
    let message = err.to_string();
    #[cfg(target_arch = "wasm32")]
    web_sys::console::warn_1(&JsValue::from_str(&message));
    JsValue::from_str(&message)
}
