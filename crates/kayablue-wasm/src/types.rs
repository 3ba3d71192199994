//! WASM-compatible wrapper types for image data.
//!
//! This module provides JavaScript-friendly types that wrap the core Kayablue types,
//! handling the conversion between Rust and JavaScript data representations.

use kayablue_core::{InterpolationFilter, PixelBuffer};
use wasm_bindgen::prelude::*;

use crate::to_js_error;

/// An RGBA image wrapper for JavaScript.
///
/// # Memory Management
///
/// The pixel data is stored in WASM memory. When you call `pixels()`, a copy is made
/// to JavaScript memory as a `Uint8Array`, ready for `new ImageData(...)`. For
/// chains of operations, keep the image in WASM memory and only extract pixels
/// when drawing.
///
/// The `free()` method can be called to explicitly release WASM memory, but this is
/// optional as wasm-bindgen's finalizer will handle cleanup automatically.
#[wasm_bindgen]
pub struct JsPixelBuffer {
    inner: PixelBuffer,
}

#[wasm_bindgen]
impl JsPixelBuffer {
    /// Wrap RGBA pixel data (4 bytes per pixel, row-major), e.g. from
    /// `ctx.getImageData(...).data`.
    ///
    /// Fails if the length does not equal `width * height * 4`.
    #[wasm_bindgen(constructor)]
    pub fn new(width: u32, height: u32, pixels: Vec<u8>) -> Result<JsPixelBuffer, JsValue> {
        PixelBuffer::from_raw(width, height, pixels)
            .map(Self::from_core)
            .map_err(to_js_error)
    }

    /// Get the image width in pixels
    #[wasm_bindgen(getter)]
    pub fn width(&self) -> u32 {
        self.inner.width()
    }

    /// Get the image height in pixels
    #[wasm_bindgen(getter)]
    pub fn height(&self) -> u32 {
        self.inner.height()
    }

    /// Get the number of bytes in the pixel buffer (width * height * 4)
    #[wasm_bindgen(getter)]
    pub fn byte_length(&self) -> usize {
        self.inner.byte_size()
    }

    /// Returns RGBA pixel data as Uint8Array.
    ///
    /// Note: This creates a copy of the pixel data.
    pub fn pixels(&self) -> Vec<u8> {
        self.inner.pixels().to_vec()
    }

    /// Explicitly free WASM memory.
    ///
    /// This is optional - wasm-bindgen's finalizer will handle cleanup automatically.
    pub fn free(self) {
        // Dropping self releases the memory
    }
}

impl JsPixelBuffer {
    pub(crate) fn from_core(inner: PixelBuffer) -> Self {
        Self { inner }
    }

    pub(crate) fn inner(&self) -> &PixelBuffer {
        &self.inner
    }
}

/// Convert a u8 filter type value to the core InterpolationFilter enum.
///
/// Values:
/// - 0 = Nearest (fastest, lowest quality)
/// - 1 = Bilinear (good balance of speed and quality)
/// - 2 = Lanczos3 (best quality, slowest)
///
/// Any other value defaults to Bilinear.
pub(crate) fn filter_from_u8(value: u8) -> InterpolationFilter {
    match value {
        0 => InterpolationFilter::Nearest,
        2 => InterpolationFilter::Lanczos3,
        _ => InterpolationFilter::Bilinear,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_js_pixel_buffer_creation() {
        let img = JsPixelBuffer::new(100, 50, vec![0u8; 100 * 50 * 4]).unwrap();
        assert_eq!(img.width(), 100);
        assert_eq!(img.height(), 50);
        assert_eq!(img.byte_length(), 20000);
    }

    #[test]
    fn test_js_pixel_buffer_pixels() {
        let pixels = vec![255u8, 128, 64, 255, 32, 16, 8, 0];
        let img = JsPixelBuffer::new(2, 1, pixels.clone()).unwrap();
        assert_eq!(img.pixels(), pixels);
    }

    #[test]
    fn test_from_core() {
        let core = PixelBuffer::filled(20, 10, [1, 2, 3, 4]).unwrap();
        let js_img = JsPixelBuffer::from_core(core.clone());
        assert_eq!(js_img.inner(), &core);
        assert_eq!(js_img.byte_length(), 800);
    }

    #[test]
    fn test_filter_from_u8() {
        assert_eq!(filter_from_u8(0), InterpolationFilter::Nearest);
        assert_eq!(filter_from_u8(1), InterpolationFilter::Bilinear);
        assert_eq!(filter_from_u8(2), InterpolationFilter::Lanczos3);
        assert_eq!(filter_from_u8(99), InterpolationFilter::Bilinear);
    }
}
