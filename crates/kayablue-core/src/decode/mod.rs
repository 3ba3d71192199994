//! Image decoding for uploaded files.
//!
//! This module turns the bytes of a user-selected file into the
//! [`PixelBuffer`](crate::buffer::PixelBuffer) the edit session works on:
//! - Format sniffing (PNG, JPEG, WebP, GIF)
//! - EXIF orientation correction
//! - Upload size limit enforcement
//!
//! # Architecture
//!
//! Decoding happens once per upload, usually from a Web Worker via the WASM
//! bindings. All operations are synchronous and single-threaded.
//!
//! # Examples
//!
//! ```ignore
//! use kayablue_core::decode::decode_image;
//!
//! let bytes = std::fs::read("photo.jpg").unwrap();
//! let image = decode_image(&bytes).unwrap();
//! println!("Decoded {}x{} image", image.width(), image.height());
//! ```

mod reader;
mod types;

pub use reader::{decode_image, decode_image_with_limit, get_orientation, probe_image};
pub use types::{DecodeError, ImageMetadata, Orientation, SourceFormat, DEFAULT_MAX_UPLOAD_BYTES};
