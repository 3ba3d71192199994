//! Image encoding for download and the compress/convert tools.
//!
//! This module provides functionality for:
//! - Encoding buffers to PNG, JPEG or WebP with a quality setting
//! - Reporting original vs. encoded size
//! - Naming downloaded files
//!
//! # Examples
//!
//! ```ignore
//! use kayablue_core::encode::{encode, EncodeSpec, OutputFormat};
//!
//! let jpeg = encode(&image, &EncodeSpec::new(OutputFormat::Jpeg, 0.8)).unwrap();
//! println!("Encoded {} bytes", jpeg.len());
//! ```

mod codec;
mod report;

pub use codec::{
    encode, jpeg_quality, webp_levels, EncodeError, EncodeSpec, Encoded, OutputFormat,
    DEFAULT_QUALITY,
};
pub use report::{
    download_file_name, format_size, CompressionReport, DEFAULT_FILE_NAME_PREFIX,
};
