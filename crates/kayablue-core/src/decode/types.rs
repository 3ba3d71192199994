//! Core types for image decoding.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::buffer::BufferError;

/// Default upload limit: 10 MiB, the largest file the editor accepts.
pub const DEFAULT_MAX_UPLOAD_BYTES: usize = 10 * 1024 * 1024;

/// Error types for image decoding operations.
#[derive(Debug, Error)]
pub enum DecodeError {
    /// The input is empty or its format is not recognized or supported.
    #[error("Invalid or unsupported image format")]
    UnsupportedFormat,

    /// The image file is corrupted or incomplete.
    #[error("Corrupted or incomplete image file: {0}")]
    Corrupted(String),

    /// The file exceeds the upload limit.
    #[error("Image file is {size} bytes, larger than the {limit} byte limit")]
    TooLarge { size: usize, limit: usize },

    /// The decoded raster could not be turned into a pixel buffer.
    #[error("Decoded image is unusable: {0}")]
    InvalidBuffer(#[from] BufferError),
}

/// Formats the decoder accepts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SourceFormat {
    Png,
    Jpeg,
    WebP,
    Gif,
}

impl SourceFormat {
    /// Map an `image` crate format onto the supported set.
    pub fn from_image_format(format: image::ImageFormat) -> Option<Self> {
        match format {
            image::ImageFormat::Png => Some(SourceFormat::Png),
            image::ImageFormat::Jpeg => Some(SourceFormat::Jpeg),
            image::ImageFormat::WebP => Some(SourceFormat::WebP),
            image::ImageFormat::Gif => Some(SourceFormat::Gif),
            _ => None,
        }
    }

    /// MIME type of the source file.
    pub fn mime_type(self) -> &'static str {
        match self {
            SourceFormat::Png => "image/png",
            SourceFormat::Jpeg => "image/jpeg",
            SourceFormat::WebP => "image/webp",
            SourceFormat::Gif => "image/gif",
        }
    }
}

/// Display transform stored in the EXIF orientation tag.
///
/// Applied as an optional horizontal mirror followed by clockwise quarter
/// turns, which covers all eight tag values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Orientation {
    pub mirrored: bool,
    pub quarter_turns: u8,
}

impl Orientation {
    pub const UPRIGHT: Orientation = Orientation {
        mirrored: false,
        quarter_turns: 0,
    };

    /// Decode an EXIF tag value. Values outside 1..=8 are treated as upright.
    pub fn from_exif(value: u32) -> Self {
        let (mirrored, quarter_turns) = match value {
            2 => (true, 0),
            3 => (false, 2),
            4 => (true, 2),
            5 => (true, 3),
            6 => (false, 1),
            7 => (true, 1),
            8 => (false, 3),
            _ => (false, 0),
        };
        Orientation {
            mirrored,
            quarter_turns,
        }
    }

    pub fn is_upright(self) -> bool {
        self == Self::UPRIGHT
    }

    /// Odd quarter turns exchange width and height.
    #[inline]
    pub fn swaps_dimensions(self) -> bool {
        self.quarter_turns % 2 == 1
    }
}

/// What the decoder can tell about a file without decoding its pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImageMetadata {
    /// Stored width in pixels (before orientation correction).
    pub width: u32,
    /// Stored height in pixels (before orientation correction).
    pub height: u32,
    /// Container format.
    pub format: SourceFormat,
    /// EXIF orientation.
    pub orientation: Orientation,
    /// Size of the encoded file in bytes.
    pub file_size: usize,
}

impl ImageMetadata {
    /// Dimensions of the decoded buffer once orientation is applied.
    pub fn oriented_dimensions(&self) -> (u32, u32) {
        if self.orientation.swaps_dimensions() {
            (self.height, self.width)
        } else {
            (self.width, self.height)
        }
    }
}
