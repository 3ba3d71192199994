//! Kayablue Core - Raster transformation pipeline
//!
//! This crate provides the image editing pipeline behind Kayablue: decoding
//! uploads into RGBA buffers, rotate/crop/resize, color filters, encoding
//! for download, and the preview/commit edit session that ties them together.

pub mod buffer;
pub mod config;
pub mod decode;
pub mod encode;
pub mod filters;
pub mod luminance;
pub mod session;
pub mod transform;

pub use buffer::{BufferError, PixelBuffer};
pub use config::EditorConfig;
pub use decode::{decode_image, decode_image_with_limit, probe_image, DecodeError, ImageMetadata};
pub use encode::{
    download_file_name, encode, CompressionReport, EncodeError, EncodeSpec, Encoded, OutputFormat,
};
pub use filters::apply_filters;
pub use session::{
    EditSession, FinishedOperation, PendingOperation, Preview, SessionError, Tool, ToolParams,
};
pub use transform::{
    crop, fit_within, normalize_angle, resize, rotate, rotated_bounds, CropRegion,
    InterpolationFilter, TransformError, ViewSize,
};

/// Largest blur radius accepted, in pixels.
pub const MAX_BLUR_RADIUS: f64 = 100.0;

/// Color and blur filter settings for the Filters tool.
///
/// Percentages follow the CSS filter conventions the editor UI uses:
/// brightness, contrast and saturation are neutral at 100, grayscale and
/// sepia at 0.
#[derive(Debug, Clone, Copy, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct FilterParameters {
    /// Brightness percent (0 to 200)
    pub brightness: f64,
    /// Contrast percent (0 to 200)
    pub contrast: f64,
    /// Saturation percent (0 to 200)
    pub saturation: f64,
    /// Grayscale percent (0 to 100)
    pub grayscale: f64,
    /// Sepia percent (0 to 100)
    pub sepia: f64,
    /// Blur radius in pixels (0 to 100)
    pub blur: f64,
}

impl Default for FilterParameters {
    fn default() -> Self {
        Self {
            brightness: 100.0,
            contrast: 100.0,
            saturation: 100.0,
            grayscale: 0.0,
            sepia: 0.0,
            blur: 0.0,
        }
    }
}

impl FilterParameters {
    /// Create identity parameters
    pub fn new() -> Self {
        Self::default()
    }

    /// Check if every filter is at its neutral value
    pub fn is_identity(&self) -> bool {
        *self == Self::default()
    }

    /// Check if the per-pixel color steps are all neutral (blur may not be)
    pub fn is_color_identity(&self) -> bool {
        Self {
            blur: 0.0,
            ..*self
        }
        .is_identity()
    }

    /// Copy with every field clamped into its valid range.
    ///
    /// Non-finite values fall back to the field's neutral value.
    pub fn clamped(&self) -> Self {
        let neutral = Self::default();
        let fit = |value: f64, fallback: f64, max: f64| {
            if value.is_finite() {
                value.clamp(0.0, max)
            } else {
                fallback
            }
        };

        Self {
            brightness: fit(self.brightness, neutral.brightness, 200.0),
            contrast: fit(self.contrast, neutral.contrast, 200.0),
            saturation: fit(self.saturation, neutral.saturation, 200.0),
            grayscale: fit(self.grayscale, neutral.grayscale, 100.0),
            sepia: fit(self.sepia, neutral.sepia, 100.0),
            blur: fit(self.blur, neutral.blur, MAX_BLUR_RADIUS),
        }
    }
}
