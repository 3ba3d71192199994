//! Edit session configuration.
//!
//! Every field has a default, so the UI can send a partial object (or none).

use serde::{Deserialize, Serialize};

use crate::decode::DEFAULT_MAX_UPLOAD_BYTES;
use crate::encode::{EncodeSpec, DEFAULT_FILE_NAME_PREFIX};
use crate::transform::{InterpolationFilter, MAX_DEVICE_PIXEL_RATIO};

/// Settings for an [`EditSession`](crate::session::EditSession).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct EditorConfig {
    /// Largest accepted upload in bytes
    pub max_upload_bytes: usize,
    /// Physical pixels per view pixel, applied to crop output
    pub device_pixel_ratio: f64,
    /// Resampling filter for rotate, resize and scaled crops
    pub interpolation: InterpolationFilter,
    /// Initial output format and quality
    pub output: EncodeSpec,
    /// Prefix for suggested download file names
    pub file_name_prefix: String,
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            max_upload_bytes: DEFAULT_MAX_UPLOAD_BYTES,
            device_pixel_ratio: 1.0,
            interpolation: InterpolationFilter::default(),
            output: EncodeSpec::default(),
            file_name_prefix: DEFAULT_FILE_NAME_PREFIX.to_string(),
        }
    }
}

impl EditorConfig {
    /// Device pixel ratio capped at `MAX_DEVICE_PIXEL_RATIO`, falling back
    /// to 1.0 when not a positive number.
    pub fn effective_dpr(&self) -> f64 {
        if self.device_pixel_ratio.is_finite() && self.device_pixel_ratio > 0.0 {
            self.device_pixel_ratio.min(MAX_DEVICE_PIXEL_RATIO)
        } else {
            1.0
        }
    }
}
