//! Shared types for geometric transforms.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors raised by resize and crop.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum TransformError {
    /// Target dimensions are zero or too large to allocate.
    #[error("Invalid dimensions: {width}x{height}")]
    InvalidDimension { width: u32, height: u32 },

    /// Crop region is degenerate or lies outside the image.
    #[error("Invalid crop: {0}")]
    InvalidCrop(String),
}

/// Interpolation filter for rotation and resize.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InterpolationFilter {
    /// Nearest neighbor (fastest, blocky).
    Nearest,
    /// Bilinear - good for interactive previews.
    #[default]
    Bilinear,
    /// Lanczos3 - sharper, slower.
    Lanczos3,
}

impl InterpolationFilter {
    /// Convert to the image crate's FilterType.
    pub fn to_image_filter(self) -> image::imageops::FilterType {
        match self {
            InterpolationFilter::Nearest => image::imageops::FilterType::Nearest,
            InterpolationFilter::Bilinear => image::imageops::FilterType::Triangle,
            InterpolationFilter::Lanczos3 => image::imageops::FilterType::Lanczos3,
        }
    }
}

/// Size of the image as currently rendered on screen, in view pixels.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ViewSize {
    pub width: f64,
    pub height: f64,
}

impl ViewSize {
    pub fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }
}

/// A crop rectangle in view units (top-left origin).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CropRegion {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl CropRegion {
    pub fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// The region covering the whole view.
    pub fn full(view: ViewSize) -> Self {
        Self::new(0.0, 0.0, view.width, view.height)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_filter_type_conversion() {
        assert!(matches!(
            InterpolationFilter::Nearest.to_image_filter(),
            image::imageops::FilterType::Nearest
        ));
        assert!(matches!(
            InterpolationFilter::Bilinear.to_image_filter(),
            image::imageops::FilterType::Triangle
        ));
        assert!(matches!(
            InterpolationFilter::Lanczos3.to_image_filter(),
            image::imageops::FilterType::Lanczos3
        ));
    }

    #[test]
    fn test_full_region() {
        let region = CropRegion::full(ViewSize::new(640.0, 480.0));
        assert_eq!(region, CropRegion::new(0.0, 0.0, 640.0, 480.0));
    }

    #[test]
    fn test_error_display() {
        let err = TransformError::InvalidDimension {
            width: 0,
            height: 10,
        };
        assert_eq!(err.to_string(), "Invalid dimensions: 0x10");
    }
}
