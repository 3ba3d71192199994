//! Geometric operations: rotation, resize and cropping.
//!
//! Every operation borrows the current buffer and returns a new one; none of
//! them mutate their input.
//!
//! # Coordinate System
//!
//! - Rotation angles are in degrees, positive = clockwise
//! - Crop regions are in view units (the image as rendered on screen) and
//!   are rescaled to source pixels
//! - Origin is the top-left corner

mod crop;
mod resize;
mod rotation;
mod types;

pub use crop::{crop, MAX_DEVICE_PIXEL_RATIO, MAX_SCALED_CROP_PIXELS};
pub use resize::{fit_within, height_for_width, resize, width_for_height};
pub use rotation::{normalize_angle, quarter_turns, rotate, rotated_bounds};
pub use types::{CropRegion, InterpolationFilter, TransformError, ViewSize};
