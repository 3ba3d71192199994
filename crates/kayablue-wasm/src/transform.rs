//! WASM bindings for geometric operations.
//!
//! Filter arguments are `u8` codes: 0 = nearest, 1 = bilinear, 2 = lanczos3.

use kayablue_core::transform::{self as core_transform, CropRegion, ViewSize};
use wasm_bindgen::prelude::*;

use crate::to_js_error;
use crate::types::{filter_from_u8, JsPixelBuffer};

/// Rotate an image clockwise around its center.
///
/// The canvas grows to fit the rotated image; uncovered corners are
/// transparent. Multiples of 90° are exact.
///
/// # Example (TypeScript)
///
/// ```typescript
/// const rotated = rotate(image, 90, 1);
/// ```
#[wasm_bindgen]
pub fn rotate(image: &JsPixelBuffer, angle_degrees: f64, filter: u8) -> JsPixelBuffer {
    JsPixelBuffer::from_core(core_transform::rotate(
        image.inner(),
        angle_degrees,
        filter_from_u8(filter),
    ))
}

/// Output dimensions of a rotation, as `[width, height]`.
#[wasm_bindgen]
pub fn rotated_bounds(width: u32, height: u32, angle_degrees: f64) -> Vec<u32> {
    let (w, h) = core_transform::rotated_bounds(width, height, angle_degrees);
    vec![w, h]
}

/// Crop a region given in view units.
///
/// `view_width` x `view_height` is the size the image is rendered at on screen.
/// `device_pixel_ratio` scales the output; pass `window.devicePixelRatio` or 1.
///
/// # Example (TypeScript)
///
/// ```typescript
/// // Image rendered at 800x600, user selected a 400x300 box at (200,150)
/// const cropped = crop(image, 200, 150, 400, 300, 800, 600, 1);
/// ```
#[wasm_bindgen]
#[allow(clippy::too_many_arguments)]
pub fn crop(
    image: &JsPixelBuffer,
    x: f64,
    y: f64,
    width: f64,
    height: f64,
    view_width: f64,
    view_height: f64,
    device_pixel_ratio: f64,
) -> Result<JsPixelBuffer, JsValue> {
    core_transform::crop(
        image.inner(),
        CropRegion::new(x, y, width, height),
        ViewSize::new(view_width, view_height),
        device_pixel_ratio,
    )
    .map(JsPixelBuffer::from_core)
    .map_err(to_js_error)
}

/// Resize to exact dimensions.
#[wasm_bindgen]
pub fn resize(
    image: &JsPixelBuffer,
    width: u32,
    height: u32,
    filter: u8,
) -> Result<JsPixelBuffer, JsValue> {
    core_transform::resize(image.inner(), width, height, filter_from_u8(filter))
        .map(JsPixelBuffer::from_core)
        .map_err(to_js_error)
}

/// Dimensions fitting within `max_edge` with the aspect ratio kept, as
/// `[width, height]`.
#[wasm_bindgen]
pub fn fit_within(width: u32, height: u32, max_edge: u32) -> Vec<u32> {
    let (w, h) = core_transform::fit_within(width, height, max_edge);
    vec![w, h]
}

/// Height matching `new_width` with the aspect ratio locked.
#[wasm_bindgen]
pub fn height_for_width(width: u32, height: u32, new_width: u32) -> u32 {
    core_transform::height_for_width(width, height, new_width)
}

/// Width matching `new_height` with the aspect ratio locked.
#[wasm_bindgen]
pub fn width_for_height(width: u32, height: u32, new_height: u32) -> u32 {
    core_transform::width_for_height(width, height, new_height)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_image(width: u32, height: u32) -> JsPixelBuffer {
        let pixels: Vec<u8> = (0..(width * height * 4) as usize)
            .map(|i| (i % 256) as u8)
            .collect();
        JsPixelBuffer::new(width, height, pixels).unwrap()
    }

    #[test]
    fn test_rotation_no_change() {
        let img = test_image(100, 100);
        let result = rotate(&img, 0.0, 1);
        assert_eq!(result.pixels(), img.pixels());
    }

    #[test]
    fn test_rotation_90_degrees() {
        let img = test_image(100, 50);
        let result = rotate(&img, 90.0, 1);
        assert_eq!(result.width(), 50);
        assert_eq!(result.height(), 100);
    }

    #[test]
    fn test_rotation_45_degrees_expands() {
        let img = test_image(100, 50);
        let result = rotate(&img, 45.0, 2);
        assert_eq!((result.width(), result.height()), (107, 107));
    }

    #[test]
    fn test_rotated_bounds() {
        assert_eq!(rotated_bounds(100, 50, 90.0), vec![50, 100]);
        assert_eq!(rotated_bounds(100, 50, 180.0), vec![100, 50]);
    }

    #[test]
    fn test_crop_view_units() {
        let img = test_image(200, 100);
        let result = crop(&img, 50.0, 25.0, 50.0, 25.0, 100.0, 50.0, 1.0).unwrap();
        assert_eq!(result.width(), 100);
        assert_eq!(result.height(), 50);
    }

    #[test]
    fn test_crop_with_dpr() {
        let img = test_image(100, 100);
        let result = crop(&img, 0.0, 0.0, 10.0, 10.0, 100.0, 100.0, 2.0).unwrap();
        assert_eq!((result.width(), result.height()), (20, 20));
    }

    #[test]
    fn test_resize() {
        let img = test_image(64, 32);
        let result = resize(&img, 16, 8, 0).unwrap();
        assert_eq!((result.width(), result.height()), (16, 8));
    }

    #[test]
    fn test_fit_within() {
        assert_eq!(fit_within(6000, 4000, 2560), vec![2560, 1707]);
    }

    #[test]
    fn test_locked_aspect_helpers() {
        assert_eq!(height_for_width(1920, 1080, 960), 540);
        assert_eq!(width_for_height(1920, 1080, 270), 480);
        assert_eq!(height_for_width(0, 1080, 960), 0);
    }
}
