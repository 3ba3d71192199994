//! Cropping in view coordinates.
//!
//! The crop tool draws its selection over the image as rendered on screen,
//! which is usually scaled down to fit. The region therefore arrives in
//! view units and is rescaled to source units before extraction:
//!
//! ```text
//! scale_x = natural_width / view_width
//! scale_y = natural_height / view_height
//! ```
//!
//! Offsets and sizes are floored the same way on both axes and then clamped
//! to the buffer, so the copy never reads past the last row or column.
//!
//! # Example
//!
//! ```ignore
//! // Image is 4000x3000, shown at 800x600; select the center quarter
//! let region = CropRegion::new(200.0, 150.0, 400.0, 300.0);
//! let cropped = crop(&image, region, ViewSize::new(800.0, 600.0), 1.0)?;
//! assert_eq!(cropped.dimensions(), (2000, 1500));
//! ```

use tracing::debug;

use super::{CropRegion, TransformError, ViewSize};
use crate::buffer::{byte_len, PixelBuffer, CHANNELS};

/// Overshoot past the view edge that is treated as UI rounding and clamped.
const VIEW_TOLERANCE: f64 = 0.5;

/// Largest accepted device pixel ratio.
pub const MAX_DEVICE_PIXEL_RATIO: f64 = 4.0;

/// Pixel limit for a crop resampled by the device pixel ratio (512 MiB of RGBA).
pub const MAX_SCALED_CROP_PIXELS: u64 = 1 << 27;

/// Crop `image` to `region`, given in units of a view of size `view`.
///
/// `device_pixel_ratio` scales both output dimensions by the same factor;
/// with a ratio of 1 the result is a direct copy of source pixels.
///
/// # Errors
///
/// `TransformError::InvalidCrop` if the region has a non-positive size, a
/// negative offset, lies outside the view, is non-finite, or covers less
/// than one source pixel; also for a non-positive view size, a ratio outside
/// `(0, MAX_DEVICE_PIXEL_RATIO]`, or a scaled output above
/// `MAX_SCALED_CROP_PIXELS`.
pub fn crop(
    image: &PixelBuffer,
    region: CropRegion,
    view: ViewSize,
    device_pixel_ratio: f64,
) -> Result<PixelBuffer, TransformError> {
    let (x, y, width, height) = validate(region, view, device_pixel_ratio)?;

    let scale_x = image.width() as f64 / view.width;
    let scale_y = image.height() as f64 / view.height;

    let src_x = (snapped_floor(x * scale_x) as u32).min(image.width());
    let src_y = (snapped_floor(y * scale_y) as u32).min(image.height());
    let src_w = (snapped_floor(width * scale_x) as u32).min(image.width() - src_x);
    let src_h = (snapped_floor(height * scale_y) as u32).min(image.height() - src_y);

    if src_w == 0 || src_h == 0 {
        return Err(TransformError::InvalidCrop(format!(
            "region {width}x{height} is smaller than one source pixel"
        )));
    }

    let (out_w, out_h) = if device_pixel_ratio == 1.0 {
        (src_w, src_h)
    } else {
        (
            snapped_floor(width * scale_x * device_pixel_ratio) as u32,
            snapped_floor(height * scale_y * device_pixel_ratio) as u32,
        )
    };

    let scaled_too_large = (out_w, out_h) != (src_w, src_h)
        && out_w as u64 * out_h as u64 > MAX_SCALED_CROP_PIXELS;
    if out_w == 0 || out_h == 0 || scaled_too_large || byte_len(out_w, out_h).is_none() {
        return Err(TransformError::InvalidCrop(format!(
            "output size {out_w}x{out_h} is not allocatable"
        )));
    }

    debug!(
        src_x,
        src_y,
        src_w,
        src_h,
        out_w,
        out_h,
        device_pixel_ratio,
        "Cropping image"
    );

    if (src_x, src_y, src_w, src_h) == (0, 0, image.width(), image.height())
        && (out_w, out_h) == image.dimensions()
    {
        return Ok(image.clone());
    }

    let extracted = copy_region(image, src_x, src_y, src_w, src_h);
    if (out_w, out_h) == (src_w, src_h) {
        return Ok(extracted);
    }

    let scaled = image::imageops::resize(
        &extracted.to_rgba_image(),
        out_w,
        out_h,
        image::imageops::FilterType::Triangle,
    );
    Ok(PixelBuffer::from_parts(out_w, out_h, scaled.into_raw()))
}

/// Check the region and return it clamped to the view.
fn validate(
    region: CropRegion,
    view: ViewSize,
    device_pixel_ratio: f64,
) -> Result<(f64, f64, f64, f64), TransformError> {
    let CropRegion {
        x,
        y,
        width,
        height,
    } = region;

    let all_finite = [x, y, width, height, view.width, view.height, device_pixel_ratio]
        .iter()
        .all(|v| v.is_finite());
    if !all_finite {
        return Err(TransformError::InvalidCrop(
            "coordinates must be finite".to_string(),
        ));
    }
    if view.width <= 0.0 || view.height <= 0.0 {
        return Err(TransformError::InvalidCrop(format!(
            "view size {}x{} must be positive",
            view.width, view.height
        )));
    }
    if device_pixel_ratio <= 0.0 || device_pixel_ratio > MAX_DEVICE_PIXEL_RATIO {
        return Err(TransformError::InvalidCrop(format!(
            "device pixel ratio {device_pixel_ratio} must be in (0, {MAX_DEVICE_PIXEL_RATIO}]"
        )));
    }
    if width <= 0.0 || height <= 0.0 {
        return Err(TransformError::InvalidCrop(format!(
            "region size {width}x{height} must be positive"
        )));
    }
    if x < 0.0 || y < 0.0 {
        return Err(TransformError::InvalidCrop(format!(
            "region offset ({x}, {y}) must not be negative"
        )));
    }
    if x + width > view.width + VIEW_TOLERANCE || y + height > view.height + VIEW_TOLERANCE {
        return Err(TransformError::InvalidCrop(format!(
            "region ({x}, {y}, {width}x{height}) extends outside the {}x{} view",
            view.width, view.height
        )));
    }

    let width = width.min(view.width - x);
    let height = height.min(view.height - y);
    if width <= 0.0 || height <= 0.0 {
        return Err(TransformError::InvalidCrop(format!(
            "region starts at ({x}, {y}), outside the view"
        )));
    }

    Ok((x, y, width, height))
}

/// Floor, treating values within 1e-6 below an integer as that integer.
fn snapped_floor(value: f64) -> f64 {
    let nearest = value.round();
    if (value - nearest).abs() < 1e-6 {
        nearest
    } else {
        value.floor()
    }
}

/// Copy a rectangle that is known to lie inside the buffer, row by row.
fn copy_region(image: &PixelBuffer, x: u32, y: u32, width: u32, height: u32) -> PixelBuffer {
    let row_bytes = width as usize * CHANNELS;
    let start = x as usize * CHANNELS;
    let mut output = Vec::with_capacity(row_bytes * height as usize);

    for row in y..y + height {
        output.extend_from_slice(&image.row(row)[start..start + row_bytes]);
    }

    PixelBuffer::from_parts(width, height, output)
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Create a test image where each pixel has a unique value based on position.
    fn test_image(width: u32, height: u32) -> PixelBuffer {
        let mut pixels = Vec::with_capacity((width * height * 4) as usize);
        for y in 0..height {
            for x in 0..width {
                let v = ((y * width + x) % 256) as u8;
                pixels.extend_from_slice(&[v, v, v, 255]);
            }
        }
        PixelBuffer::from_raw(width, height, pixels).unwrap()
    }

    fn view(width: f64, height: f64) -> ViewSize {
        ViewSize::new(width, height)
    }

    #[test]
    fn test_full_crop_is_identity() {
        let img = test_image(100, 80);
        let result = crop(&img, CropRegion::full(view(100.0, 80.0)), view(100.0, 80.0), 1.0).unwrap();
        assert_eq!(result, img);
    }

    #[test]
    fn test_full_crop_scaled_view_is_identity() {
        // Image shown at a third of its size; 1000/333.3 is not exact
        let img = test_image(1000, 500);
        let v = view(333.3, 166.65);
        let result = crop(&img, CropRegion::full(v), v, 1.0).unwrap();
        assert_eq!(result, img);
    }

    #[test]
    fn test_center_crop_source_units() {
        let img = test_image(10, 10);
        let result = crop(&img, CropRegion::new(2.0, 2.0, 6.0, 6.0), view(10.0, 10.0), 1.0).unwrap();

        assert_eq!(result.dimensions(), (6, 6));
        // First pixel comes from (2, 2): (2 * 10 + 2) % 256 = 22
        assert_eq!(result.pixel(0, 0), Some([22, 22, 22, 255]));
    }

    #[test]
    fn test_view_scaling() {
        // 100x100 image displayed at 50x50
        let img = test_image(100, 100);
        let result = crop(&img, CropRegion::new(10.0, 5.0, 20.0, 25.0), view(50.0, 50.0), 1.0).unwrap();

        assert_eq!(result.dimensions(), (40, 50));
        // Origin maps to (20, 10): (10 * 100 + 20) % 256 = 252
        assert_eq!(result.pixel(0, 0), img.pixel(20, 10));
    }

    #[test]
    fn test_fractional_region_is_floored() {
        let img = test_image(10, 10);
        let result = crop(&img, CropRegion::new(1.7, 1.2, 3.9, 2.99), view(10.0, 10.0), 1.0).unwrap();

        assert_eq!(result.dimensions(), (3, 2));
        assert_eq!(result.pixel(0, 0), img.pixel(1, 1));
    }

    #[test]
    fn test_non_uniform_view_scale() {
        let img = test_image(200, 100);
        let result = crop(&img, CropRegion::new(0.0, 0.0, 50.0, 50.0), view(100.0, 100.0), 1.0).unwrap();
        assert_eq!(result.dimensions(), (100, 50));
    }

    #[test]
    fn test_device_pixel_ratio_scales_both_axes() {
        let img = test_image(100, 100);
        let result = crop(&img, CropRegion::new(0.0, 0.0, 50.0, 40.0), view(100.0, 100.0), 2.0).unwrap();
        assert_eq!(result.dimensions(), (100, 80));
    }

    #[test]
    fn test_device_pixel_ratio_below_one() {
        let img = test_image(100, 100);
        let result = crop(&img, CropRegion::new(0.0, 0.0, 100.0, 100.0), view(100.0, 100.0), 0.5).unwrap();
        assert_eq!(result.dimensions(), (50, 50));
    }

    #[test]
    fn test_slight_overshoot_is_clamped() {
        let img = test_image(10, 10);
        let result = crop(&img, CropRegion::new(5.0, 5.0, 5.3, 5.3), view(10.0, 10.0), 1.0).unwrap();
        assert_eq!(result.dimensions(), (5, 5));
        assert_eq!(result.pixel(4, 4), img.pixel(9, 9));
    }

    #[test]
    fn test_rejects_degenerate_region() {
        let img = test_image(10, 10);
        let v = view(10.0, 10.0);

        for region in [
            CropRegion::new(0.0, 0.0, 0.0, 5.0),
            CropRegion::new(0.0, 0.0, 5.0, -1.0),
            CropRegion::new(-1.0, 0.0, 5.0, 5.0),
            CropRegion::new(0.0, 0.0, f64::NAN, 5.0),
        ] {
            assert!(
                matches!(crop(&img, region, v, 1.0), Err(TransformError::InvalidCrop(_))),
                "region {:?} should be rejected",
                region
            );
        }
    }

    #[test]
    fn test_rejects_out_of_bounds_region() {
        let img = test_image(10, 10);
        let result = crop(&img, CropRegion::new(6.0, 0.0, 6.0, 5.0), view(10.0, 10.0), 1.0);
        assert!(matches!(result, Err(TransformError::InvalidCrop(_))));

        let result = crop(&img, CropRegion::new(10.2, 0.0, 0.2, 5.0), view(10.0, 10.0), 1.0);
        assert!(matches!(result, Err(TransformError::InvalidCrop(_))));
    }

    #[test]
    fn test_rejects_sub_pixel_region() {
        // View is larger than the image, so 1 view pixel is half a source pixel
        let img = test_image(10, 10);
        let result = crop(&img, CropRegion::new(0.0, 0.0, 1.0, 1.0), view(20.0, 20.0), 1.0);
        assert!(matches!(result, Err(TransformError::InvalidCrop(_))));
    }

    #[test]
    fn test_rejects_bad_view_or_ratio() {
        let img = test_image(10, 10);
        let region = CropRegion::new(0.0, 0.0, 5.0, 5.0);
        assert!(crop(&img, region, view(0.0, 10.0), 1.0).is_err());
        assert!(crop(&img, region, view(10.0, 10.0), 0.0).is_err());
        assert!(crop(&img, region, view(10.0, 10.0), f64::INFINITY).is_err());
    }

    #[test]
    fn test_rejects_huge_device_pixel_ratio() {
        let img = test_image(10, 10);
        let region = CropRegion::new(0.0, 0.0, 10.0, 10.0);

        let result = crop(&img, region, view(10.0, 10.0), 1.0e6);
        assert!(matches!(result, Err(TransformError::InvalidCrop(_))));

        let max = crop(&img, region, view(10.0, 10.0), MAX_DEVICE_PIXEL_RATIO).unwrap();
        assert_eq!(max.dimensions(), (40, 40));
    }

    #[test]
    fn test_rejects_oversized_scaled_output() {
        // 3000x3000 at ratio 4 would be 12000x12000
        let img = PixelBuffer::filled(3000, 3000, [1, 2, 3, 255]).unwrap();
        let region = CropRegion::new(0.0, 0.0, 3000.0, 3000.0);
        let result = crop(&img, region, view(3000.0, 3000.0), MAX_DEVICE_PIXEL_RATIO);
        assert!(matches!(result, Err(TransformError::InvalidCrop(_))));
    }
}

// ============================================================================
// Property-Based Tests
// ============================================================================
