//! Image rotation by arbitrary angles.
//!
//! Multiples of 90° are pure pixel permutations and never resample, so a
//! full turn in quarter steps reproduces the input exactly. Every other
//! angle uses inverse mapping: for each pixel in the output image we find
//! the source position it came from and interpolate there.
//!
//! Angles are in degrees, positive = clockwise on screen (y axis down).
//! For a clockwise rotation by θ the inverse transform is:
//! ```text
//! src_x =  dx * cos(θ) + dy * sin(θ) + src_cx
//! src_y = -dx * sin(θ) + dy * cos(θ) + src_cy
//! ```
//! where `(dx, dy)` is the destination pixel center relative to the
//! destination center.

use tracing::{debug, trace};

use super::InterpolationFilter;
use crate::buffer::{byte_len, PixelBuffer, CHANNELS};

/// Angles closer than this to a quarter turn take the exact path.
const QUARTER_TURN_EPSILON: f64 = 1e-3;

/// Fill for destination pixels that fall outside the source.
const TRANSPARENT: [u8; 4] = [0, 0, 0, 0];

/// Normalize an angle to `[0, 360)` for display.
pub fn normalize_angle(angle_degrees: f64) -> f64 {
    let normalized = angle_degrees.rem_euclid(360.0);
    // rem_euclid can return 360.0 for tiny negative inputs
    if normalized >= 360.0 {
        0.0
    } else {
        normalized
    }
}

/// Number of clockwise quarter turns if `angle_degrees` is a multiple of 90°.
pub fn quarter_turns(angle_degrees: f64) -> Option<u32> {
    let normalized = normalize_angle(angle_degrees);
    let quarters = (normalized / 90.0).round();
    if (normalized - quarters * 90.0).abs() < QUARTER_TURN_EPSILON {
        Some(quarters as u32 % 4)
    } else {
        None
    }
}

/// Compute the dimensions of the bounding box for a rotated image.
///
/// ```text
/// new_w = ceil(w*|cos θ| + h*|sin θ|)
/// new_h = ceil(w*|sin θ| + h*|cos θ|)
/// ```
///
/// Quarter turns are computed exactly. Values within 1e-6 of an integer are
/// snapped before the ceiling so floating error never adds a column.
pub fn rotated_bounds(width: u32, height: u32, angle_degrees: f64) -> (u32, u32) {
    if let Some(quarters) = quarter_turns(angle_degrees) {
        return if quarters % 2 == 0 {
            (width, height)
        } else {
            (height, width)
        };
    }

    let angle_rad = angle_degrees.to_radians();
    let cos = angle_rad.cos().abs();
    let sin = angle_rad.sin().abs();

    let w = width as f64;
    let h = height as f64;

    let new_w = snapped_ceil(w * cos + h * sin);
    let new_h = snapped_ceil(w * sin + h * cos);

    (new_w.max(1), new_h.max(1))
}

fn snapped_ceil(value: f64) -> u32 {
    let nearest = value.round();
    if (value - nearest).abs() < 1e-6 {
        nearest as u32
    } else {
        value.ceil() as u32
    }
}

/// Rotate an image around its center.
///
/// The output canvas is expanded to the bounding box of the rotated source
/// (no clipping); uncovered pixels are fully transparent.
///
/// # Example
///
/// ```ignore
/// use kayablue_core::transform::{rotate, InterpolationFilter};
///
/// let rotated = rotate(&image, 15.0, InterpolationFilter::Bilinear);
/// ```
pub fn rotate(image: &PixelBuffer, angle_degrees: f64, filter: InterpolationFilter) -> PixelBuffer {
    if let Some(quarters) = quarter_turns(angle_degrees) {
        trace!(quarters, "Rotating by quarter turns");
        return rotate_quarter_turns(image, quarters);
    }

    let (src_w, src_h) = (image.width() as f64, image.height() as f64);
    let (dst_w, dst_h) = rotated_bounds(image.width(), image.height(), angle_degrees);
    debug!(
        width = image.width(),
        height = image.height(),
        angle_degrees,
        dst_w,
        dst_h,
        ?filter,
        "Rotating image"
    );

    let angle_rad = angle_degrees.to_radians();
    let cos = angle_rad.cos();
    let sin = angle_rad.sin();

    let src_cx = src_w / 2.0;
    let src_cy = src_h / 2.0;
    let dst_cx = dst_w as f64 / 2.0;
    let dst_cy = dst_h as f64 / 2.0;

    let mut output = Vec::with_capacity(byte_len(dst_w, dst_h).unwrap_or(0));

    for dst_y in 0..dst_h {
        for dst_x in 0..dst_w {
            // Work on pixel centers so the mapping is symmetric
            let dx = dst_x as f64 + 0.5 - dst_cx;
            let dy = dst_y as f64 + 0.5 - dst_cy;

            // Continuous source position in pixel-index space
            let src_x = dx * cos + dy * sin + src_cx - 0.5;
            let src_y = -dx * sin + dy * cos + src_cy - 0.5;

            let pixel = match filter {
                InterpolationFilter::Nearest => sample_nearest(image, src_x, src_y),
                InterpolationFilter::Bilinear => sample_bilinear(image, src_x, src_y),
                InterpolationFilter::Lanczos3 => sample_lanczos3(image, src_x, src_y),
            };
            output.extend_from_slice(&pixel);
        }
    }

    PixelBuffer::from_parts(dst_w, dst_h, output)
}

/// Exact clockwise rotation by `quarters` * 90°.
fn rotate_quarter_turns(image: &PixelBuffer, quarters: u32) -> PixelBuffer {
    let (w, h) = image.dimensions();
    if quarters % 4 == 0 {
        return image.clone();
    }

    let (dst_w, dst_h) = if quarters % 2 == 0 { (w, h) } else { (h, w) };
    let mut output = Vec::with_capacity(image.byte_size());

    for dst_y in 0..dst_h {
        for dst_x in 0..dst_w {
            let (src_x, src_y) = match quarters % 4 {
                1 => (dst_y, h - 1 - dst_x),
                2 => (w - 1 - dst_x, h - 1 - dst_y),
                _ => (w - 1 - dst_y, dst_x),
            };
            let idx = image.index(src_x, src_y);
            output.extend_from_slice(&image.pixels()[idx..idx + CHANNELS]);
        }
    }

    PixelBuffer::from_parts(dst_w, dst_h, output)
}

/// Get a pixel as [f64; 4] at integer coordinates clamped to the image.
#[inline]
fn get_pixel_f64(image: &PixelBuffer, px: i64, py: i64) -> [f64; 4] {
    let x = px.clamp(0, image.width() as i64 - 1) as u32;
    let y = py.clamp(0, image.height() as i64 - 1) as u32;
    let idx = image.index(x, y);
    let p = &image.pixels()[idx..idx + CHANNELS];
    [p[0] as f64, p[1] as f64, p[2] as f64, p[3] as f64]
}

/// True if `(x, y)` lies inside the footprint of the source pixels.
#[inline]
fn covers(image: &PixelBuffer, x: f64, y: f64) -> bool {
    x >= -0.5 && y >= -0.5 && x < image.width() as f64 - 0.5 && y < image.height() as f64 - 0.5
}

#[inline]
fn to_u8(values: [f64; 4]) -> [u8; 4] {
    values.map(|v| v.clamp(0.0, 255.0).round() as u8)
}

fn sample_nearest(image: &PixelBuffer, x: f64, y: f64) -> [u8; 4] {
    if !covers(image, x, y) {
        return TRANSPARENT;
    }
    to_u8(get_pixel_f64(image, x.round() as i64, y.round() as i64))
}

/// Bilinear interpolation over the 4 nearest pixels, weighted by distance.
fn sample_bilinear(image: &PixelBuffer, x: f64, y: f64) -> [u8; 4] {
    if !covers(image, x, y) {
        return TRANSPARENT;
    }

    let x0 = x.floor() as i64;
    let y0 = y.floor() as i64;
    let fx = x - x0 as f64;
    let fy = y - y0 as f64;

    let p00 = get_pixel_f64(image, x0, y0);
    let p10 = get_pixel_f64(image, x0 + 1, y0);
    let p01 = get_pixel_f64(image, x0, y0 + 1);
    let p11 = get_pixel_f64(image, x0 + 1, y0 + 1);

    let mut result = [0.0f64; 4];
    for i in 0..CHANNELS {
        result[i] = p00[i] * (1.0 - fx) * (1.0 - fy)
            + p10[i] * fx * (1.0 - fy)
            + p01[i] * (1.0 - fx) * fy
            + p11[i] * fx * fy;
    }
    to_u8(result)
}

/// Lanczos3 interpolation over a 6x6 neighborhood.
///
/// Falls back to bilinear within the kernel radius of the border.
fn sample_lanczos3(image: &PixelBuffer, x: f64, y: f64) -> [u8; 4] {
    let (w, h) = (image.width() as i64, image.height() as i64);

    if x < 2.0 || x >= (w - 3) as f64 || y < 2.0 || y >= (h - 3) as f64 {
        return sample_bilinear(image, x, y);
    }

    let x0 = x.floor() as i64;
    let y0 = y.floor() as i64;

    let mut sum = [0.0f64; 4];
    let mut weight_sum = 0.0;

    for ky in -2..=3 {
        for kx in -2..=3 {
            let px = x0 + kx;
            let py = y0 + ky;
            let weight = lanczos_weight(x - px as f64, 3.0) * lanczos_weight(y - py as f64, 3.0);

            let pixel = get_pixel_f64(image, px, py);
            for i in 0..CHANNELS {
                sum[i] += pixel[i] * weight;
            }
            weight_sum += weight;
        }
    }

    if weight_sum <= 0.0 {
        return sample_bilinear(image, x, y);
    }
    to_u8(sum.map(|s| s / weight_sum))
}

/// Lanczos kernel weight function.
///
/// ```text
/// L(x) = sinc(x) * sinc(x/a)  for |x| < a
/// L(x) = 0                     for |x| >= a
/// ```
fn lanczos_weight(x: f64, a: f64) -> f64 {
    if x.abs() < f64::EPSILON {
        return 1.0;
    }
    if x.abs() >= a {
        return 0.0;
    }

    let pi_x = std::f64::consts::PI * x;
    let pi_x_a = pi_x / a;
    (a * pi_x.sin() * pi_x_a.sin()) / (pi_x * pi_x)
}
