//! Separable Gaussian blur.
//!
//! The blur runs on premultiplied alpha so transparent neighbours do not
//! pull dark fringes into visible edges. Samples past the border repeat the
//! edge pixel.

use tracing::{debug, trace};

use crate::buffer::CHANNELS;

/// Normalized 1D Gaussian weights with `sigma = radius` and a half-width of
/// `ceil(3 * sigma)`.
pub fn gaussian_kernel(radius: f64) -> Vec<f32> {
    if !radius.is_finite() || radius <= 0.0 {
        return vec![1.0];
    }

    let half = (3.0 * radius).ceil() as i64;
    let sigma2 = 2.0 * radius * radius;

    let mut weights: Vec<f64> = (-half..=half)
        .map(|i| (-((i * i) as f64) / sigma2).exp())
        .collect();
    let sum: f64 = weights.iter().sum();
    for w in &mut weights {
        *w /= sum;
    }

    weights.into_iter().map(|w| w as f32).collect()
}

/// Blur RGBA pixel data in place.
///
/// A radius of zero (or less) leaves the data untouched.
pub fn gaussian_blur(pixels: &mut [u8], width: u32, height: u32, radius: f64) {
    let (width, height) = (width as usize, height as usize);
    if radius <= 0.0 || width == 0 || height == 0 {
        trace!(radius, "Blur skipped");
        return;
    }
    if pixels.len() != width * height * CHANNELS {
        return;
    }

    debug!(width, height, radius, "Applying gaussian blur");

    let kernel = gaussian_kernel(radius);
    let premultiplied = premultiply(pixels);
    let temp = blur_horizontal(&premultiplied, width, height, &kernel);
    let blurred = blur_vertical(&temp, width, height, &kernel);
    unpremultiply(&blurred, pixels);
}

fn premultiply(pixels: &[u8]) -> Vec<f32> {
    let mut out = Vec::with_capacity(pixels.len());
    for px in pixels.chunks_exact(CHANNELS) {
        let a = px[3] as f32;
        out.push(px[0] as f32 * a / 255.0);
        out.push(px[1] as f32 * a / 255.0);
        out.push(px[2] as f32 * a / 255.0);
        out.push(a);
    }
    out
}

fn unpremultiply(src: &[f32], dst: &mut [u8]) {
    for (s, d) in src.chunks_exact(CHANNELS).zip(dst.chunks_exact_mut(CHANNELS)) {
        let a = s[3];
        let alpha = to_byte(a);
        if alpha == 0 {
            d.copy_from_slice(&[0, 0, 0, 0]);
            continue;
        }
        d[0] = to_byte(s[0] * 255.0 / a);
        d[1] = to_byte(s[1] * 255.0 / a);
        d[2] = to_byte(s[2] * 255.0 / a);
        d[3] = alpha;
    }
}

#[inline]
fn to_byte(value: f32) -> u8 {
    value.clamp(0.0, 255.0).round() as u8
}

/// Horizontal blur pass.
fn blur_horizontal(src: &[f32], width: usize, height: usize, kernel: &[f32]) -> Vec<f32> {
    let mut dst = vec![0.0f32; src.len()];
    let half = (kernel.len() / 2) as isize;
    let max_x = width as isize - 1;

    for y in 0..height {
        let row = y * width;
        for x in 0..width {
            let mut sum = [0.0f32; CHANNELS];
            for (k, w) in kernel.iter().enumerate() {
                let sx = (x as isize + k as isize - half).clamp(0, max_x) as usize;
                let base = (row + sx) * CHANNELS;
                for (acc, v) in sum.iter_mut().zip(&src[base..base + CHANNELS]) {
                    *acc += v * w;
                }
            }
            let base = (row + x) * CHANNELS;
            dst[base..base + CHANNELS].copy_from_slice(&sum);
        }
    }

    dst
}

/// Vertical blur pass.
fn blur_vertical(src: &[f32], width: usize, height: usize, kernel: &[f32]) -> Vec<f32> {
    let mut dst = vec![0.0f32; src.len()];
    let half = (kernel.len() / 2) as isize;
    let max_y = height as isize - 1;

    for y in 0..height {
        for x in 0..width {
            let mut sum = [0.0f32; CHANNELS];
            for (k, w) in kernel.iter().enumerate() {
                let sy = (y as isize + k as isize - half).clamp(0, max_y) as usize;
                let base = (sy * width + x) * CHANNELS;
                for (acc, v) in sum.iter_mut().zip(&src[base..base + CHANNELS]) {
                    *acc += v * w;
                }
            }
            let base = (y * width + x) * CHANNELS;
            dst[base..base + CHANNELS].copy_from_slice(&sum);
        }
    }

    dst
}
