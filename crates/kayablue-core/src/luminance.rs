//! Luma and sepia weights shared by the color filters.
//!
//! Luma uses the ITU-R BT.601 coefficients, matching the filters the editor
//! has always shipped. Values are in 0-255 space and are not clamped.

/// ITU-R BT.601 coefficient for the red channel.
pub const LUMA_R: f64 = 0.2989;

/// ITU-R BT.601 coefficient for the green channel.
pub const LUMA_G: f64 = 0.5870;

/// ITU-R BT.601 coefficient for the blue channel.
pub const LUMA_B: f64 = 0.1140;

/// Sepia tone matrix, one row per output channel.
pub const SEPIA: [[f64; 3]; 3] = [
    [0.393, 0.769, 0.189],
    [0.349, 0.686, 0.168],
    [0.272, 0.534, 0.131],
];

/// Luma of an RGB triple in 0-255 space.
#[inline]
pub fn luma(r: f64, g: f64, b: f64) -> f64 {
    LUMA_R * r + LUMA_G * g + LUMA_B * b
}

/// The full-strength sepia tone of an RGB triple.
#[inline]
pub fn sepia_tone(r: f64, g: f64, b: f64) -> (f64, f64, f64) {
    let row = |m: [f64; 3]| m[0] * r + m[1] * g + m[2] * b;
    (row(SEPIA[0]), row(SEPIA[1]), row(SEPIA[2]))
}
