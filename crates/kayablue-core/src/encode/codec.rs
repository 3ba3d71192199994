//! Encoding pixel buffers for download and for the compress/convert tools.
//!
//! PNG is always lossless. JPEG maps quality onto the codec's 1-100 scale.
//! The `image` crate only writes lossless WebP, so below full quality the
//! RGB channels are first reduced to fewer levels, which the encoder then
//! packs smaller. Alpha stays exact for WebP.
//!
//! JPEG has no alpha channel and transparent areas come out black, matching
//! what a browser canvas export produces.

use std::fmt;
use std::io::Cursor;
use std::str::FromStr;

use image::codecs::jpeg::JpegEncoder;
use image::codecs::png::PngEncoder;
use image::codecs::webp::WebPEncoder;
use image::{ExtendedColorType, ImageEncoder};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, trace};

use crate::buffer::PixelBuffer;
use crate::decode::{decode_image_with_limit, DecodeError};

/// Default quality for lossy output, the browser's `toDataURL` default.
pub const DEFAULT_QUALITY: f32 = 0.92;

/// Errors that can occur during encoding.
#[derive(Debug, Error)]
pub enum EncodeError {
    /// Format name or MIME type is not one of png, jpeg or webp
    #[error("Unsupported output format: {0}")]
    UnsupportedFormat(String),

    /// Quality is NaN or infinite
    #[error("Invalid quality {0}: must be a finite number between 0 and 1")]
    InvalidQuality(f32),

    /// The codec rejected the image
    #[error("Encoding failed: {0}")]
    EncodingFailed(String),

    /// Encoded output could not be read back for a preview
    #[error("Encoded output could not be decoded: {0}")]
    Decode(#[from] DecodeError),
}

/// Output file formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    #[default]
    Png,
    Jpeg,
    WebP,
}

impl OutputFormat {
    /// MIME type of the encoded file.
    pub fn mime_type(self) -> &'static str {
        match self {
            OutputFormat::Png => "image/png",
            OutputFormat::Jpeg => "image/jpeg",
            OutputFormat::WebP => "image/webp",
        }
    }

    /// File extension without the dot.
    pub fn extension(self) -> &'static str {
        match self {
            OutputFormat::Png => "png",
            OutputFormat::Jpeg => "jpg",
            OutputFormat::WebP => "webp",
        }
    }

    /// Whether the quality setting changes the output.
    pub fn is_lossy(self) -> bool {
        matches!(self, OutputFormat::Jpeg | OutputFormat::WebP)
    }
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.extension())
    }
}

impl FromStr for OutputFormat {
    type Err = EncodeError;

    /// Parse a short name (`png`, `jpg`, `jpeg`, `webp`) or a MIME type.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let name = s.trim().to_ascii_lowercase();
        let name = name.strip_prefix("image/").unwrap_or(&name);
        match name {
            "png" => Ok(OutputFormat::Png),
            "jpg" | "jpeg" => Ok(OutputFormat::Jpeg),
            "webp" => Ok(OutputFormat::WebP),
            _ => Err(EncodeError::UnsupportedFormat(s.to_string())),
        }
    }
}

/// Output format plus quality (0.0 to 1.0, ignored by lossless formats).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct EncodeSpec {
    pub format: OutputFormat,
    pub quality: f32,
}

impl Default for EncodeSpec {
    fn default() -> Self {
        Self {
            format: OutputFormat::Png,
            quality: DEFAULT_QUALITY,
        }
    }
}

impl EncodeSpec {
    pub fn new(format: OutputFormat, quality: f32) -> Self {
        Self { format, quality }
    }

    /// Quality clamped into `[0, 1]`.
    ///
    /// # Errors
    ///
    /// Returns `EncodeError::InvalidQuality` for NaN or infinite values.
    pub fn checked_quality(&self) -> Result<f32, EncodeError> {
        if !self.quality.is_finite() {
            return Err(EncodeError::InvalidQuality(self.quality));
        }
        Ok(self.quality.clamp(0.0, 1.0))
    }

    /// The spec the compress tool encodes with: lossless formats switch to
    /// WebP, which keeps transparency.
    pub fn for_compression(self) -> Self {
        if self.format.is_lossy() {
            self
        } else {
            Self {
                format: OutputFormat::WebP,
                ..self
            }
        }
    }
}

/// An encoded image.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Encoded {
    pub bytes: Vec<u8>,
    pub format: OutputFormat,
}

impl Encoded {
    /// Size of the encoded file in bytes.
    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    pub fn mime_type(&self) -> &'static str {
        self.format.mime_type()
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.bytes
    }

    /// Decode the encoded bytes back into a buffer, showing the codec loss.
    ///
    /// The upload limit does not apply here.
    pub fn decode(&self) -> Result<PixelBuffer, EncodeError> {
        Ok(decode_image_with_limit(&self.bytes, usize::MAX)?)
    }
}

/// Map quality in `[0, 1]` onto the JPEG encoder's 1-100 scale.
pub fn jpeg_quality(quality: f32) -> u8 {
    (quality * 100.0).round().clamp(1.0, 100.0) as u8
}

/// Number of levels per RGB channel for WebP at `quality`.
///
/// Full quality keeps all 256. Lower values fall off quadratically so the
/// top of the slider stays close to the source.
pub fn webp_levels(quality: f32) -> u16 {
    if quality >= 1.0 {
        return 256;
    }
    let q = quality.clamp(0.0, 1.0);
    (2.0 + q * q * 254.0).round().clamp(2.0, 255.0) as u16
}

/// Snap RGB to `levels` evenly spaced values; alpha is left alone.
fn quantize_rgb(rgba: &mut [u8], levels: u16) {
    if levels >= 256 {
        return;
    }
    let step = 255.0 / (levels as f32 - 1.0);
    for px in rgba.chunks_exact_mut(4) {
        for c in &mut px[..3] {
            let bucket = (*c as f32 / step).round();
            *c = (bucket * step).round().clamp(0.0, 255.0) as u8;
        }
    }
}

/// Encode a buffer according to `spec`.
///
/// # Errors
///
/// Returns `EncodeError::InvalidQuality` for a non-finite quality and
/// `EncodeError::EncodingFailed` if the codec fails.
///
/// # Example
///
/// ```
/// use kayablue_core::{encode, EncodeSpec, OutputFormat, PixelBuffer};
///
/// let image = PixelBuffer::filled(10, 10, [128, 128, 128, 255]).unwrap();
/// let jpeg = encode(&image, &EncodeSpec::new(OutputFormat::Jpeg, 0.9)).unwrap();
///
/// // Verify JPEG magic bytes
/// assert_eq!(&jpeg.bytes[0..2], &[0xFF, 0xD8]);
/// ```
pub fn encode(image: &PixelBuffer, spec: &EncodeSpec) -> Result<Encoded, EncodeError> {
    let quality = spec.checked_quality()?;
    let (width, height) = image.dimensions();

    let mut buffer = Cursor::new(Vec::new());
    let result = match spec.format {
        OutputFormat::Png => PngEncoder::new(&mut buffer).write_image(
            image.pixels(),
            width,
            height,
            ExtendedColorType::Rgba8,
        ),
        OutputFormat::Jpeg => JpegEncoder::new_with_quality(&mut buffer, jpeg_quality(quality))
            .write_image(
                &flatten_onto_black(image.pixels()),
                width,
                height,
                ExtendedColorType::Rgb8,
            ),
        OutputFormat::WebP => {
            let levels = webp_levels(quality);
            let mut rgba = image.pixels().to_vec();
            quantize_rgb(&mut rgba, levels);
            trace!(levels, "Quantized RGB for WebP");
            WebPEncoder::new_lossless(&mut buffer).write_image(
                &rgba,
                width,
                height,
                ExtendedColorType::Rgba8,
            )
        }
    };
    result.map_err(|e| EncodeError::EncodingFailed(e.to_string()))?;

    let bytes = buffer.into_inner();
    debug!(
        width,
        height,
        format = %spec.format,
        quality,
        encoded_bytes = bytes.len(),
        "Encoded image"
    );

    Ok(Encoded {
        bytes,
        format: spec.format,
    })
}

/// Drop alpha by compositing RGBA over black.
fn flatten_onto_black(rgba: &[u8]) -> Vec<u8> {
    let mut rgb = Vec::with_capacity(rgba.len() / 4 * 3);
    for px in rgba.chunks_exact(4) {
        let a = px[3] as u32;
        for &c in &px[..3] {
            rgb.push(((c as u32 * a + 127) / 255) as u8);
        }
    }
    rgb
}

#[cfg(test)]
mod tests {
    use super::*;

    fn gradient(width: u32, height: u32) -> PixelBuffer {
        let mut pixels = Vec::with_capacity((width * height * 4) as usize);
        for y in 0..height {
            for x in 0..width {
                pixels.extend_from_slice(&[
                    ((x * 255) / width) as u8,
                    ((y * 255) / height) as u8,
                    ((x + y) % 256) as u8,
                    255,
                ]);
            }
        }
        PixelBuffer::from_raw(width, height, pixels).unwrap()
    }

    // ===== Format Parsing Tests =====

    #[test]
    fn test_parse_short_names() {
        assert_eq!("png".parse::<OutputFormat>().unwrap(), OutputFormat::Png);
        assert_eq!("jpg".parse::<OutputFormat>().unwrap(), OutputFormat::Jpeg);
        assert_eq!("JPEG".parse::<OutputFormat>().unwrap(), OutputFormat::Jpeg);
        assert_eq!("webp".parse::<OutputFormat>().unwrap(), OutputFormat::WebP);
    }

    #[test]
    fn test_parse_mime_types() {
        assert_eq!("image/png".parse::<OutputFormat>().unwrap(), OutputFormat::Png);
        assert_eq!("image/jpeg".parse::<OutputFormat>().unwrap(), OutputFormat::Jpeg);
        assert_eq!("image/webp".parse::<OutputFormat>().unwrap(), OutputFormat::WebP);
    }

    #[test]
    fn test_parse_unsupported() {
        match "image/bmp".parse::<OutputFormat>() {
            Err(EncodeError::UnsupportedFormat(name)) => assert_eq!(name, "image/bmp"),
            other => panic!("Expected UnsupportedFormat, got {other:?}"),
        }
        assert!("".parse::<OutputFormat>().is_err());
    }

    #[test]
    fn test_format_metadata() {
        assert_eq!(OutputFormat::Jpeg.extension(), "jpg");
        assert_eq!(OutputFormat::WebP.mime_type(), "image/webp");
        assert_eq!(OutputFormat::Png.to_string(), "png");
        assert!(OutputFormat::Jpeg.is_lossy());
        assert!(OutputFormat::WebP.is_lossy());
        assert!(!OutputFormat::Png.is_lossy());
    }

    #[test]
    fn test_jpeg_quality_mapping() {
        assert_eq!(jpeg_quality(0.0), 1);
        assert_eq!(jpeg_quality(0.5), 50);
        assert_eq!(jpeg_quality(0.92), 92);
        assert_eq!(jpeg_quality(1.0), 100);
    }

    // ===== Encoding Tests =====

    #[test]
    fn test_encode_png_magic_and_round_trip() {
        let img = gradient(16, 8);
        let encoded = encode(&img, &EncodeSpec::default()).unwrap();

        assert_eq!(&encoded.bytes[0..8], &[0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A]);
        assert_eq!(encoded.mime_type(), "image/png");
        assert_eq!(encoded.decode().unwrap(), img, "PNG must be lossless");
    }

    #[test]
    fn test_encode_png_ignores_quality() {
        let img = gradient(20, 20);
        let low = encode(&img, &EncodeSpec::new(OutputFormat::Png, 0.1)).unwrap();
        let high = encode(&img, &EncodeSpec::new(OutputFormat::Png, 1.0)).unwrap();
        assert_eq!(low.bytes, high.bytes);
    }

    #[test]
    fn test_encode_jpeg_markers() {
        let img = gradient(32, 32);
        let encoded = encode(&img, &EncodeSpec::new(OutputFormat::Jpeg, 0.9)).unwrap();

        assert_eq!(&encoded.bytes[0..2], &[0xFF, 0xD8]);
        let len = encoded.len();
        assert_eq!(&encoded.bytes[len - 2..], &[0xFF, 0xD9]);
        assert_eq!(encoded.mime_type(), "image/jpeg");
    }

    #[test]
    fn test_encode_jpeg_quality_affects_size() {
        let img = gradient(64, 64);
        let low = encode(&img, &EncodeSpec::new(OutputFormat::Jpeg, 0.1)).unwrap();
        let high = encode(&img, &EncodeSpec::new(OutputFormat::Jpeg, 0.95)).unwrap();
        assert!(
            low.len() < high.len(),
            "Low quality ({}) should be smaller than high quality ({})",
            low.len(),
            high.len()
        );
    }

    #[test]
    fn test_encode_jpeg_flattens_alpha_onto_black() {
        let img = PixelBuffer::filled(16, 16, [255, 255, 255, 0]).unwrap();
        let encoded = encode(&img, &EncodeSpec::new(OutputFormat::Jpeg, 1.0)).unwrap();
        let decoded = encoded.decode().unwrap();

        assert!(decoded.is_opaque());
        for px in decoded.pixels().chunks_exact(4) {
            assert!(px[0] < 8 && px[1] < 8 && px[2] < 8, "Expected black, got {px:?}");
        }
    }

    #[test]
    fn test_encode_webp_full_quality_is_lossless() {
        let img = gradient(12, 9);
        let encoded = encode(&img, &EncodeSpec::new(OutputFormat::WebP, 1.0)).unwrap();

        assert_eq!(&encoded.bytes[0..4], b"RIFF");
        assert_eq!(&encoded.bytes[8..12], b"WEBP");
        assert_eq!(encoded.decode().unwrap(), img);
    }

    #[test]
    fn test_encode_webp_quality_affects_size() {
        let img = gradient(64, 64);
        let low = encode(&img, &EncodeSpec::new(OutputFormat::WebP, 0.05)).unwrap();
        let high = encode(&img, &EncodeSpec::new(OutputFormat::WebP, 1.0)).unwrap();

        assert_ne!(low.bytes, high.bytes);
        assert!(
            low.len() < high.len(),
            "Low quality ({}) should be smaller than high quality ({})",
            low.len(),
            high.len()
        );
        assert_ne!(low.decode().unwrap(), img);
    }

    #[test]
    fn test_encode_webp_keeps_alpha() {
        let img = PixelBuffer::filled(8, 8, [200, 40, 90, 77]).unwrap();
        let encoded = encode(&img, &EncodeSpec::new(OutputFormat::WebP, 0.2)).unwrap();
        let decoded = encoded.decode().unwrap();
        for px in decoded.pixels().chunks_exact(4) {
            assert_eq!(px[3], 77);
        }
    }

    #[test]
    fn test_webp_levels() {
        assert_eq!(webp_levels(1.0), 256);
        assert_eq!(webp_levels(0.0), 2);
        assert_eq!(webp_levels(0.5), 66);
        assert!(webp_levels(0.92) < 256);
    }

    #[test]
    fn test_quantize_rgb_snaps_to_levels() {
        let mut px = [10, 128, 250, 33];
        quantize_rgb(&mut px, 2);
        assert_eq!(px, [0, 255, 255, 33]);

        let mut px = [10, 128, 250, 33];
        quantize_rgb(&mut px, 256);
        assert_eq!(px, [10, 128, 250, 33]);
    }

    #[test]
    fn test_for_compression() {
        let png = EncodeSpec::new(OutputFormat::Png, 0.4).for_compression();
        assert_eq!(png, EncodeSpec::new(OutputFormat::WebP, 0.4));

        let jpeg = EncodeSpec::new(OutputFormat::Jpeg, 0.4);
        assert_eq!(jpeg.for_compression(), jpeg);
    }

    #[test]
    fn test_out_of_range_quality_is_clamped() {
        let img = gradient(8, 8);
        let over = encode(&img, &EncodeSpec::new(OutputFormat::Jpeg, 7.0)).unwrap();
        let max = encode(&img, &EncodeSpec::new(OutputFormat::Jpeg, 1.0)).unwrap();
        assert_eq!(over.bytes, max.bytes);
    }

    #[test]
    fn test_non_finite_quality_rejected() {
        let img = gradient(8, 8);
        for quality in [f32::NAN, f32::INFINITY, f32::NEG_INFINITY] {
            let result = encode(&img, &EncodeSpec::new(OutputFormat::Jpeg, quality));
            assert!(matches!(result, Err(EncodeError::InvalidQuality(_))));
        }
    }

    #[test]
    fn test_flatten_onto_black() {
        let rgb = flatten_onto_black(&[200, 100, 50, 255, 200, 100, 50, 0, 255, 255, 255, 128]);
        assert_eq!(rgb, vec![200, 100, 50, 0, 0, 0, 128, 128, 128]);
    }

    #[test]
    fn test_encode_spec_serde() {
        let spec: EncodeSpec = serde_json::from_str(r#"{"format":"webp"}"#).unwrap();
        assert_eq!(spec.format, OutputFormat::WebP);
        assert_eq!(spec.quality, DEFAULT_QUALITY);
    }
}
