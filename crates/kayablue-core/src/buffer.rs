//! The RGBA pixel buffer that every pipeline stage consumes and produces.
//!
//! A `PixelBuffer` is never mutated after construction. Operations borrow the
//! current buffer and hand back a new one, so the edit session can swap its
//! authoritative buffer in a single assignment.

use thiserror::Error;

/// Bytes per RGBA pixel.
pub const CHANNELS: usize = 4;

/// Errors raised when constructing a buffer from raw parts.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum BufferError {
    /// Width or height is zero.
    #[error("Invalid dimensions: width ({width}) and height ({height}) must be non-zero")]
    ZeroDimension { width: u32, height: u32 },

    /// `width * height * 4` does not fit in memory.
    #[error("Image of {width}x{height} is too large to allocate")]
    TooLarge { width: u32, height: u32 },

    /// Pixel data length doesn't match the dimensions.
    #[error("Invalid pixel data: expected {expected} bytes (width * height * 4), got {actual}")]
    LengthMismatch { expected: usize, actual: usize },
}

/// Number of bytes needed for a `width` x `height` RGBA raster, if it fits.
pub fn byte_len(width: u32, height: u32) -> Option<usize> {
    (width as usize)
        .checked_mul(height as usize)?
        .checked_mul(CHANNELS)
}

/// A decoded image with RGBA pixel data (8 bits per channel, row-major).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PixelBuffer {
    width: u32,
    height: u32,
    pixels: Vec<u8>,
}

impl PixelBuffer {
    /// Wrap raw RGBA bytes, checking that the length matches the dimensions.
    pub fn from_raw(width: u32, height: u32, pixels: Vec<u8>) -> Result<Self, BufferError> {
        if width == 0 || height == 0 {
            return Err(BufferError::ZeroDimension { width, height });
        }
        let expected = byte_len(width, height).ok_or(BufferError::TooLarge { width, height })?;
        if pixels.len() != expected {
            return Err(BufferError::LengthMismatch {
                expected,
                actual: pixels.len(),
            });
        }
        Ok(Self {
            width,
            height,
            pixels,
        })
    }

    /// Create a buffer filled with a single RGBA color.
    pub fn filled(width: u32, height: u32, rgba: [u8; 4]) -> Result<Self, BufferError> {
        if width == 0 || height == 0 {
            return Err(BufferError::ZeroDimension { width, height });
        }
        let len = byte_len(width, height).ok_or(BufferError::TooLarge { width, height })?;
        let pixels = rgba.iter().copied().cycle().take(len).collect();
        Ok(Self {
            width,
            height,
            pixels,
        })
    }

    /// Build a buffer from pixels produced inside the crate, where the
    /// length has already been derived from the dimensions.
    pub(crate) fn from_parts(width: u32, height: u32, pixels: Vec<u8>) -> Self {
        debug_assert!(width > 0 && height > 0, "Zero-sized pixel buffer");
        debug_assert_eq!(
            Some(pixels.len()),
            byte_len(width, height),
            "Pixel buffer size mismatch"
        );
        Self {
            width,
            height,
            pixels,
        }
    }

    /// Create a PixelBuffer from an `image::RgbaImage`.
    pub fn from_rgba_image(img: image::RgbaImage) -> Result<Self, BufferError> {
        let (width, height) = img.dimensions();
        Self::from_raw(width, height, img.into_raw())
    }

    /// Copy into an `image::RgbaImage` for processing with the `image` crate.
    pub fn to_rgba_image(&self) -> image::RgbaImage {
        // Length is an invariant of the type, so `from_raw` cannot fail here;
        // fall back to a blank canvas rather than panicking.
        image::RgbaImage::from_raw(self.width, self.height, self.pixels.clone())
            .unwrap_or_else(|| image::RgbaImage::new(self.width, self.height))
    }

    #[inline]
    pub fn width(&self) -> u32 {
        self.width
    }

    #[inline]
    pub fn height(&self) -> u32 {
        self.height
    }

    #[inline]
    pub fn dimensions(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    /// Raw RGBA bytes.
    #[inline]
    pub fn pixels(&self) -> &[u8] {
        &self.pixels
    }

    /// Give up ownership of the raw RGBA bytes.
    pub fn into_pixels(self) -> Vec<u8> {
        self.pixels
    }

    /// Get the total number of pixels.
    pub fn pixel_count(&self) -> usize {
        self.width as usize * self.height as usize
    }

    /// Get the size of the pixel buffer in bytes.
    pub fn byte_size(&self) -> usize {
        self.pixels.len()
    }

    /// The RGBA value at `(x, y)`, or `None` outside the buffer.
    pub fn pixel(&self, x: u32, y: u32) -> Option<[u8; 4]> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let idx = self.index(x, y);
        let mut px = [0u8; 4];
        px.copy_from_slice(&self.pixels[idx..idx + CHANNELS]);
        Some(px)
    }

    /// True when every pixel has alpha 255.
    pub fn is_opaque(&self) -> bool {
        self.pixels.chunks_exact(CHANNELS).all(|px| px[3] == 255)
    }

    #[inline]
    pub(crate) fn index(&self, x: u32, y: u32) -> usize {
        (y as usize * self.width as usize + x as usize) * CHANNELS
    }

    /// One row of RGBA bytes.
    #[inline]
    pub(crate) fn row(&self, y: u32) -> &[u8] {
        let stride = self.width as usize * CHANNELS;
        let start = y as usize * stride;
        &self.pixels[start..start + stride]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_raw_valid() {
        let buf = PixelBuffer::from_raw(100, 50, vec![0u8; 100 * 50 * 4]).unwrap();

        assert_eq!(buf.width(), 100);
        assert_eq!(buf.height(), 50);
        assert_eq!(buf.pixel_count(), 5000);
        assert_eq!(buf.byte_size(), 20000);
    }

    #[test]
    fn test_from_raw_length_mismatch() {
        let err = PixelBuffer::from_raw(10, 10, vec![0u8; 10 * 10 * 3]).unwrap_err();
        assert_eq!(
            err,
            BufferError::LengthMismatch {
                expected: 400,
                actual: 300
            }
        );
    }

    #[test]
    fn test_from_raw_zero_dimension() {
        assert!(matches!(
            PixelBuffer::from_raw(0, 10, vec![]),
            Err(BufferError::ZeroDimension { .. })
        ));
        assert!(matches!(
            PixelBuffer::from_raw(10, 0, vec![]),
            Err(BufferError::ZeroDimension { .. })
        ));
    }

    #[test]
    fn test_filled() {
        let buf = PixelBuffer::filled(3, 2, [1, 2, 3, 4]).unwrap();
        assert_eq!(buf.byte_size(), 24);
        assert_eq!(buf.pixel(2, 1), Some([1, 2, 3, 4]));
    }

    #[test]
    fn test_pixel_out_of_bounds() {
        let buf = PixelBuffer::filled(2, 2, [9, 9, 9, 255]).unwrap();
        assert_eq!(buf.pixel(2, 0), None);
        assert_eq!(buf.pixel(0, 2), None);
    }

    #[test]
    fn test_pixel_addressing() {
        let pixels: Vec<u8> = (0..2 * 2 * 4).map(|i| i as u8).collect();
        let buf = PixelBuffer::from_raw(2, 2, pixels).unwrap();

        assert_eq!(buf.pixel(0, 0), Some([0, 1, 2, 3]));
        assert_eq!(buf.pixel(1, 0), Some([4, 5, 6, 7]));
        assert_eq!(buf.pixel(0, 1), Some([8, 9, 10, 11]));
        assert_eq!(buf.row(1), &[8, 9, 10, 11, 12, 13, 14, 15]);
    }

    #[test]
    fn test_is_opaque() {
        let opaque = PixelBuffer::filled(4, 4, [10, 20, 30, 255]).unwrap();
        assert!(opaque.is_opaque());

        let clear = PixelBuffer::filled(4, 4, [10, 20, 30, 0]).unwrap();
        assert!(!clear.is_opaque());
    }

    #[test]
    fn test_rgba_image_round_trip() {
        let buf = PixelBuffer::filled(5, 3, [200, 100, 50, 128]).unwrap();
        let img = buf.to_rgba_image();
        assert_eq!(img.dimensions(), (5, 3));

        let back = PixelBuffer::from_rgba_image(img).unwrap();
        assert_eq!(back, buf);
    }

    #[test]
    fn test_byte_len_overflow() {
        assert_eq!(byte_len(10, 10), Some(400));
        assert!(byte_len(u32::MAX, u32::MAX).is_none());
    }

    #[test]
    fn test_error_display() {
        let err = BufferError::ZeroDimension {
            width: 0,
            height: 5,
        };
        assert_eq!(
            err.to_string(),
            "Invalid dimensions: width (0) and height (5) must be non-zero"
        );
    }
}
