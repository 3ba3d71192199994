//! Decoding of uploaded image files with EXIF orientation handling.

use std::io::Cursor;

use exif::{In, Reader, Tag};
use image::{DynamicImage, ImageReader};
use tracing::debug;

use super::{DecodeError, ImageMetadata, Orientation, SourceFormat, DEFAULT_MAX_UPLOAD_BYTES};
use crate::buffer::PixelBuffer;

/// Decode an uploaded image with the default 10 MiB upload limit.
///
/// See [`decode_image_with_limit`].
pub fn decode_image(bytes: &[u8]) -> Result<PixelBuffer, DecodeError> {
    decode_image_with_limit(bytes, DEFAULT_MAX_UPLOAD_BYTES)
}

/// Decode PNG, JPEG, WebP or GIF bytes into an RGBA pixel buffer.
///
/// The format is sniffed from the content, not from a file name. EXIF
/// orientation is applied so the buffer matches what a browser displays.
/// Animated GIF and WebP files yield their first frame.
///
/// # Errors
///
/// * `DecodeError::TooLarge` if `bytes` is longer than `max_bytes`
/// * `DecodeError::UnsupportedFormat` for empty input or unknown formats
/// * `DecodeError::Corrupted` if the codec rejects the data
pub fn decode_image_with_limit(bytes: &[u8], max_bytes: usize) -> Result<PixelBuffer, DecodeError> {
    let (reader, format) = sniff(bytes, max_bytes)?;

    let img = reader
        .decode()
        .map_err(|e| DecodeError::Corrupted(e.to_string()))?;

    let orientation = extract_orientation(bytes);
    let oriented = apply_orientation(img, orientation);
    let buffer = PixelBuffer::from_rgba_image(oriented.into_rgba8())?;

    debug!(
        width = buffer.width(),
        height = buffer.height(),
        format = format.mime_type(),
        ?orientation,
        "Decoded image"
    );
    Ok(buffer)
}

/// Read format, dimensions and orientation without decoding pixel data.
pub fn probe_image(bytes: &[u8]) -> Result<ImageMetadata, DecodeError> {
    let (reader, format) = sniff(bytes, usize::MAX)?;
    let (width, height) = reader
        .into_dimensions()
        .map_err(|e| DecodeError::Corrupted(e.to_string()))?;

    Ok(ImageMetadata {
        width,
        height,
        format,
        orientation: extract_orientation(bytes),
        file_size: bytes.len(),
    })
}

/// Extract the EXIF orientation from encoded bytes (for external use).
pub fn get_orientation(bytes: &[u8]) -> Orientation {
    extract_orientation(bytes)
}

fn sniff(
    bytes: &[u8],
    max_bytes: usize,
) -> Result<(ImageReader<Cursor<&[u8]>>, SourceFormat), DecodeError> {
    if bytes.is_empty() {
        return Err(DecodeError::UnsupportedFormat);
    }
    if bytes.len() > max_bytes {
        return Err(DecodeError::TooLarge {
            size: bytes.len(),
            limit: max_bytes,
        });
    }

    let reader = ImageReader::new(Cursor::new(bytes))
        .with_guessed_format()
        .map_err(|e| DecodeError::Corrupted(e.to_string()))?;

    let format = reader
        .format()
        .and_then(SourceFormat::from_image_format)
        .ok_or(DecodeError::UnsupportedFormat)?;

    Ok((reader, format))
}

/// Returns `Orientation::UPRIGHT` if no EXIF data is found or orientation
/// cannot be determined.
fn extract_orientation(bytes: &[u8]) -> Orientation {
    let exif_reader = Reader::new();
    let mut cursor = Cursor::new(bytes);

    match exif_reader.read_from_container(&mut cursor) {
        Ok(exif) => exif
            .get_field(Tag::Orientation, In::PRIMARY)
            .and_then(|field| field.value.get_uint(0))
            .map(Orientation::from_exif)
            .unwrap_or_default(),
        Err(_) => Orientation::UPRIGHT,
    }
}

fn apply_orientation(img: DynamicImage, orientation: Orientation) -> DynamicImage {
    let img = if orientation.mirrored { img.fliph() } else { img };
    match orientation.quarter_turns % 4 {
        1 => img.rotate90(),
        2 => img.rotate180(),
        3 => img.rotate270(),
        _ => img,
    }
}
