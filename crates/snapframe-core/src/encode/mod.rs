//! Image encoding for export.
//!
//! Flattened composites are encoded as JPEG (browser download path) or PNG
//! (native save path). [`encode_raster`] picks the codec from an
//! [`ImageFormat`] so callers can stay format-agnostic.

mod jpeg;
mod png;

use serde::{Deserialize, Serialize};

use crate::raster::RasterImage;

pub use jpeg::encode_jpeg;
pub use png::encode_png;

use thiserror::Error;

/// Errors that can occur during encoding.
#[derive(Debug, Error)]
pub enum EncodeError {
    /// Pixel data length doesn't match expected dimensions
    #[error("Invalid pixel data: expected {expected} bytes, got {actual}")]
    InvalidPixelData { expected: usize, actual: usize },

    /// Width or height is zero
    #[error("Invalid dimensions: width ({width}) and height ({height}) must be non-zero")]
    InvalidDimensions { width: u32, height: u32 },

    /// The codec rejected the image
    #[error("Encoding failed: {0}")]
    EncodingFailed(String),
}

/// Output container for exported images.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ImageFormat {
    #[default]
    Png,
    Jpeg,
}

impl ImageFormat {
    /// Conventional file extension, without the dot.
    pub fn extension(self) -> &'static str {
        match self {
            ImageFormat::Png => "png",
            ImageFormat::Jpeg => "jpeg",
        }
    }

    /// MIME type for downloads.
    pub fn mime_type(self) -> &'static str {
        match self {
            ImageFormat::Png => "image/png",
            ImageFormat::Jpeg => "image/jpeg",
        }
    }
}

/// Encode an RGBA raster in the requested format.
///
/// `quality` is on a 0.0 to 1.0 scale and only affects JPEG. Alpha is
/// dropped for JPEG, so callers should flatten onto an opaque background
/// first.
pub fn encode_raster(
    image: &RasterImage,
    format: ImageFormat,
    quality: f32,
) -> Result<Vec<u8>, EncodeError> {
    match format {
        ImageFormat::Png => encode_png(image),
        ImageFormat::Jpeg => encode_jpeg(image, quality_to_percent(quality)),
    }
}

/// Reject empty rasters and buffers that are not `width * height` RGBA.
fn check_rgba(image: &RasterImage) -> Result<(), EncodeError> {
    let (width, height) = (image.width, image.height);
    if width == 0 || height == 0 {
        return Err(EncodeError::InvalidDimensions { width, height });
    }
    let expected = image.expected_len();
    if image.pixels.len() != expected {
        return Err(EncodeError::InvalidPixelData {
            expected,
            actual: image.pixels.len(),
        });
    }
    Ok(())
}

/// Map a 0.0 to 1.0 quality onto the JPEG encoder's 1 to 100 scale.
pub fn quality_to_percent(quality: f32) -> u8 {
    if !quality.is_finite() {
        return 100;
    }
    (quality.clamp(0.0, 1.0) * 100.0).round().max(1.0) as u8
}
