//! PNG encoding for the native save path.

use image::codecs::png::PngEncoder;
use image::{ExtendedColorType, ImageEncoder};

use super::{check_rgba, EncodeError};
use crate::raster::RasterImage;

/// Encode a straight-alpha RGBA raster as PNG. Lossless.
pub fn encode_png(image: &RasterImage) -> Result<Vec<u8>, EncodeError> {
    check_rgba(image)?;

    let mut buffer = Vec::new();
    PngEncoder::new(&mut buffer)
        .write_image(&image.pixels, image.width, image.height, ExtendedColorType::Rgba8)
        .map_err(|e| EncodeError::EncodingFailed(e.to_string()))?;

    Ok(buffer)
}
