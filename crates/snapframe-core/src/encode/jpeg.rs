//! JPEG encoding for the browser download path.

use image::codecs::jpeg::JpegEncoder;
use image::{ExtendedColorType, ImageEncoder};

use super::{check_rgba, EncodeError};
use crate::raster::RasterImage;

/// Encode an opaque RGBA raster as baseline JPEG.
///
/// Alpha is discarded, so transparent regions come out with whatever color
/// their pixels carry. `quality` is on the encoder's 1 to 100 scale and is
/// clamped into it.
pub fn encode_jpeg(image: &RasterImage, quality: u8) -> Result<Vec<u8>, EncodeError> {
    check_rgba(image)?;

    let rgb = image.to_rgb_bytes();
    let mut buffer = Vec::with_capacity(rgb.len() / 8);
    JpegEncoder::new_with_quality(&mut buffer, quality.clamp(1, 100))
        .write_image(&rgb, image.width, image.height, ExtendedColorType::Rgb8)
        .map_err(|e| EncodeError::EncodingFailed(e.to_string()))?;

    Ok(buffer)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_jpeg_markers() {
        let jpeg = encode_jpeg(&RasterImage::solid(100, 100, [128, 128, 128, 255]), 90).unwrap();
        assert_eq!(&jpeg[0..2], &[0xFF, 0xD8]);
        assert_eq!(&jpeg[jpeg.len() - 2..], &[0xFF, 0xD9]);
    }

    #[test]
    fn test_out_of_range_quality_is_clamped() {
        let image = RasterImage::solid(10, 10, [128, 128, 128, 255]);
        assert!(encode_jpeg(&image, 0).is_ok());
        assert!(encode_jpeg(&image, 255).is_ok());
    }

    #[test]
    fn test_truncated_buffer_rejected() {
        let image = RasterImage {
            width: 100,
            height: 100,
            pixels: vec![128u8; 99 * 100 * 4],
        };
        assert!(matches!(
            encode_jpeg(&image, 90),
            Err(EncodeError::InvalidPixelData { .. })
        ));
    }

    #[test]
    fn test_empty_canvas_rejected() {
        let image = RasterImage {
            width: 0,
            height: 440,
            pixels: Vec::new(),
        };
        assert!(matches!(
            encode_jpeg(&image, 90),
            Err(EncodeError::InvalidDimensions { .. })
        ));
    }

    #[test]
    fn test_lower_quality_is_smaller() {
        let pixels = (0..64 * 64 * 4).map(|i| (i * 31 % 251) as u8).collect();
        let noisy = RasterImage::new(64, 64, pixels);
        let high = encode_jpeg(&noisy, 95).unwrap();
        let low = encode_jpeg(&noisy, 20).unwrap();
        assert!(low.len() < high.len());
    }
}

// ============================================================================
// Property-Based Tests
// ============================================================================
