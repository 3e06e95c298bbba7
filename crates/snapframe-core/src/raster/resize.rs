//! Image resizing for canvas fitting and cover layout.
//!
//! All functions return new `RasterImage` instances without modifying the
//! input.

use super::{DecodeError, FilterType, RasterImage};

/// Resize an image to exact dimensions, ignoring aspect ratio.
///
/// This is the "plain resize" used by the manual-fit path and by the
/// face-centering fallback.
///
/// # Errors
///
/// Returns `DecodeError::InvalidDimensions` if either target dimension is
/// zero, and `DecodeError::CorruptedFile` if the source buffer is malformed.
pub fn resize(
    image: &RasterImage,
    width: u32,
    height: u32,
    filter: FilterType,
) -> Result<RasterImage, DecodeError> {
    if width == 0 || height == 0 {
        return Err(DecodeError::InvalidDimensions { width, height });
    }

    if image.width == width && image.height == height {
        return Ok(image.clone());
    }

    let rgba = image
        .to_rgba_image()
        .ok_or_else(|| DecodeError::CorruptedFile("Failed to create RgbaImage".to_string()))?;

    let resized = image::imageops::resize(&rgba, width, height, filter.to_image_filter());

    Ok(RasterImage::from_rgba_image(resized))
}

/// Resize an image to fit within a maximum edge length while preserving
/// aspect ratio. Images already inside the bound are returned unchanged.
pub fn resize_to_fit(
    image: &RasterImage,
    max_edge: u32,
    filter: FilterType,
) -> Result<RasterImage, DecodeError> {
    if max_edge == 0 {
        return Err(DecodeError::InvalidDimensions {
            width: max_edge,
            height: max_edge,
        });
    }

    if image.width <= max_edge && image.height <= max_edge {
        return Ok(image.clone());
    }

    let (new_width, new_height) = calculate_fit_dimensions(image.width, image.height, max_edge);
    resize(image, new_width, new_height, filter)
}

/// Scale factor that makes a `content` box cover a `target` box.
///
/// The content is scaled uniformly until both of its edges reach at least the
/// target's, so one axis may overflow and is cropped by the viewport.
pub fn cover_scale(content_w: f64, content_h: f64, target_w: f64, target_h: f64) -> f64 {
    if content_w <= 0.0 || content_h <= 0.0 {
        return 1.0;
    }
    (target_w / content_w).max(target_h / content_h)
}

/// Calculate dimensions to fit within max_edge while preserving aspect ratio.
fn calculate_fit_dimensions(width: u32, height: u32, max_edge: u32) -> (u32, u32) {
    if width == 0 || height == 0 {
        return (0, 0);
    }

    let ratio = width as f64 / height as f64;

    if width >= height {
        let new_height = (max_edge as f64 / ratio).round() as u32;
        (max_edge, new_height.max(1))
    } else {
        let new_width = (max_edge as f64 * ratio).round() as u32;
        (new_width.max(1), max_edge)
    }
}
