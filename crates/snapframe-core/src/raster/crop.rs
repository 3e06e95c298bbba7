//! Pixel-space cropping.
//!
//! Face centering computes its crop window in source-image pixels, so unlike
//! normalized crop parameters the rectangle here is used as-is after being
//! clipped to the image bounds.

use super::{cover_scale, CropRect, DecodeError, RasterImage};

/// Copy the pixels inside `rect` into a new image.
///
/// The rectangle is clipped to the image. A rectangle that does not overlap
/// the image at all is an error rather than an empty result.
///
/// # Example
///
/// ```
/// use snapframe_core::raster::{apply_crop, CropRect, RasterImage};
///
/// let image = RasterImage::solid(100, 100, [128, 128, 128, 255]);
/// let cropped = apply_crop(&image, CropRect::new(25, 25, 50, 50)).unwrap();
/// assert_eq!((cropped.width, cropped.height), (50, 50));
/// ```
pub fn apply_crop(image: &RasterImage, rect: CropRect) -> Result<RasterImage, DecodeError> {
    image.validate()?;
    if rect.x >= image.width || rect.y >= image.height || rect.width == 0 || rect.height == 0 {
        return Err(DecodeError::InvalidCrop {
            x: rect.x,
            y: rect.y,
            width: rect.width,
            height: rect.height,
        });
    }

    // Fast path: full crop returns a clone
    if rect.x == 0 && rect.y == 0 && rect.width >= image.width && rect.height >= image.height {
        return Ok(image.clone());
    }

    let right = rect.right().min(image.width);
    let bottom = rect.bottom().min(image.height);
    let out_width = right - rect.x;
    let out_height = bottom - rect.y;

    let stride = image.width as usize * 4;
    let row_bytes = out_width as usize * 4;
    let mut output = Vec::with_capacity(row_bytes * out_height as usize);

    for y in rect.y..bottom {
        let start = y as usize * stride + rect.x as usize * 4;
        output.extend_from_slice(&image.pixels[start..start + row_bytes]);
    }

    Ok(RasterImage::new(out_width, out_height, output))
}

/// The centered region of a `width` x `height` image that stays visible when
/// the image is cover-fitted into a `target_w` x `target_h` box.
pub fn cover_crop_rect(width: u32, height: u32, target_w: f64, target_h: f64) -> CropRect {
    let scale = cover_scale(width as f64, height as f64, target_w, target_h);
    let visible_w = ((target_w / scale).round() as u32).clamp(1, width.max(1));
    let visible_h = ((target_h / scale).round() as u32).clamp(1, height.max(1));
    CropRect::new(
        (width.saturating_sub(visible_w)) / 2,
        (height.saturating_sub(visible_h)) / 2,
        visible_w,
        visible_h,
    )
}

/// Crop an image to the part a cover fit into the target box would show.
pub fn cover_crop(
    image: &RasterImage,
    target_w: f64,
    target_h: f64,
) -> Result<RasterImage, DecodeError> {
    apply_crop(
        image,
        cover_crop_rect(image.width, image.height, target_w, target_h),
    )
}


// ============================================================================
// Property-Based Tests
// ============================================================================
