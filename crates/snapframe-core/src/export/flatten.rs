//! Scene rasterization.

use kurbo::Affine;
use tiny_skia::{Color, FilterQuality, IntSize, Pixmap, PixmapPaint};
use tracing::{debug, error};

use super::{CaptureError, ExportOptions, Scene, SceneLayer};
use crate::encode::encode_raster;
use crate::raster::RasterImage;
use crate::transform::to_skia_transform;

/// Render `scene` into a `width` x `height` raster.
///
/// Every layer is drawn back to front with bilinear sampling over an opaque
/// background. The viewport is stretched onto the output, so a 2x target
/// yields the same picture at twice the resolution.
pub fn flatten(scene: &Scene<'_>, width: u32, height: u32) -> Result<RasterImage, CaptureError> {
    let invalid = || CaptureError::InvalidSize { width, height };
    if !(scene.viewport.width > 0.0 && scene.viewport.height > 0.0) {
        return Err(invalid());
    }
    let mut canvas = Pixmap::new(width, height).ok_or_else(invalid)?;

    let [r, g, b, a] = scene.background;
    canvas.fill(Color::from_rgba8(r, g, b, a));

    let root = Affine::scale_non_uniform(
        width as f64 / scene.viewport.width,
        height as f64 / scene.viewport.height,
    );
    let paint = PixmapPaint {
        quality: FilterQuality::Bilinear,
        ..PixmapPaint::default()
    };

    for layer in &scene.layers {
        let source = to_pixmap(layer.raster).ok_or(CaptureError::Raster(layer.kind))?;
        let transform = to_skia_transform(root * layer_to_viewport(layer));
        canvas.draw_pixmap(0, 0, source.as_ref(), &paint, transform, None);
    }

    Ok(from_pixmap(&canvas))
}

/// Flatten and encode per `options`.
pub fn capture_composite(
    scene: &Scene<'_>,
    options: &ExportOptions,
) -> Result<Vec<u8>, CaptureError> {
    let result = flatten(scene, options.target_width, options.target_height).and_then(|raster| {
        encode_raster(&raster, options.format, options.quality).map_err(CaptureError::from)
    });

    match &result {
        Ok(bytes) => debug!(
            strategy = ?options.strategy,
            width = options.target_width,
            height = options.target_height,
            bytes = bytes.len(),
            "composite captured"
        ),
        Err(err) => error!(strategy = ?options.strategy, %err, "composite capture failed"),
    }
    result
}

/// Pixel space of the layer raster to viewport space.
fn layer_to_viewport(layer: &SceneLayer<'_>) -> Affine {
    let rect = layer.content_rect;
    let sx = rect.width() / layer.raster.width.max(1) as f64;
    let sy = rect.height() / layer.raster.height.max(1) as f64;
    layer.transform * Affine::translate(rect.origin().to_vec2()) * Affine::scale_non_uniform(sx, sy)
}

/// Premultiply into a pixmap.
fn to_pixmap(image: &RasterImage) -> Option<Pixmap> {
    let size = IntSize::from_wh(image.width, image.height)?;
    if image.pixels.len() != image.width as usize * image.height as usize * 4 {
        return None;
    }
    let mut data = Vec::with_capacity(image.pixels.len());
    for px in image.pixels.chunks_exact(4) {
        let alpha = px[3] as u16;
        let premultiply = |c: u8| ((c as u16 * alpha + 127) / 255) as u8;
        data.extend_from_slice(&[premultiply(px[0]), premultiply(px[1]), premultiply(px[2]), px[3]]);
    }
    Pixmap::from_vec(data, size)
}

fn from_pixmap(pixmap: &Pixmap) -> RasterImage {
    let mut pixels = Vec::with_capacity(pixmap.data().len());
    for px in pixmap.pixels() {
        let c = px.demultiply();
        pixels.extend_from_slice(&[c.red(), c.green(), c.blue(), c.alpha()]);
    }
    RasterImage::new(pixmap.width(), pixmap.height(), pixels)
}
