//! Export of the composed editor view as one flattened image.
//!
//! Export reads a [`Scene`]: an immutable snapshot of every visible layer at
//! its committed transform. The scene is rasterized at the requested output
//! size by mapping the logical viewport onto it with a single root scale, so
//! the result does not depend on the host's pixel density.
//!
//! Two [`CaptureStrategy`] values exist for the two host contexts (native
//! view snapshot, browser raster). They share the same rasterizer and only
//! differ in their default encoding.

mod flatten;
mod sink;

use kurbo::{Affine, Rect};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::config::Viewport;
use crate::encode::{EncodeError, ImageFormat};
use crate::layer::LayerKind;
use crate::raster::RasterImage;

pub use flatten::{capture_composite, flatten};
#[cfg(not(target_arch = "wasm32"))]
pub use sink::DirectorySink;
pub use sink::{export_file_name, ExportSink};

/// Errors that can occur while capturing or saving a composite.
#[derive(Debug, Error)]
pub enum CaptureError {
    /// Output width or height is zero or too large to allocate
    #[error("Invalid output size: {width}x{height}")]
    InvalidSize { width: u32, height: u32 },

    /// A layer's pixels could not be handed to the rasterizer
    #[error("Layer {0:?} could not be rasterized")]
    Raster(LayerKind),

    #[error(transparent)]
    Encode(#[from] EncodeError),

    /// The save target refused access
    #[error("Permission denied: {0}")]
    PermissionDenied(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Host-side capture path.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum CaptureStrategy {
    /// Snapshot of the composed native view tree.
    #[default]
    NativeSnapshot,
    /// Serialization of the browser-hosted view to a raster.
    BrowserRaster,
}

/// Output parameters of one capture.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExportOptions {
    pub target_width: u32,
    pub target_height: u32,
    /// 0.0 to 1.0, JPEG only.
    pub quality: f32,
    pub format: ImageFormat,
    pub strategy: CaptureStrategy,
}

impl ExportOptions {
    /// Lossless capture at the reference viewport size.
    pub fn native_snapshot() -> Self {
        Self {
            target_width: 320,
            target_height: 440,
            quality: 1.0,
            format: ImageFormat::Png,
            strategy: CaptureStrategy::NativeSnapshot,
        }
    }

    /// JPEG download at quality 0.95.
    pub fn browser_raster() -> Self {
        Self {
            target_width: 320,
            target_height: 440,
            quality: 0.95,
            format: ImageFormat::Jpeg,
            strategy: CaptureStrategy::BrowserRaster,
        }
    }

    pub fn with_size(self, target_width: u32, target_height: u32) -> Self {
        Self {
            target_width,
            target_height,
            ..self
        }
    }
}

impl Default for ExportOptions {
    fn default() -> Self {
        Self::native_snapshot()
    }
}

/// One layer as export sees it.
#[derive(Debug, Clone)]
pub struct SceneLayer<'a> {
    pub kind: LayerKind,
    pub raster: &'a RasterImage,
    /// Where the raster is drawn in the layer's local box.
    pub content_rect: Rect,
    /// Layer-local to viewport, from the committed transform.
    pub transform: Affine,
}

/// Read-only snapshot of the composed view, back to front.
#[derive(Debug, Clone)]
pub struct Scene<'a> {
    pub viewport: Viewport,
    pub background: [u8; 4],
    pub layers: Vec<SceneLayer<'a>>,
}

impl<'a> Scene<'a> {
    pub fn new(viewport: Viewport, background: [u8; 4]) -> Self {
        Self {
            viewport,
            background,
            layers: Vec::new(),
        }
    }

    pub fn push(&mut self, layer: SceneLayer<'a>) {
        self.layers.push(layer);
    }

    pub fn layer(&self, kind: LayerKind) -> Option<&SceneLayer<'a>> {
        self.layers.iter().find(|l| l.kind == kind)
    }
}
