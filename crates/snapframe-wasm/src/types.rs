//! WASM-compatible wrapper types.
//!
//! Images cross the boundary as [`JsRasterImage`]; layer kinds, touch phases
//! and capture strategies cross as short strings.

use snapframe_core::export::CaptureStrategy;
use snapframe_core::gesture::TouchPhase;
use snapframe_core::layer::LayerKind;
use snapframe_core::raster::{FilterType, RasterImage};
use wasm_bindgen::prelude::*;

/// An RGBA image for JavaScript.
///
/// The pixel data lives in WASM memory. `pixels()` copies it out as a
/// `Uint8Array` that can back an `ImageData`.
#[wasm_bindgen]
pub struct JsRasterImage {
    width: u32,
    height: u32,
    pixels: Vec<u8>,
}

#[wasm_bindgen]
impl JsRasterImage {
    /// Create an image from RGBA pixel data (4 bytes per pixel, row-major).
    #[wasm_bindgen(constructor)]
    pub fn new(width: u32, height: u32, pixels: Vec<u8>) -> JsRasterImage {
        JsRasterImage {
            width,
            height,
            pixels,
        }
    }

    #[wasm_bindgen(getter)]
    pub fn width(&self) -> u32 {
        self.width
    }

    #[wasm_bindgen(getter)]
    pub fn height(&self) -> u32 {
        self.height
    }

    #[wasm_bindgen(getter)]
    pub fn byte_length(&self) -> usize {
        self.pixels.len()
    }

    /// RGBA pixel data. Copies.
    pub fn pixels(&self) -> Vec<u8> {
        self.pixels.clone()
    }

    /// Explicitly free WASM memory.
    pub fn free(self) {}
}

impl JsRasterImage {
    pub(crate) fn from_raster(img: RasterImage) -> Self {
        Self {
            width: img.width,
            height: img.height,
            pixels: img.pixels,
        }
    }

    /// Copy into a core image, rejecting a buffer that does not match the
    /// dimensions.
    pub(crate) fn to_raster(&self) -> Result<RasterImage, String> {
        let expected = self.width as usize * self.height as usize * 4;
        if self.width == 0 || self.height == 0 || self.pixels.len() != expected {
            return Err(format!(
                "expected {expected} RGBA bytes for {}x{}, got {}",
                self.width,
                self.height,
                self.pixels.len()
            ));
        }
        Ok(RasterImage::new(self.width, self.height, self.pixels.clone()))
    }
}

/// Filter from its numeric code: 0 nearest, 2 lanczos3, anything else
/// bilinear.
pub(crate) fn filter_from_u8(value: u8) -> FilterType {
    match value {
        0 => FilterType::Nearest,
        2 => FilterType::Lanczos3,
        _ => FilterType::Bilinear,
    }
}

/// `"photo"`, `"frame"` or `"sticker"`.
pub(crate) fn layer_kind_from_str(value: &str) -> Result<LayerKind, String> {
    match value {
        "photo" => Ok(LayerKind::BasePhoto),
        "frame" => Ok(LayerKind::FrameOverlay),
        "sticker" => Ok(LayerKind::EmojiSticker),
        other => Err(format!("unknown layer '{other}'")),
    }
}

/// Pointer event type names: `down`, `move`, `up`, `cancel`.
pub(crate) fn touch_phase_from_str(value: &str) -> Result<TouchPhase, String> {
    match value {
        "down" | "pointerdown" | "touchstart" => Ok(TouchPhase::Down),
        "move" | "pointermove" | "touchmove" => Ok(TouchPhase::Move),
        "up" | "pointerup" | "touchend" => Ok(TouchPhase::Up),
        "cancel" | "pointercancel" | "touchcancel" => Ok(TouchPhase::Cancel),
        other => Err(format!("unknown touch phase '{other}'")),
    }
}

/// `"native"` or `"browser"`.
pub(crate) fn strategy_from_str(value: &str) -> Result<CaptureStrategy, String> {
    match value {
        "native" => Ok(CaptureStrategy::NativeSnapshot),
        "browser" => Ok(CaptureStrategy::BrowserRaster),
        other => Err(format!("unknown capture strategy '{other}'")),
    }
}

pub(crate) fn js_error(message: impl std::fmt::Display) -> JsValue {
    JsValue::from_str(&message.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_js_raster_image_creation() {
        let img = JsRasterImage::new(100, 50, vec![0u8; 100 * 50 * 4]);
        assert_eq!(img.width(), 100);
        assert_eq!(img.height(), 50);
        assert_eq!(img.byte_length(), 20000);
    }

    #[test]
    fn test_round_trip_through_core() {
        let core = RasterImage::solid(3, 2, [1, 2, 3, 4]);
        let js = JsRasterImage::from_raster(core.clone());
        assert_eq!(js.to_raster().unwrap(), core);
    }

    #[test]
    fn test_to_raster_rejects_short_buffer() {
        let img = JsRasterImage::new(4, 4, vec![0u8; 4 * 4 * 3]);
        assert!(img.to_raster().is_err());
    }

    #[test]
    fn test_filter_from_u8() {
        assert_eq!(filter_from_u8(0), FilterType::Nearest);
        assert_eq!(filter_from_u8(1), FilterType::Bilinear);
        assert_eq!(filter_from_u8(2), FilterType::Lanczos3);
        assert_eq!(filter_from_u8(255), FilterType::Bilinear);
    }

    #[test]
    fn test_layer_kind_names() {
        assert_eq!(layer_kind_from_str("photo"), Ok(LayerKind::BasePhoto));
        assert_eq!(layer_kind_from_str("frame"), Ok(LayerKind::FrameOverlay));
        assert_eq!(layer_kind_from_str("sticker"), Ok(LayerKind::EmojiSticker));
        assert!(layer_kind_from_str("background").is_err());
    }

    #[test]
    fn test_touch_phase_names() {
        assert_eq!(touch_phase_from_str("pointerdown"), Ok(TouchPhase::Down));
        assert_eq!(touch_phase_from_str("touchmove"), Ok(TouchPhase::Move));
        assert_eq!(touch_phase_from_str("up"), Ok(TouchPhase::Up));
        assert_eq!(touch_phase_from_str("touchcancel"), Ok(TouchPhase::Cancel));
        assert!(touch_phase_from_str("hover").is_err());
    }

    #[test]
    fn test_strategy_names() {
        assert_eq!(strategy_from_str("native"), Ok(CaptureStrategy::NativeSnapshot));
        assert_eq!(strategy_from_str("browser"), Ok(CaptureStrategy::BrowserRaster));
        assert!(strategy_from_str("print").is_err());
    }
}
