//! Image decoding WASM bindings.
//!
//! Photos picked from the library or camera are decoded with EXIF
//! orientation applied. Frame overlays and sticker bitmaps are decoded as
//! authored.
//!
//! ```typescript
//! import { decode_photo, decode_overlay } from '@snapframe/wasm';
//!
//! const photo = decode_photo(new Uint8Array(await file.arrayBuffer()));
//! editor.set_photo(photo);
//! ```

use crate::types::{filter_from_u8, js_error, JsRasterImage};
use snapframe_core::raster;
use wasm_bindgen::prelude::*;

/// Decode a JPEG or PNG photo, applying EXIF orientation.
#[wasm_bindgen]
pub fn decode_photo(bytes: &[u8]) -> Result<JsRasterImage, JsValue> {
    raster::decode_image(bytes)
        .map(JsRasterImage::from_raster)
        .map_err(js_error)
}

/// Decode a frame or sticker bitmap without touching its orientation.
#[wasm_bindgen]
pub fn decode_overlay(bytes: &[u8]) -> Result<JsRasterImage, JsValue> {
    raster::decode_image_no_orientation(bytes)
        .map(JsRasterImage::from_raster)
        .map_err(js_error)
}

/// Resize to exact dimensions. `filter`: 0 nearest, 1 bilinear, 2 lanczos3.
#[wasm_bindgen]
pub fn resize(
    image: &JsRasterImage,
    width: u32,
    height: u32,
    filter: u8,
) -> Result<JsRasterImage, JsValue> {
    let source = image.to_raster().map_err(js_error)?;
    raster::resize(&source, width, height, filter_from_u8(filter))
        .map(JsRasterImage::from_raster)
        .map_err(js_error)
}

/// Build a picker thumbnail whose longest edge is `max_edge`.
#[wasm_bindgen]
pub fn thumbnail(image: &JsRasterImage, max_edge: u32) -> Result<JsRasterImage, JsValue> {
    let source = image.to_raster().map_err(js_error)?;
    raster::resize_to_fit(&source, max_edge, raster::FilterType::Bilinear)
        .map(JsRasterImage::from_raster)
        .map_err(js_error)
}
