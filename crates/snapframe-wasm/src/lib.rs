//! Snapframe WASM - WebAssembly bindings for Snapframe
//!
//! This crate exposes the snapframe-core editor to a browser host.
//!
//! # Module Structure
//!
//! - `types` - WASM-compatible image wrapper and name parsing
//! - `decode` - Photo and overlay decoding, resizing
//! - `editor` - The editing session: touches, animation, face fit, capture
//! - `frames` - The persisted frame library
//!
//! # Usage
//!
//! ```typescript
//! import init, { JsEditor, decode_photo } from '@snapframe/wasm';
//!
//! await init();
//! const editor = new JsEditor(undefined);
//! editor.set_photo(decode_photo(new Uint8Array(await file.arrayBuffer())));
//! const jpeg = editor.capture('browser');
//! ```

use wasm_bindgen::prelude::*;

mod decode;
mod editor;
mod frames;
mod types;

pub use decode::{decode_overlay, decode_photo, resize, thumbnail};
pub use editor::JsEditor;
pub use frames::JsFrameLibrary;
pub use types::JsRasterImage;

/// Initialize the WASM module (called automatically on load)
#[wasm_bindgen(start)]
pub fn init() {
    #[cfg(feature = "console_error_panic_hook")]
    console_error_panic_hook::set_once();
}

/// Get the version of the WASM module
#[wasm_bindgen]
pub fn version() -> String {
    env!("CARGO_PKG_VERSION").to_string()
}
