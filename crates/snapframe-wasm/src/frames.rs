//! Frame library bindings.
//!
//! The page persists the library itself (e.g. in `localStorage`) using the
//! JSON from [`JsFrameLibrary::to_json`].

use snapframe_core::frames::FrameLibrary;
use wasm_bindgen::prelude::*;

use crate::types::js_error;

#[wasm_bindgen]
pub struct JsFrameLibrary {
    inner: FrameLibrary,
}

#[wasm_bindgen]
impl JsFrameLibrary {
    /// Library from stored JSON. Missing or corrupt JSON gives an empty
    /// library.
    #[wasm_bindgen(constructor)]
    pub fn new(json: Option<String>, seed: f64) -> JsFrameLibrary {
        let seed = seed.max(0.0) as u64;
        let inner = json
            .as_deref()
            .and_then(|json| FrameLibrary::from_json(json, seed).ok())
            .unwrap_or_else(|| FrameLibrary::new(seed));
        JsFrameLibrary { inner }
    }

    pub fn to_json(&self) -> Result<String, JsValue> {
        self.inner.to_json().map_err(js_error)
    }

    /// All frames as `{id, name, uri, preview, isCustom}` objects.
    pub fn frames(&self) -> Result<JsValue, JsValue> {
        Ok(serde_wasm_bindgen::to_value(self.inner.frames())?)
    }

    #[wasm_bindgen(getter)]
    pub fn length(&self) -> usize {
        self.inner.len()
    }

    /// Add a picked image as a custom frame. Returns the new frame's id.
    pub fn import(&mut self, uri: &str, now_ms: f64) -> String {
        self.inner.import(uri, now_ms.max(0.0) as u64).id.clone()
    }

    pub fn remove(&mut self, id: &str) -> Result<(), JsValue> {
        self.inner.remove(id).map(|_| ()).map_err(js_error)
    }

    pub fn clear(&mut self) {
        self.inner.clear();
    }

    /// Select a frame and return it, for passing to `JsEditor.select_frame`.
    pub fn select(&mut self, id: &str) -> Result<JsValue, JsValue> {
        let frame = self.inner.select(id).map_err(js_error)?;
        Ok(serde_wasm_bindgen::to_value(frame)?)
    }

    pub fn deselect(&mut self) {
        self.inner.deselect();
    }

    /// Id of the selected frame, if any.
    pub fn selected(&self) -> Option<String> {
        self.inner.selected().map(|frame| frame.id.clone())
    }
}
