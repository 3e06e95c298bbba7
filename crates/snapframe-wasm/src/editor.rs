//! Editing session bindings.
//!
//! [`JsEditor`] wraps the core editor for a browser host. Pointer events go
//! in, committed-transform events come out as plain objects, and the page
//! draws each layer with the CSS matrix from [`JsEditor::layer_matrix`].
//!
//! ```typescript
//! const editor = new JsEditor(undefined);
//! editor.set_photo(decode_photo(bytes));
//! canvas.addEventListener('pointermove', (e) => {
//!   const events = editor.touch(e.pointerId, e.type, e.offsetX, e.offsetY, e.timeStamp);
//! });
//! requestAnimationFrame(function frame(t) {
//!   editor.tick(1 / 60);
//!   requestAnimationFrame(frame);
//! });
//! ```

use serde::Serialize;
use snapframe_core::config::EditorConfig;
use snapframe_core::editor::Editor;
use snapframe_core::error::{EditorError, Notice};
use snapframe_core::export::export_file_name;
use snapframe_core::face::{FaceBounds, FaceLocator, RasterManipulator};
use snapframe_core::frames::Frame;
use snapframe_core::gesture::TouchEvent;
use snapframe_core::raster::RasterImage;
use wasm_bindgen::prelude::*;

use crate::types::{
    js_error, layer_kind_from_str, strategy_from_str, touch_phase_from_str, JsRasterImage,
};

/// Face boxes found by the page's own detector. `None` means the page has no
/// detector.
struct ProvidedFaces(Option<Vec<FaceBounds>>);

impl FaceLocator for ProvidedFaces {
    fn locate(&mut self, _image: &RasterImage) -> Result<Option<FaceBounds>, EditorError> {
        match &self.0 {
            Some(faces) => Ok(faces.first().copied()),
            None => Err(EditorError::DetectionUnsupported(
                "no face detector in this browser".to_string(),
            )),
        }
    }
}

/// Browser editing session.
#[wasm_bindgen]
pub struct JsEditor {
    inner: Editor,
    manipulator: RasterManipulator,
    /// Notices already written to the console.
    reported: usize,
}

#[wasm_bindgen]
impl JsEditor {
    /// Create a session. `config` is a partial `EditorConfig` object, or
    /// `undefined` for defaults.
    #[wasm_bindgen(constructor)]
    pub fn new(config: JsValue) -> Result<JsEditor, JsValue> {
        let config: EditorConfig = if config.is_undefined() || config.is_null() {
            EditorConfig::default()
        } else {
            serde_wasm_bindgen::from_value(config)?
        };
        let manipulator = RasterManipulator::new(config.face.filter);
        let inner = Editor::new(config).map_err(js_error)?;
        Ok(JsEditor {
            inner,
            manipulator,
            reported: 0,
        })
    }

    /// Feed one pointer event. Returns the editor events it produced.
    pub fn touch(
        &mut self,
        pointer: u32,
        phase: &str,
        x: f64,
        y: f64,
        timestamp_ms: f64,
    ) -> Result<JsValue, JsValue> {
        let phase = touch_phase_from_str(phase).map_err(js_error)?;
        let event = TouchEvent::new(pointer as u64, phase, x, y, timestamp_ms.max(0.0) as u64);
        to_js(&self.inner.handle_touch(&event))
    }

    /// Step animations by `dt` seconds. Returns whether anything moved.
    pub fn tick(&mut self, dt: f64) -> bool {
        self.inner.tick(dt)
    }

    /// Live transform of a layer as `[a, b, c, d, e, f]` for CSS `matrix()`.
    pub fn layer_matrix(&self, layer: &str) -> Result<Option<Vec<f64>>, JsValue> {
        let kind = layer_kind_from_str(layer).map_err(js_error)?;
        Ok(self
            .inner
            .layer(kind)
            .map(|layer| layer.live_affine().as_coeffs().to_vec()))
    }

    /// Committed transform of a layer, or `undefined` when the layer is absent.
    pub fn committed(&self, layer: &str) -> Result<JsValue, JsValue> {
        let kind = layer_kind_from_str(layer).map_err(js_error)?;
        to_js(&self.inner.layer(kind).map(|layer| layer.committed()))
    }

    pub fn set_photo(&mut self, image: &JsRasterImage) -> Result<(), JsValue> {
        let image = image.to_raster().map_err(js_error)?;
        let result = self.inner.set_photo(image);
        self.report();
        result.map_err(js_error)
    }

    /// Crop the photo around the first of `faces` (an array of
    /// `{left, top, width, height}`), or pass `null` when the browser has no
    /// detector.
    pub fn center_on_face(&mut self, faces: JsValue) -> Result<JsValue, JsValue> {
        let faces: Option<Vec<FaceBounds>> = if faces.is_undefined() || faces.is_null() {
            None
        } else {
            Some(serde_wasm_bindgen::from_value(faces)?)
        };
        let update = self
            .inner
            .center_photo_on_face(&mut ProvidedFaces(faces), &self.manipulator);
        self.report();
        to_js(&update)
    }

    pub fn apply_manual_fit(&mut self) -> Result<JsValue, JsValue> {
        let update = self.inner.apply_manual_fit(&self.manipulator);
        self.report();
        to_js(&update)
    }

    pub fn restore_original_photo(&mut self) -> Result<JsValue, JsValue> {
        let update = self.inner.restore_original_photo();
        self.report();
        to_js(&update)
    }

    /// Overlay a frame. `frame` is a stored `{id, name, uri, preview}` entry.
    pub fn select_frame(&mut self, frame: JsValue, image: &JsRasterImage) -> Result<(), JsValue> {
        let frame: Frame = serde_wasm_bindgen::from_value(frame)?;
        let image = image.to_raster().map_err(js_error)?;
        self.inner.select_frame(frame, image).map_err(js_error)
    }

    pub fn clear_frame(&mut self) {
        self.inner.clear_frame();
    }

    pub fn set_frame_draggable(&mut self, draggable: bool) {
        self.inner.set_frame_draggable(draggable);
    }

    pub fn set_sticker(&mut self, glyph: &str, image: &JsRasterImage) -> Result<(), JsValue> {
        let image = image.to_raster().map_err(js_error)?;
        self.inner.set_sticker(glyph, image).map_err(js_error)
    }

    pub fn remove_sticker(&mut self) {
        self.inner.remove_sticker();
    }

    pub fn sticker_zoom_in(&mut self) -> Result<JsValue, JsValue> {
        to_js(&self.inner.sticker_zoom_in())
    }

    pub fn sticker_zoom_out(&mut self) -> Result<JsValue, JsValue> {
        to_js(&self.inner.sticker_zoom_out())
    }

    pub fn sticker_reset(&mut self) -> Result<JsValue, JsValue> {
        to_js(&self.inner.sticker_reset())
    }

    pub fn set_editable(&mut self, layer: &str, editable: bool) -> Result<(), JsValue> {
        let kind = layer_kind_from_str(layer).map_err(js_error)?;
        self.inner.set_editable(kind, editable);
        Ok(())
    }

    /// Back to an empty screen.
    pub fn reset(&mut self) -> Result<(), JsValue> {
        self.inner.reset().map_err(js_error)
    }

    /// Flatten and encode the committed view. `strategy` is `"native"` or
    /// `"browser"`.
    pub fn capture(&mut self, strategy: &str) -> Result<Vec<u8>, JsValue> {
        let strategy = strategy_from_str(strategy).map_err(js_error)?;
        let result = self.inner.capture(strategy);
        self.report();
        result.map(|(bytes, _)| bytes).map_err(js_error)
    }

    /// Download name for a capture with `strategy`.
    pub fn file_name(&self, strategy: &str) -> Result<String, JsValue> {
        let strategy = strategy_from_str(strategy).map_err(js_error)?;
        let format = self.inner.export_options(strategy).format;
        Ok(export_file_name(&self.inner.config().export.file_stem, format))
    }

    /// MIME type for a `Blob` holding a capture with `strategy`.
    pub fn mime_type(&self, strategy: &str) -> Result<String, JsValue> {
        let strategy = strategy_from_str(strategy).map_err(js_error)?;
        Ok(self.inner.export_options(strategy).format.mime_type().to_string())
    }

    /// Events queued by commands outside `touch`.
    pub fn take_events(&mut self) -> Result<JsValue, JsValue> {
        to_js(&self.inner.take_events())
    }

    /// Drain queued `{kind, message}` notices.
    pub fn take_notices(&mut self) -> Result<JsValue, JsValue> {
        self.reported = 0;
        to_js(&self.inner.take_notices())
    }
}

impl JsEditor {
    /// Write new notices to the browser console.
    fn report(&mut self) {
        let notices: &[Notice] = self.inner.notices();
        for notice in &notices[self.reported.min(notices.len())..] {
            web_sys::console::warn_1(&JsValue::from_str(&format!(
                "{:?}: {}",
                notice.kind, notice.message
            )));
        }
        self.reported = notices.len();
    }
}

fn to_js<T: Serialize + ?Sized>(value: &T) -> Result<JsValue, JsValue> {
    Ok(serde_wasm_bindgen::to_value(value)?)
}
