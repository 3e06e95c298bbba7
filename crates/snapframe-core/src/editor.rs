//! The composed editing screen.
//!
//! [`Editor`] holds the three layers, routes touches to the layer under the
//! first contact, steps animations, and turns every committed change into an
//! [`EditorEvent`]. Failures from collaborators never abort the session:
//! they are logged, queued as [`Notice`]s, and the screen stays as it was.

use kurbo::Point;
use serde::Serialize;
use tracing::{debug, info, instrument, warn};

use crate::config::EditorConfig;
use crate::encode::ImageFormat;
use crate::error::{EditorError, Notice};
use crate::export::{
    capture_composite, export_file_name, CaptureStrategy, ExportOptions, ExportSink, Scene,
};
use crate::face::{center_on_face, manual_fit, FaceCenterOutcome, FaceLocator, ImageManipulator};
use crate::frames::Frame;
use crate::gesture::{TouchEvent, TouchPhase};
use crate::layer::{Layer, LayerContent, LayerKind};
use crate::raster::RasterImage;
use crate::transform::LayerTransform;

/// Camera or library picker.
pub trait ImageSource {
    /// `Ok(None)` when the user cancelled.
    fn acquire(&mut self) -> Result<Option<RasterImage>, EditorError>;
}

/// Something the host should react to.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum EditorEvent {
    /// A layer's committed transform changed.
    TransformCommitted {
        layer: LayerKind,
        transform: LayerTransform,
    },
    /// No face was found; the host should offer a manual fit.
    ManualFitRequired,
}

/// What happened to the base photo.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum PhotoUpdate {
    /// The picker was dismissed; nothing changed.
    Cancelled,
    Replaced,
    /// Cropped around a face.
    Centered,
    /// Resized without a crop (manual fit or crop fallback).
    Fitted,
    ManualFitRequired,
    /// The operation failed; see the queued notice.
    Unchanged,
}

/// One editing screen.
#[derive(Debug)]
pub struct Editor {
    config: EditorConfig,
    photo: Layer,
    /// The photo as picked, before face-centering or fitting.
    original_photo: Option<RasterImage>,
    frame: Option<(Frame, Layer)>,
    sticker: Option<Layer>,
    /// Layer bound to the contacts currently down.
    active: Option<LayerKind>,
    events: Vec<EditorEvent>,
    notices: Vec<Notice>,
}

impl Editor {
    pub fn new(config: EditorConfig) -> Result<Self, EditorError> {
        config.validate()?;
        let photo = Layer::base_photo(&config, None)?;
        Ok(Self {
            config,
            photo,
            original_photo: None,
            frame: None,
            sticker: None,
            active: None,
            events: Vec::new(),
            notices: Vec::new(),
        })
    }

    pub fn config(&self) -> &EditorConfig {
        &self.config
    }

    pub fn layer(&self, kind: LayerKind) -> Option<&Layer> {
        match kind {
            LayerKind::BasePhoto => Some(&self.photo),
            LayerKind::FrameOverlay => self.frame.as_ref().map(|(_, layer)| layer),
            LayerKind::EmojiSticker => self.sticker.as_ref(),
        }
    }

    fn layer_mut(&mut self, kind: LayerKind) -> Option<&mut Layer> {
        match kind {
            LayerKind::BasePhoto => Some(&mut self.photo),
            LayerKind::FrameOverlay => self.frame.as_mut().map(|(_, layer)| layer),
            LayerKind::EmojiSticker => self.sticker.as_mut(),
        }
    }

    /// Front-most layer accepting a touch at `point`.
    pub fn hit(&self, point: Point) -> Option<LayerKind> {
        LayerKind::HIT_ORDER
            .into_iter()
            .find(|&kind| self.layer(kind).is_some_and(|layer| layer.hit(point)))
    }

    /// Route one contact event. Returns the events it produced.
    pub fn handle_touch(&mut self, event: &TouchEvent) -> Vec<EditorEvent> {
        if self.active.is_none() {
            if event.phase != TouchPhase::Down {
                return self.take_events();
            }
            self.active = self.hit(event.position);
        }

        let Some(kind) = self.active else {
            return self.take_events();
        };
        let Some(layer) = self.layer_mut(kind) else {
            // The layer was removed mid-gesture
            self.active = None;
            return self.take_events();
        };

        let committed = layer.handle_touch(event);
        let still_tracking = layer.is_tracking();
        if let Some(transform) = committed {
            self.commit_event(kind, transform);
        }
        if !still_tracking {
            self.active = None;
        }
        self.take_events()
    }

    /// Layer bound to the current touch sequence, if any.
    pub fn active_layer(&self) -> Option<LayerKind> {
        self.active
    }

    /// Step animations by `dt` seconds. Returns whether anything moved.
    pub fn tick(&mut self, dt: f64) -> bool {
        let mut moved = self.photo.tick(dt);
        if let Some((_, frame)) = self.frame.as_mut() {
            moved |= frame.tick(dt);
        }
        if let Some(sticker) = self.sticker.as_mut() {
            moved |= sticker.tick(dt);
        }
        moved
    }

    pub fn is_animating(&self) -> bool {
        LayerKind::PAINT_ORDER
            .into_iter()
            .any(|kind| self.layer(kind).is_some_and(Layer::is_animating))
    }

    // ---- photo ----

    /// Show `image` as the base photo at fit.
    pub fn set_photo(&mut self, image: RasterImage) -> Result<(), EditorError> {
        self.replace_photo_pixels(image.clone())?;
        self.original_photo = Some(image);
        Ok(())
    }

    fn replace_photo_pixels(&mut self, image: RasterImage) -> Result<(), EditorError> {
        self.photo.set_content(LayerContent::Image(image))?;
        let transform = self.photo.set_transform(LayerTransform::IDENTITY);
        self.commit_event(LayerKind::BasePhoto, transform);
        Ok(())
    }

    /// Ask `source` for a photo and show it.
    pub fn load_photo(&mut self, source: &mut dyn ImageSource) -> PhotoUpdate {
        match source.acquire() {
            Ok(None) => {
                debug!("photo pick cancelled");
                PhotoUpdate::Cancelled
            }
            Ok(Some(image)) => match self.set_photo(image) {
                Ok(()) => PhotoUpdate::Replaced,
                Err(err) => self.fail(err),
            },
            Err(err) => self.fail(err),
        }
    }

    /// Crop the picked photo around its face.
    ///
    /// Without a face the photo is left as picked and
    /// [`EditorEvent::ManualFitRequired`] is queued. With `face.auto_center`
    /// off a found face leaves the photo as picked too.
    #[instrument(level = "debug", skip_all)]
    pub fn center_photo_on_face(
        &mut self,
        locator: &mut dyn FaceLocator,
        manipulator: &dyn ImageManipulator,
    ) -> PhotoUpdate {
        let Some(original) = self.original_photo.as_ref() else {
            return PhotoUpdate::Unchanged;
        };

        let centering = match center_on_face(original, locator, manipulator, &self.config.face) {
            Ok(centering) => centering,
            Err(err) => return self.fail(err),
        };
        if let Some(notice) = centering.notice {
            self.notices.push(notice);
        }

        let (image, update) = match centering.outcome {
            FaceCenterOutcome::Centered { image, crop } => {
                info!(?crop, "photo centered on face");
                (image, PhotoUpdate::Centered)
            }
            FaceCenterOutcome::Resized(image) => (image, PhotoUpdate::Fitted),
            FaceCenterOutcome::Kept(_) => return PhotoUpdate::Unchanged,
            FaceCenterOutcome::ManualFitRequired => {
                self.events.push(EditorEvent::ManualFitRequired);
                return PhotoUpdate::ManualFitRequired;
            }
        };
        match self.replace_photo_pixels(image) {
            Ok(()) => update,
            Err(err) => self.fail(err),
        }
    }

    /// Plain resize of the picked photo to the canvas.
    pub fn apply_manual_fit(&mut self, manipulator: &dyn ImageManipulator) -> PhotoUpdate {
        let Some(original) = self.original_photo.as_ref() else {
            return PhotoUpdate::Unchanged;
        };
        let fitted = manual_fit(original, manipulator, &self.config.face)
            .and_then(|image| self.replace_photo_pixels(image));
        match fitted {
            Ok(()) => PhotoUpdate::Fitted,
            Err(err) => self.fail(err),
        }
    }

    /// Go back to the photo as picked.
    pub fn restore_original_photo(&mut self) -> PhotoUpdate {
        let Some(original) = self.original_photo.clone() else {
            return PhotoUpdate::Unchanged;
        };
        match self.replace_photo_pixels(original) {
            Ok(()) => PhotoUpdate::Replaced,
            Err(err) => self.fail(err),
        }
    }

    pub fn has_photo(&self) -> bool {
        self.photo.content() != &LayerContent::Empty
    }

    // ---- frame ----

    /// Overlay `frame`, drawn from `raster`, at its default position.
    pub fn select_frame(&mut self, frame: Frame, raster: RasterImage) -> Result<(), EditorError> {
        let layer = Layer::frame_overlay(&self.config, raster)?;
        debug!(id = %frame.id, "frame selected");
        self.frame = Some((frame, layer));
        Ok(())
    }

    pub fn clear_frame(&mut self) {
        self.frame = None;
    }

    pub fn selected_frame(&self) -> Option<&Frame> {
        self.frame.as_ref().map(|(frame, _)| frame)
    }

    pub fn set_frame_draggable(&mut self, draggable: bool) {
        self.config.frame.draggable = draggable;
        if let Some((_, layer)) = self.frame.as_mut() {
            layer.set_drag_allowed(draggable);
        }
    }

    // ---- sticker ----

    /// Attach a sticker, replacing any previous one.
    pub fn set_sticker(
        &mut self,
        glyph: impl Into<String>,
        raster: RasterImage,
    ) -> Result<(), EditorError> {
        self.sticker = Some(Layer::emoji_sticker(&self.config, glyph, raster)?);
        Ok(())
    }

    pub fn remove_sticker(&mut self) {
        self.sticker = None;
    }

    pub fn sticker_zoom_in(&mut self) -> Option<LayerTransform> {
        let factor = self.config.sticker.zoom_in_factor;
        self.sticker_command(|sticker| sticker.zoom_by(factor))
    }

    pub fn sticker_zoom_out(&mut self) -> Option<LayerTransform> {
        let factor = self.config.sticker.zoom_out_factor;
        self.sticker_command(|sticker| sticker.zoom_by(factor))
    }

    pub fn sticker_reset(&mut self) -> Option<LayerTransform> {
        self.sticker_command(Layer::reset_transform)
    }

    fn sticker_command(
        &mut self,
        command: impl FnOnce(&mut Layer) -> LayerTransform,
    ) -> Option<LayerTransform> {
        let transform = command(self.sticker.as_mut()?);
        self.commit_event(LayerKind::EmojiSticker, transform);
        Some(transform)
    }

    // ---- whole screen ----

    /// Enable or disable gestures on a layer.
    pub fn set_editable(&mut self, kind: LayerKind, editable: bool) {
        if let Some(layer) = self.layer_mut(kind) {
            layer.set_editable(editable);
        }
        if !editable && self.active == Some(kind) {
            self.active = None;
        }
    }

    /// Commit a transform on a layer directly, without animation.
    pub fn set_transform(&mut self, kind: LayerKind, transform: LayerTransform) -> Option<LayerTransform> {
        let committed = self.layer_mut(kind)?.set_transform(transform);
        self.commit_event(kind, committed);
        Some(committed)
    }

    /// Back to the initial screen: placeholder photo, no frame, no sticker.
    pub fn reset(&mut self) -> Result<(), EditorError> {
        self.photo = Layer::base_photo(&self.config, None)?;
        self.original_photo = None;
        self.frame = None;
        self.sticker = None;
        self.active = None;
        self.events.clear();
        self.notices.clear();
        Ok(())
    }

    /// Committed state of every visible layer, back to front.
    pub fn snapshot(&self) -> Scene<'_> {
        let mut scene = Scene::new(self.config.viewport, self.config.export.background);
        for kind in LayerKind::PAINT_ORDER {
            if let Some(layer) = self.layer(kind).and_then(Layer::scene_layer) {
                scene.push(layer);
            }
        }
        scene
    }

    /// Export options configured for a strategy.
    pub fn export_options(&self, strategy: CaptureStrategy) -> &ExportOptions {
        match strategy {
            CaptureStrategy::NativeSnapshot => &self.config.export.native,
            CaptureStrategy::BrowserRaster => &self.config.export.browser,
        }
    }

    /// Flatten the committed view and encode it.
    #[instrument(level = "debug", skip(self))]
    pub fn capture(&mut self, strategy: CaptureStrategy) -> Result<(Vec<u8>, ImageFormat), EditorError> {
        let options = self.export_options(strategy).clone();
        let captured = capture_composite(&self.snapshot(), &options);
        match captured {
            Ok(bytes) => Ok((bytes, options.format)),
            Err(err) => Err(self.record(err.into())),
        }
    }

    /// Capture and hand the file to `sink`. Returns the saved file name.
    #[instrument(level = "info", skip(self, sink))]
    pub fn export(
        &mut self,
        strategy: CaptureStrategy,
        sink: &mut dyn ExportSink,
    ) -> Result<String, EditorError> {
        let (bytes, format) = self.capture(strategy)?;
        let file_name = export_file_name(&self.config.export.file_stem, format);
        match sink.save(&bytes, &file_name) {
            Ok(()) => {
                info!(%file_name, bytes = bytes.len(), "export saved");
                Ok(file_name)
            }
            Err(err) => Err(self.record(err.into())),
        }
    }

    // ---- events and notices ----

    /// Drain queued events.
    pub fn take_events(&mut self) -> Vec<EditorEvent> {
        std::mem::take(&mut self.events)
    }

    pub fn notices(&self) -> &[Notice] {
        &self.notices
    }

    /// Drain queued notices.
    pub fn take_notices(&mut self) -> Vec<Notice> {
        std::mem::take(&mut self.notices)
    }

    fn commit_event(&mut self, layer: LayerKind, transform: LayerTransform) {
        self.events
            .push(EditorEvent::TransformCommitted { layer, transform });
    }

    fn record(&mut self, err: EditorError) -> EditorError {
        warn!(kind = ?err.kind(), %err, "editor operation failed");
        self.notices.push(Notice::from(&err));
        err
    }

    fn fail(&mut self, err: EditorError) -> PhotoUpdate {
        self.record(err);
        PhotoUpdate::Unchanged
    }
}
