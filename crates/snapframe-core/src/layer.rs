//! One parametrized transformable layer.
//!
//! The base photo, the frame overlay and the emoji sticker are all a
//! [`Layer`]; what differs between them is the [`LayerPolicy`] record
//! (scale range, translation bound, whether rotation and focal zoom apply,
//! what a double tap does) and the layout box.
//!
//! A layer owns its [`CompositeRecognizer`], its [`TransformState`] and the
//! ephemeral gesture session that exists while a contact is down on it.

use kurbo::{Affine, Point, Rect, Size, Vec2};
use serde::{Deserialize, Serialize};
use tracing::{debug, trace};

use crate::animation::{SpringConfig, TransformAnimation};
use crate::config::EditorConfig;
use crate::export::SceneLayer;
use crate::gesture::{CompositeRecognizer, GestureKind, MergedUpdate, TouchEvent, TouchPhase};
use crate::raster::{cover_crop, DecodeError, RasterImage};
use crate::transform::{
    hit_test, project, LayerGeometry, LayerTransform, ProjectionMode, ScaleLimits,
    TransformState, TranslationBounds,
};

/// Which of the three layers this is. Also identifies the layer in editor
/// events.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum LayerKind {
    BasePhoto,
    FrameOverlay,
    EmojiSticker,
}

impl LayerKind {
    /// Back-to-front drawing order.
    pub const PAINT_ORDER: [LayerKind; 3] = [
        LayerKind::BasePhoto,
        LayerKind::FrameOverlay,
        LayerKind::EmojiSticker,
    ];

    /// Front-to-back touch order.
    pub const HIT_ORDER: [LayerKind; 3] = [
        LayerKind::EmojiSticker,
        LayerKind::FrameOverlay,
        LayerKind::BasePhoto,
    ];
}

/// What a recognized double tap does to a layer.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum DoubleTapAction {
    /// Zoomed in: back to `fit` with translation (0, 0). At fit: to `zoomed`.
    ToggleZoom { fit: f64, zoomed: f64 },
    /// Scale 1 and rotation 0, translation kept.
    ResetScaleRotation,
    None,
}

/// Numeric rules for one layer variant.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LayerPolicy {
    pub scale: ScaleLimits,
    pub translation: TranslationBounds,
    pub rotation: bool,
    /// Keep the content under the pinch midpoint fixed while zooming.
    pub focal_zoom: bool,
    pub double_tap: DoubleTapAction,
    pub projection: ProjectionMode,
}

impl LayerPolicy {
    pub fn base_photo(config: &EditorConfig) -> Self {
        let viewport = config.viewport;
        Self {
            scale: ScaleLimits::new(config.photo.min_scale, config.photo.max_scale),
            translation: TranslationBounds::Cover {
                viewport_width: viewport.width,
                viewport_height: viewport.height,
                content_width: viewport.width,
                content_height: viewport.height,
            },
            rotation: false,
            focal_zoom: config.photo.focal_zoom,
            double_tap: DoubleTapAction::ToggleZoom {
                fit: config.photo.min_scale,
                zoomed: config.photo.zoomed_scale,
            },
            projection: ProjectionMode::Full,
        }
    }

    pub fn frame_overlay(_config: &EditorConfig) -> Self {
        Self {
            scale: ScaleLimits::locked(1.0),
            translation: TranslationBounds::Free,
            rotation: false,
            focal_zoom: false,
            double_tap: DoubleTapAction::None,
            projection: ProjectionMode::TranslateOnly,
        }
    }

    pub fn emoji_sticker(config: &EditorConfig) -> Self {
        Self {
            scale: ScaleLimits::new(config.sticker.min_scale, config.sticker.max_scale),
            translation: TranslationBounds::Free,
            rotation: true,
            focal_zoom: false,
            double_tap: DoubleTapAction::ResetScaleRotation,
            projection: ProjectionMode::Full,
        }
    }

    pub fn for_kind(kind: LayerKind, config: &EditorConfig) -> Self {
        match kind {
            LayerKind::BasePhoto => Self::base_photo(config),
            LayerKind::FrameOverlay => Self::frame_overlay(config),
            LayerKind::EmojiSticker => Self::emoji_sticker(config),
        }
    }

    /// Bring a transform inside this policy. Translation is bounded for the
    /// already-clamped scale.
    pub fn clamp(&self, t: LayerTransform) -> LayerTransform {
        let scale = self.scale.clamp(t.scale);
        let (translate_x, translate_y) = self.translation.clamp(
            finite_or_zero(t.translate_x),
            finite_or_zero(t.translate_y),
            scale,
        );
        let rotation = if self.rotation {
            finite_or_zero(t.rotation)
        } else {
            0.0
        };
        LayerTransform {
            scale,
            translate_x,
            translate_y,
            rotation,
        }
    }

    /// Recognizers composed for this layer.
    pub fn gestures(&self) -> Vec<GestureKind> {
        let mut kinds = vec![GestureKind::Pan];
        if !self.scale.is_locked() {
            kinds.push(GestureKind::Pinch);
        }
        if self.rotation {
            kinds.push(GestureKind::Rotate);
        }
        if self.double_tap != DoubleTapAction::None {
            kinds.push(GestureKind::DoubleTap);
        }
        kinds
    }

    /// Target of a double tap from `committed`, or `None` if the layer
    /// ignores double taps.
    pub fn double_tap_target(&self, committed: LayerTransform) -> Option<LayerTransform> {
        let target = match self.double_tap {
            DoubleTapAction::ToggleZoom { fit, zoomed } => {
                if committed.scale > fit {
                    LayerTransform {
                        scale: fit,
                        translate_x: 0.0,
                        translate_y: 0.0,
                        ..committed
                    }
                } else {
                    committed.with_scale(zoomed)
                }
            }
            DoubleTapAction::ResetScaleRotation => LayerTransform {
                scale: 1.0,
                rotation: 0.0,
                ..committed
            },
            DoubleTapAction::None => return None,
        };
        Some(self.clamp(target))
    }
}

fn finite_or_zero(v: f64) -> f64 {
    if v.is_finite() {
        v
    } else {
        0.0
    }
}

/// What a layer shows.
#[derive(Debug, Clone, PartialEq)]
pub enum LayerContent {
    /// Nothing chosen yet; the photo layer starts out like this.
    Empty,
    Image(RasterImage),
    /// An emoji glyph and its rasterized bitmap.
    Glyph { glyph: String, raster: RasterImage },
}

impl LayerContent {
    pub fn raster(&self) -> Option<&RasterImage> {
        match self {
            LayerContent::Empty => None,
            LayerContent::Image(raster) | LayerContent::Glyph { raster, .. } => Some(raster),
        }
    }

    pub fn glyph(&self) -> Option<&str> {
        match self {
            LayerContent::Glyph { glyph, .. } => Some(glyph),
            _ => None,
        }
    }
}

/// Deltas of the gesture in progress, relative to `base`.
///
/// Recognizer values are cumulative from their own start. When one of them
/// ends while others keep going (a finger lifts out of a pinch but the pan
/// continues), the session rebases onto the current live transform and
/// records the surviving recognizers' values as references.
#[derive(Debug, Clone, Copy)]
struct GestureSession {
    base: LayerTransform,
    pan: Vec2,
    pan_ref: Vec2,
    ratio: f64,
    ratio_ref: f64,
    angle: f64,
    angle_ref: f64,
    focal: Option<Point>,
    /// Live scale and translation when the current pinch started.
    pinch_anchor: Option<(f64, Vec2)>,
    touched: bool,
}

impl GestureSession {
    fn new(base: LayerTransform) -> Self {
        Self {
            base,
            pan: Vec2::ZERO,
            pan_ref: Vec2::ZERO,
            ratio: 1.0,
            ratio_ref: 1.0,
            angle: 0.0,
            angle_ref: 0.0,
            focal: None,
            pinch_anchor: None,
            touched: false,
        }
    }

    fn candidate(&self, policy: &LayerPolicy, center: Point) -> LayerTransform {
        let ratio = if self.ratio_ref > 0.0 {
            self.ratio / self.ratio_ref
        } else {
            self.ratio
        };
        let scale = policy.scale.clamp(self.base.scale * ratio);

        let mut translate =
            Vec2::new(self.base.translate_x, self.base.translate_y) + (self.pan - self.pan_ref);
        if policy.focal_zoom {
            if let (Some(focal), Some((anchor_scale, anchor_translate))) =
                (self.focal, self.pinch_anchor)
            {
                if anchor_scale > 0.0 {
                    let relative = focal - (center + anchor_translate);
                    translate -= relative * (scale / anchor_scale - 1.0);
                }
            }
        }

        let rotation = if policy.rotation {
            self.base.rotation + (self.angle - self.angle_ref)
        } else {
            self.base.rotation
        };

        policy.clamp(LayerTransform {
            scale,
            translate_x: translate.x,
            translate_y: translate.y,
            rotation,
        })
    }

    fn rebase(&mut self, live: LayerTransform, update: &MergedUpdate) {
        self.base = live;
        let live_translate = Vec2::new(live.translate_x, live.translate_y);

        if update.pan.is_some_and(|p| p.ended) {
            self.pan = Vec2::ZERO;
        }
        self.pan_ref = self.pan;

        if update.pinch.is_some_and(|p| p.ended) {
            self.ratio = 1.0;
            self.focal = None;
            self.pinch_anchor = None;
        } else if self.pinch_anchor.is_some() {
            self.pinch_anchor = Some((live.scale, live_translate));
        }
        self.ratio_ref = self.ratio;

        if update.rotation.is_some_and(|r| r.ended) {
            self.angle = 0.0;
        }
        self.angle_ref = self.angle;
    }
}

/// A transformable visual element of the editor.
#[derive(Debug)]
pub struct Layer {
    kind: LayerKind,
    content: LayerContent,
    /// Pixels actually drawn, already cropped to what a cover fit shows.
    display: Option<RasterImage>,
    /// Where `display` is drawn inside the layer box.
    content_rect: Rect,
    geometry: LayerGeometry,
    policy: LayerPolicy,
    state: TransformState,
    editable: bool,
    drag_allowed: bool,
    gestures: CompositeRecognizer,
    session: Option<GestureSession>,
    animation: Option<TransformAnimation>,
    spring: SpringConfig,
}

impl Layer {
    fn with_parts(
        kind: LayerKind,
        content: LayerContent,
        geometry: LayerGeometry,
        content_rect: Rect,
        config: &EditorConfig,
    ) -> Result<Self, DecodeError> {
        let policy = LayerPolicy::for_kind(kind, config);
        let mut layer = Self {
            kind,
            content: LayerContent::Empty,
            display: None,
            content_rect,
            geometry,
            policy,
            state: TransformState::new(LayerTransform::IDENTITY),
            editable: true,
            drag_allowed: true,
            gestures: CompositeRecognizer::for_kinds(&policy.gestures(), &config.gestures),
            session: None,
            animation: None,
            spring: config.spring,
        };
        layer.set_content(content)?;
        Ok(layer)
    }

    /// The base photo, filling the viewport. `None` shows the placeholder.
    pub fn base_photo(config: &EditorConfig, image: Option<RasterImage>) -> Result<Self, DecodeError> {
        let geometry = LayerGeometry::fill(config.viewport.width, config.viewport.height);
        let content = image.map_or(LayerContent::Empty, LayerContent::Image);
        Self::with_parts(
            LayerKind::BasePhoto,
            content,
            geometry,
            geometry.local_rect(),
            config,
        )
    }

    /// A frame image stretched over the viewport.
    pub fn frame_overlay(config: &EditorConfig, image: RasterImage) -> Result<Self, DecodeError> {
        let geometry = LayerGeometry::fill(config.viewport.width, config.viewport.height);
        let mut layer = Self::with_parts(
            LayerKind::FrameOverlay,
            LayerContent::Image(image),
            geometry,
            geometry.local_rect(),
            config,
        )?;
        layer.drag_allowed = config.frame.draggable;
        Ok(layer)
    }

    /// A glyph sticker in a padded square box at its configured origin.
    pub fn emoji_sticker(
        config: &EditorConfig,
        glyph: impl Into<String>,
        raster: RasterImage,
    ) -> Result<Self, DecodeError> {
        let sticker = &config.sticker;
        let edge = sticker.box_size();
        let geometry = LayerGeometry::new(
            Point::new(sticker.origin_x, sticker.origin_y),
            Size::new(edge, edge),
        );
        let inset = (edge - sticker.glyph_size) / 2.0;
        let glyph_box = Rect::new(inset, inset, inset + sticker.glyph_size, inset + sticker.glyph_size);
        let content_rect = contain_rect(glyph_box, raster.width, raster.height);
        Self::with_parts(
            LayerKind::EmojiSticker,
            LayerContent::Glyph {
                glyph: glyph.into(),
                raster,
            },
            geometry,
            content_rect,
            config,
        )
    }

    /// Swap what the layer shows. The transform is left alone.
    pub fn set_content(&mut self, content: LayerContent) -> Result<(), DecodeError> {
        self.display = match &content {
            LayerContent::Empty => None,
            LayerContent::Glyph { raster, .. } => {
                raster.validate()?;
                Some(raster.clone())
            }
            LayerContent::Image(raster) => {
                let size = self.geometry.size;
                Some(cover_crop(raster, size.width, size.height)?)
            }
        };
        self.content = content;
        Ok(())
    }

    pub fn kind(&self) -> LayerKind {
        self.kind
    }

    pub fn content(&self) -> &LayerContent {
        &self.content
    }

    pub fn geometry(&self) -> &LayerGeometry {
        &self.geometry
    }

    pub fn policy(&self) -> &LayerPolicy {
        &self.policy
    }

    pub fn live(&self) -> LayerTransform {
        self.state.live()
    }

    pub fn committed(&self) -> LayerTransform {
        self.state.committed()
    }

    pub fn is_editable(&self) -> bool {
        self.editable
    }

    /// Stop or resume accepting gestures. Disabling drops any session in
    /// progress without committing it.
    pub fn set_editable(&mut self, editable: bool) {
        self.editable = editable;
        if !editable {
            self.abandon_session();
        }
    }

    pub fn is_drag_allowed(&self) -> bool {
        self.drag_allowed
    }

    pub fn set_drag_allowed(&mut self, allowed: bool) {
        self.drag_allowed = allowed;
    }

    pub fn is_animating(&self) -> bool {
        self.animation.is_some()
    }

    pub fn in_gesture(&self) -> bool {
        self.session.is_some()
    }

    /// Whether contacts that started on this layer are still down.
    pub fn is_tracking(&self) -> bool {
        self.gestures.is_tracking()
    }

    /// Affine of the on-screen transform.
    pub fn live_affine(&self) -> Affine {
        project(&self.state.live(), &self.geometry, self.policy.projection)
    }

    /// Affine of the committed transform.
    pub fn committed_affine(&self) -> Affine {
        project(&self.state.committed(), &self.geometry, self.policy.projection)
    }

    /// Whether a viewport point should start a gesture on this layer.
    ///
    /// The frame overlay only takes touches on its opaque pixels so the
    /// photo stays reachable through the frame's window.
    pub fn hit(&self, point: Point) -> bool {
        if !self.editable {
            return false;
        }
        let affine = self.live_affine();
        if !hit_test(affine, &self.geometry, point) {
            return false;
        }
        match self.kind {
            LayerKind::FrameOverlay => self.drag_allowed && self.opaque_at(affine.inverse() * point),
            _ => true,
        }
    }

    fn opaque_at(&self, local: Point) -> bool {
        let Some(display) = &self.display else {
            return false;
        };
        let rect = self.content_rect;
        if !rect.contains(local) || rect.width() <= 0.0 || rect.height() <= 0.0 {
            return false;
        }
        let px = ((local.x - rect.x0) / rect.width() * display.width as f64) as u32;
        let py = ((local.y - rect.y0) / rect.height() * display.height as f64) as u32;
        display
            .pixel(px.min(display.width.saturating_sub(1)), py.min(display.height.saturating_sub(1)))
            .is_some_and(|[_, _, _, a]| a > 0)
    }

    /// Feed one contact event. Returns the newly committed transform when
    /// this event ended the gesture or triggered a double tap.
    pub fn handle_touch(&mut self, event: &TouchEvent) -> Option<LayerTransform> {
        if !self.editable {
            return None;
        }

        if event.phase == TouchPhase::Down && self.session.is_none() {
            self.begin_session();
        }

        let update = self.gestures.handle(event);

        if let Some(position) = update.double_tap {
            self.session = None;
            return self.double_tap(position);
        }

        let mut session = self.session.take()?;
        if !update.is_empty() {
            self.apply_update(&mut session, &update);
        }

        if update.released {
            return self.end_session(session);
        }
        self.session = Some(session);
        None
    }

    fn begin_session(&mut self) {
        if self.animation.take().is_some() {
            trace!(layer = ?self.kind, "gesture interrupts animation");
        }
        // Deltas are relative to the committed value
        self.state.settle();
        self.session = Some(GestureSession::new(self.state.committed()));
    }

    fn apply_update(&mut self, session: &mut GestureSession, update: &MergedUpdate) {
        session.touched = true;

        if let Some(pan) = update.pan {
            if self.drag_allowed {
                session.pan = pan.value;
            }
        }
        if let Some(pinch) = update.pinch {
            if session.pinch_anchor.is_none() {
                let live = self.state.live();
                session.pinch_anchor =
                    Some((live.scale, Vec2::new(live.translate_x, live.translate_y)));
            }
            session.ratio = pinch.value.ratio;
            session.focal = Some(pinch.value.focal);
        }
        if let Some(rotation) = update.rotation {
            session.angle = rotation.value;
        }

        let live = session.candidate(&self.policy, self.geometry.center());
        self.state.set_live(live);

        let any_ended = update.pan.is_some_and(|p| p.ended)
            || update.pinch.is_some_and(|p| p.ended)
            || update.rotation.is_some_and(|r| r.ended);
        if any_ended && !update.released {
            session.rebase(live, update);
        }
    }

    fn end_session(&mut self, session: GestureSession) -> Option<LayerTransform> {
        if !session.touched {
            return None;
        }
        let committed = self.policy.clamp(self.state.live());
        self.state.commit(committed);
        debug!(layer = ?self.kind, ?committed, "gesture committed");
        Some(committed)
    }

    /// Drop the gesture in progress and put the layer back on its committed
    /// value.
    pub fn abandon_session(&mut self) {
        self.gestures.reset();
        if self.session.take().is_some() {
            self.state.settle();
        }
    }

    fn double_tap(&mut self, position: Point) -> Option<LayerTransform> {
        let target = self.policy.double_tap_target(self.state.committed())?;
        debug!(layer = ?self.kind, x = position.x, y = position.y, "double tap");
        self.animate_to(target);
        Some(target)
    }

    /// Commit `target` now and ease the live value toward it.
    pub fn animate_to(&mut self, target: LayerTransform) -> LayerTransform {
        let target = self.policy.clamp(target);
        self.state.commit_target(target);
        let animation = TransformAnimation::new(self.state.live(), target, self.spring);
        self.animation = (!animation.is_settled()).then_some(animation);
        if self.animation.is_none() {
            self.state.settle();
        }
        target
    }

    /// Commit `transform` without animating. Used to restore a layout.
    pub fn set_transform(&mut self, transform: LayerTransform) -> LayerTransform {
        self.abandon_session();
        self.animation = None;
        let committed = self.policy.clamp(transform);
        self.state.commit(committed);
        committed
    }

    /// Multiply the committed scale by `factor` (clamped) with easing.
    pub fn zoom_by(&mut self, factor: f64) -> LayerTransform {
        let committed = self.state.committed();
        self.animate_to(committed.with_scale(committed.scale * factor))
    }

    /// Ease back to the identity transform.
    pub fn reset_transform(&mut self) -> LayerTransform {
        self.abandon_session();
        self.animate_to(LayerTransform::IDENTITY)
    }

    /// Advance the running animation by `dt` seconds. Returns whether the
    /// live value changed.
    pub fn tick(&mut self, dt: f64) -> bool {
        let Some(animation) = self.animation.as_mut() else {
            return false;
        };
        let live = animation.step(dt);
        let settled = animation.is_settled();
        self.state.set_live(live);
        if settled {
            self.animation = None;
            self.state.settle();
        }
        true
    }

    /// The layer as export sees it: committed transform, display pixels.
    pub fn scene_layer(&self) -> Option<SceneLayer<'_>> {
        let raster = self.display.as_ref()?;
        Some(SceneLayer {
            kind: self.kind,
            raster,
            content_rect: self.content_rect,
            transform: self.committed_affine(),
        })
    }
}

/// Largest rect with the raster's aspect ratio centered in `bounds`.
fn contain_rect(bounds: Rect, width: u32, height: u32) -> Rect {
    if width == 0 || height == 0 {
        return bounds;
    }
    let scale = (bounds.width() / width as f64).min(bounds.height() / height as f64);
    let size = Size::new(width as f64 * scale, height as f64 * scale);
    Rect::from_center_size(bounds.center(), size)
}


// ============================================================================
// Property-Based Tests
// ============================================================================

#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        /// Property: a committed photo transform respects the cover bound.
        #[test]
        fn prop_photo_commit_within_bounds(
            scale in 1.0f64..3.0,
            tx in -1000.0f64..1000.0,
            ty in -1000.0f64..1000.0,
        ) {
            let config = EditorConfig::default();
            let mut layer = Layer::base_photo(&config, None).unwrap();
            let committed = layer.set_transform(LayerTransform::new(scale, tx, ty, 0.0));
            let bound_x = (320.0 * committed.scale - 320.0) / 2.0;
            let bound_y = (440.0 * committed.scale - 440.0) / 2.0;
            prop_assert!(committed.translate_x.abs() <= bound_x);
            prop_assert!(committed.translate_y.abs() <= bound_y);
        }

        /// Property: the policy clamp is idempotent for every variant.
        #[test]
        fn prop_policy_clamp_idempotent(
            scale in -5.0f64..10.0,
            tx in -1000.0f64..1000.0,
            rotation in -10.0f64..10.0,
        ) {
            let config = EditorConfig::default();
            for kind in LayerKind::PAINT_ORDER {
                let policy = LayerPolicy::for_kind(kind, &config);
                let once = policy.clamp(LayerTransform::new(scale, tx, tx, rotation));
                prop_assert_eq!(policy.clamp(once), once);
            }
        }
    }
}
