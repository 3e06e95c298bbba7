//! Layer transforms: state, clamp policy and render projection.
//!
//! # Transform Order
//!
//! Each layer carries a [`LayerTransform`] that is applied about the layer's
//! center in this order:
//! 1. Translate
//! 2. Scale
//! 3. Rotate
//!
//! Translation bounds are derived before rotation, so rotating a sticker never
//! changes how far it may be dragged.
//!
//! # Coordinate System
//!
//! - Units are viewport logical units (the reference viewport is 320 x 440)
//! - Origin is the viewport's top-left corner, y points down
//! - Rotation is in radians, positive = clockwise on screen

mod clamp;
mod projection;
mod state;

pub use clamp::{clamp_scale, clamp_translation, translation_bound, ScaleLimits, TranslationBounds};
pub use projection::{
    hit_test, project, to_skia_transform, LayerGeometry, ProjectionMode,
};
pub use state::{LayerTransform, TransformState};
