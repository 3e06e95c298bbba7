//! Per-layer transform values and their committed baseline.

use serde::{Deserialize, Serialize};

/// Scale, translation and rotation of one layer.
///
/// Translation is in viewport logical units, rotation in radians
/// (positive = clockwise on screen, since the y axis points down).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LayerTransform {
    pub scale: f64,
    pub translate_x: f64,
    pub translate_y: f64,
    pub rotation: f64,
}

impl Default for LayerTransform {
    fn default() -> Self {
        Self::IDENTITY
    }
}

impl LayerTransform {
    pub const IDENTITY: LayerTransform = LayerTransform {
        scale: 1.0,
        translate_x: 0.0,
        translate_y: 0.0,
        rotation: 0.0,
    };

    pub fn new(scale: f64, translate_x: f64, translate_y: f64, rotation: f64) -> Self {
        Self {
            scale,
            translate_x,
            translate_y,
            rotation,
        }
    }

    /// Same transform with a different translation.
    pub fn with_translation(self, translate_x: f64, translate_y: f64) -> Self {
        Self {
            translate_x,
            translate_y,
            ..self
        }
    }

    /// Same transform with a different scale.
    pub fn with_scale(self, scale: f64) -> Self {
        Self { scale, ..self }
    }
}

/// Live and committed transform of a layer.
///
/// `live` is what is drawn on screen and may be mid-gesture or
/// mid-animation. `committed` is the value at the last gesture end; it is the
/// baseline for the next gesture's deltas and the value export reads.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct TransformState {
    live: LayerTransform,
    committed: LayerTransform,
}

impl TransformState {
    pub fn new(initial: LayerTransform) -> Self {
        Self {
            live: initial,
            committed: initial,
        }
    }

    pub fn live(&self) -> LayerTransform {
        self.live
    }

    pub fn committed(&self) -> LayerTransform {
        self.committed
    }

    /// Update the on-screen value without touching the baseline.
    pub fn set_live(&mut self, transform: LayerTransform) {
        self.live = transform;
    }

    /// Make `transform` both the on-screen value and the new baseline.
    pub fn commit(&mut self, transform: LayerTransform) {
        self.live = transform;
        self.committed = transform;
    }

    /// Set the baseline only, leaving the live value to an animation.
    pub fn commit_target(&mut self, transform: LayerTransform) {
        self.committed = transform;
    }

    /// Snap the live value back onto the baseline.
    pub fn settle(&mut self) {
        self.live = self.committed;
    }
}
