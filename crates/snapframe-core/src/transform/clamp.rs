//! Clamp policy functions.
//!
//! These are pure and are applied on every gesture update before the live
//! transform is drawn, and once more when it is committed.
//!
//! # Translation bound
//!
//! A layer of `content` length scaled by `s` and centered in a viewport of
//! `viewport` length may move until its edge meets the viewport edge:
//!
//! ```text
//! bound = max(0, (content * s - viewport) / 2)
//! ```
//!
//! The bound is computed before rotation, matching the projection order
//! translate, scale, rotate.

use serde::{Deserialize, Serialize};

/// Clamp a scale into `[min, max]`.
///
/// Equivalent to `max(min, min(max, s))`. NaN input yields `min`.
#[inline]
pub fn clamp_scale(s: f64, min: f64, max: f64) -> f64 {
    if s.is_nan() {
        return min;
    }
    min.max(max.min(s))
}

/// Largest allowed translation magnitude along one axis.
#[inline]
pub fn translation_bound(scale: f64, viewport: f64, content: f64) -> f64 {
    ((content * scale - viewport) / 2.0).max(0.0)
}

/// Clamp a translation along one axis so the scaled content keeps covering
/// the viewport.
#[inline]
pub fn clamp_translation(t: f64, scale: f64, viewport: f64, content: f64) -> f64 {
    if t.is_nan() {
        return 0.0;
    }
    let bound = translation_bound(scale, viewport, content);
    (-bound).max(bound.min(t))
}

/// Scale range of a layer.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScaleLimits {
    pub min: f64,
    pub max: f64,
}

impl ScaleLimits {
    pub const fn new(min: f64, max: f64) -> Self {
        Self { min, max }
    }

    /// A scale that cannot change.
    pub const fn locked(value: f64) -> Self {
        Self {
            min: value,
            max: value,
        }
    }

    pub fn clamp(&self, s: f64) -> f64 {
        clamp_scale(s, self.min, self.max)
    }

    pub fn is_locked(&self) -> bool {
        self.min == self.max
    }
}

/// How a layer's translation is bounded.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum TranslationBounds {
    /// Content of the given size must keep covering the viewport.
    Cover {
        viewport_width: f64,
        viewport_height: f64,
        content_width: f64,
        content_height: f64,
    },
    /// Free-floating overlay.
    Free,
}

impl TranslationBounds {
    /// Clamp a translation pair for the given scale.
    pub fn clamp(&self, translate_x: f64, translate_y: f64, scale: f64) -> (f64, f64) {
        match *self {
            TranslationBounds::Cover {
                viewport_width,
                viewport_height,
                content_width,
                content_height,
            } => (
                clamp_translation(translate_x, scale, viewport_width, content_width),
                clamp_translation(translate_y, scale, viewport_height, content_height),
            ),
            TranslationBounds::Free => (translate_x, translate_y),
        }
    }
}


// ============================================================================
// Property-Based Tests
// ============================================================================
