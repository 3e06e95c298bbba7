//! Render projection: transform state to a 2D affine.
//!
//! A layer is laid out as a box of `size` at `origin` in viewport
//! coordinates. Its transform is applied about the box center in the fixed
//! order translate, scale, rotate, so for a local point `p`:
//!
//! ```text
//! p' = origin + center + translate + scale * R(rotation) * (p - center)
//! ```

use kurbo::{Affine, Point, Rect, Size, Vec2};
use serde::{Deserialize, Serialize};

use super::LayerTransform;

/// Layout box of a layer inside the viewport.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LayerGeometry {
    pub origin: Point,
    pub size: Size,
}

impl LayerGeometry {
    pub fn new(origin: Point, size: Size) -> Self {
        Self { origin, size }
    }

    /// Geometry of a layer filling the viewport.
    pub fn fill(width: f64, height: f64) -> Self {
        Self {
            origin: Point::ORIGIN,
            size: Size::new(width, height),
        }
    }

    /// The box in its own coordinates.
    pub fn local_rect(&self) -> Rect {
        self.size.to_rect()
    }

    /// Center of the box in viewport coordinates, before any transform.
    pub fn center(&self) -> Point {
        self.origin + self.size.to_vec2() / 2.0
    }
}

/// Which components of the transform reach the screen.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ProjectionMode {
    /// Translate, scale and rotate.
    #[default]
    Full,
    /// Translation only; the frame overlay is repositioned, never resized.
    TranslateOnly,
}

/// Map a layer transform to the affine from layer-local to viewport space.
pub fn project(
    transform: &LayerTransform,
    geometry: &LayerGeometry,
    mode: ProjectionMode,
) -> Affine {
    let translate = Vec2::new(transform.translate_x, transform.translate_y);
    match mode {
        ProjectionMode::TranslateOnly => Affine::translate(geometry.origin.to_vec2() + translate),
        ProjectionMode::Full => {
            let half = geometry.size.to_vec2() / 2.0;
            Affine::translate(geometry.origin.to_vec2() + half + translate)
                * Affine::scale(transform.scale)
                * Affine::rotate(transform.rotation)
                * Affine::translate(-half)
        }
    }
}

/// Whether a viewport point lands on the projected layer box.
///
/// Degenerate transforms (scale 0) never hit.
pub fn hit_test(affine: Affine, geometry: &LayerGeometry, point: Point) -> bool {
    if affine.determinant().abs() < f64::EPSILON {
        return false;
    }
    let local = affine.inverse() * point;
    let rect = geometry.local_rect();
    local.x >= rect.x0 && local.x <= rect.x1 && local.y >= rect.y0 && local.y <= rect.y1
}

/// Convert to the rasterizer's single-precision transform.
pub fn to_skia_transform(affine: Affine) -> tiny_skia::Transform {
    let [a, b, c, d, e, f] = affine.as_coeffs();
    tiny_skia::Transform::from_row(a as f32, b as f32, c as f32, d as f32, e as f32, f as f32)
}
