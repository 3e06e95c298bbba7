//! Spring easing for double-tap, zoom buttons and reset.
//!
//! Animations are stepped by the host's frame scheduler through
//! [`TransformAnimation::step`]. Each component of a layer transform gets its
//! own damped spring; a spring is settled once both its displacement and its
//! speed drop below the configured rest thresholds, at which point it lands
//! exactly on the target.

use serde::{Deserialize, Serialize};

use crate::transform::LayerTransform;

/// Largest integration step. Frames longer than this are split.
const MAX_SUBSTEP: f64 = 1.0 / 240.0;

/// Springs that have not settled after this long are snapped to the target.
const MAX_DURATION: f64 = 10.0;

/// Configuration for physics-based spring animations.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SpringConfig {
    /// Tension of the spring (controls speed).
    pub stiffness: f64,
    /// Friction (controls oscillation decay).
    pub damping: f64,
    /// Mass of the animated value (controls inertia).
    pub mass: f64,
    /// Displacement below which the spring may settle.
    pub rest_displacement: f64,
    /// Speed below which the spring may settle.
    pub rest_speed: f64,
}

impl Default for SpringConfig {
    fn default() -> Self {
        Self {
            stiffness: 100.0,
            damping: 10.0,
            mass: 1.0,
            rest_displacement: 0.01,
            rest_speed: 2.0,
        }
    }
}

/// One scalar driven toward a target by a damped spring.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Spring {
    value: f64,
    velocity: f64,
    target: f64,
    elapsed: f64,
    settled: bool,
    config: SpringConfig,
}

impl Spring {
    pub fn new(start: f64, target: f64, config: SpringConfig) -> Self {
        let mut spring = Self {
            value: start,
            velocity: 0.0,
            target,
            elapsed: 0.0,
            settled: false,
            config,
        };
        spring.check_settled();
        spring
    }

    pub fn value(&self) -> f64 {
        self.value
    }

    pub fn target(&self) -> f64 {
        self.target
    }

    pub fn velocity(&self) -> f64 {
        self.velocity
    }

    pub fn is_settled(&self) -> bool {
        self.settled
    }

    /// Advance by `dt` seconds and return the new value.
    pub fn step(&mut self, dt: f64) -> f64 {
        if self.settled || !(dt > 0.0) {
            return self.value;
        }

        let substeps = (dt / MAX_SUBSTEP).ceil().max(1.0) as usize;
        let h = dt / substeps as f64;

        for _ in 0..substeps {
            let force = -self.config.stiffness * (self.value - self.target);
            let damping = -self.config.damping * self.velocity;
            let acceleration = (force + damping) / self.config.mass;

            // Semi-implicit Euler
            self.velocity += acceleration * h;
            self.value += self.velocity * h;
            self.elapsed += h;

            if self.check_settled() {
                break;
            }
        }

        if !self.settled && self.elapsed >= MAX_DURATION {
            self.land();
        }
        self.value
    }

    fn check_settled(&mut self) -> bool {
        let displacement = (self.value - self.target).abs();
        if displacement < self.config.rest_displacement && self.velocity.abs() < self.config.rest_speed
        {
            self.land();
        }
        self.settled
    }

    fn land(&mut self) {
        self.value = self.target;
        self.velocity = 0.0;
        self.settled = true;
    }
}

/// Springs for every component of a layer transform.
#[derive(Clone, Debug, PartialEq)]
pub struct TransformAnimation {
    scale: Spring,
    translate_x: Spring,
    translate_y: Spring,
    rotation: Spring,
}

impl TransformAnimation {
    pub fn new(from: LayerTransform, to: LayerTransform, config: SpringConfig) -> Self {
        Self {
            scale: Spring::new(from.scale, to.scale, config),
            translate_x: Spring::new(from.translate_x, to.translate_x, config),
            translate_y: Spring::new(from.translate_y, to.translate_y, config),
            rotation: Spring::new(from.rotation, to.rotation, config),
        }
    }

    /// Advance all springs and return the interpolated transform.
    pub fn step(&mut self, dt: f64) -> LayerTransform {
        LayerTransform {
            scale: self.scale.step(dt),
            translate_x: self.translate_x.step(dt),
            translate_y: self.translate_y.step(dt),
            rotation: self.rotation.step(dt),
        }
    }

    pub fn current(&self) -> LayerTransform {
        LayerTransform {
            scale: self.scale.value(),
            translate_x: self.translate_x.value(),
            translate_y: self.translate_y.value(),
            rotation: self.rotation.value(),
        }
    }

    pub fn target(&self) -> LayerTransform {
        LayerTransform {
            scale: self.scale.target(),
            translate_x: self.translate_x.target(),
            translate_y: self.translate_y.target(),
            rotation: self.rotation.target(),
        }
    }

    pub fn is_settled(&self) -> bool {
        self.scale.is_settled()
            && self.translate_x.is_settled()
            && self.translate_y.is_settled()
            && self.rotation.is_settled()
    }
}
