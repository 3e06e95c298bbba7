//! Individual gesture state machines.

use std::f64::consts::{PI, TAU};

use kurbo::{Point, Vec2};
use serde::{Deserialize, Serialize};

use super::{Contacts, PointerId, TouchEvent, TouchPhase};
use crate::config::GestureConfig;

/// Which gesture a recognizer detects.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum GestureKind {
    Pan,
    Pinch,
    Rotate,
    DoubleTap,
}

/// Recognizer lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RecognizerState {
    #[default]
    Idle,
    Active,
    /// The commit event has been emitted. The next event resets to `Idle`.
    Ended,
}

/// Whether an update is part of the continuous stream or the final commit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GesturePhase {
    Active,
    Ended,
}

/// Recognizer-specific payload. All values are cumulative since the
/// recognizer became active.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum GestureDelta {
    Translation(Vec2),
    Scale { ratio: f64, focal: Point },
    Rotation(f64),
    DoubleTap(Point),
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GestureUpdate {
    pub phase: GesturePhase,
    pub delta: GestureDelta,
}

impl GestureUpdate {
    fn active(delta: GestureDelta) -> Self {
        Self {
            phase: GesturePhase::Active,
            delta,
        }
    }

    fn ended(delta: GestureDelta) -> Self {
        Self {
            phase: GesturePhase::Ended,
            delta,
        }
    }

    pub fn is_ended(&self) -> bool {
        self.phase == GesturePhase::Ended
    }
}

/// A gesture state machine fed one contact event at a time.
///
/// `contacts` already reflects `event`.
pub trait Recognizer {
    fn kind(&self) -> GestureKind;

    fn state(&self) -> RecognizerState;

    fn handle(&mut self, event: &TouchEvent, contacts: &Contacts) -> Option<GestureUpdate>;

    /// Drop all tracking and return to `Idle` without emitting anything.
    fn reset(&mut self);
}

// ============================================================================
// Pan
// ============================================================================

/// Centroid translation of all contacts.
///
/// When a finger is added or lifted mid-gesture the centroid jumps; the pan
/// re-anchors so the reported translation stays continuous.
#[derive(Debug, Clone)]
pub struct PanRecognizer {
    activation_distance: f64,
    state: RecognizerState,
    anchor: Option<Point>,
    carried: Vec2,
    last_count: usize,
    translation: Vec2,
}

impl PanRecognizer {
    pub fn new(activation_distance: f64) -> Self {
        Self {
            activation_distance: activation_distance.max(0.0),
            state: RecognizerState::Idle,
            anchor: None,
            carried: Vec2::ZERO,
            last_count: 0,
            translation: Vec2::ZERO,
        }
    }

    pub fn from_config(config: &GestureConfig) -> Self {
        Self::new(config.pan_activation_distance)
    }
}

impl Recognizer for PanRecognizer {
    fn kind(&self) -> GestureKind {
        GestureKind::Pan
    }

    fn state(&self) -> RecognizerState {
        self.state
    }

    fn handle(&mut self, _event: &TouchEvent, contacts: &Contacts) -> Option<GestureUpdate> {
        if self.state == RecognizerState::Ended {
            self.reset();
        }

        let Some(centroid) = contacts.centroid() else {
            let was_active = self.state == RecognizerState::Active;
            let final_translation = self.translation;
            self.reset();
            if was_active {
                self.state = RecognizerState::Ended;
                return Some(GestureUpdate::ended(GestureDelta::Translation(
                    final_translation,
                )));
            }
            return None;
        };

        match self.anchor {
            Some(anchor) if contacts.len() == self.last_count => {
                self.translation = self.carried + (centroid - anchor);
            }
            Some(_) => {
                // Contact count changed: keep what was travelled so far
                self.carried = self.translation;
                self.anchor = Some(centroid);
            }
            None => {
                self.anchor = Some(centroid);
                self.carried = Vec2::ZERO;
                self.translation = Vec2::ZERO;
            }
        }
        self.last_count = contacts.len();

        if self.state == RecognizerState::Idle
            && self.translation.hypot() >= self.activation_distance
            && self.translation != Vec2::ZERO
        {
            self.state = RecognizerState::Active;
        }

        (self.state == RecognizerState::Active)
            .then(|| GestureUpdate::active(GestureDelta::Translation(self.translation)))
    }

    fn reset(&mut self) {
        self.state = RecognizerState::Idle;
        self.anchor = None;
        self.carried = Vec2::ZERO;
        self.last_count = 0;
        self.translation = Vec2::ZERO;
    }
}

// ============================================================================
// Two-finger tracking shared by pinch and rotate
// ============================================================================

/// The pair of contacts a two-finger recognizer is locked onto.
#[derive(Debug, Clone, Copy)]
struct TrackedPair {
    first: PointerId,
    second: PointerId,
}

impl TrackedPair {
    /// Current positions, or `None` once either finger has lifted.
    fn positions(&self, contacts: &Contacts) -> Option<(Point, Point)> {
        Some((contacts.get(self.first)?, contacts.get(self.second)?))
    }
}

// ============================================================================
// Pinch
// ============================================================================

/// Distance ratio between two contacts, relative to their distance when the
/// pinch began. The focal point is the pair's midpoint.
#[derive(Debug, Clone)]
pub struct PinchRecognizer {
    min_span: f64,
    state: RecognizerState,
    pair: Option<TrackedPair>,
    start_span: f64,
    ratio: f64,
    focal: Point,
}

impl PinchRecognizer {
    pub fn new(min_span: f64) -> Self {
        Self {
            min_span: min_span.max(f64::EPSILON),
            state: RecognizerState::Idle,
            pair: None,
            start_span: 0.0,
            ratio: 1.0,
            focal: Point::ORIGIN,
        }
    }

    pub fn from_config(config: &GestureConfig) -> Self {
        Self::new(config.min_span)
    }
}

impl Recognizer for PinchRecognizer {
    fn kind(&self) -> GestureKind {
        GestureKind::Pinch
    }

    fn state(&self) -> RecognizerState {
        self.state
    }

    fn handle(&mut self, _event: &TouchEvent, contacts: &Contacts) -> Option<GestureUpdate> {
        if self.state == RecognizerState::Ended {
            self.reset();
        }

        if let Some(pair) = self.pair {
            let Some((a, b)) = pair.positions(contacts) else {
                let delta = GestureDelta::Scale {
                    ratio: self.ratio,
                    focal: self.focal,
                };
                self.reset();
                self.state = RecognizerState::Ended;
                return Some(GestureUpdate::ended(delta));
            };
            self.ratio = a.distance(b) / self.start_span;
            self.focal = a.midpoint(b);
            return Some(GestureUpdate::active(GestureDelta::Scale {
                ratio: self.ratio,
                focal: self.focal,
            }));
        }

        // Idle: wait for two fingers far enough apart to measure a ratio
        let ((first, a), (second, b)) = contacts.first_pair()?;
        let span = a.distance(b);
        if span < self.min_span {
            return None;
        }
        self.pair = Some(TrackedPair { first, second });
        self.start_span = span;
        self.ratio = 1.0;
        self.focal = a.midpoint(b);
        self.state = RecognizerState::Active;
        Some(GestureUpdate::active(GestureDelta::Scale {
            ratio: self.ratio,
            focal: self.focal,
        }))
    }

    fn reset(&mut self) {
        self.state = RecognizerState::Idle;
        self.pair = None;
        self.start_span = 0.0;
        self.ratio = 1.0;
        self.focal = Point::ORIGIN;
    }
}

// ============================================================================
// Rotate
// ============================================================================

/// Wrap an angle difference into `(-PI, PI]`.
fn wrap_angle(theta: f64) -> f64 {
    let wrapped = (theta + PI).rem_euclid(TAU) - PI;
    if wrapped <= -PI {
        wrapped + TAU
    } else {
        wrapped
    }
}

/// Angle swept by the line between two contacts. Unwrapped, so several full
/// turns accumulate instead of jumping back at +/-PI.
#[derive(Debug, Clone, Default)]
pub struct RotationRecognizer {
    state: RecognizerState,
    pair: Option<TrackedPair>,
    last_heading: f64,
    angle: f64,
}

impl RotationRecognizer {
    pub fn new() -> Self {
        Self::default()
    }

    fn heading(a: Point, b: Point) -> f64 {
        (b - a).atan2()
    }
}

impl Recognizer for RotationRecognizer {
    fn kind(&self) -> GestureKind {
        GestureKind::Rotate
    }

    fn state(&self) -> RecognizerState {
        self.state
    }

    fn handle(&mut self, _event: &TouchEvent, contacts: &Contacts) -> Option<GestureUpdate> {
        if self.state == RecognizerState::Ended {
            self.reset();
        }

        if let Some(pair) = self.pair {
            let Some((a, b)) = pair.positions(contacts) else {
                let angle = self.angle;
                self.reset();
                self.state = RecognizerState::Ended;
                return Some(GestureUpdate::ended(GestureDelta::Rotation(angle)));
            };
            let heading = Self::heading(a, b);
            self.angle += wrap_angle(heading - self.last_heading);
            self.last_heading = heading;
            return Some(GestureUpdate::active(GestureDelta::Rotation(self.angle)));
        }

        let ((first, a), (second, b)) = contacts.first_pair()?;
        if a == b {
            return None;
        }
        self.pair = Some(TrackedPair { first, second });
        self.last_heading = Self::heading(a, b);
        self.angle = 0.0;
        self.state = RecognizerState::Active;
        Some(GestureUpdate::active(GestureDelta::Rotation(0.0)))
    }

    fn reset(&mut self) {
        *self = Self::default();
    }
}

// ============================================================================
// Double tap
// ============================================================================

#[derive(Debug, Clone, Copy)]
struct Press {
    pointer: PointerId,
    position: Point,
    down_ms: u64,
}

#[derive(Debug, Clone, Copy)]
struct Tap {
    position: Point,
    up_ms: u64,
}

/// Two quick single-finger taps close together.
///
/// A tap is a press released within `tap_timeout_ms` without moving more
/// than `tap_slop`. The second press must start within
/// `double_tap_window_ms` of the first release and within
/// `double_tap_distance` of the first tap. Anything else silently restarts
/// the sequence.
#[derive(Debug, Clone)]
pub struct DoubleTapRecognizer {
    tap_timeout_ms: u64,
    tap_slop: f64,
    window_ms: u64,
    max_distance: f64,
    state: RecognizerState,
    press: Option<Press>,
    first_tap: Option<Tap>,
}

impl DoubleTapRecognizer {
    pub fn new(tap_timeout_ms: u64, tap_slop: f64, window_ms: u64, max_distance: f64) -> Self {
        Self {
            tap_timeout_ms,
            tap_slop,
            window_ms,
            max_distance,
            state: RecognizerState::Idle,
            press: None,
            first_tap: None,
        }
    }

    pub fn from_config(config: &GestureConfig) -> Self {
        Self::new(
            config.tap_timeout_ms,
            config.tap_slop,
            config.double_tap_window_ms,
            config.double_tap_distance,
        )
    }

    fn fail(&mut self) {
        self.press = None;
        self.first_tap = None;
    }

    fn continues_sequence(&self, position: Point, down_ms: u64) -> bool {
        self.first_tap.is_some_and(|tap| {
            down_ms.saturating_sub(tap.up_ms) <= self.window_ms
                && tap.position.distance(position) <= self.max_distance
        })
    }
}

impl Recognizer for DoubleTapRecognizer {
    fn kind(&self) -> GestureKind {
        GestureKind::DoubleTap
    }

    fn state(&self) -> RecognizerState {
        self.state
    }

    fn handle(&mut self, event: &TouchEvent, contacts: &Contacts) -> Option<GestureUpdate> {
        if self.state == RecognizerState::Ended {
            self.reset();
        }

        if contacts.len() > 1 {
            self.fail();
            return None;
        }

        match event.phase {
            TouchPhase::Down => {
                if !self.continues_sequence(event.position, event.timestamp_ms) {
                    self.first_tap = None;
                }
                self.press = Some(Press {
                    pointer: event.pointer,
                    position: event.position,
                    down_ms: event.timestamp_ms,
                });
                None
            }
            TouchPhase::Move => {
                if let Some(press) = self.press {
                    if press.pointer == event.pointer
                        && press.position.distance(event.position) > self.tap_slop
                    {
                        self.fail();
                    }
                }
                None
            }
            TouchPhase::Cancel => {
                self.fail();
                None
            }
            TouchPhase::Up => {
                let press = self.press.take()?;
                if press.pointer != event.pointer
                    || event.timestamp_ms.saturating_sub(press.down_ms) > self.tap_timeout_ms
                    || press.position.distance(event.position) > self.tap_slop
                {
                    self.fail();
                    return None;
                }

                if self.first_tap.take().is_some() {
                    self.state = RecognizerState::Ended;
                    return Some(GestureUpdate::ended(GestureDelta::DoubleTap(
                        press.position,
                    )));
                }

                self.first_tap = Some(Tap {
                    position: press.position,
                    up_ms: event.timestamp_ms,
                });
                None
            }
        }
    }

    fn reset(&mut self) {
        self.state = RecognizerState::Idle;
        self.press = None;
        self.first_tap = None;
    }
}
