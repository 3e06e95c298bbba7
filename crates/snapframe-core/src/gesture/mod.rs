//! Touch gesture recognition.
//!
//! Raw contacts arrive as [`TouchEvent`]s. Each [`Recognizer`] is an
//! independent `Idle -> Active -> Ended` state machine that turns the contact
//! stream into cumulative deltas:
//!
//! | Recognizer | Arity | Delta |
//! |---|---|---|
//! | [`PanRecognizer`] | 1+ contacts, after an activation distance | centroid translation |
//! | [`PinchRecognizer`] | 2 contacts | distance ratio and focal point |
//! | [`RotationRecognizer`] | 2 contacts | unwrapped angle |
//! | [`DoubleTapRecognizer`] | 1 contact, two taps | tap position |
//!
//! A [`CompositeRecognizer`] feeds every event to all of its recognizers and
//! merges their output into one [`MergedUpdate`] per event, so pinch, pan and
//! rotation can run in the same interaction.

mod composer;
mod recognizer;

use kurbo::Point;
use serde::{Deserialize, Serialize};

pub use composer::{compose, recognizer_for, CompositeRecognizer, MergedUpdate, PinchDelta, Tracked};
pub use recognizer::{
    DoubleTapRecognizer, GestureDelta, GestureKind, GesturePhase, GestureUpdate, PanRecognizer,
    PinchRecognizer, Recognizer, RecognizerState, RotationRecognizer,
};

/// Identifier of one finger/contact, stable from press to release.
pub type PointerId = u64;

/// Lifecycle stage of a contact.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TouchPhase {
    Down,
    Move,
    Up,
    /// The host took the contact away (e.g. a system gesture). Treated like
    /// a release.
    Cancel,
}

/// One contact sample in viewport coordinates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TouchEvent {
    pub pointer: PointerId,
    pub phase: TouchPhase,
    pub position: Point,
    pub timestamp_ms: u64,
}

impl TouchEvent {
    pub fn new(pointer: PointerId, phase: TouchPhase, x: f64, y: f64, timestamp_ms: u64) -> Self {
        Self {
            pointer,
            phase,
            position: Point::new(x, y),
            timestamp_ms,
        }
    }

    pub fn down(pointer: PointerId, x: f64, y: f64, timestamp_ms: u64) -> Self {
        Self::new(pointer, TouchPhase::Down, x, y, timestamp_ms)
    }

    pub fn moved(pointer: PointerId, x: f64, y: f64, timestamp_ms: u64) -> Self {
        Self::new(pointer, TouchPhase::Move, x, y, timestamp_ms)
    }

    pub fn up(pointer: PointerId, x: f64, y: f64, timestamp_ms: u64) -> Self {
        Self::new(pointer, TouchPhase::Up, x, y, timestamp_ms)
    }

    /// Whether this event removes its contact.
    pub fn is_release(&self) -> bool {
        matches!(self.phase, TouchPhase::Up | TouchPhase::Cancel)
    }
}

/// Contacts currently down, in press order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Contacts {
    points: Vec<(PointerId, Point)>,
}

impl Contacts {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fold an event into the table.
    pub fn apply(&mut self, event: &TouchEvent) {
        let existing = self.points.iter().position(|(id, _)| *id == event.pointer);
        match (event.phase, existing) {
            (TouchPhase::Down | TouchPhase::Move, Some(idx)) => self.points[idx].1 = event.position,
            (TouchPhase::Down, None) => self.points.push((event.pointer, event.position)),
            (TouchPhase::Up | TouchPhase::Cancel, Some(idx)) => {
                self.points.remove(idx);
            }
            // Moves or releases of unknown pointers are dropped
            _ => {}
        }
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn get(&self, pointer: PointerId) -> Option<Point> {
        self.points
            .iter()
            .find(|(id, _)| *id == pointer)
            .map(|(_, p)| *p)
    }

    /// The two earliest contacts.
    pub fn first_pair(&self) -> Option<((PointerId, Point), (PointerId, Point))> {
        match self.points.as_slice() {
            [a, b, ..] => Some((*a, *b)),
            _ => None,
        }
    }

    /// Mean position of all contacts.
    pub fn centroid(&self) -> Option<Point> {
        if self.points.is_empty() {
            return None;
        }
        let n = self.points.len() as f64;
        let (sx, sy) = self
            .points
            .iter()
            .fold((0.0, 0.0), |(sx, sy), (_, p)| (sx + p.x, sy + p.y));
        Some(Point::new(sx / n, sy / n))
    }

    pub fn clear(&mut self) {
        self.points.clear();
    }
}
