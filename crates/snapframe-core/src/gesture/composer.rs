//! Simultaneous composition of recognizers.

use std::fmt;

use kurbo::{Point, Vec2};

use super::recognizer::{
    DoubleTapRecognizer, GestureDelta, GestureKind, GestureUpdate, PanRecognizer,
    PinchRecognizer, Recognizer, RotationRecognizer,
};
use super::{Contacts, TouchEvent};
use crate::config::GestureConfig;

/// A cumulative value and whether its recognizer just ended.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Tracked<T> {
    pub value: T,
    pub ended: bool,
}

impl<T> Tracked<T> {
    fn from_update(value: T, update: &GestureUpdate) -> Self {
        Self {
            value,
            ended: update.is_ended(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PinchDelta {
    pub ratio: f64,
    pub focal: Point,
}

/// Everything the composed recognizers reported for one touch event.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct MergedUpdate {
    pub pan: Option<Tracked<Vec2>>,
    pub pinch: Option<Tracked<PinchDelta>>,
    pub rotation: Option<Tracked<f64>>,
    pub double_tap: Option<Point>,
    /// The last contact lifted with this event.
    pub released: bool,
}

impl MergedUpdate {
    /// No recognizer reported anything.
    pub fn is_empty(&self) -> bool {
        self.pan.is_none()
            && self.pinch.is_none()
            && self.rotation.is_none()
            && self.double_tap.is_none()
    }

    fn merge(&mut self, update: GestureUpdate) {
        match update.delta {
            GestureDelta::Translation(v) => self.pan = Some(Tracked::from_update(v, &update)),
            GestureDelta::Scale { ratio, focal } => {
                self.pinch = Some(Tracked::from_update(PinchDelta { ratio, focal }, &update))
            }
            GestureDelta::Rotation(angle) => {
                self.rotation = Some(Tracked::from_update(angle, &update))
            }
            GestureDelta::DoubleTap(position) => self.double_tap = Some(position),
        }
    }
}

/// Recognizers that all see every event of a layer's hit region.
pub struct CompositeRecognizer {
    recognizers: Vec<Box<dyn Recognizer>>,
    contacts: Contacts,
}

/// Merge recognizers into one group with simultaneous recognition: pinch,
/// pan and rotation can all be active in the same interaction.
pub fn compose(recognizers: Vec<Box<dyn Recognizer>>) -> CompositeRecognizer {
    CompositeRecognizer {
        recognizers,
        contacts: Contacts::new(),
    }
}

/// Build the standard recognizer for a gesture kind.
pub fn recognizer_for(kind: GestureKind, config: &GestureConfig) -> Box<dyn Recognizer> {
    match kind {
        GestureKind::Pan => Box::new(PanRecognizer::from_config(config)),
        GestureKind::Pinch => Box::new(PinchRecognizer::from_config(config)),
        GestureKind::Rotate => Box::new(RotationRecognizer::new()),
        GestureKind::DoubleTap => Box::new(DoubleTapRecognizer::from_config(config)),
    }
}

impl CompositeRecognizer {
    /// Compose the standard recognizers for `kinds`.
    pub fn for_kinds(kinds: &[GestureKind], config: &GestureConfig) -> Self {
        compose(kinds.iter().map(|&k| recognizer_for(k, config)).collect())
    }

    /// Feed one event to every recognizer.
    pub fn handle(&mut self, event: &TouchEvent) -> MergedUpdate {
        self.contacts.apply(event);

        let mut merged = MergedUpdate::default();
        for recognizer in &mut self.recognizers {
            if let Some(update) = recognizer.handle(event, &self.contacts) {
                merged.merge(update);
            }
        }
        merged.released = event.is_release() && self.contacts.is_empty();
        merged
    }

    pub fn kinds(&self) -> Vec<GestureKind> {
        self.recognizers.iter().map(|r| r.kind()).collect()
    }

    /// Whether any contact is currently down on this group.
    pub fn is_tracking(&self) -> bool {
        !self.contacts.is_empty()
    }

    /// Forget all contacts and return every recognizer to idle.
    pub fn reset(&mut self) {
        self.contacts.clear();
        for recognizer in &mut self.recognizers {
            recognizer.reset();
        }
    }
}

impl fmt::Debug for CompositeRecognizer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CompositeRecognizer")
            .field("kinds", &self.kinds())
            .field("contacts", &self.contacts)
            .finish()
    }
}
