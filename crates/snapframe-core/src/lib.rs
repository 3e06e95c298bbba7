//! Snapframe Core - Photo composition library
//!
//! This crate provides the transform core of the Snapframe editor: gesture
//! recognition, per-layer scale/translate/rotate state with clamping, spring
//! animation, face-centered cropping, the frame library, and flattening the
//! composed view into an exported image.

pub mod animation;
pub mod config;
pub mod editor;
pub mod encode;
pub mod error;
pub mod export;
pub mod face;
pub mod frames;
pub mod gesture;
pub mod layer;
pub mod raster;
pub mod transform;

pub use config::EditorConfig;
pub use editor::{Editor, EditorEvent, ImageSource, PhotoUpdate};
pub use error::{EditorError, ErrorKind, Notice};
pub use export::{CaptureStrategy, ExportOptions, ExportSink};
pub use face::{FaceBounds, FaceLocator, ImageManipulator};
pub use frames::{Frame, FrameLibrary};
pub use gesture::{TouchEvent, TouchPhase};
pub use layer::{Layer, LayerKind};
pub use raster::RasterImage;
pub use transform::LayerTransform;
