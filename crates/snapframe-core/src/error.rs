//! Editor-level error taxonomy and user-facing notices.
//!
//! Every error in this crate is recoverable at the UI boundary. Module errors
//! (decode, encode, capture, config, frame store) fold into [`EditorError`],
//! and the editor turns an `EditorError` into a [`Notice`] that the host shows
//! as a dismissible message while the session carries on unchanged.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::config::ConfigError;
use crate::encode::EncodeError;
use crate::export::CaptureError;
use crate::frames::FrameStoreError;
use crate::raster::DecodeError;

/// Errors surfaced by the editing session.
#[derive(Debug, Error)]
pub enum EditorError {
    /// The host refused access to the camera, library or save location.
    #[error("Permission denied: {0}")]
    PermissionDenied(String),

    /// The camera or photo library could not supply an image.
    #[error("Image source unavailable: {0}")]
    SourceUnavailable(String),

    /// Face detection is not available on this host.
    #[error("Face detection unsupported: {0}")]
    DetectionUnsupported(String),

    /// An image could not be decoded, cropped or resized.
    #[error("Image processing failed: {0}")]
    ProcessingFailure(String),

    /// The composed view could not be captured or saved.
    #[error("Capture failed: {0}")]
    CaptureFailure(String),
}

impl EditorError {
    /// Stable category for the error, used by notices and bindings.
    pub fn kind(&self) -> ErrorKind {
        match self {
            EditorError::PermissionDenied(_) => ErrorKind::PermissionDenied,
            EditorError::SourceUnavailable(_) => ErrorKind::SourceUnavailable,
            EditorError::DetectionUnsupported(_) => ErrorKind::DetectionUnsupported,
            EditorError::ProcessingFailure(_) => ErrorKind::ProcessingFailure,
            EditorError::CaptureFailure(_) => ErrorKind::CaptureFailure,
        }
    }
}

impl From<DecodeError> for EditorError {
    fn from(err: DecodeError) -> Self {
        EditorError::ProcessingFailure(err.to_string())
    }
}

impl From<EncodeError> for EditorError {
    fn from(err: EncodeError) -> Self {
        EditorError::CaptureFailure(err.to_string())
    }
}

impl From<CaptureError> for EditorError {
    fn from(err: CaptureError) -> Self {
        match err {
            CaptureError::PermissionDenied(msg) => EditorError::PermissionDenied(msg),
            other => EditorError::CaptureFailure(other.to_string()),
        }
    }
}

impl From<ConfigError> for EditorError {
    fn from(err: ConfigError) -> Self {
        EditorError::ProcessingFailure(err.to_string())
    }
}

impl From<FrameStoreError> for EditorError {
    fn from(err: FrameStoreError) -> Self {
        EditorError::SourceUnavailable(err.to_string())
    }
}

/// Category of an [`EditorError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ErrorKind {
    PermissionDenied,
    SourceUnavailable,
    DetectionUnsupported,
    ProcessingFailure,
    CaptureFailure,
}

/// A dismissible message for the user.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Notice {
    /// What went wrong.
    pub kind: ErrorKind,
    /// Human readable detail.
    pub message: String,
}

impl From<&EditorError> for Notice {
    fn from(err: &EditorError) -> Self {
        Notice {
            kind: err.kind(),
            message: err.to_string(),
        }
    }
}
