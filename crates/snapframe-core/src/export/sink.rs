//! Where exported bytes go.

use crate::encode::ImageFormat;

#[cfg(not(target_arch = "wasm32"))]
use std::io::Write;
#[cfg(not(target_arch = "wasm32"))]
use std::path::PathBuf;

#[cfg(not(target_arch = "wasm32"))]
use tempfile::NamedTempFile;
#[cfg(not(target_arch = "wasm32"))]
use tracing::debug;

use super::CaptureError;

/// Platform save target: photo library, download folder, memory.
///
/// A sink either stores the whole file or nothing.
pub trait ExportSink {
    fn save(&mut self, bytes: &[u8], file_name: &str) -> Result<(), CaptureError>;
}

/// `stem.ext` for the given format.
pub fn export_file_name(stem: &str, format: ImageFormat) -> String {
    format!("{stem}.{}", format.extension())
}

/// Saves into a directory.
///
/// Bytes are written to a temporary file in the same directory and renamed
/// into place once complete, so a failed save never leaves a partial file.
#[cfg(not(target_arch = "wasm32"))]
#[derive(Debug, Clone)]
pub struct DirectorySink {
    dir: PathBuf,
}

#[cfg(not(target_arch = "wasm32"))]
impl DirectorySink {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }
}

#[cfg(not(target_arch = "wasm32"))]
impl ExportSink for DirectorySink {
    fn save(&mut self, bytes: &[u8], file_name: &str) -> Result<(), CaptureError> {
        let mut temp = NamedTempFile::new_in(&self.dir).map_err(map_io)?;
        temp.write_all(bytes).map_err(map_io)?;
        temp.flush().map_err(map_io)?;

        let target = self.dir.join(file_name);
        temp.persist(&target).map_err(|e| map_io(e.error))?;
        debug!(path = %target.display(), bytes = bytes.len(), "export saved");
        Ok(())
    }
}

#[cfg(not(target_arch = "wasm32"))]
fn map_io(err: std::io::Error) -> CaptureError {
    match err.kind() {
        std::io::ErrorKind::PermissionDenied => CaptureError::PermissionDenied(err.to_string()),
        _ => CaptureError::Io(err),
    }
}
