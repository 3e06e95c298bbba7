//! User-imported frame overlays.
//!
//! The library is a flat list persisted as a JSON array. The editor never
//! owns a [`Frame`]; it only shows the raster behind the selected frame's
//! URI.

use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

#[cfg(not(target_arch = "wasm32"))]
use std::path::Path;

const ID_ALPHABET: &[u8; 36] = b"0123456789abcdefghijklmnopqrstuvwxyz";
const ID_SUFFIX_LEN: usize = 9;

/// Errors from the frame store.
#[derive(Debug, Error)]
pub enum FrameStoreError {
    #[error("Frame not found: {0}")]
    NotFound(String),

    #[error("Frame store is malformed: {0}")]
    Malformed(#[from] serde_json::Error),

    #[error("Frame store I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// A frame overlay resource.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Frame {
    pub id: String,
    pub name: String,
    pub uri: String,
    /// Thumbnail URI for pickers.
    pub preview: String,
    #[serde(default)]
    pub is_custom: bool,
}

/// Persisted list of frames plus the current selection.
#[derive(Debug, Clone)]
pub struct FrameLibrary {
    frames: Vec<Frame>,
    selected: Option<String>,
    rng: SmallRng,
}

impl Default for FrameLibrary {
    fn default() -> Self {
        Self::new(0x5eed)
    }
}

impl FrameLibrary {
    /// Empty library. `seed` drives id generation.
    pub fn new(seed: u64) -> Self {
        Self {
            frames: Vec::new(),
            selected: None,
            rng: SmallRng::seed_from_u64(seed),
        }
    }

    /// Library from a stored JSON array.
    pub fn from_json(json: &str, seed: u64) -> Result<Self, FrameStoreError> {
        let frames: Vec<Frame> = serde_json::from_str(json)?;
        Ok(Self {
            frames,
            ..Self::new(seed)
        })
    }

    /// Stored JSON array.
    pub fn to_json(&self) -> Result<String, FrameStoreError> {
        Ok(serde_json::to_string(&self.frames)?)
    }

    /// Read the store at `path`. A missing or unreadable store is an empty
    /// library.
    #[cfg(not(target_arch = "wasm32"))]
    pub fn load(path: &Path, seed: u64) -> Self {
        let loaded = std::fs::read_to_string(path)
            .map_err(FrameStoreError::from)
            .and_then(|json| Self::from_json(&json, seed));
        match loaded {
            Ok(library) => {
                debug!(path = %path.display(), count = library.frames.len(), "frames loaded");
                library
            }
            Err(FrameStoreError::Io(err)) if err.kind() == std::io::ErrorKind::NotFound => {
                Self::new(seed)
            }
            Err(err) => {
                tracing::warn!(path = %path.display(), %err, "frame store unreadable, starting empty");
                Self::new(seed)
            }
        }
    }

    /// Write the store to `path`, replacing it atomically.
    #[cfg(not(target_arch = "wasm32"))]
    pub fn save(&self, path: &Path) -> Result<(), FrameStoreError> {
        use std::io::Write;

        let dir = path
            .parent()
            .filter(|p| !p.as_os_str().is_empty())
            .unwrap_or_else(|| Path::new("."));
        let mut temp = tempfile::NamedTempFile::new_in(dir)?;
        temp.write_all(self.to_json()?.as_bytes())?;
        temp.persist(path).map_err(|e| FrameStoreError::Io(e.error))?;
        Ok(())
    }

    pub fn frames(&self) -> &[Frame] {
        &self.frames
    }

    pub fn len(&self) -> usize {
        self.frames.len()
    }

    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }

    pub fn get(&self, id: &str) -> Option<&Frame> {
        self.frames.iter().find(|f| f.id == id)
    }

    /// `frame_<millis>_<9 base36 chars>`.
    pub fn generate_id(&mut self, now_millis: u64) -> String {
        let suffix: String = (0..ID_SUFFIX_LEN)
            .map(|_| ID_ALPHABET[self.rng.gen_range(0..ID_ALPHABET.len())] as char)
            .collect();
        format!("frame_{now_millis}_{suffix}")
    }

    /// Append a frame, marking it custom.
    pub fn add(&mut self, mut frame: Frame) -> &Frame {
        frame.is_custom = true;
        debug!(id = %frame.id, "frame added");
        self.frames.push(frame);
        let last = self.frames.len() - 1;
        &self.frames[last]
    }

    /// Add an image the user picked as a new custom frame.
    pub fn import(&mut self, uri: impl Into<String>, now_millis: u64) -> &Frame {
        let uri = uri.into();
        let frame = Frame {
            id: self.generate_id(now_millis),
            name: format!("Frame {}", self.frames.len() + 1),
            preview: uri.clone(),
            uri,
            is_custom: true,
        };
        self.add(frame)
    }

    /// Remove a frame. Removing the selected frame clears the selection.
    pub fn remove(&mut self, id: &str) -> Result<Frame, FrameStoreError> {
        let idx = self
            .frames
            .iter()
            .position(|f| f.id == id)
            .ok_or_else(|| FrameStoreError::NotFound(id.to_string()))?;
        if self.selected.as_deref() == Some(id) {
            self.selected = None;
        }
        Ok(self.frames.remove(idx))
    }

    pub fn clear(&mut self) {
        self.frames.clear();
        self.selected = None;
    }

    pub fn select(&mut self, id: &str) -> Result<&Frame, FrameStoreError> {
        let frame = self
            .frames
            .iter()
            .find(|f| f.id == id)
            .ok_or_else(|| FrameStoreError::NotFound(id.to_string()))?;
        self.selected = Some(frame.id.clone());
        Ok(frame)
    }

    /// Select "no frame".
    pub fn deselect(&mut self) {
        self.selected = None;
    }

    pub fn selected(&self) -> Option<&Frame> {
        self.selected.as_deref().and_then(|id| self.get(id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn frame(id: &str) -> Frame {
        Frame {
            id: id.to_string(),
            name: format!("name {id}"),
            uri: format!("file:///{id}.png"),
            preview: format!("file:///{id}.png"),
            is_custom: false,
        }
    }

    #[test]
    fn test_generate_id_format() {
        let mut library = FrameLibrary::new(7);
        let id = library.generate_id(1_700_000_000_000);
        let suffix = id.strip_prefix("frame_1700000000000_").unwrap();
        assert_eq!(suffix.len(), 9);
        assert!(suffix.bytes().all(|b| ID_ALPHABET.contains(&b)));
    }

    #[test]
    fn test_generated_ids_differ() {
        let mut library = FrameLibrary::new(7);
        assert_ne!(library.generate_id(1), library.generate_id(1));
    }

    #[test]
    fn test_add_marks_custom() {
        let mut library = FrameLibrary::default();
        assert!(library.add(frame("a")).is_custom);
        assert_eq!(library.len(), 1);
    }

    #[test]
    fn test_import_names_and_previews() {
        let mut library = FrameLibrary::default();
        library.add(frame("a"));
        let imported = library.import("file:///picked.png", 42).clone();
        assert_eq!(imported.name, "Frame 2");
        assert_eq!(imported.preview, "file:///picked.png");
        assert!(imported.id.starts_with("frame_42_"));
    }

    #[test]
    fn test_remove_clears_selection() {
        let mut library = FrameLibrary::default();
        library.add(frame("a"));
        library.add(frame("b"));
        library.select("a").unwrap();
        library.remove("a").unwrap();
        assert!(library.selected().is_none());
        assert_eq!(library.frames()[0].id, "b");
        assert!(matches!(
            library.remove("a"),
            Err(FrameStoreError::NotFound(_))
        ));
    }

    #[test]
    fn test_select_unknown_is_error() {
        let mut library = FrameLibrary::default();
        assert!(library.select("missing").is_err());
    }

    #[test]
    fn test_json_uses_camel_case() {
        let mut library = FrameLibrary::default();
        library.add(frame("a"));
        let json = library.to_json().unwrap();
        assert!(json.contains("\"isCustom\":true"));

        let restored = FrameLibrary::from_json(&json, 1).unwrap();
        assert_eq!(restored.frames(), library.frames());
    }

    #[test]
    fn test_missing_is_custom_defaults_false() {
        let json = r#"[{"id":"x","name":"X","uri":"u","preview":"p"}]"#;
        let library = FrameLibrary::from_json(json, 1).unwrap();
        assert!(!library.frames()[0].is_custom);
    }

    #[test]
    fn test_clear() {
        let mut library = FrameLibrary::default();
        library.add(frame("a"));
        library.select("a").unwrap();
        library.clear();
        assert!(library.is_empty());
        assert!(library.selected().is_none());
    }

    #[cfg(not(target_arch = "wasm32"))]
    #[test]
    fn test_save_and_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("frames.json");

        let mut library = FrameLibrary::default();
        library.import("file:///one.png", 1);
        library.save(&path).unwrap();

        let loaded = FrameLibrary::load(&path, 9);
        assert_eq!(loaded.frames(), library.frames());
    }

    #[cfg(not(target_arch = "wasm32"))]
    #[test]
    fn test_load_missing_or_corrupt_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("frames.json");
        assert!(FrameLibrary::load(&path, 1).is_empty());

        std::fs::write(&path, "not json").unwrap();
        assert!(FrameLibrary::load(&path, 1).is_empty());
    }
}
