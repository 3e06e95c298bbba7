//! Editor configuration.
//!
//! All tunables of the editing screen live in [`EditorConfig`]. Every section
//! has a `Default` matching the reference screen (a 320 x 440 portrait
//! canvas), and every field is optional when loading from TOML:
//!
//! ```toml
//! [photo]
//! zoomed_scale = 2.0
//!
//! [gestures]
//! double_tap_window_ms = 350
//! ```

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::animation::SpringConfig;
use crate::export::ExportOptions;
use crate::raster::FilterType;

/// Errors raised while loading or validating configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to parse configuration: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Failed to serialize configuration: {0}")]
    Serialize(#[from] toml::ser::Error),

    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

/// Fixed logical size every layer's clamp policy is relative to.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Viewport {
    pub width: f64,
    pub height: f64,
}

impl Default for Viewport {
    fn default() -> Self {
        Self {
            width: 320.0,
            height: 440.0,
        }
    }
}

/// Base photo limits.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PhotoConfig {
    /// Never shrink below fill.
    pub min_scale: f64,
    pub max_scale: f64,
    /// Scale reached by double-tapping a photo at fit.
    pub zoomed_scale: f64,
    /// Keep the content under the pinch midpoint fixed while zooming.
    pub focal_zoom: bool,
}

impl Default for PhotoConfig {
    fn default() -> Self {
        Self {
            min_scale: 1.0,
            max_scale: 3.0,
            zoomed_scale: 1.5,
            focal_zoom: true,
        }
    }
}

/// Emoji sticker layout and limits.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StickerConfig {
    pub min_scale: f64,
    pub max_scale: f64,
    /// Rendered glyph edge length in logical units.
    pub glyph_size: f64,
    /// Touch padding around the glyph.
    pub padding: f64,
    /// Smallest edge of the sticker's touch box.
    pub min_box: f64,
    /// Top-left of the sticker box inside the viewport before any drag.
    pub origin_x: f64,
    pub origin_y: f64,
    pub zoom_in_factor: f64,
    pub zoom_out_factor: f64,
}

impl StickerConfig {
    /// Edge length of the square sticker box.
    pub fn box_size(&self) -> f64 {
        (self.glyph_size + 2.0 * self.padding).max(self.min_box)
    }
}

impl Default for StickerConfig {
    fn default() -> Self {
        Self {
            min_scale: 0.3,
            max_scale: 3.0,
            glyph_size: 50.0,
            padding: 20.0,
            min_box: 60.0,
            origin_x: 100.0,
            origin_y: 100.0,
            zoom_in_factor: 1.2,
            zoom_out_factor: 0.8,
        }
    }
}

/// Frame overlay behavior.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FrameConfig {
    pub draggable: bool,
}

impl Default for FrameConfig {
    fn default() -> Self {
        Self { draggable: true }
    }
}

/// Recognizer thresholds, in logical units and milliseconds.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GestureConfig {
    /// Distance a contact travels before a pan activates.
    pub pan_activation_distance: f64,
    /// Longest press that still counts as a tap.
    pub tap_timeout_ms: u64,
    /// Movement allowed during a tap.
    pub tap_slop: f64,
    /// Maximum delay between the first release and the second press.
    pub double_tap_window_ms: u64,
    /// Maximum distance between the two presses of a double tap.
    pub double_tap_distance: f64,
    /// Two contacts closer than this cannot start a pinch or rotation.
    pub min_span: f64,
}

impl Default for GestureConfig {
    fn default() -> Self {
        Self {
            pan_activation_distance: 10.0,
            tap_timeout_ms: 250,
            tap_slop: 10.0,
            double_tap_window_ms: 300,
            double_tap_distance: 40.0,
            min_span: 1.0,
        }
    }
}

/// Face-centering parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FaceConfig {
    /// Crop window size relative to the face box.
    pub expand_factor: f64,
    pub output_width: u32,
    pub output_height: u32,
    pub filter: FilterType,
    /// Crop automatically when a face is found.
    pub auto_center: bool,
}

impl Default for FaceConfig {
    fn default() -> Self {
        Self {
            expand_factor: 1.8,
            output_width: 320,
            output_height: 440,
            filter: FilterType::Lanczos3,
            auto_center: true,
        }
    }
}

/// Export presets and background.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExportConfig {
    /// Opaque RGBA color behind every layer.
    pub background: [u8; 4],
    /// File name stem used by sinks.
    pub file_stem: String,
    pub native: ExportOptions,
    pub browser: ExportOptions,
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            background: [37, 41, 46, 255],
            file_stem: "sticker-smash".to_string(),
            native: ExportOptions::native_snapshot(),
            browser: ExportOptions::browser_raster(),
        }
    }
}

/// Complete configuration of an editing screen.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct EditorConfig {
    pub viewport: Viewport,
    pub photo: PhotoConfig,
    pub sticker: StickerConfig,
    pub frame: FrameConfig,
    pub gestures: GestureConfig,
    pub spring: SpringConfig,
    pub face: FaceConfig,
    pub export: ExportConfig,
}

impl EditorConfig {
    /// Parse a TOML document, defaulting missing fields, then validate it.
    pub fn from_toml_str(source: &str) -> Result<Self, ConfigError> {
        let config: EditorConfig = toml::from_str(source)?;
        config.validate()?;
        Ok(config)
    }

    /// Serialize to a TOML document.
    pub fn to_toml_string(&self) -> Result<String, ConfigError> {
        Ok(toml::to_string(self)?)
    }

    /// Reject values the transform core cannot work with.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let viewport = &self.viewport;
        if !(is_positive(viewport.width) && is_positive(viewport.height)) {
            return Err(ConfigError::Invalid(format!(
                "viewport must be positive, got {}x{}",
                viewport.width, viewport.height
            )));
        }
        check_range("photo", self.photo.min_scale, self.photo.max_scale)?;
        check_range("sticker", self.sticker.min_scale, self.sticker.max_scale)?;
        let zoomed = self.photo.zoomed_scale;
        if !(zoomed.is_finite() && zoomed > self.photo.min_scale && zoomed <= self.photo.max_scale) {
            return Err(ConfigError::Invalid(format!(
                "photo.zoomed_scale {} must lie in ({}, {}]",
                zoomed, self.photo.min_scale, self.photo.max_scale
            )));
        }
        check_positive("sticker.glyph_size", self.sticker.glyph_size)?;
        check_positive("sticker.zoom_in_factor", self.sticker.zoom_in_factor)?;
        check_positive("sticker.zoom_out_factor", self.sticker.zoom_out_factor)?;
        check_positive("face.expand_factor", self.face.expand_factor)?;
        if self.face.output_width == 0 || self.face.output_height == 0 {
            return Err(ConfigError::Invalid("face output size must be non-zero".into()));
        }
        check_positive("spring.stiffness", self.spring.stiffness)?;
        check_positive("spring.mass", self.spring.mass)?;
        if !(self.spring.damping.is_finite() && self.spring.damping >= 0.0) {
            return Err(ConfigError::Invalid(format!(
                "spring.damping must be non-negative, got {}",
                self.spring.damping
            )));
        }
        for (name, options) in [("native", &self.export.native), ("browser", &self.export.browser)] {
            if options.target_width == 0 || options.target_height == 0 {
                return Err(ConfigError::Invalid(format!(
                    "export.{name} target size must be non-zero"
                )));
            }
        }
        Ok(())
    }
}

fn is_positive(value: f64) -> bool {
    value.is_finite() && value > 0.0
}

fn check_positive(name: &str, value: f64) -> Result<(), ConfigError> {
    if is_positive(value) {
        Ok(())
    } else {
        Err(ConfigError::Invalid(format!("{name} must be positive, got {value}")))
    }
}

fn check_range(name: &str, min: f64, max: f64) -> Result<(), ConfigError> {
    if is_positive(min) && max.is_finite() && min <= max {
        Ok(())
    } else {
        Err(ConfigError::Invalid(format!(
            "{name} scale range [{min}, {max}] is invalid"
        )))
    }
}
