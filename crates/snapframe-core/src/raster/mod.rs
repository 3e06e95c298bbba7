//! Raster image handles: decoding, cropping and resizing.
//!
//! Every image the editor touches (the base photo, the frame overlay and the
//! rasterized sticker glyph) is held as an RGBA [`RasterImage`]. Decoding
//! applies EXIF orientation so camera captures arrive upright.
//!
//! # Examples
//!
//! ```ignore
//! use snapframe_core::raster::{decode_image, resize, FilterType};
//!
//! let bytes = std::fs::read("portrait.jpg").unwrap();
//! let photo = decode_image(&bytes).unwrap();
//! let canvas = resize(&photo, 320, 440, FilterType::Lanczos3).unwrap();
//! ```

mod crop;
mod decode;
mod resize;
mod types;

pub use crop::{apply_crop, cover_crop, cover_crop_rect};
pub use decode::{decode_image, decode_image_no_orientation};
pub use resize::{cover_scale, resize, resize_to_fit};
pub use types::{CropRect, DecodeError, FilterType, Orientation, RasterImage};
