//! Face-centering of a freshly picked photo.
//!
//! A [`FaceLocator`] reports the primary face, [`compute_face_crop`] grows
//! that box into a portrait crop window that stays inside the source, and an
//! [`ImageManipulator`] crops and resizes to the output canvas. When no face
//! is found (or detection is unavailable) the host is asked to offer a
//! manual fit instead, which is a plain resize of the whole image.

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::config::FaceConfig;
use crate::error::{EditorError, ErrorKind, Notice};
use crate::raster::{apply_crop, resize, CropRect, FilterType, RasterImage};

/// Face box in source-image pixels.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FaceBounds {
    pub left: f64,
    pub top: f64,
    pub width: f64,
    pub height: f64,
}

impl FaceBounds {
    pub fn new(left: f64, top: f64, width: f64, height: f64) -> Self {
        Self {
            left,
            top,
            width,
            height,
        }
    }

    pub fn center(&self) -> (f64, f64) {
        (self.left + self.width / 2.0, self.top + self.height / 2.0)
    }

    fn is_valid(&self) -> bool {
        [self.left, self.top, self.width, self.height]
            .iter()
            .all(|v| v.is_finite())
            && self.width > 0.0
            && self.height > 0.0
    }
}

/// Crop window around a face.
///
/// The face box is scaled by `expand_factor` about its center, shrunk to the
/// source if it came out larger, then shifted so it lies inside
/// `[0, source_width] x [0, source_height]`. Returns `None` for a degenerate
/// face or source.
pub fn compute_face_crop(
    face: &FaceBounds,
    source_width: u32,
    source_height: u32,
    expand_factor: f64,
) -> Option<CropRect> {
    if !face.is_valid() || source_width == 0 || source_height == 0 || !(expand_factor > 0.0) {
        return None;
    }

    let width = ((face.width * expand_factor).round() as u32).clamp(1, source_width);
    let height = ((face.height * expand_factor).round() as u32).clamp(1, source_height);

    let (cx, cy) = face.center();
    let x = (cx - width as f64 / 2.0)
        .round()
        .clamp(0.0, (source_width - width) as f64) as u32;
    let y = (cy - height as f64 / 2.0)
        .round()
        .clamp(0.0, (source_height - height) as f64) as u32;

    Some(CropRect::new(x, y, width, height))
}

/// Finds the primary face in an image.
pub trait FaceLocator {
    /// `Ok(None)` when there is no face. An error means detection itself is
    /// unavailable or failed.
    fn locate(&mut self, image: &RasterImage) -> Result<Option<FaceBounds>, EditorError>;
}

/// Crop/resize capability.
pub trait ImageManipulator {
    fn crop_and_resize(
        &self,
        image: &RasterImage,
        crop: CropRect,
        width: u32,
        height: u32,
    ) -> Result<RasterImage, EditorError>;

    fn resize(&self, image: &RasterImage, width: u32, height: u32)
        -> Result<RasterImage, EditorError>;
}

/// [`ImageManipulator`] backed by the `image` crate resamplers.
#[derive(Debug, Clone, Copy, Default)]
pub struct RasterManipulator {
    filter: FilterType,
}

impl RasterManipulator {
    pub fn new(filter: FilterType) -> Self {
        Self { filter }
    }
}

impl ImageManipulator for RasterManipulator {
    fn crop_and_resize(
        &self,
        image: &RasterImage,
        crop: CropRect,
        width: u32,
        height: u32,
    ) -> Result<RasterImage, EditorError> {
        if !crop.fits_within(image.width, image.height) {
            return Err(EditorError::ProcessingFailure(format!(
                "crop {}x{}+{}+{} exceeds {}x{} image",
                crop.width, crop.height, crop.x, crop.y, image.width, image.height
            )));
        }
        let cropped = apply_crop(image, crop)?;
        Ok(resize(&cropped, width, height, self.filter)?)
    }

    fn resize(
        &self,
        image: &RasterImage,
        width: u32,
        height: u32,
    ) -> Result<RasterImage, EditorError> {
        Ok(resize(image, width, height, self.filter)?)
    }
}

/// Result of a face-centering attempt.
#[derive(Debug, Clone, PartialEq)]
pub enum FaceCenterOutcome {
    /// Cropped around the face and resized to the canvas.
    Centered { image: RasterImage, crop: CropRect },
    /// The crop failed; the whole image was resized instead.
    Resized(RasterImage),
    /// A face was found but automatic centering is off. The image stays as
    /// picked.
    Kept(FaceBounds),
    /// No usable face. The host should offer manual options.
    ManualFitRequired,
}

/// Outcome plus the notice to show, if any.
#[derive(Debug, Clone, PartialEq)]
pub struct FaceCentering {
    pub outcome: FaceCenterOutcome,
    pub notice: Option<Notice>,
}

/// Center `image` on its primary face.
///
/// Detection failure degrades exactly like "no face" and adds a notice. An
/// error is only returned when even the plain-resize fallback fails; the
/// caller then keeps the unmodified image.
pub fn center_on_face(
    image: &RasterImage,
    locator: &mut dyn FaceLocator,
    manipulator: &dyn ImageManipulator,
    config: &FaceConfig,
) -> Result<FaceCentering, EditorError> {
    let face = match locator.locate(image) {
        Ok(Some(face)) => face,
        Ok(None) => {
            info!("no face detected, manual fit required");
            return Ok(FaceCentering {
                outcome: FaceCenterOutcome::ManualFitRequired,
                notice: None,
            });
        }
        Err(err) => {
            warn!(%err, "face detection failed");
            let notice = Notice {
                kind: ErrorKind::DetectionUnsupported,
                message: err.to_string(),
            };
            return Ok(FaceCentering {
                outcome: FaceCenterOutcome::ManualFitRequired,
                notice: Some(notice),
            });
        }
    };

    if !config.auto_center {
        debug!(?face, "face found, automatic centering disabled");
        return Ok(FaceCentering {
            outcome: FaceCenterOutcome::Kept(face),
            notice: None,
        });
    }

    let Some(crop) = compute_face_crop(&face, image.width, image.height, config.expand_factor)
    else {
        warn!(?face, "unusable face bounds");
        return Ok(FaceCentering {
            outcome: FaceCenterOutcome::ManualFitRequired,
            notice: None,
        });
    };
    debug!(?face, ?crop, "face crop computed");

    match manipulator.crop_and_resize(image, crop, config.output_width, config.output_height) {
        Ok(centered) => Ok(FaceCentering {
            outcome: FaceCenterOutcome::Centered {
                image: centered,
                crop,
            },
            notice: None,
        }),
        Err(err) => {
            warn!(%err, "face crop failed, falling back to plain resize");
            let resized = manual_fit(image, manipulator, config)?;
            Ok(FaceCentering {
                outcome: FaceCenterOutcome::Resized(resized),
                notice: Some(Notice::from(&err)),
            })
        }
    }
}

/// Plain resize of the whole image to the output canvas.
pub fn manual_fit(
    image: &RasterImage,
    manipulator: &dyn ImageManipulator,
    config: &FaceConfig,
) -> Result<RasterImage, EditorError> {
    manipulator.resize(image, config.output_width, config.output_height)
}

#[cfg(test)]
mod tests {
    use super::*;

    struct FixedLocator(Result<Option<FaceBounds>, ()>);

    impl FaceLocator for FixedLocator {
        fn locate(&mut self, _image: &RasterImage) -> Result<Option<FaceBounds>, EditorError> {
            self.0
                .map_err(|_| EditorError::DetectionUnsupported("no detector".to_string()))
        }
    }

    struct BrokenCrop;

    impl ImageManipulator for BrokenCrop {
        fn crop_and_resize(
            &self,
            _image: &RasterImage,
            _crop: CropRect,
            _width: u32,
            _height: u32,
        ) -> Result<RasterImage, EditorError> {
            Err(EditorError::ProcessingFailure("crop failed".to_string()))
        }

        fn resize(
            &self,
            image: &RasterImage,
            width: u32,
            height: u32,
        ) -> Result<RasterImage, EditorError> {
            RasterManipulator::default().resize(image, width, height)
        }
    }

    fn config() -> FaceConfig {
        FaceConfig {
            filter: FilterType::Nearest,
            ..FaceConfig::default()
        }
    }

    #[test]
    fn test_crop_clamped_at_origin() {
        let face = FaceBounds::new(40.0, 60.0, 80.0, 100.0);
        let crop = compute_face_crop(&face, 400, 500, 2.5).unwrap();
        assert_eq!(crop, CropRect::new(0, 0, 200, 250));
    }

    #[test]
    fn test_crop_centered_on_face() {
        let face = FaceBounds::new(150.0, 200.0, 100.0, 100.0);
        let crop = compute_face_crop(&face, 400, 500, 1.8).unwrap();
        assert_eq!(crop, CropRect::new(110, 160, 180, 180));
    }

    #[test]
    fn test_crop_clamped_at_far_edge() {
        let face = FaceBounds::new(350.0, 450.0, 40.0, 40.0);
        let crop = compute_face_crop(&face, 400, 500, 2.0).unwrap();
        assert_eq!(crop, CropRect::new(320, 420, 80, 80));
        assert!(crop.fits_within(400, 500));
    }

    #[test]
    fn test_crop_shrunk_to_source() {
        let face = FaceBounds::new(10.0, 10.0, 300.0, 300.0);
        let crop = compute_face_crop(&face, 400, 500, 3.0).unwrap();
        assert_eq!(crop, CropRect::new(0, 0, 400, 500));
    }

    #[test]
    fn test_degenerate_face() {
        assert!(compute_face_crop(&FaceBounds::new(0.0, 0.0, 0.0, 10.0), 100, 100, 2.0).is_none());
        assert!(compute_face_crop(&FaceBounds::new(f64::NAN, 0.0, 5.0, 5.0), 100, 100, 2.0).is_none());
        assert!(compute_face_crop(&FaceBounds::new(0.0, 0.0, 5.0, 5.0), 0, 100, 2.0).is_none());
    }

    #[test]
    fn test_center_on_face() {
        let image = RasterImage::solid(400, 500, [90, 90, 90, 255]);
        let mut locator = FixedLocator(Ok(Some(FaceBounds::new(150.0, 200.0, 100.0, 100.0))));
        let result =
            center_on_face(&image, &mut locator, &RasterManipulator::default(), &config()).unwrap();
        match result.outcome {
            FaceCenterOutcome::Centered { image, crop } => {
                assert_eq!((image.width, image.height), (320, 440));
                assert_eq!(crop, CropRect::new(110, 160, 180, 180));
            }
            other => panic!("unexpected outcome {other:?}"),
        }
        assert!(result.notice.is_none());
    }

    #[test]
    fn test_auto_center_off_keeps_image() {
        let image = RasterImage::solid(400, 500, [90, 90, 90, 255]);
        let face = FaceBounds::new(150.0, 200.0, 100.0, 100.0);
        let mut locator = FixedLocator(Ok(Some(face)));
        let config = FaceConfig {
            auto_center: false,
            ..config()
        };
        let result = center_on_face(&image, &mut locator, &BrokenCrop, &config).unwrap();
        assert_eq!(result.outcome, FaceCenterOutcome::Kept(face));
        assert!(result.notice.is_none());
    }

    #[test]
    fn test_no_face_requires_manual_fit() {
        let image = RasterImage::solid(40, 50, [0, 0, 0, 255]);
        let mut locator = FixedLocator(Ok(None));
        let result =
            center_on_face(&image, &mut locator, &RasterManipulator::default(), &config()).unwrap();
        assert_eq!(result.outcome, FaceCenterOutcome::ManualFitRequired);
        assert!(result.notice.is_none());
    }

    #[test]
    fn test_detection_failure_degrades_like_no_face() {
        let image = RasterImage::solid(40, 50, [0, 0, 0, 255]);
        let mut locator = FixedLocator(Err(()));
        let result =
            center_on_face(&image, &mut locator, &RasterManipulator::default(), &config()).unwrap();
        assert_eq!(result.outcome, FaceCenterOutcome::ManualFitRequired);
        assert_eq!(result.notice.unwrap().kind, ErrorKind::DetectionUnsupported);
    }

    #[test]
    fn test_crop_failure_falls_back_to_resize() {
        let image = RasterImage::solid(400, 500, [10, 20, 30, 255]);
        let mut locator = FixedLocator(Ok(Some(FaceBounds::new(150.0, 200.0, 100.0, 100.0))));
        let result = center_on_face(&image, &mut locator, &BrokenCrop, &config()).unwrap();
        match result.outcome {
            FaceCenterOutcome::Resized(resized) => {
                assert_eq!((resized.width, resized.height), (320, 440));
            }
            other => panic!("unexpected outcome {other:?}"),
        }
        assert_eq!(result.notice.unwrap().kind, ErrorKind::ProcessingFailure);
    }

    #[test]
    fn test_manipulator_rejects_out_of_bounds_crop() {
        let image = RasterImage::solid(10, 10, [0, 0, 0, 255]);
        let err = RasterManipulator::default()
            .crop_and_resize(&image, CropRect::new(5, 5, 10, 10), 4, 4)
            .unwrap_err();
        assert!(matches!(err, EditorError::ProcessingFailure(_)));
    }

    #[test]
    fn test_manual_fit_is_plain_resize() {
        let image = RasterImage::solid(64, 64, [1, 2, 3, 255]);
        let manipulator = RasterManipulator::new(FilterType::Nearest);
        let fitted = manual_fit(&image, &manipulator, &config()).unwrap();
        let expected = resize(&image, 320, 440, FilterType::Nearest).unwrap();
        assert_eq!(fitted, expected);
    }
}

// ============================================================================
// Property-Based Tests
// ============================================================================
