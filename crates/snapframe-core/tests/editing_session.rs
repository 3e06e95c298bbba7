//! End-to-end editing flows through the public `Editor` API.

use snapframe_core::config::EditorConfig;
use snapframe_core::editor::{Editor, EditorEvent, ImageSource, PhotoUpdate};
use snapframe_core::error::{EditorError, ErrorKind};
use snapframe_core::face::{FaceBounds, FaceLocator, RasterManipulator};
use snapframe_core::frames::FrameLibrary;
use snapframe_core::gesture::TouchEvent;
use snapframe_core::layer::LayerKind;
use snapframe_core::raster::{cover_crop_rect, resize, CropRect, FilterType, RasterImage};
use snapframe_core::transform::LayerTransform;

const FRAME: f64 = 1.0 / 60.0;

struct OneShot(Option<RasterImage>);

impl ImageSource for OneShot {
    fn acquire(&mut self) -> Result<Option<RasterImage>, EditorError> {
        Ok(self.0.take())
    }
}

struct FixedFaces(Vec<FaceBounds>);

impl FaceLocator for FixedFaces {
    fn locate(&mut self, _image: &RasterImage) -> Result<Option<FaceBounds>, EditorError> {
        Ok(self.0.first().copied())
    }
}

struct NoDetector;

impl FaceLocator for NoDetector {
    fn locate(&mut self, _image: &RasterImage) -> Result<Option<FaceBounds>, EditorError> {
        Err(EditorError::DetectionUnsupported("no detector on this host".to_string()))
    }
}

/// Each pixel encodes its own coordinates so crops can be checked.
fn gradient(width: u32, height: u32) -> RasterImage {
    let mut pixels = Vec::with_capacity((width * height * 4) as usize);
    for y in 0..height {
        for x in 0..width {
            pixels.extend_from_slice(&[(x % 256) as u8, (y % 256) as u8, 0, 255]);
        }
    }
    RasterImage::new(width, height, pixels)
}

fn editor_with_photo() -> Editor {
    let _ = tracing_subscriber::fmt()
        .with_test_writer()
        .with_max_level(tracing::Level::DEBUG)
        .try_init();

    let mut editor = Editor::new(EditorConfig::default()).unwrap();
    editor
        .set_photo(RasterImage::solid(320, 440, [0, 0, 255, 255]))
        .unwrap();
    editor.take_events();
    editor
}

fn double_tap(editor: &mut Editor, x: f64, y: f64, at_ms: u64) -> Vec<EditorEvent> {
    let mut events = Vec::new();
    events.extend(editor.handle_touch(&TouchEvent::down(1, x, y, at_ms)));
    events.extend(editor.handle_touch(&TouchEvent::up(1, x, y, at_ms + 40)));
    events.extend(editor.handle_touch(&TouchEvent::down(1, x, y, at_ms + 120)));
    events.extend(editor.handle_touch(&TouchEvent::up(1, x, y, at_ms + 160)));
    events
}

fn settle(editor: &mut Editor) {
    let mut frames = 0;
    while editor.tick(FRAME) {
        frames += 1;
        assert!(frames < 600, "animation did not settle");
    }
}

fn committed(editor: &Editor, kind: LayerKind) -> LayerTransform {
    editor.layer(kind).unwrap().committed()
}

#[test]
fn double_tap_toggles_photo_zoom_twice() {
    let mut editor = editor_with_photo();

    let events = double_tap(&mut editor, 160.0, 220.0, 0);
    assert_eq!(
        events,
        vec![EditorEvent::TransformCommitted {
            layer: LayerKind::BasePhoto,
            transform: LayerTransform::IDENTITY.with_scale(1.5),
        }]
    );
    settle(&mut editor);
    assert_eq!(editor.layer(LayerKind::BasePhoto).unwrap().live().scale, 1.5);

    double_tap(&mut editor, 160.0, 220.0, 1_000);
    assert_eq!(committed(&editor, LayerKind::BasePhoto), LayerTransform::IDENTITY);
    settle(&mut editor);

    double_tap(&mut editor, 160.0, 220.0, 2_000);
    assert_eq!(committed(&editor, LayerKind::BasePhoto).scale, 1.5);
    double_tap(&mut editor, 160.0, 220.0, 3_000);
    assert_eq!(committed(&editor, LayerKind::BasePhoto).scale, 1.0);
}

#[test]
fn slow_taps_do_not_zoom() {
    let mut editor = editor_with_photo();
    editor.handle_touch(&TouchEvent::down(1, 160.0, 220.0, 0));
    editor.handle_touch(&TouchEvent::up(1, 160.0, 220.0, 40));
    editor.handle_touch(&TouchEvent::down(1, 160.0, 220.0, 900));
    let events = editor.handle_touch(&TouchEvent::up(1, 160.0, 220.0, 940));
    assert!(events.is_empty());
    assert_eq!(committed(&editor, LayerKind::BasePhoto), LayerTransform::IDENTITY);
}

#[test]
fn sticker_scale_survives_extreme_pinches() {
    let mut editor = editor_with_photo();
    editor
        .set_sticker("😀", RasterImage::solid(50, 50, [255, 0, 0, 255]))
        .unwrap();

    // Spread from 200px to 20000px
    editor.handle_touch(&TouchEvent::down(1, 145.0, 145.0, 0));
    editor.handle_touch(&TouchEvent::down(2, 345.0, 145.0, 10));
    editor.handle_touch(&TouchEvent::moved(2, 20_145.0, 145.0, 30));
    let live = editor.layer(LayerKind::EmojiSticker).unwrap().live();
    assert_eq!(live.scale, 3.0);
    editor.handle_touch(&TouchEvent::up(2, 20_145.0, 145.0, 40));
    editor.handle_touch(&TouchEvent::up(1, 145.0, 145.0, 50));
    assert_eq!(committed(&editor, LayerKind::EmojiSticker).scale, 3.0);

    editor.sticker_reset();
    settle(&mut editor);

    // Squeeze from 200px to 0.2px
    editor.handle_touch(&TouchEvent::down(1, 145.0, 145.0, 1_000));
    editor.handle_touch(&TouchEvent::down(2, 345.0, 145.0, 1_010));
    editor.handle_touch(&TouchEvent::moved(2, 145.2, 145.0, 1_030));
    let live = editor.layer(LayerKind::EmojiSticker).unwrap().live();
    assert!((live.scale - 0.3).abs() < 1e-12);
    editor.handle_touch(&TouchEvent::up(2, 145.2, 145.0, 1_040));
    editor.handle_touch(&TouchEvent::up(1, 145.0, 145.0, 1_050));
    assert!((committed(&editor, LayerKind::EmojiSticker).scale - 0.3).abs() < 1e-12);
}

#[test]
fn photo_pan_stays_inside_cover_bounds() {
    let mut editor = editor_with_photo();
    editor.set_transform(LayerKind::BasePhoto, LayerTransform::IDENTITY.with_scale(2.0));

    editor.handle_touch(&TouchEvent::down(1, 160.0, 220.0, 0));
    editor.handle_touch(&TouchEvent::moved(1, 1_160.0, -780.0, 16));
    let events = editor.handle_touch(&TouchEvent::up(1, 1_160.0, -780.0, 32));

    // (2 - 1) * 320 / 2 and (2 - 1) * 440 / 2
    let expected = LayerTransform::new(2.0, 160.0, -220.0, 0.0);
    assert_eq!(
        events,
        vec![EditorEvent::TransformCommitted {
            layer: LayerKind::BasePhoto,
            transform: expected,
        }]
    );
}

#[test]
fn face_is_centered_in_picked_photo() {
    let mut config = EditorConfig::default();
    config.face.expand_factor = 2.5;
    config.face.output_width = 200;
    config.face.output_height = 250;
    let mut editor = Editor::new(config).unwrap();

    let mut picker = OneShot(Some(gradient(400, 500)));
    assert_eq!(editor.load_photo(&mut picker), PhotoUpdate::Replaced);

    let mut faces = FixedFaces(vec![FaceBounds::new(40.0, 60.0, 80.0, 100.0)]);
    let manipulator = RasterManipulator::new(FilterType::Nearest);
    assert_eq!(
        editor.center_photo_on_face(&mut faces, &manipulator),
        PhotoUpdate::Centered
    );
    assert!(editor.notices().is_empty());

    // The 200x250 face crop is then trimmed at the sides to cover 320x440
    let visible = cover_crop_rect(200, 250, 320.0, 440.0);
    assert_eq!((visible.x, visible.y), (9, 0));
    let scene = editor.snapshot();
    let photo = scene.layer(LayerKind::BasePhoto).unwrap();
    assert_eq!((photo.raster.width, photo.raster.height), (visible.width, visible.height));
    assert_eq!(photo.raster.pixel(0, 0), Some([9, 0, 0, 255]));
    assert_eq!(photo.raster.pixel(10, 20), Some([19, 20, 0, 255]));
}

#[test]
fn zero_faces_asks_for_manual_fit() {
    let mut config = EditorConfig::default();
    config.face.output_width = 320;
    config.face.output_height = 440;
    let mut editor = Editor::new(config).unwrap();
    let source = gradient(400, 500);
    editor.set_photo(source.clone()).unwrap();
    editor.take_events();

    let manipulator = RasterManipulator::new(FilterType::Nearest);
    assert_eq!(
        editor.center_photo_on_face(&mut FixedFaces(Vec::new()), &manipulator),
        PhotoUpdate::ManualFitRequired
    );
    assert_eq!(editor.take_events(), vec![EditorEvent::ManualFitRequired]);

    assert_eq!(editor.apply_manual_fit(&manipulator), PhotoUpdate::Fitted);
    let expected = resize(&source, 320, 440, FilterType::Nearest).unwrap();
    let scene = editor.snapshot();
    assert_eq!(scene.layer(LayerKind::BasePhoto).unwrap().raster, &expected);
}

#[test]
fn found_face_is_ignored_without_auto_center() {
    let mut config = EditorConfig::default();
    config.face.auto_center = false;
    let mut editor = Editor::new(config).unwrap();
    let source = gradient(320, 440);
    editor.set_photo(source.clone()).unwrap();
    editor.take_events();

    let mut faces = FixedFaces(vec![FaceBounds::new(100.0, 100.0, 40.0, 40.0)]);
    assert_eq!(
        editor.center_photo_on_face(&mut faces, &RasterManipulator::default()),
        PhotoUpdate::Unchanged
    );
    assert!(editor.take_events().is_empty());
    assert!(editor.notices().is_empty());

    let scene = editor.snapshot();
    assert_eq!(scene.layer(LayerKind::BasePhoto).unwrap().raster, &source);
}

#[test]
fn missing_detector_is_a_notice_not_a_failure() {
    let mut editor = editor_with_photo();
    let manipulator = RasterManipulator::default();
    assert_eq!(
        editor.center_photo_on_face(&mut NoDetector, &manipulator),
        PhotoUpdate::ManualFitRequired
    );
    let notices = editor.take_notices();
    assert_eq!(notices.len(), 1);
    assert_eq!(notices[0].kind, ErrorKind::DetectionUnsupported);
    assert!(editor.has_photo());
}

#[test]
fn restoring_original_undoes_face_crop() {
    let mut editor = Editor::new(EditorConfig::default()).unwrap();
    let source = gradient(320, 440);
    editor.set_photo(source.clone()).unwrap();

    let mut faces = FixedFaces(vec![FaceBounds::new(100.0, 100.0, 40.0, 40.0)]);
    editor.center_photo_on_face(&mut faces, &RasterManipulator::default());
    assert_eq!(editor.restore_original_photo(), PhotoUpdate::Replaced);

    let scene = editor.snapshot();
    assert_eq!(scene.layer(LayerKind::BasePhoto).unwrap().raster, &source);
}

#[test]
fn frame_library_selection_drives_overlay() {
    let mut library = FrameLibrary::new(3);
    let id = library.import("file:///gold.png", 1_700_000_000_000).id.clone();
    let frame = library.select(&id).unwrap().clone();

    let mut editor = editor_with_photo();
    editor
        .select_frame(frame, RasterImage::solid(32, 44, [200, 160, 0, 255]))
        .unwrap();
    assert_eq!(editor.selected_frame().map(|f| f.id.as_str()), Some(id.as_str()));

    // Dragging the frame moves it but never scales it
    editor.handle_touch(&TouchEvent::down(1, 300.0, 400.0, 0));
    editor.handle_touch(&TouchEvent::moved(1, 280.0, 380.0, 16));
    let events = editor.handle_touch(&TouchEvent::up(1, 280.0, 380.0, 32));
    assert_eq!(
        events,
        vec![EditorEvent::TransformCommitted {
            layer: LayerKind::FrameOverlay,
            transform: LayerTransform::new(1.0, -20.0, -20.0, 0.0),
        }]
    );
    assert_eq!(committed(&editor, LayerKind::BasePhoto), LayerTransform::IDENTITY);

    library.remove(&id).unwrap();
    assert!(library.selected().is_none());
    editor.clear_frame();
    assert!(editor.layer(LayerKind::FrameOverlay).is_none());
}

#[test]
fn crop_rect_of_face_scenario() {
    let crop = snapframe_core::face::compute_face_crop(
        &FaceBounds::new(40.0, 60.0, 80.0, 100.0),
        400,
        500,
        2.5,
    );
    assert_eq!(crop, Some(CropRect::new(0, 0, 200, 250)));
}
