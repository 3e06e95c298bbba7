//! Flattening the committed view into exported files.

use std::f64::consts::FRAC_PI_4;

use snapframe_core::config::EditorConfig;
use snapframe_core::editor::Editor;
use snapframe_core::encode::ImageFormat;
use snapframe_core::export::{CaptureStrategy, DirectorySink, ExportOptions};
use snapframe_core::gesture::TouchEvent;
use snapframe_core::layer::LayerKind;
use snapframe_core::raster::{decode_image_no_orientation, RasterImage};
use snapframe_core::transform::LayerTransform;

const BLUE: [u8; 4] = [0, 0, 255, 255];
const GREEN: [u8; 4] = [0, 255, 0, 255];
const RED: [u8; 4] = [255, 0, 0, 255];

/// Left half blue, right half green.
fn split_photo() -> RasterImage {
    let mut pixels = Vec::with_capacity(320 * 440 * 4);
    for _ in 0..440 {
        for x in 0..320 {
            pixels.extend_from_slice(if x < 160 { &BLUE } else { &GREEN });
        }
    }
    RasterImage::new(320, 440, pixels)
}

/// Photo zoomed 1.5x and shifted 20px right, with a red sticker tilted 45
/// degrees at 0.8x in the middle of its default box.
fn composed(config: EditorConfig) -> Editor {
    let _ = tracing_subscriber::fmt()
        .with_test_writer()
        .with_max_level(tracing::Level::DEBUG)
        .try_init();

    let mut editor = Editor::new(config).unwrap();
    editor.set_photo(split_photo()).unwrap();
    editor
        .set_sticker("🟥", RasterImage::solid(50, 50, RED))
        .unwrap();
    editor.set_transform(LayerKind::BasePhoto, LayerTransform::new(1.5, 20.0, 0.0, 0.0));
    editor.set_transform(
        LayerKind::EmojiSticker,
        LayerTransform::new(0.8, 0.0, 0.0, FRAC_PI_4),
    );
    editor
}

fn png_config(width: u32, height: u32) -> EditorConfig {
    let mut config = EditorConfig::default();
    config.export.native = ExportOptions::native_snapshot().with_size(width, height);
    config.export.browser = ExportOptions {
        strategy: CaptureStrategy::BrowserRaster,
        format: ImageFormat::Png,
        ..config.export.native.clone()
    };
    config
}

fn capture(editor: &mut Editor, strategy: CaptureStrategy) -> RasterImage {
    let (bytes, format) = editor.capture(strategy).unwrap();
    assert_eq!(format, ImageFormat::Png);
    decode_image_no_orientation(&bytes).unwrap()
}

fn near(px: Option<[u8; 4]>, expected: [u8; 4]) -> bool {
    px.is_some_and(|px| px.iter().zip(expected).all(|(&a, b)| a.abs_diff(b) <= 2))
}

fn is_red(px: Option<[u8; 4]>) -> bool {
    px.is_some_and(|[r, g, b, _]| r > 200 && g < 60 && b < 60)
}

#[test]
fn export_matches_committed_layout() {
    let mut editor = composed(png_config(320, 440));
    let out = capture(&mut editor, CaptureStrategy::NativeSnapshot);
    assert_eq!((out.width, out.height), (320, 440));

    // Photo split line lands at 160 + 20
    assert!(near(out.pixel(170, 300), BLUE));
    assert!(near(out.pixel(190, 300), GREEN));

    // Sticker is a diamond of half-diagonal 20 * sqrt(2) around (145, 145)
    assert!(is_red(out.pixel(145, 145)));
    assert!(is_red(out.pixel(167, 145)));
    assert!(near(out.pixel(165, 165), BLUE));
}

#[test]
fn export_at_double_density() {
    let mut editor = composed(png_config(640, 880));
    let out = capture(&mut editor, CaptureStrategy::NativeSnapshot);
    assert_eq!((out.width, out.height), (640, 880));

    assert!(near(out.pixel(340, 600), BLUE));
    assert!(near(out.pixel(380, 600), GREEN));
    assert!(is_red(out.pixel(334, 290)));
    assert!(near(out.pixel(330, 330), BLUE));
}

#[test]
fn strategies_agree_for_same_format() {
    let mut editor = composed(png_config(320, 440));
    let (native, _) = editor.capture(CaptureStrategy::NativeSnapshot).unwrap();
    let (browser, _) = editor.capture(CaptureStrategy::BrowserRaster).unwrap();
    assert_eq!(native, browser);
}

#[test]
fn export_ignores_gesture_in_progress() {
    let mut editor = composed(png_config(320, 440));
    let before = capture(&mut editor, CaptureStrategy::NativeSnapshot);

    // Sticker dragged but not released
    editor.handle_touch(&TouchEvent::down(1, 145.0, 145.0, 0));
    editor.handle_touch(&TouchEvent::moved(1, 245.0, 345.0, 16));
    assert_ne!(
        editor.layer(LayerKind::EmojiSticker).unwrap().live(),
        editor.layer(LayerKind::EmojiSticker).unwrap().committed()
    );

    let during = capture(&mut editor, CaptureStrategy::NativeSnapshot);
    assert_eq!(before, during);
}

#[test]
fn browser_default_is_jpeg() {
    let mut editor = composed(EditorConfig::default());
    let (bytes, format) = editor.capture(CaptureStrategy::BrowserRaster).unwrap();
    assert_eq!(format, ImageFormat::Jpeg);
    assert_eq!(&bytes[..2], &[0xFF, 0xD8]);

    let out = decode_image_no_orientation(&bytes).unwrap();
    assert_eq!((out.width, out.height), (320, 440));
    assert!(is_red(out.pixel(145, 145)));
}

#[test]
fn export_to_directory() {
    let dir = tempfile::tempdir().unwrap();
    let mut sink = DirectorySink::new(dir.path());
    let mut editor = composed(EditorConfig::default());

    let name = editor
        .export(CaptureStrategy::NativeSnapshot, &mut sink)
        .unwrap();
    assert_eq!(name, "sticker-smash.png");

    let saved = std::fs::read(dir.path().join(&name)).unwrap();
    let out = decode_image_no_orientation(&saved).unwrap();
    assert!(near(out.pixel(170, 300), BLUE));
}

#[test]
fn failed_export_leaves_no_file() {
    let dir = tempfile::tempdir().unwrap();
    let mut sink = DirectorySink::new(dir.path().join("missing"));
    let mut editor = composed(EditorConfig::default());

    assert!(editor.export(CaptureStrategy::NativeSnapshot, &mut sink).is_err());
    assert_eq!(editor.take_notices().len(), 1);
    assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 0);
}
