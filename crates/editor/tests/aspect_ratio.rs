//! Aspect-ratio switching through the editor.

use std::sync::Arc;

use reelforge_common::config::AppConfig;
use reelforge_editor::EditorState;
use reelforge_project_model::aspect::{AspectRatio, CanvasDimensions};
use reelforge_project_model::composition::CompositionDocument;
use reelforge_project_model::overlay::{OverlayDraft, OverlayKind, VisualStyles};

fn image(left: f64, top: f64, width: f64, height: f64) -> OverlayDraft {
    OverlayDraft::new(
        OverlayKind::Image {
            src: "https://cdn/logo.png".to_string(),
            styles: VisualStyles::default(),
        },
        0,
        60,
    )
    .with_geometry(left, top, width, height)
}

#[test]
fn switching_rescales_from_previous_canvas() {
    let mut editor = EditorState::new(30, AspectRatio::Landscape);
    let id = editor.add(image(640.0, 360.0, 320.0, 180.0)).unwrap();

    editor.set_aspect_ratio("1:1");
    let overlay = editor.overlay(id).unwrap();
    assert_eq!(editor.dimensions(), CanvasDimensions::new(1080, 1080));
    assert_eq!(overlay.left, 540.0);
    assert_eq!(overlay.top, 540.0);
    assert_eq!(overlay.width, 270.0);
    assert_eq!(overlay.height, 270.0);
}

#[test]
fn same_ratio_keeps_overlay_array() {
    let mut editor = EditorState::new(30, AspectRatio::Portrait);
    editor.add(image(10.0, 20.0, 30.0, 40.0)).unwrap();
    let before = Arc::clone(editor.overlays());
    let revision = editor.revision();

    editor.set_aspect_ratio("9_16");
    assert!(Arc::ptr_eq(&before, editor.overlays()));
    assert_eq!(editor.revision(), revision);
    assert_eq!(editor.aspect_ratio(), AspectRatio::Portrait);
}

#[test]
fn baseline_follows_every_switch() {
    let mut editor = EditorState::new(30, AspectRatio::Landscape);
    let id = editor.add(image(100.0, 100.0, 400.0, 200.0)).unwrap();

    // Repeating a ratio is a no-op transform but must still leave the
    // baseline on that ratio, so the next switch scales from it.
    editor.set_aspect_ratio("4:5");
    editor.set_aspect_ratio("4:5");
    editor.set_aspect_ratio("16:9");

    let overlay = editor.overlay(id).unwrap();
    assert!((overlay.left - 100.0).abs() <= 1.0);
    assert!((overlay.top - 100.0).abs() <= 1.0);
    assert!((overlay.width - 400.0).abs() <= 1.0);
    assert!((overlay.height - 200.0).abs() <= 1.0);
}

#[test]
fn round_trip_through_every_ratio_stays_within_a_pixel() {
    let mut editor = EditorState::new(30, AspectRatio::Landscape);
    let id = editor.add(image(333.0, 77.0, 512.0, 288.0)).unwrap();

    for label in ["9:16", "1:1", "4:5", "default", "16:9"] {
        editor.set_aspect_ratio(label);
        let overlay = editor.overlay(id).unwrap();
        assert!(overlay.left.is_finite() && overlay.width >= 0.0);
    }
    editor.set_aspect_ratio("9:16");
    editor.set_aspect_ratio("16:9");

    let overlay = editor.overlay(id).unwrap();
    assert!((overlay.width - 512.0).abs() <= 3.0);
    assert!((overlay.height - 288.0).abs() <= 3.0);
}

#[test]
fn unknown_label_falls_back_to_default_canvas() {
    let mut editor = EditorState::new(30, AspectRatio::Landscape);
    editor.set_aspect_ratio("21:9");
    assert_eq!(editor.aspect_ratio(), AspectRatio::Default);
    assert_eq!(editor.dimensions(), CanvasDimensions::new(1920, 1080));
}

#[test]
fn editor_from_document_and_config() {
    let mut document = CompositionDocument::new("promo", 24, AspectRatio::Square);
    document.overlays.push(image(0.0, 0.0, 100.0, 100.0).into_overlay(
        reelforge_project_model::overlay::OverlayId(41),
    ));
    let mut editor = EditorState::from_document(&document).unwrap();
    assert_eq!(editor.fps(), 24);
    assert_eq!(editor.dimensions(), CanvasDimensions::new(1080, 1080));
    let next = editor.add(image(0.0, 0.0, 1.0, 1.0)).unwrap();
    assert_eq!(next.0, 42);

    let config = AppConfig::default();
    let editor = EditorState::from_config(&config);
    assert_eq!(editor.fps(), config.editor.fps);
    assert_eq!(editor.aspect_ratio(), AspectRatio::Landscape);
    assert_eq!(
        editor.duration().duration_in_frames,
        config.editor.default_duration_frames
    );
}
