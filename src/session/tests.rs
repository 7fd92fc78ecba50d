use std::io::Cursor;

use image::{DynamicImage, ImageFormat, Rgb, RgbImage};
use pretty_assertions::assert_eq;

use super::*;
use crate::annotation::AnnotationKind;
use crate::notify::NotificationLevel;
use crate::upload::FileKind;
use crate::viewer::OverlayElement;

fn png_bytes(width: u32, height: u32) -> Vec<u8> {
    let image = RgbImage::from_pixel(width, height, Rgb([255, 255, 255]));
    let mut bytes = Vec::new();
    DynamicImage::ImageRgb8(image)
        .write_to(&mut Cursor::new(&mut bytes), ImageFormat::Png)
        .unwrap();
    bytes
}

fn session_with_image() -> Annotator {
    let mut annotator = Annotator::default();
    annotator.set_viewport(200.0, 100.0);
    annotator.upload("image/png", png_bytes(200, 100)).unwrap();
    annotator.take_notifications();
    annotator
}

#[test]
fn test_text_upload_is_rejected() {
    let mut annotator = Annotator::default();
    let result = annotator.upload("text/plain", b"hello".to_vec());

    assert!(matches!(result, Err(AnnotatorError::UnsupportedFileType { .. })));
    assert!(annotator.document().is_none());
    assert_eq!(
        annotator.take_notifications(),
        vec![Notification::error(
            "Unsupported file type. Please upload a PDF or image."
        )]
    );
}

#[test]
fn test_rejected_upload_keeps_current_document() {
    let mut annotator = session_with_image();
    annotator.select_tool(Some(Tool::Underline));
    annotator.pointer_down(10.0, 10.0);

    assert!(annotator.upload("text/csv", vec![]).is_err());
    assert_eq!(annotator.document().map(|d| d.kind), Some(FileKind::Image));
    assert_eq!(annotator.annotations().len(), 1);
}

#[test]
fn test_image_upload_succeeds() {
    let mut annotator = Annotator::default();
    let id = annotator.upload("image/png", png_bytes(4, 4)).unwrap();

    let doc = annotator.document().unwrap();
    assert_eq!(doc.id, id);
    assert_eq!(doc.kind, FileKind::Image);
    assert!(doc.url.starts_with("data:image/png;base64,"));
    assert_eq!(annotator.current_page(), Some(1));

    let notes = annotator.take_notifications();
    assert_eq!(notes.len(), 1);
    assert_eq!(notes[0].level, NotificationLevel::Success);
    assert_eq!(notes[0].message, "File upload successful");
    assert!(annotator.notifications().is_empty());
}

#[test]
fn test_data_url_upload() {
    let mut annotator = Annotator::default();
    let url = crate::upload::encode_data_url("image/png", &png_bytes(2, 2));
    annotator.upload_data_url(&url).unwrap();
    assert_eq!(annotator.document().map(|d| d.kind), Some(FileKind::Image));
}

#[test]
fn test_pointer_events_without_document_are_ignored() {
    let mut annotator = Annotator::default();
    annotator.select_tool(Some(Tool::Draw));
    annotator.pointer_down(1.0, 1.0);
    annotator.pointer_move(5.0, 5.0);
    annotator.pointer_up();
    assert!(annotator.annotations().is_empty());
    assert!(!annotator.is_drawing());
    assert!(!annotator.commit_comment("hi"));
}

#[test]
fn test_new_upload_resets_store_and_page() {
    let mut annotator = session_with_image();
    annotator.select_tool(Some(Tool::Underline));
    annotator.pointer_down(50.0, 50.0);
    assert_eq!(annotator.annotations().len(), 1);

    let first = annotator.document().map(|d| d.id);
    annotator.upload("image/jpeg", png_bytes(3, 3)).unwrap();

    assert_ne!(annotator.document().map(|d| d.id), first);
    assert!(annotator.annotations().is_empty());
    assert_eq!(annotator.current_page(), Some(1));
    // Tool selection survives the new document
    assert_eq!(annotator.tool(), Some(Tool::Underline));
}

#[test]
fn test_close_document_drops_annotations() {
    let mut annotator = session_with_image();
    annotator.select_tool(Some(Tool::Underline));
    annotator.pointer_down(50.0, 50.0);
    annotator.close_document();

    assert!(annotator.document().is_none());
    assert!(annotator.annotations().is_empty());
    assert!(annotator.render_set().is_empty());
}

#[test]
fn test_images_stay_on_page_one() {
    let mut annotator = session_with_image();
    assert!(!annotator.next_page());
    assert!(!annotator.previous_page());
    assert_eq!(annotator.current_page(), Some(1));
    assert_eq!(annotator.page_count(), Some(1));
}

#[test]
fn test_unparsable_pdf_pages_hide_annotations() {
    let mut annotator = Annotator::default();
    annotator.upload("application/pdf", b"%PDF-broken".to_vec()).unwrap();
    assert_eq!(annotator.page_count(), None);

    annotator.select_tool(Some(Tool::Underline));
    annotator.pointer_down(50.0, 50.0);
    assert_eq!(annotator.render_set().len(), 1);

    assert!(annotator.next_page());
    assert_eq!(annotator.current_page(), Some(2));
    assert!(annotator.render_set().is_empty());
    assert_eq!(annotator.annotations().len(), 1);

    assert!(annotator.previous_page());
    assert_eq!(annotator.render_set().len(), 1);
}

#[test]
fn test_page_change_discards_draft() {
    let mut annotator = Annotator::default();
    annotator.upload("application/pdf", b"%PDF-broken".to_vec()).unwrap();
    annotator.select_tool(Some(Tool::Comment));
    annotator.pointer_down(10.0, 10.0);
    assert!(annotator.draft().is_some());

    annotator.next_page();
    assert!(annotator.draft().is_none());
    assert!(!annotator.commit_comment("lost"));
}

#[test]
fn test_render_set_includes_live_marks() {
    let mut annotator = session_with_image();
    annotator.select_tool(Some(Tool::Draw));
    annotator.pointer_down(10.0, 10.0);
    annotator.pointer_move(20.0, 20.0);
    annotator.pointer_up();

    annotator.select_tool(Some(Tool::Comment));
    annotator.pointer_down(30.0, 30.0);

    let set = annotator.render_set();
    assert_eq!(set.len(), 2);
    assert!(matches!(&set[0], OverlayElement::Path { d, .. } if d == "M10,10 L20,20"));
    assert!(matches!(set[1], OverlayElement::CommentInput { .. }));

    annotator.commit_comment("done");
    assert_eq!(annotator.render_set().len(), 1);
    assert_eq!(annotator.annotations()[1].kind, AnnotationKind::Comment);
}

#[test]
fn test_overlay_svg() {
    let mut annotator = session_with_image();
    annotator.select_tool(Some(Tool::Underline));
    annotator.pointer_down(5.0, 6.0);
    let svg = annotator.overlay_svg().unwrap();
    assert!(svg.contains(r#"width="200""#));
    assert!(svg.contains(r#"<rect x="5" y="6" width="100" height="2""#));
}

#[test]
fn test_annotations_json() {
    let mut annotator = session_with_image();
    annotator.set_color(Color::new(0xA8, 0xDA, 0xDC));
    annotator.select_tool(Some(Tool::Underline));
    annotator.pointer_down(50.0, 50.0);

    let value: serde_json::Value =
        serde_json::from_str(&annotator.annotations_json().unwrap()).unwrap();
    assert_eq!(value[0]["color"], "#A8DADC");
    assert_eq!(value[0]["page"], 1);
}

#[test]
fn test_export_without_document() {
    let mut annotator = Annotator::default();
    let result = annotator.export_current_page(None);

    assert!(matches!(result, Err(AnnotatorError::ExportPrecondition(_))));
    assert_eq!(
        annotator.take_notifications(),
        vec![Notification::error("No document to export!")]
    );
}

#[test]
fn test_export_with_zero_viewport() {
    let mut annotator = Annotator::default();
    annotator.upload("image/png", png_bytes(4, 4)).unwrap();
    annotator.take_notifications();

    assert!(annotator.export_current_page(None).is_err());
    assert_eq!(
        annotator.take_notifications(),
        vec![Notification::error("Failed to create canvas context!")]
    );
}

#[test]
fn test_export_png_after_gestures() {
    let mut annotator = session_with_image();
    annotator.set_color(Color::new(0xFF, 0x6B, 0x6B));
    annotator.select_tool(Some(Tool::Underline));
    annotator.pointer_down(50.0, 50.0);

    let artifact = annotator.export_current_page(None).unwrap();
    assert_eq!(artifact.file_name, "annotated-image.png");
    let image = image::load_from_memory(&artifact.bytes).unwrap().to_rgba8();
    assert_eq!(image.get_pixel(60, 51).0, [0xFF, 0x6B, 0x6B, 0xFF]);
    assert!(annotator.notifications().is_empty());
}

#[test]
fn test_export_image_as_pdf() {
    let mut annotator = session_with_image();
    let artifact = annotator
        .export_current_page(Some(ExportFormat::Pdf))
        .unwrap();
    let doc = lopdf::Document::load_mem(&artifact.bytes).unwrap();
    assert_eq!(doc.get_pages().len(), 1);
}

#[test]
fn test_custom_config_geometry() {
    let mut config = AnnotatorConfig::default();
    config.tools.underline_width = 40.0;
    config.palette.default = Color::new(0x4E, 0xCD, 0xC4);

    let mut annotator = Annotator::new(config);
    annotator.upload("image/png", png_bytes(4, 4)).unwrap();
    annotator.select_tool(Some(Tool::Underline));
    annotator.pointer_down(0.0, 0.0);

    let a = &annotator.annotations()[0];
    assert_eq!(a.width, 40.0);
    assert_eq!(a.color, Color::new(0x4E, 0xCD, 0xC4));
}

#[test]
fn test_negative_viewport_is_clamped() {
    let mut annotator = session_with_image();
    annotator.set_viewport(-10.0, 50.0);
    assert_eq!(annotator.viewport(), (0.0, 50.0));

    let svg = annotator.overlay_svg().unwrap();
    assert!(svg.contains(r#"viewBox="0 0 0 50""#));

    annotator.set_viewport(f32::NAN, f32::INFINITY);
    assert_eq!(annotator.viewport(), (0.0, 0.0));
}

#[test]
fn test_non_finite_pointer_events_are_ignored() {
    let mut annotator = session_with_image();
    annotator.select_tool(Some(Tool::Underline));
    annotator.pointer_down(f32::NAN, 10.0);
    assert!(annotator.annotations().is_empty());

    annotator.select_tool(Some(Tool::Draw));
    annotator.pointer_down(10.0, 10.0);
    annotator.pointer_move(f32::INFINITY, 20.0);
    annotator.pointer_move(20.0, 20.0);
    annotator.pointer_up();

    let json = annotator.annotations_json().unwrap();
    let parsed: Vec<Annotation> = serde_json::from_str(&json).unwrap();
    assert_eq!(parsed.len(), 1);
    assert_eq!(
        parsed[0].path.as_ref().map(|p| p.to_string()).as_deref(),
        Some("M10,10 L20,20")
    );
}

#[test]
fn test_configured_comment_height_applies_to_draft_and_commit() {
    let mut config = AnnotatorConfig::default();
    config.tools.comment_height = 32.0;

    let mut annotator = Annotator::new(config);
    annotator.upload("image/png", png_bytes(4, 4)).unwrap();
    annotator.select_tool(Some(Tool::Comment));
    annotator.pointer_down(10.0, 10.0);

    let set = annotator.render_set();
    assert!(matches!(&set[0], OverlayElement::CommentInput { bounds, .. } if bounds.height == 32.0));

    assert!(annotator.commit_comment("  sized  "));
    let a = &annotator.annotations()[0];
    assert_eq!(a.height, 32.0);
    assert_eq!(a.text.as_deref(), Some("sized"));
}
