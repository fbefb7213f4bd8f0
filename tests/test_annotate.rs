//! Integration tests for detection overlays.
//!
//! Tests cover:
//! - Dimension preservation through annotation and a PNG round-trip
//! - The empty detection set leaving the image pixel-identical

mod common;

use aerodefect::annotate::draw_detections;
use common::*;

#[test]
fn test_annotation_preserves_dimensions() {
    let img = gray_image(320, 240);
    let detections = vec![make_detection("crack", 95.0, (10.0, 10.0, 60.0, 80.0))];

    let annotated = draw_detections(&img, &detections);
    assert_eq!(annotated.dimensions(), img.dimensions());
}

#[test]
fn test_empty_set_draws_nothing() {
    let img = gray_image(100, 100);
    let annotated = draw_detections(&img, &[]);

    assert_eq!(annotated.dimensions(), img.dimensions());
    assert_eq!(annotated.as_raw(), img.as_raw());
}

#[test]
fn test_boxes_change_pixels() {
    let img = gray_image(100, 100);
    let detections = vec![make_detection("crack", 95.0, (10.0, 10.0, 60.0, 80.0))];

    let annotated = draw_detections(&img, &detections);
    assert_ne!(annotated.as_raw(), img.as_raw());
}

#[test]
fn test_out_of_bounds_boxes_are_clamped() {
    let img = gray_image(100, 100);
    let detections = vec![make_detection("crack", 95.0, (-20.0, -20.0, 400.0, 400.0))];

    // Must not panic, and dimensions stay put.
    let annotated = draw_detections(&img, &detections);
    assert_eq!(annotated.dimensions(), img.dimensions());
}

#[test]
fn test_png_round_trip_keeps_dimensions() -> anyhow::Result<()> {
    let file = create_test_image();
    let img = image::open(file.path())?.to_rgb8();
    let detections = vec![make_detection("dent", 60.0, (5.0, 5.0, 40.0, 40.0))];

    let annotated = draw_detections(&img, &detections);

    let out = tempfile::Builder::new().suffix(".png").tempfile()?;
    annotated.save_with_format(out.path(), image::ImageFormat::Png)?;
    let reloaded = image::open(out.path())?;

    assert_eq!(reloaded.width(), img.width());
    assert_eq!(reloaded.height(), img.height());
    Ok(())
}
