//! Integration tests for detection record validation and box geometry.

mod common;

use aerodefect::models::{BoundingBox, Detection};
use common::*;

#[test]
fn test_detection_rejects_confidence_outside_range() {
    let bbox = BoundingBox {
        x1: 0.0,
        y1: 0.0,
        x2: 10.0,
        y2: 10.0,
    };

    assert!(Detection::new("crack", -1.0, bbox.clone()).is_err());
    assert!(Detection::new("crack", 100.01, bbox.clone()).is_err());
    assert!(Detection::new("crack", f32::NAN, bbox.clone()).is_err());
    assert!(Detection::new("crack", 100.0, bbox).is_ok());
}

#[test]
fn test_detection_rejects_unordered_corners() {
    let inverted = BoundingBox {
        x1: 10.0,
        y1: 0.0,
        x2: 0.0,
        y2: 10.0,
    };
    assert!(Detection::new("crack", 50.0, inverted).is_err());

    // Degenerate but ordered boxes are allowed.
    let point = BoundingBox {
        x1: 5.0,
        y1: 5.0,
        x2: 5.0,
        y2: 5.0,
    };
    assert!(Detection::new("crack", 50.0, point).is_ok());
}

#[test]
fn test_iou_of_disjoint_boxes_is_zero() {
    let a = make_detection("crack", 90.0, (0.0, 0.0, 10.0, 10.0));
    let b = make_detection("crack", 90.0, (20.0, 20.0, 30.0, 30.0));
    assert_eq!(a.bbox.iou(&b.bbox), 0.0);
}

#[test]
fn test_iou_of_identical_boxes_is_one() {
    let a = make_detection("crack", 90.0, (0.0, 0.0, 10.0, 10.0));
    let b = make_detection("dent", 40.0, (0.0, 0.0, 10.0, 10.0));
    assert_eq!(a.bbox.iou(&b.bbox), 1.0);
}

#[test]
fn test_iou_of_half_overlap() {
    let a = make_detection("crack", 90.0, (0.0, 0.0, 10.0, 10.0));
    let b = make_detection("crack", 90.0, (5.0, 0.0, 15.0, 10.0));

    // Intersection 50, union 150.
    let iou = a.bbox.iou(&b.bbox);
    assert!((iou - 1.0 / 3.0).abs() < 1e-6);
}
