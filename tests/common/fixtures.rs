use aerodefect::models::{BoundingBox, Detection};
use image::{ImageBuffer, Rgb, RgbImage};
use tempfile::NamedTempFile;

/// Creates a uniform mid-gray test image of the given size.
pub fn gray_image(width: u32, height: u32) -> RgbImage {
    ImageBuffer::from_fn(width, height, |_, _| Rgb([128u8, 128u8, 128u8]))
}

/// Creates a 100x100 gray test image on disk and returns the temp file.
/// The file will be automatically cleaned up when dropped.
pub fn create_test_image() -> NamedTempFile {
    let img = gray_image(100, 100);
    let file = tempfile::Builder::new()
        .suffix(".png")
        .tempfile()
        .expect("Failed to create temp image file");
    img.save_with_format(file.path(), image::ImageFormat::Png)
        .expect("Failed to save test image");
    file
}

/// Creates a detection with a valid box at the given corners.
pub fn make_detection(class_label: &str, confidence: f32, corners: (f32, f32, f32, f32)) -> Detection {
    let (x1, y1, x2, y2) = corners;
    Detection::new(class_label, confidence, BoundingBox { x1, y1, x2, y2 })
        .expect("Failed to build test detection")
}
