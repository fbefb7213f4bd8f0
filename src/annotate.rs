//! Draws detection overlays onto a copy of the input image.

use ab_glyph::{FontVec, PxScale};
use image::{Rgb, RgbImage};
use imageproc::{
    drawing::{draw_filled_rect_mut, draw_hollow_rect_mut, draw_text_mut},
    rect::Rect,
};
use log::debug;

use crate::models::{BoundingBox, Detection};

const BOX_COLOR: Rgb<u8> = Rgb([220, 40, 40]);
const TEXT_COLOR: Rgb<u8> = Rgb([255, 255, 255]);
const LABEL_SCALE: f32 = 14.0;

/// Draw boxes and `label confidence%` tags for every detection onto a copy
/// of the image. An empty detection set returns the copy untouched. Label
/// text needs a system font; when none is found only the boxes are drawn.
pub fn draw_detections(img: &RgbImage, detections: &[Detection]) -> RgbImage {
    let mut annotated = img.clone();
    if detections.is_empty() {
        return annotated;
    }

    let font = load_system_font();
    if font.is_none() {
        debug!("no system font found, drawing boxes without labels");
    }

    let (img_w, img_h) = annotated.dimensions();

    for detection in detections {
        let rect = rect_from_bbox(&detection.bbox, img_w, img_h);

        // Double outline for a 2px box edge.
        draw_hollow_rect_mut(&mut annotated, rect, BOX_COLOR);
        if rect.width() > 2 && rect.height() > 2 {
            let inner = Rect::at(rect.left() + 1, rect.top() + 1)
                .of_size(rect.width() - 2, rect.height() - 2);
            draw_hollow_rect_mut(&mut annotated, inner, BOX_COLOR);
        }

        if let Some(font) = &font {
            draw_label_tag(&mut annotated, detection, &rect, font);
        }
    }

    annotated
}

/// Filled tag above the box (or inside it at the top edge when the box
/// touches the image top), with the class label and confidence.
fn draw_label_tag(img: &mut RgbImage, detection: &Detection, rect: &Rect, font: &FontVec) {
    let text = format!("{} {:.2}%", detection.class_label, detection.confidence);

    let tag_height = LABEL_SCALE as u32 + 4;
    let tag_width = (text.len() as u32 * (LABEL_SCALE as u32 * 3 / 5 + 1)).min(img.width());
    let tag_y = if rect.top() >= tag_height as i32 {
        rect.top() - tag_height as i32
    } else {
        rect.top()
    };

    let tag = Rect::at(rect.left(), tag_y).of_size(tag_width.max(1), tag_height);
    draw_filled_rect_mut(img, tag, BOX_COLOR);
    draw_text_mut(
        img,
        TEXT_COLOR,
        rect.left() + 2,
        tag_y + 2,
        PxScale::from(LABEL_SCALE),
        font,
        &text,
    );
}

/// Convert a floating-point box to an integer `Rect`, clamped to the image.
fn rect_from_bbox(bbox: &BoundingBox, img_w: u32, img_h: u32) -> Rect {
    let max_x = img_w.saturating_sub(1) as f32;
    let max_y = img_h.saturating_sub(1) as f32;

    let x1 = bbox.x1.clamp(0.0, max_x);
    let y1 = bbox.y1.clamp(0.0, max_y);
    let x2 = bbox.x2.clamp(0.0, max_x);
    let y2 = bbox.y2.clamp(0.0, max_y);

    let width = (x2 - x1).max(1.0).round() as u32;
    let height = (y2 - y1).max(1.0).round() as u32;

    Rect::at(x1.round() as i32, y1.round() as i32).of_size(width, height)
}

/// Try common font locations; label text is skipped when none parses.
fn load_system_font() -> Option<FontVec> {
    let font_paths = [
        "/usr/share/fonts/truetype/dejavu/DejaVuSans.ttf",
        "/usr/share/fonts/truetype/liberation/LiberationSans-Regular.ttf",
        "/System/Library/Fonts/Arial.ttf",
        "C:\\Windows\\Fonts\\arial.ttf",
    ];

    for path in &font_paths {
        if let Ok(font_data) = std::fs::read(path) {
            if let Ok(font) = FontVec::try_from_vec(font_data) {
                return Some(font);
            }
        }
    }

    None
}
