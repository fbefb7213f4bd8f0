//! Builds the downloadable PDF defect report.
//!
//! Layout is a fixed grid on US Letter pages: a vertical cursor walks down
//! one line height per text line and a new page starts when the next line
//! would cross the bottom margin. Line content and pagination are pure
//! functions so the no-line-lost contract is testable without parsing PDF.

use anyhow::{Context, Result};
use printpdf::{BuiltinFont, Mm, PdfDocument};
use time::OffsetDateTime;
use time::format_description;

use crate::models::Detection;
use crate::risk::RiskTier;

// US Letter.
const PAGE_WIDTH_MM: f32 = 215.9;
const PAGE_HEIGHT_MM: f32 = 279.4;

const LEFT_MARGIN_MM: f32 = 20.0;
const CURSOR_START_MM: f32 = 260.0;
const BOTTOM_MARGIN_MM: f32 = 20.0;
const LINE_HEIGHT_MM: f32 = 8.0;

const TITLE_FONT_SIZE: f32 = 16.0;
const BODY_FONT_SIZE: f32 = 11.0;

/// Lines preceding the per-detection detail lines: title, timestamp,
/// total count, overall risk.
pub const HEADER_LINE_COUNT: usize = 4;

/// Text lines of the report, in render order: the fixed header followed by
/// one line per detection (1-based index, class, confidence, tier).
pub fn report_lines(detections: &[Detection], overall: RiskTier) -> Vec<String> {
    let mut lines = Vec::with_capacity(HEADER_LINE_COUNT + detections.len());
    lines.push("Aircraft Defect Detection Report".to_string());
    lines.push(format!("Generated: {}", timestamp()));
    lines.push(format!("Total Defects: {}", detections.len()));
    lines.push(format!("Highest Risk: {}", overall.uppercased()));

    for (i, detection) in detections.iter().enumerate() {
        let tier = RiskTier::from_confidence(detection.confidence);
        lines.push(format!(
            "{}. {} - {:.2}% - {}",
            i + 1,
            detection.class_label,
            detection.confidence,
            tier.capitalized()
        ));
    }

    lines
}

/// Split lines into pages by walking the vertical cursor. When the next
/// line would fall below the bottom margin the cursor resets to the top of
/// a fresh page. Never drops or reorders a line.
pub fn paginate(lines: &[String]) -> Vec<Vec<String>> {
    let mut pages = Vec::new();
    let mut current = Vec::new();
    let mut cursor = CURSOR_START_MM;

    for line in lines {
        if cursor < BOTTOM_MARGIN_MM {
            pages.push(std::mem::take(&mut current));
            cursor = CURSOR_START_MM;
        }
        current.push(line.clone());
        cursor -= LINE_HEIGHT_MM;
    }

    if !current.is_empty() {
        pages.push(current);
    }

    pages
}

/// Render the report to PDF bytes. Fails only on PDF serialization errors.
pub fn render_report(detections: &[Detection], overall: RiskTier) -> Result<Vec<u8>> {
    let lines = report_lines(detections, overall);
    let pages = paginate(&lines);

    let (doc, first_page, first_layer) = PdfDocument::new(
        "Aircraft Defect Detection Report",
        Mm(PAGE_WIDTH_MM),
        Mm(PAGE_HEIGHT_MM),
        "report",
    );
    let body_font = doc
        .add_builtin_font(BuiltinFont::Helvetica)
        .context("failed to register report body font")?;
    let title_font = doc
        .add_builtin_font(BuiltinFont::HelveticaBold)
        .context("failed to register report title font")?;

    let mut line_index = 0usize;
    for (page_no, page_lines) in pages.iter().enumerate() {
        let layer = if page_no == 0 {
            doc.get_page(first_page).get_layer(first_layer)
        } else {
            let (page, layer) = doc.add_page(Mm(PAGE_WIDTH_MM), Mm(PAGE_HEIGHT_MM), "report");
            doc.get_page(page).get_layer(layer)
        };

        let mut cursor = CURSOR_START_MM;
        for line in page_lines {
            let (font, size) = if line_index == 0 {
                (&title_font, TITLE_FONT_SIZE)
            } else {
                (&body_font, BODY_FONT_SIZE)
            };
            layer.use_text(line.clone(), size, Mm(LEFT_MARGIN_MM), Mm(cursor), font);
            cursor -= LINE_HEIGHT_MM;
            line_index += 1;
        }
    }

    doc.save_to_bytes().context("failed to serialize report PDF")
}

fn timestamp() -> String {
    let format = format_description::parse("[year]-[month]-[day] [hour]:[minute]:[second] UTC");
    match format {
        Ok(format) => OffsetDateTime::now_utc()
            .format(&format)
            .unwrap_or_else(|_| "unknown".to_string()),
        Err(_) => "unknown".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn line(i: usize) -> String {
        format!("line {i}")
    }

    #[test]
    fn short_reports_fit_one_page() {
        let lines: Vec<String> = (0..10).map(line).collect();
        let pages = paginate(&lines);
        assert_eq!(pages.len(), 1);
        assert_eq!(pages[0].len(), 10);
    }

    #[test]
    fn pagination_never_loses_or_reorders_lines() {
        let lines: Vec<String> = (0..100).map(line).collect();
        let pages = paginate(&lines);

        assert!(pages.len() > 1);
        let rejoined: Vec<String> = pages.into_iter().flatten().collect();
        assert_eq!(rejoined, lines);
    }

    #[test]
    fn every_page_respects_the_line_capacity() {
        let capacity = ((CURSOR_START_MM - BOTTOM_MARGIN_MM) / LINE_HEIGHT_MM) as usize + 1;
        let lines: Vec<String> = (0..200).map(line).collect();

        for page in paginate(&lines) {
            assert!(page.len() <= capacity);
            assert!(!page.is_empty());
        }
    }
}
