//! Markdown-to-PDF rendering of generated itineraries.
//!
//! Rendering runs in three pure steps: [`parse_markdown`] turns the itinerary
//! into [`PageElement`]s, [`layout_pages`] flows them onto Letter pages below a
//! title block, and [`write_pdf`] serializes the pages. Only the last step can
//! fail, and it fails with [`GuideError::DocumentBuildFailed`].

pub mod layout;
pub mod markdown;
pub mod pdf;
pub mod text;

use std::path::Path;

use chrono::{Local, NaiveDateTime};
use tracing::{debug, info};

use crate::error::{GuideError, Result};
use crate::types::trip::suggested_filename;

pub use layout::{layout_pages, FontWeight, LaidOutPage, PageGeometry, TextRun, TitleBlock};
pub use markdown::{parse_markdown, PageElement};
pub use pdf::write_pdf;

pub const PDF_MIME_TYPE: &str = "application/pdf";
const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M";

/// Finished PDF ready to be offered for download
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedDocument {
    pub bytes: Vec<u8>,
    pub filename: String,
    pub mime_type: &'static str,
}

impl RenderedDocument {
    /// Write the PDF to `path`, reporting I/O failures as document errors.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        std::fs::write(path, &self.bytes).map_err(|err| {
            GuideError::DocumentBuildFailed(format!("writing {}: {}", path.display(), err))
        })?;
        info!(
            target: "travel_guide::render",
            path = %path.display(),
            bytes = self.bytes.len(),
            "PDF written"
        );
        Ok(())
    }
}

/// Page layout for `markdown` under a title block stamped with `generated_at`
pub fn layout_document(
    markdown: &str,
    title_label: &str,
    generated_at: NaiveDateTime,
) -> Vec<LaidOutPage> {
    let elements = parse_markdown(markdown);
    let title = TitleBlock::new(title_label, &generated_at.format(TIMESTAMP_FORMAT).to_string());
    debug!(
        target: "travel_guide::render",
        elements = elements.len(),
        "parsed itinerary markdown"
    );
    layout_pages(&elements, &title, PageGeometry::letter())
}

/// Render with an explicit generation timestamp.
///
/// The output is a pure function of the arguments: the same markdown, label
/// and timestamp always produce the same bytes.
pub fn render_at(
    markdown: &str,
    title_label: &str,
    generated_at: NaiveDateTime,
) -> Result<Vec<u8>> {
    let pages = layout_document(markdown, title_label, generated_at);
    let document_title = format!("Travel Guide - {}", title_label);
    let bytes = write_pdf(&pages, &PageGeometry::letter(), &document_title, generated_at)?;

    debug!(
        target: "travel_guide::render",
        pages = pages.len(),
        bytes = bytes.len(),
        "PDF rendered"
    );
    Ok(bytes)
}

/// Render the itinerary to PDF bytes, stamped with the current local time.
pub fn render(markdown: &str, title_label: &str) -> Result<Vec<u8>> {
    render_at(markdown, title_label, Local::now().naive_local())
}

/// Render and attach the download name derived from the destination.
pub fn render_document(markdown: &str, destination: &str) -> Result<RenderedDocument> {
    Ok(RenderedDocument {
        bytes: render(markdown, destination)?,
        filename: suggested_filename(destination),
        mime_type: PDF_MIME_TYPE,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn timestamp() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2026, 10, 16)
            .and_then(|date| date.and_hms_opt(9, 30, 0))
            .unwrap()
    }

    #[test]
    fn test_layout_stamps_timestamp() {
        let pages = layout_document("## Trip Overview", "Paris", timestamp());
        assert_eq!(pages[0].runs[1].text, "Generated: 2026-10-16 09:30");
    }

    #[test]
    fn test_same_input_same_layout() {
        let markdown = "## Trip Overview\nA great trip.\n\n### Day 1\n- Museum\n- Lunch\n";
        assert_eq!(
            layout_document(markdown, "Paris", timestamp()),
            layout_document(markdown, "Paris", timestamp())
        );
    }

    #[test]
    fn test_render_produces_pdf() {
        let markdown = "## Trip Overview\n- Café crème at 9:00";
        let bytes = render_at(markdown, "Paris, France", timestamp()).unwrap();
        assert!(bytes.starts_with(b"%PDF"));
    }

    #[test]
    fn test_same_input_same_bytes() {
        let markdown = "## Trip Overview\nA great trip.\n\n### Day 1\n- Museum\n- Lunch\n";
        let first = render_at(markdown, "Paris", timestamp()).unwrap();
        let second = render_at(markdown, "Paris", timestamp()).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_render_document_metadata() {
        let document = render_document("Hello", "Kyoto, Japan").unwrap();
        assert_eq!(document.filename, "travel_guide_Kyoto_Japan.pdf");
        assert_eq!(document.mime_type, "application/pdf");
    }

    #[test]
    fn test_save_reports_document_error() {
        let document = RenderedDocument {
            bytes: b"%PDF-1.3".to_vec(),
            filename: "x.pdf".to_string(),
            mime_type: PDF_MIME_TYPE,
        };
        let err = document
            .save("/nonexistent-dir/for/sure/x.pdf")
            .unwrap_err();
        assert_eq!(err.error_code(), "DOCUMENT_BUILD_FAILED");
    }
}
