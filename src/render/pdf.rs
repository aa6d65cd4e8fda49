use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};

use chrono::{NaiveDateTime, TimeZone, Utc};
use lopdf::{Object, StringFormat};
use printpdf::{BuiltinFont, IndirectFontRef, Mm, OffsetDateTime, PdfDocument};

use super::layout::{FontWeight, LaidOutPage, PageGeometry};
use crate::error::{GuideError, Result};

pub const DOCUMENT_AUTHOR: &str = "Travel Guide Generator";

fn mm(points: f32) -> Mm {
    Mm(points * 25.4 / 72.0)
}

fn build_failed(stage: &str, err: impl std::fmt::Debug) -> GuideError {
    GuideError::DocumentBuildFailed(format!("{stage}: {err:?}"))
}

/// Serialize laid-out pages into a PDF using the built-in Helvetica faces.
///
/// The info dictionary dates come from `generated_at` and the trailer `/ID` is
/// a digest of the pages, so identical input yields identical bytes.
pub fn write_pdf(
    pages: &[LaidOutPage],
    geometry: &PageGeometry,
    document_title: &str,
    generated_at: NaiveDateTime,
) -> Result<Vec<u8>> {
    let stamp = pdf_timestamp(generated_at)?;
    let document_id = document_id(pages, document_title, generated_at)?;

    let (doc, first_page, first_layer) = PdfDocument::new(
        document_title,
        mm(geometry.width),
        mm(geometry.height),
        "Page 1",
    );
    let doc = doc
        .with_author(DOCUMENT_AUTHOR)
        .with_creation_date(stamp)
        .with_mod_date(stamp)
        .with_metadata_date(stamp)
        .with_document_id(document_id.clone());

    let regular: IndirectFontRef = doc
        .add_builtin_font(BuiltinFont::Helvetica)
        .map_err(|err| build_failed("loading Helvetica", err))?;
    let bold: IndirectFontRef = doc
        .add_builtin_font(BuiltinFont::HelveticaBold)
        .map_err(|err| build_failed("loading Helvetica-Bold", err))?;

    let mut targets = vec![(first_page, first_layer)];
    for idx in 1..pages.len() {
        targets.push(doc.add_page(
            mm(geometry.width),
            mm(geometry.height),
            format!("Page {}", idx + 1),
        ));
    }

    for (page, (page_index, layer_index)) in pages.iter().zip(targets) {
        let layer = doc.get_page(page_index).get_layer(layer_index);

        for run in &page.runs {
            let font = match run.weight {
                FontWeight::Regular => &regular,
                FontWeight::Bold => &bold,
            };
            layer.use_text(run.text.as_str(), run.size, mm(run.x), mm(run.y), font);
        }
    }

    let bytes = doc
        .save_to_bytes()
        .map_err(|err| build_failed("serializing PDF", err))?;
    stamp_trailer_id(&bytes, &document_id)
}

fn pdf_timestamp(generated_at: NaiveDateTime) -> Result<OffsetDateTime> {
    let seconds = Utc.from_utc_datetime(&generated_at).timestamp();
    OffsetDateTime::from_unix_timestamp(seconds)
        .map_err(|err| build_failed("converting timestamp", err))
}

fn document_id(
    pages: &[LaidOutPage],
    document_title: &str,
    generated_at: NaiveDateTime,
) -> Result<String> {
    let layout = serde_json::to_vec(pages)?;

    let mut content = DefaultHasher::new();
    layout.hash(&mut content);
    let mut header = DefaultHasher::new();
    document_title.hash(&mut header);
    generated_at.hash(&mut header);

    Ok(format!("{:016X}{:016X}", header.finish(), content.finish()))
}

/// printpdf draws the trailer `/ID` pair from its own generator on every save,
/// so the pair is replaced after the fact.
fn stamp_trailer_id(bytes: &[u8], document_id: &str) -> Result<Vec<u8>> {
    let mut document =
        lopdf::Document::load_mem(bytes).map_err(|err| build_failed("reloading PDF", err))?;

    let id = Object::String(document_id.as_bytes().to_vec(), StringFormat::Literal);
    document.trailer.set("ID", Object::Array(vec![id.clone(), id]));

    let mut stamped = Vec::with_capacity(bytes.len());
    document
        .save_to(&mut stamped)
        .map_err(|err| build_failed("writing trailer", err))?;
    Ok(stamped)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::layout::TextRun;
    use chrono::NaiveDate;

    fn at(hour: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2026, 10, 16)
            .and_then(|date| date.and_hms_opt(hour, 30, 0))
            .unwrap()
    }

    fn page(text: &str) -> LaidOutPage {
        LaidOutPage {
            runs: vec![TextRun {
                text: text.to_string(),
                x: 36.0,
                y: 700.0,
                size: 10.0,
                weight: FontWeight::Regular,
            }],
        }
    }

    fn contains(haystack: &[u8], needle: &str) -> bool {
        haystack
            .windows(needle.len())
            .any(|window| window == needle.as_bytes())
    }

    #[test]
    fn test_same_pages_same_bytes() {
        let pages = vec![page("Day 1"), page("Day 2")];
        let geometry = PageGeometry::letter();

        let first = write_pdf(&pages, &geometry, "Travel Guide - Rome", at(9)).unwrap();
        let second = write_pdf(&pages, &geometry, "Travel Guide - Rome", at(9)).unwrap();

        assert_eq!(first, second);
    }

    #[test]
    fn test_info_dictionary_uses_generation_time_and_author() {
        let pdf = write_pdf(&[page("Day 1")], &PageGeometry::letter(), "Travel Guide - Rome", at(9))
            .unwrap();

        assert!(contains(&pdf, "D:20261016093000"));
        assert!(contains(&pdf, DOCUMENT_AUTHOR));
    }

    #[test]
    fn test_document_id_follows_content() {
        let title = "Travel Guide - Rome";
        let base = document_id(&[page("Day 1")], title, at(9)).unwrap();

        assert_eq!(base.len(), 32);
        assert_eq!(base, document_id(&[page("Day 1")], title, at(9)).unwrap());
        assert_ne!(base, document_id(&[page("Day 2")], title, at(9)).unwrap());
        assert_ne!(base, document_id(&[page("Day 1")], title, at(10)).unwrap());
    }
}
