//! Flow layout: turns [`PageElement`]s into positioned text runs on fixed-size
//! pages. Everything is in PDF points (1/72 in) with the origin at the
//! bottom-left corner of the page, which is what the PDF writer expects.

use serde::Serialize;

use super::markdown::PageElement;
use super::text::{pdf_safe, text_width, wrap_text};

pub const POINTS_PER_INCH: f32 = 72.0;

/// Glyph drawn in front of each list item
pub const BULLET_GLYPH: &str = "-";
const LIST_LEFT_INDENT: f32 = 6.0;
const LIST_ITEM_INDENT: f32 = 12.0;

const SPACER_HEIGHT: f32 = 6.0;
const SPACER_AFTER_LIST: f32 = 4.0;
const TITLE_BLOCK_GAP: f32 = 10.0;

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct PageGeometry {
    pub width: f32,
    pub height: f32,
    pub margin_left: f32,
    pub margin_right: f32,
    pub margin_top: f32,
    pub margin_bottom: f32,
}

impl PageGeometry {
    /// US Letter with 0.5 in side margins and 0.7 in top/bottom margins
    pub fn letter() -> Self {
        Self {
            width: 8.5 * POINTS_PER_INCH,
            height: 11.0 * POINTS_PER_INCH,
            margin_left: 0.5 * POINTS_PER_INCH,
            margin_right: 0.5 * POINTS_PER_INCH,
            margin_top: 0.7 * POINTS_PER_INCH,
            margin_bottom: 0.7 * POINTS_PER_INCH,
        }
    }

    pub fn content_width(&self) -> f32 {
        self.width - self.margin_left - self.margin_right
    }

    fn bottom_limit(&self) -> f32 {
        self.height - self.margin_bottom
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum FontWeight {
    Regular,
    Bold,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TextStyle {
    pub size: f32,
    pub leading: f32,
    pub weight: FontWeight,
    pub space_before: f32,
    pub space_after: f32,
}

pub const TITLE_STYLE: TextStyle = TextStyle {
    size: 18.0,
    leading: 22.0,
    weight: FontWeight::Bold,
    space_before: 0.0,
    space_after: 12.0,
};

pub const META_STYLE: TextStyle = TextStyle {
    size: 10.0,
    leading: 12.0,
    weight: FontWeight::Regular,
    space_before: 0.0,
    space_after: 0.0,
};

pub const BODY_STYLE: TextStyle = TextStyle {
    size: 10.0,
    leading: 12.0,
    weight: FontWeight::Regular,
    space_before: 6.0,
    space_after: 0.0,
};

pub const HEADING2_STYLE: TextStyle = TextStyle {
    size: 14.0,
    leading: 17.0,
    weight: FontWeight::Bold,
    space_before: 12.0,
    space_after: 6.0,
};

pub const HEADING3_STYLE: TextStyle = TextStyle {
    size: 12.0,
    leading: 14.0,
    weight: FontWeight::Bold,
    space_before: 8.0,
    space_after: 4.0,
};

/// A single line of text placed on a page
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TextRun {
    pub text: String,
    /// Left edge of the run
    pub x: f32,
    /// Baseline, measured from the bottom of the page
    pub y: f32,
    pub size: f32,
    pub weight: FontWeight,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct LaidOutPage {
    pub runs: Vec<TextRun>,
}

impl LaidOutPage {
    pub fn is_empty(&self) -> bool {
        self.runs.is_empty()
    }
}

/// Title block content placed above the itinerary
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TitleBlock {
    pub title: String,
    pub generated: String,
}

impl TitleBlock {
    pub fn new(title_label: &str, generated_at: &str) -> Self {
        Self {
            title: format!("Travel Guide: {}", title_label),
            generated: format!("Generated: {}", generated_at),
        }
    }
}

/// Single-column flow of text lines across pages
#[derive(Debug)]
pub struct FlowLayout {
    geometry: PageGeometry,
    pages: Vec<LaidOutPage>,
    /// Distance from the top edge to the top of the next line
    cursor: f32,
}

impl FlowLayout {
    pub fn new(geometry: PageGeometry) -> Self {
        Self {
            geometry,
            pages: vec![LaidOutPage::default()],
            cursor: geometry.margin_top,
        }
    }

    fn current_page(&mut self) -> &mut LaidOutPage {
        if self.pages.is_empty() {
            self.pages.push(LaidOutPage::default());
        }
        let last = self.pages.len() - 1;
        &mut self.pages[last]
    }

    fn new_page(&mut self) {
        self.pages.push(LaidOutPage::default());
        self.cursor = self.geometry.margin_top;
    }

    /// Vertical gap. Gaps at the top of a page are dropped.
    pub fn add_space(&mut self, points: f32) {
        if self.current_page().is_empty() {
            return;
        }
        self.cursor += points;
    }

    /// Reserve one line of `style`, breaking the page if it would cross the
    /// bottom margin. Returns the baseline of the reserved line.
    fn reserve_line(&mut self, style: &TextStyle) -> f32 {
        if self.cursor + style.leading > self.geometry.bottom_limit()
            && !self.current_page().is_empty()
        {
            self.new_page();
        }

        let y = self.geometry.height - self.cursor - style.size;
        self.cursor += style.leading;
        y
    }

    fn push_run(&mut self, text: String, x: f32, y: f32, style: &TextStyle) {
        self.current_page().runs.push(TextRun {
            text,
            x,
            y,
            size: style.size,
            weight: style.weight,
        });
    }

    fn place_line(&mut self, text: String, x: f32, style: &TextStyle) {
        let y = self.reserve_line(style);
        self.push_run(text, x, y, style);
    }

    /// Wrapped block of text starting at `indent` from the left margin
    pub fn add_block(&mut self, text: &str, style: &TextStyle, indent: f32) {
        let x = self.geometry.margin_left + indent;
        let width = self.geometry.content_width() - indent;
        let safe = pdf_safe(text);

        self.add_space(style.space_before);
        for line in wrap_text(&safe, width, style.size, style.weight) {
            self.place_line(line, x, style);
        }
        self.add_space(style.space_after);
    }

    /// Single line centred in the content column
    pub fn add_centered(&mut self, text: &str, style: &TextStyle) {
        let safe = pdf_safe(text);
        let width = self.geometry.content_width();

        self.add_space(style.space_before);
        for line in wrap_text(&safe, width, style.size, style.weight) {
            let line_width = text_width(&line, style.size, style.weight);
            let x = self.geometry.margin_left + ((width - line_width) / 2.0).max(0.0);
            self.place_line(line, x, style);
        }
        self.add_space(style.space_after);
    }

    /// Bulleted paragraph: glyph at the list indent, text at the item indent
    pub fn add_bullet_item(&mut self, text: &str, style: &TextStyle) {
        let glyph_x = self.geometry.margin_left + LIST_LEFT_INDENT;
        let text_indent = LIST_LEFT_INDENT + LIST_ITEM_INDENT;
        let x = self.geometry.margin_left + text_indent;
        let width = self.geometry.content_width() - text_indent;
        let safe = pdf_safe(text);

        self.add_space(style.space_before);
        let mut lines = wrap_text(&safe, width, style.size, style.weight).into_iter();

        let y = self.reserve_line(style);
        self.push_run(BULLET_GLYPH.to_string(), glyph_x, y, style);
        if let Some(first) = lines.next() {
            self.push_run(first, x, y, style);
        }
        for line in lines {
            self.place_line(line, x, style);
        }
        self.add_space(style.space_after);
    }

    pub fn add_title_block(&mut self, block: &TitleBlock) {
        self.add_centered(&block.title, &TITLE_STYLE);
        self.add_block(&block.generated, &META_STYLE, 0.0);
        self.add_space(TITLE_BLOCK_GAP);
    }

    pub fn add_elements(&mut self, elements: &[PageElement]) {
        let mut previous: Option<&PageElement> = None;

        for element in elements {
            match element {
                PageElement::Heading2(text) => self.add_block(text, &HEADING2_STYLE, 0.0),
                PageElement::Heading3(text) => self.add_block(text, &HEADING3_STYLE, 0.0),
                PageElement::Paragraph(text) => self.add_block(text, &BODY_STYLE, 0.0),
                PageElement::BulletList(items) => {
                    for item in items {
                        self.add_bullet_item(item, &BODY_STYLE);
                    }
                }
                PageElement::Spacer => {
                    let height = match previous {
                        Some(PageElement::BulletList(_)) => SPACER_AFTER_LIST,
                        _ => SPACER_HEIGHT,
                    };
                    self.add_space(height);
                }
            }
            previous = Some(element);
        }
    }

    pub fn finish(self) -> Vec<LaidOutPage> {
        self.pages
    }
}

/// Lay out the title block followed by `elements`
pub fn layout_pages(
    elements: &[PageElement],
    title: &TitleBlock,
    geometry: PageGeometry,
) -> Vec<LaidOutPage> {
    let mut flow = FlowLayout::new(geometry);
    flow.add_title_block(title);
    flow.add_elements(elements);
    flow.finish()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::markdown::parse_markdown;

    fn title() -> TitleBlock {
        TitleBlock::new("Paris", "2026-10-16 09:30")
    }

    #[test]
    fn test_letter_geometry() {
        let geometry = PageGeometry::letter();
        assert_eq!(geometry.width, 612.0);
        assert_eq!(geometry.height, 792.0);
        assert_eq!(geometry.margin_left, 36.0);
        assert!((geometry.margin_top - 50.4).abs() < 1e-3);
        assert_eq!(geometry.content_width(), 540.0);
    }

    #[test]
    fn test_title_block_comes_first() {
        let pages = layout_pages(&[], &title(), PageGeometry::letter());

        assert_eq!(pages.len(), 1);
        let runs = &pages[0].runs;
        assert_eq!(runs[0].text, "Travel Guide: Paris");
        assert_eq!(runs[0].size, 18.0);
        assert_eq!(runs[0].weight, FontWeight::Bold);
        assert_eq!(runs[1].text, "Generated: 2026-10-16 09:30");
        assert!(runs[1].y < runs[0].y);
    }

    #[test]
    fn test_bullets_are_indented_with_glyph() {
        let elements = parse_markdown("### Day 1\n- Museum\n- Lunch");
        let pages = layout_pages(&elements, &title(), PageGeometry::letter());
        let runs = &pages[0].runs;

        let museum = runs.iter().position(|r| r.text == "Museum").unwrap();
        assert_eq!(runs[museum - 1].text, BULLET_GLYPH);
        assert_eq!(runs[museum - 1].y, runs[museum].y);
        assert_eq!(runs[museum].x, 36.0 + 18.0);
        assert_eq!(runs[museum - 1].x, 36.0 + 6.0);
    }

    #[test]
    fn test_heading_spacing() {
        let elements = parse_markdown("Intro\n## Section\nBody");
        let pages = layout_pages(&elements, &title(), PageGeometry::letter());
        let runs = &pages[0].runs;

        let intro = runs.iter().find(|r| r.text == "Intro").unwrap();
        let heading = runs.iter().find(|r| r.text == "Section").unwrap();
        let body = runs.iter().find(|r| r.text == "Body").unwrap();

        // baseline distance = previous leading + space before + size delta
        let gap_before_heading = intro.y - heading.y;
        assert!((gap_before_heading - (12.0 + 12.0 + 4.0)).abs() < 1e-3);

        let gap_after_heading = heading.y - body.y;
        assert!((gap_after_heading - (17.0 + 6.0 + 6.0 - 4.0)).abs() < 1e-3);
    }

    #[test]
    fn test_long_documents_paginate() {
        let markdown: String = (1..=120)
            .map(|day| format!("### Day {day}\n- Breakfast\n- Sightseeing\n\n"))
            .collect();
        let elements = parse_markdown(&markdown);
        let geometry = PageGeometry::letter();
        let pages = layout_pages(&elements, &title(), geometry);

        assert!(pages.len() > 1);
        for page in &pages {
            assert!(!page.is_empty());
            for run in &page.runs {
                assert!(run.y >= geometry.margin_bottom - 1e-3, "{run:?}");
                assert!(run.y <= geometry.height - geometry.margin_top);
            }
        }
        let day_count: usize = pages
            .iter()
            .flat_map(|p| &p.runs)
            .filter(|r| r.text.starts_with("Day "))
            .count();
        assert_eq!(day_count, 120);
    }

    #[test]
    fn test_layout_is_deterministic() {
        let elements =
            parse_markdown("## Trip Overview\nA great trip.\n\n### Day 1\n- Museum\n- Lunch\n");
        let first = layout_pages(&elements, &title(), PageGeometry::letter());
        let second = layout_pages(&elements, &title(), PageGeometry::letter());
        assert_eq!(first, second);
    }
}
