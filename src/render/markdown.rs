//! Line-oriented parser for the itinerary markdown subset.
//!
//! Recognised: `## ` and `### ` headings, bullet lines starting with `-`, `*`
//! or `•`, blank lines, and everything else as a paragraph. The parser has no
//! error state; any input produces a sequence of [`PageElement`]s.

use serde::{Deserialize, Serialize};

const BULLET_MARKERS: [char; 3] = ['-', '*', '•'];

/// One structural unit of the output document, in flow order
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "content", rename_all = "snake_case")]
pub enum PageElement {
    Heading2(String),
    Heading3(String),
    BulletList(Vec<String>),
    Paragraph(String),
    Spacer,
}

impl PageElement {
    /// Visible text of the element, one entry per rendered line of source
    pub fn visible_text(&self) -> Vec<&str> {
        match self {
            PageElement::Heading2(text)
            | PageElement::Heading3(text)
            | PageElement::Paragraph(text) => vec![text.as_str()],
            PageElement::BulletList(items) => items.iter().map(String::as_str).collect(),
            PageElement::Spacer => Vec::new(),
        }
    }
}

fn is_bullet_line(line: &str) -> bool {
    line.trim_start().starts_with(&BULLET_MARKERS[..])
}

fn strip_bullet_marker(line: &str) -> String {
    let mut chars = line.trim_start().chars();
    chars.next();
    chars.as_str().trim().to_string()
}

/// Parse itinerary markdown in a single forward pass.
pub fn parse_markdown(markdown: &str) -> Vec<PageElement> {
    let lines: Vec<&str> = markdown.lines().collect();
    let mut elements = Vec::new();
    let mut i = 0;

    while i < lines.len() {
        let line = lines[i].trim_end();

        if line.trim().is_empty() {
            elements.push(PageElement::Spacer);
            i += 1;
            continue;
        }

        if let Some(rest) = line.strip_prefix("## ") {
            elements.push(PageElement::Heading2(rest.trim().to_string()));
            i += 1;
            continue;
        }

        if let Some(rest) = line.strip_prefix("### ") {
            elements.push(PageElement::Heading3(rest.trim().to_string()));
            i += 1;
            continue;
        }

        if is_bullet_line(line) {
            let mut items = Vec::new();
            while i < lines.len() && is_bullet_line(lines[i]) {
                items.push(strip_bullet_marker(lines[i]));
                i += 1;
            }
            elements.push(PageElement::BulletList(items));
            elements.push(PageElement::Spacer);
            continue;
        }

        elements.push(PageElement::Paragraph(line.to_string()));
        i += 1;
    }

    elements
}
