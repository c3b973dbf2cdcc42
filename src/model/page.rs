//! Page-level types.

use super::Paragraph;
use serde::{Deserialize, Serialize};

/// A4 width in points.
pub const A4_WIDTH: f32 = 595.0;
/// A4 height in points.
pub const A4_HEIGHT: f32 = 842.0;

/// What a page is for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PageKind {
    /// Title page
    Cover,
    /// Table of contents
    Index,
    /// Opening page of a category
    Section,
    /// One summary
    Summary,
}

/// Repeating header band.
///
/// The band is fixed: when a page's content spills onto continuation sheets,
/// every sheet repeats the same band without recomputing it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HeaderBand {
    /// Edition number
    pub edition: u32,
    /// Category shown in the band, if any
    pub category: Option<String>,
    /// Locality and date line (e.g., "RÍO GALLEGOS, 15 de marzo de 2025")
    pub date_line: String,
}

impl HeaderBand {
    /// Edition label, e.g. "EDICIÓN Nº 42".
    pub fn edition_label(&self) -> String {
        format!("EDICIÓN Nº {}", self.edition)
    }
}

/// A single page in the document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Page {
    /// Page number (1-indexed)
    pub number: u32,

    /// Page role
    pub kind: PageKind,

    /// Page width in points (1 point = 1/72 inch)
    pub width: f32,

    /// Page height in points
    pub height: f32,

    /// Header band, when headers are enabled
    pub header: Option<HeaderBand>,

    /// Footer text with the page number already substituted
    pub footer: Option<String>,

    /// Content blocks on the page
    pub elements: Vec<Block>,
}

impl Page {
    /// Create a new page with the given dimensions.
    pub fn new(number: u32, kind: PageKind, width: f32, height: f32) -> Self {
        Self {
            number,
            kind,
            width,
            height,
            header: None,
            footer: None,
            elements: Vec::new(),
        }
    }

    /// Create a new A4 portrait page.
    pub fn a4(number: u32, kind: PageKind) -> Self {
        Self::new(number, kind, A4_WIDTH, A4_HEIGHT)
    }

    /// Add a block to the page.
    pub fn add_block(&mut self, block: Block) {
        self.elements.push(block);
    }

    /// Add a paragraph to the page.
    pub fn add_paragraph(&mut self, paragraph: Paragraph) {
        self.elements.push(Block::Paragraph(paragraph));
    }

    /// Get plain text content of the page body (header and footer excluded).
    pub fn plain_text(&self) -> String {
        self.elements
            .iter()
            .filter_map(Block::plain_text)
            .filter(|t| !t.trim().is_empty())
            .collect::<Vec<_>>()
            .join("\n\n")
    }

    /// Check if the page is empty (no content blocks).
    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }

    /// Get the number of blocks on the page.
    pub fn block_count(&self) -> usize {
        self.elements.len()
    }

    /// Paragraphs on the page, in order.
    pub fn paragraphs(&self) -> impl Iterator<Item = &Paragraph> {
        self.elements.iter().filter_map(|b| match b {
            Block::Paragraph(p) => Some(p),
            _ => None,
        })
    }
}

/// A content block on a page.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Block {
    /// A paragraph of text
    Paragraph(Paragraph),

    /// Full-width colored bar with centered white title text
    Band {
        /// Title text
        text: String,
        /// Bar color (hex)
        color: String,
    },

    /// Table-of-contents line: label, optional detail, dotted leader, page
    IndexEntry {
        /// Entry label
        label: String,
        /// Secondary text under the label
        detail: Option<String>,
        /// Target page number
        page: u32,
        /// Nesting level (0 = category, 1 = summary)
        level: u8,
    },

    /// A horizontal rule / separator
    HorizontalRule,

    /// Vertical whitespace in points
    Spacer {
        /// Height in points
        height: f32,
    },
}

impl Block {
    /// Create a band block.
    pub fn band(text: impl Into<String>, color: impl Into<String>) -> Self {
        Block::Band {
            text: text.into(),
            color: color.into(),
        }
    }

    /// Check if this block is a paragraph.
    pub fn is_paragraph(&self) -> bool {
        matches!(self, Block::Paragraph(_))
    }

    /// Plain text of the block, if it carries any.
    pub fn plain_text(&self) -> Option<String> {
        match self {
            Block::Paragraph(p) => Some(p.plain_text()),
            Block::Band { text, .. } => Some(text.clone()),
            Block::IndexEntry {
                label,
                detail,
                page,
                ..
            } => Some(match detail {
                Some(d) => format!("{} ({}) ... {}", label, d, page),
                None => format!("{} ... {}", label, page),
            }),
            Block::HorizontalRule | Block::Spacer { .. } => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_page_new() {
        let page = Page::a4(3, PageKind::Section);
        assert_eq!(page.number, 3);
        assert_eq!(page.width, 595.0);
        assert_eq!(page.height, 842.0);
        assert!(page.is_empty());
    }

    #[test]
    fn test_plain_text_skips_layout_blocks() {
        let mut page = Page::a4(1, PageKind::Index);
        page.add_block(Block::band("SUMARIO", "#300E74"));
        page.add_block(Block::Spacer { height: 12.0 });
        page.add_block(Block::IndexEntry {
            label: "DECRETOS".into(),
            detail: None,
            page: 3,
            level: 0,
        });
        assert_eq!(page.plain_text(), "SUMARIO\n\nDECRETOS ... 3");
        assert_eq!(page.block_count(), 3);
    }

    #[test]
    fn test_edition_label() {
        let band = HeaderBand {
            edition: 42,
            category: None,
            date_line: String::new(),
        };
        assert_eq!(band.edition_label(), "EDICIÓN Nº 42");
    }
}
