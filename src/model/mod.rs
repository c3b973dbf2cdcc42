//! Declarative page tree for composed bulletins.
//!
//! This module defines the intermediate representation between page
//! composition and output. Pages hold blocks of styled text; the PDF, JSON
//! and text renderers all read the same tree.

mod document;
mod page;
mod paragraph;

pub use document::{Document, Metadata};
pub use page::{Block, HeaderBand, Page, PageKind};
pub use paragraph::{Alignment, InlineContent, Paragraph, ParagraphStyle, TextRun, TextStyle};
