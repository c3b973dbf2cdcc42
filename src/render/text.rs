//! Plain text rendering for composed documents.

use crate::model::Document;

/// Marker line placed before each page's text, e.g. `--- Página 3 ---`.
pub fn page_marker(number: u32) -> String {
    format!("--- Página {} ---", number)
}

/// Plain text of the document, pages separated by blank lines.
pub fn to_text(doc: &Document) -> String {
    doc.plain_text().trim().to_string()
}

/// Plain text with a page marker before each page.
///
/// This is the same layout text extracted from a PDF file has, so both
/// sources go through the same speech cleaning.
pub fn to_text_with_markers(doc: &Document) -> String {
    doc.pages
        .iter()
        .map(|page| format!("{}\n{}", page_marker(page.number), page.plain_text()))
        .collect::<Vec<_>>()
        .join("\n\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Page, PageKind, Paragraph};

    fn doc() -> Document {
        let mut doc = Document::new();
        for n in 1..=2 {
            let mut page = Page::a4(n, PageKind::Summary);
            page.add_paragraph(Paragraph::with_text(format!("Texto {}.", n)));
            doc.add_page(page);
        }
        doc
    }

    #[test]
    fn test_to_text() {
        let result = to_text(&doc());
        assert_eq!(result, "Texto 1.\n\nTexto 2.");
    }

    #[test]
    fn test_markers() {
        let result = to_text_with_markers(&doc());
        assert!(result.starts_with("--- Página 1 ---\nTexto 1."));
        assert!(result.contains("--- Página 2 ---"));
    }
}
