//! Text extraction from bulletin PDF files.

use std::path::Path;

use lopdf::Document as LopdfDocument;

use crate::error::{Error, Result};
use crate::render::page_marker;

/// Extract the text of a PDF file, each page preceded by a page marker.
pub fn extract_pdf_text<P: AsRef<Path>>(path: P) -> Result<String> {
    let path = path.as_ref();
    if !path.exists() {
        return Err(Error::Io(std::io::Error::new(
            std::io::ErrorKind::NotFound,
            format!("{} not found", path.display()),
        )));
    }
    let doc = LopdfDocument::load(path)?;
    log::debug!("Loaded {} for reading", path.display());
    pages_text(&doc)
}

/// Extract the text of an in-memory PDF.
pub fn extract_pdf_text_from_bytes(data: &[u8]) -> Result<String> {
    let doc = LopdfDocument::load_mem(data)?;
    pages_text(&doc)
}

fn pages_text(doc: &LopdfDocument) -> Result<String> {
    let pages = doc.get_pages();
    if pages.is_empty() {
        return Err(Error::Pdf("document has no pages".to_string()));
    }

    let mut parts = Vec::with_capacity(pages.len());
    for &number in pages.keys() {
        let text = match doc.extract_text(&[number]) {
            Ok(text) => text,
            Err(e) => {
                log::warn!("Could not extract text from page {}: {}", number, e);
                String::new()
            }
        };
        parts.push(format!("{}\n{}", page_marker(number), text.trim()));
    }
    Ok(parts.join("\n\n"))
}
