//! # boletin
//!
//! Composition of the municipal Official Bulletin.
//!
//! This library gathers a bulletin's categories and summaries from the
//! bulletin REST API, plans the page numbers of the printed edition, renders
//! it to PDF (or JSON / plain text) and reads bulletins aloud chunk by chunk
//! through a pluggable speech engine.
//!
//! ## Quick Start
//!
//! ```no_run
//! use boletin::{ApiClient, Boletin};
//!
//! fn main() -> boletin::Result<()> {
//!     let client = ApiClient::from_env()?;
//!
//!     // Fetch bulletin 12 and write its PDF
//!     let bulletin = Boletin::new().with_index(true).fetch(&client, 12)?;
//!     bulletin.save_pdf(bulletin.file_name())?;
//!
//!     Ok(())
//! }
//! ```
//!
//! ## Features
//!
//! - **Aggregation**: categories and summaries fetched in parallel and grouped
//! - **Stable pagination**: the index and the body share one page plan
//! - **PDF output**: cover, index, section and summary pages with repeating chrome
//! - **Speech**: cleaning, sentence chunking and a stop/skip-safe player

pub mod aggregate;
pub mod api;
pub mod config;
pub mod dates;
pub mod error;
pub mod html;
pub mod model;
pub mod plan;
pub mod render;
pub mod speech;

// Re-export commonly used types
pub use aggregate::{fetch_articles, fetch_bulletin_data, BulletinData, CategorySection};
pub use api::{ApiClient, BulletinSource};
pub use config::ApiConfig;
pub use error::{Error, Result};
pub use model::{
    Alignment, Block, Document, HeaderBand, InlineContent, Metadata, Page, PageKind, Paragraph,
    ParagraphStyle, TextRun, TextStyle,
};
pub use plan::{PageMapEntry, PagePlan, SectionPages};
pub use render::{JsonFormat, PdfConfig};
pub use speech::{ChunkOptions, Player, PlayerTiming, SpeechEngine, SpeechEvent, VoiceSettings};

use std::path::Path;

/// Crate version, printed in document metadata.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Fetch a bulletin and compose its document with default settings.
///
/// # Example
///
/// ```no_run
/// use boletin::{compose, ApiClient};
///
/// let client = ApiClient::from_env()?;
/// let doc = compose(&client, 12)?;
/// println!("Pages: {}", doc.page_count());
/// # Ok::<(), boletin::Error>(())
/// ```
pub fn compose<S: BulletinSource + ?Sized>(source: &S, id: i64) -> Result<Document> {
    Ok(Boletin::new().fetch(source, id)?.document)
}

/// Fetch a bulletin and render it straight to PDF bytes.
pub fn generate_pdf<S: BulletinSource + ?Sized>(source: &S, id: i64) -> Result<Vec<u8>> {
    Boletin::new().fetch(source, id)?.to_pdf()
}

/// Read a bulletin PDF and split its text into speech chunks.
///
/// # Example
///
/// ```no_run
/// let chunks = boletin::chunks_from_pdf("EDICION_007_BOLETIN_MUNICIPAL.pdf")?;
/// println!("{} chunks", chunks.len());
/// # Ok::<(), boletin::Error>(())
/// ```
pub fn chunks_from_pdf<P: AsRef<Path>>(path: P) -> Result<Vec<String>> {
    let raw = speech::extract_pdf_text(path)?;
    Ok(speech::prepare_chunks(&raw, &ChunkOptions::default()))
}

/// Builder for fetching and composing bulletins.
///
/// # Example
///
/// ```no_run
/// use boletin::{ApiClient, Boletin};
///
/// let client = ApiClient::from_env()?;
/// let pdf = Boletin::new()
///     .with_cover(true)
///     .with_index(false)
///     .with_footer("Página {pageNumber}")
///     .fetch(&client, 12)?
///     .to_pdf()?;
/// # Ok::<(), boletin::Error>(())
/// ```
#[derive(Debug, Clone, Default)]
pub struct Boletin {
    pdf_config: PdfConfig,
    chunk_options: ChunkOptions,
    articles: bool,
}

impl Boletin {
    /// Create a new builder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Include or omit the cover page.
    pub fn with_cover(mut self, show: bool) -> Self {
        self.pdf_config = self.pdf_config.with_cover(show);
        self
    }

    /// Include or omit the index page.
    pub fn with_index(mut self, show: bool) -> Self {
        self.pdf_config = self.pdf_config.with_index(show);
        self
    }

    /// Include or omit the header band.
    pub fn with_header(mut self, show: bool) -> Self {
        self.pdf_config = self.pdf_config.with_header(show);
        self
    }

    /// Set the footer template.
    pub fn with_footer(mut self, template: impl Into<String>) -> Self {
        self.pdf_config = self.pdf_config.with_footer(template);
        self
    }

    /// Replace the whole render configuration.
    pub fn with_config(mut self, config: PdfConfig) -> Self {
        self.pdf_config = config;
        self
    }

    /// Set the chunking options used by [`BoletinResult::chunks`].
    pub fn with_chunk_options(mut self, options: ChunkOptions) -> Self {
        self.chunk_options = options;
        self
    }

    /// Also fetch the articles of every summary.
    pub fn with_articles(mut self, fetch: bool) -> Self {
        self.articles = fetch;
        self
    }

    /// Fetch a bulletin and compose its document.
    pub fn fetch<S: BulletinSource + ?Sized>(self, source: &S, id: i64) -> Result<BoletinResult> {
        let mut data = fetch_bulletin_data(source, id)?;
        if self.articles {
            fetch_articles(source, &mut data)?;
        }
        Ok(self.compose(data))
    }

    /// Compose already-fetched data.
    pub fn compose(self, data: BulletinData) -> BoletinResult {
        let plan = PagePlan::for_sections(&data.categories, &self.pdf_config);
        let document = render::compose_with_plan(&data, &self.pdf_config, &plan);
        BoletinResult {
            data,
            plan,
            document,
            chunk_options: self.chunk_options,
        }
    }
}

/// A composed bulletin.
#[derive(Debug, Clone)]
pub struct BoletinResult {
    /// The aggregated data
    pub data: BulletinData,
    /// Page numbers used by the index and the body
    pub plan: PagePlan,
    /// The composed page tree
    pub document: Document,
    chunk_options: ChunkOptions,
}

impl BoletinResult {
    /// Render to PDF bytes.
    pub fn to_pdf(&self) -> Result<Vec<u8>> {
        render::to_pdf(&self.document)
    }

    /// Write the PDF to a file.
    pub fn save_pdf<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        render::save_pdf(&self.document, path)
    }

    /// Render the page tree to JSON.
    pub fn to_json(&self, format: JsonFormat) -> Result<String> {
        render::to_json(&self.document, format)
    }

    /// Plain text of every page.
    pub fn to_text(&self) -> String {
        render::to_text(&self.document)
    }

    /// Speech chunks for the whole bulletin.
    pub fn chunks(&self) -> Vec<String> {
        let marked = render::to_text_with_markers(&self.document);
        speech::prepare_chunks(&marked, &self.chunk_options)
    }

    /// Suggested output file name.
    pub fn file_name(&self) -> String {
        render::pdf_file_name(self.data.edition())
    }

    /// Get the document.
    pub fn document(&self) -> &Document {
        &self.document
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::{Bulletin, BulletinType, Category, Summary, TypeRef};

    struct Memory;

    impl BulletinSource for Memory {
        fn bulletin(&self, id: i64) -> Result<Bulletin> {
            Ok(Bulletin {
                id: Some(id),
                numero_edicion: Some(7),
                fecha: Some("2025-03-15".into()),
                tipo_boletin: Some(TypeRef::Id(1)),
                titulo_edicion: None,
            })
        }

        fn bulletin_type(&self, id: i64) -> Result<BulletinType> {
            Ok(BulletinType {
                id,
                nombre: "Ordinario".into(),
                observacion: None,
            })
        }

        fn categories(&self) -> Result<Vec<Category>> {
            Ok(vec![Category {
                id: 1,
                nombre: "Decretos".into(),
                abreviatura: "DEC".into(),
            }])
        }

        fn summaries_for_bulletin(&self, bulletin_id: i64) -> Result<Vec<Summary>> {
            Ok(vec![Summary {
                id: 10,
                contenido: Some("<p>DECRETO N° 12. Designa personal.</p>".into()),
                fecha: Some("2025-03-14".into()),
                id_categoria: 1,
                id_boletin: Some(bulletin_id),
            }])
        }
    }

    #[test]
    fn test_builder_defaults() {
        let builder = Boletin::new();
        assert!(builder.pdf_config.show_cover);
        assert!(builder.pdf_config.show_index);
        assert!(!builder.articles);
    }

    #[test]
    fn test_builder_chained() {
        let builder = Boletin::new()
            .with_cover(false)
            .with_index(false)
            .with_header(false)
            .with_footer("p. {pageNumber}")
            .with_articles(true);
        assert!(!builder.pdf_config.show_cover);
        assert!(!builder.pdf_config.show_header);
        assert_eq!(builder.pdf_config.footer_template, "p. {pageNumber}");
        assert!(builder.articles);
    }

    #[test]
    fn test_fetch_and_compose() {
        let result = Boletin::new().fetch(&Memory, 3).unwrap();
        assert_eq!(result.document.page_count(), 4);
        assert_eq!(result.plan.total_pages, 4);
        assert_eq!(result.file_name(), "EDICION_007_BOLETIN_MUNICIPAL.pdf");
    }

    #[test]
    fn test_outputs() {
        let result = Boletin::new().with_index(false).fetch(&Memory, 3).unwrap();
        assert!(result.to_pdf().unwrap().starts_with(b"%PDF-"));
        assert!(result.to_json(JsonFormat::Compact).unwrap().contains("\"pages\""));
        assert!(result.to_text().contains("Designa personal"));
    }

    #[test]
    fn test_chunks_have_no_page_markers() {
        let result = Boletin::new().fetch(&Memory, 3).unwrap();
        let chunks = result.chunks();
        assert!(!chunks.is_empty());
        assert!(chunks.iter().all(|c| !c.contains("--- Página")));
    }

    #[test]
    fn test_generate_pdf() {
        let pdf = generate_pdf(&Memory, 3).unwrap();
        assert!(pdf.starts_with(b"%PDF-"));
        assert_eq!(compose(&Memory, 3).unwrap().page_count(), 4);
    }

    #[test]
    fn test_chunks_from_missing_pdf() {
        assert!(chunks_from_pdf("/nonexistent.pdf").is_err());
    }
}
