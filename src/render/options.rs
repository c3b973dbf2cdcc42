//! Rendering options and configuration.

/// Placeholder replaced by the page number in footer templates.
pub const PAGE_NUMBER_TOKEN: &str = "{pageNumber}";

/// Default footer template.
pub const DEFAULT_FOOTER: &str = "Página {pageNumber} • Boletín Oficial Municipal • Río Gallegos";

/// Default locality printed on the cover and in date lines.
pub const DEFAULT_LOCALITY: &str = "Río Gallegos";

/// Options for composing a bulletin document.
#[derive(Debug, Clone, PartialEq)]
pub struct PdfConfig {
    /// Include the cover page (page 1)
    pub show_cover: bool,

    /// Include the index page after the cover
    pub show_index: bool,

    /// Repeat the header band on body pages
    pub show_header: bool,

    /// Footer text; `{pageNumber}` is replaced with the page number
    pub footer_template: String,

    /// Locality shown on the cover and in date lines
    pub locality: String,

    /// Authorities listed on the cover as (name, role)
    pub authorities: Vec<(String, String)>,
}

impl PdfConfig {
    /// Create new options with defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Enable or disable the cover page.
    pub fn with_cover(mut self, show: bool) -> Self {
        self.show_cover = show;
        self
    }

    /// Enable or disable the index page.
    pub fn with_index(mut self, show: bool) -> Self {
        self.show_index = show;
        self
    }

    /// Enable or disable the header band.
    pub fn with_header(mut self, show: bool) -> Self {
        self.show_header = show;
        self
    }

    /// Set the footer template.
    pub fn with_footer(mut self, template: impl Into<String>) -> Self {
        self.footer_template = template.into();
        self
    }

    /// Set the locality.
    pub fn with_locality(mut self, locality: impl Into<String>) -> Self {
        self.locality = locality.into();
        self
    }

    /// Add an authority to the cover.
    pub fn with_authority(mut self, name: impl Into<String>, role: impl Into<String>) -> Self {
        self.authorities.push((name.into(), role.into()));
        self
    }

    /// Footer text for a page.
    pub fn footer_for(&self, page: u32) -> String {
        footer_text(&self.footer_template, page)
    }
}

impl Default for PdfConfig {
    fn default() -> Self {
        Self {
            show_cover: true,
            show_index: true,
            show_header: true,
            footer_template: DEFAULT_FOOTER.to_string(),
            locality: DEFAULT_LOCALITY.to_string(),
            authorities: [
                ("PABLO GRASSO", "INTENDENTE"),
                ("DIEGO ROBLES", "JEFE DE GABINETE"),
                ("SARA DELGADO", "SECRETARIA DE GOBIERNO"),
                ("GONZALO CHUTE", "SECRETARIO DE LEGAL Y TÉCNICA"),
            ]
            .into_iter()
            .map(|(name, role)| (name.to_string(), role.to_string()))
            .collect(),
        }
    }
}

/// Substitute the page number into a footer template.
///
/// Plain string substitution: every `{pageNumber}` is replaced and nothing
/// else in the template changes.
pub fn footer_text(template: &str, page: u32) -> String {
    template.replace(PAGE_NUMBER_TOKEN, &page.to_string())
}
