//! Rendering: page composition and output formats.

mod compose;
mod json;
mod options;
mod pdf;
mod text;

pub use compose::{
    compose_document, compose_with_plan, cover_page, index_page, pdf_file_name, section_page,
    summary_page, BAND_BLUE, BAND_PURPLE, TITLE_BLUE,
};
pub use json::{to_json, JsonFormat};
pub use options::{footer_text, PdfConfig, DEFAULT_FOOTER, DEFAULT_LOCALITY, PAGE_NUMBER_TOKEN};
pub use pdf::{encode_win_ansi, save_pdf, text_width, to_pdf};
pub use text::{page_marker, to_text, to_text_with_markers};
