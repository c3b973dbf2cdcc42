//! Endpoint paths, relative to the API base URL.

pub const BULLETINS: &str = "/boletines/";
pub const BULLETIN_TYPES: &str = "/tipos-boletin/";
pub const CATEGORIES: &str = "/categorias/";
pub const SUMMARIES: &str = "/resumenes/";
pub const PUBLISHED_BULLETINS: &str = "/publicados/boletines";

pub fn bulletin(id: i64) -> String {
    format!("/boletines/{}", id)
}

pub fn bulletin_type(id: i64) -> String {
    format!("/tipos-boletin/{}", id)
}

pub fn summaries_for_bulletin(bulletin_id: i64) -> String {
    format!("{}?id_boletin={}", SUMMARIES, bulletin_id)
}

pub fn published_bulletin(id: i64) -> String {
    format!("/publicados/boletin/{}", id)
}

pub fn published_summaries(published_id: i64) -> String {
    format!("/publicados/resumenes/boletin/{}", published_id)
}

pub fn articles_for_document(document_id: i64) -> String {
    format!("/articulo/?documento_id={}", document_id)
}
