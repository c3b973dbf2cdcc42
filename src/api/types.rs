//! Records returned by the bulletin REST API.
//!
//! Field names follow the API's JSON so records deserialize without
//! renaming. Optional fields default when absent; nothing here is ever
//! written back to the API by this crate.

use serde::{Deserialize, Serialize};

/// Bulletin type reference, sent either as an id or as an embedded name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum TypeRef {
    /// Foreign key into `/tipos-boletin/`
    Id(i64),
    /// Already-resolved type name
    Name(String),
}

/// A bulletin edition, the root of a publication.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Bulletin {
    /// Record id. A record without id is treated as not found.
    #[serde(default)]
    pub id: Option<i64>,

    /// Edition number
    #[serde(default, alias = "edicion")]
    pub numero_edicion: Option<u32>,

    /// Publication date (ISO)
    #[serde(default, alias = "fecha_publicacion")]
    pub fecha: Option<String>,

    /// Bulletin type
    #[serde(default)]
    pub tipo_boletin: Option<TypeRef>,

    /// Optional edition title
    #[serde(default)]
    pub titulo_edicion: Option<String>,
}

impl Bulletin {
    /// Edition number, 1 when the API left it empty.
    pub fn edition(&self) -> u32 {
        self.numero_edicion.filter(|n| *n > 0).unwrap_or(1)
    }

    /// Publication date, empty when absent.
    pub fn date(&self) -> &str {
        self.fecha.as_deref().unwrap_or("")
    }
}

/// A bulletin type (e.g., "Ordinario", "Extraordinario").
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BulletinType {
    /// Record id
    pub id: i64,
    /// Display name
    pub nombre: String,
    /// Free-text remarks
    #[serde(default)]
    pub observacion: Option<String>,
}

/// A category grouping summaries (e.g., "Resoluciones").
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Category {
    /// Record id
    pub id: i64,
    /// Display name
    pub nombre: String,
    /// Short code used in summary references
    #[serde(default)]
    pub abreviatura: String,
}

/// A summary (resumen): rich-text leaf content of a bulletin.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Summary {
    /// Record id
    pub id: i64,
    /// Content in the editor's HTML subset
    #[serde(default)]
    pub contenido: Option<String>,
    /// Date (ISO)
    #[serde(default)]
    pub fecha: Option<String>,
    /// Owning category
    pub id_categoria: i64,
    /// Owning bulletin
    #[serde(default)]
    pub id_boletin: Option<i64>,
}

impl Summary {
    /// Content, empty when absent.
    pub fn content(&self) -> &str {
        self.contenido.as_deref().unwrap_or("")
    }
}

/// An article of a document in the document-based flow.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Article {
    /// Record id
    pub id: i64,
    /// Owning document
    pub documento_id: i64,
    /// Article number as printed (may be non-numeric, e.g. "3 bis")
    #[serde(default)]
    pub numero_articulo: String,
    /// Article kind
    #[serde(default)]
    pub tipo_articulo: String,
    /// Content in the editor's HTML subset
    #[serde(default)]
    pub contenido: String,
    /// Display order within the document
    #[serde(default)]
    pub orden: i64,
}

/// A summary as exposed by the public reading endpoints.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PublishedSummary {
    /// Record id
    pub id: i64,
    /// Owning published bulletin
    pub id_publicado: i64,
    /// Content in the editor's HTML subset
    #[serde(default)]
    pub contenido: String,
    /// Date (ISO)
    #[serde(default)]
    pub fecha: String,
    /// Owning category
    pub id_categoria: i64,
    /// Embedded category, when the endpoint expands it
    #[serde(default)]
    pub categoria: Option<Category>,
}

/// A bulletin as exposed by `/publicados/boletines`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PublishedBulletin {
    /// Record id of the publication
    pub id: i64,
    /// Source bulletin
    pub id_boletin: i64,
    /// Bulletin type id
    pub tipo_boletin: i64,
    /// Bulletin type name
    #[serde(default)]
    pub tipo_boletin_nombre: Option<String>,
    /// Bulletin date (ISO)
    #[serde(default)]
    pub fecha: String,
    /// Publication date (ISO)
    #[serde(default)]
    pub fecha_publicacion: String,
    /// Edition number
    pub edicion: u32,
    /// Summaries, when embedded
    #[serde(default)]
    pub resumenes_publicados: Option<Vec<PublishedSummary>>,
    /// Number of summaries
    #[serde(default)]
    pub resumenes_count: u32,
    /// Names of the main categories
    #[serde(default)]
    pub categorias_principales: Vec<String>,
    /// Whether an accessible version exists
    #[serde(default)]
    pub accesible: Option<bool>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bulletin_aliases() {
        let json = r#"{"id": 7, "edicion": 42, "fecha": "2025-03-15", "tipo_boletin": 2}"#;
        let b: Bulletin = serde_json::from_str(json).unwrap();
        assert_eq!(b.id, Some(7));
        assert_eq!(b.edition(), 42);
        assert_eq!(b.tipo_boletin, Some(TypeRef::Id(2)));
    }

    #[test]
    fn test_bulletin_without_id() {
        let b: Bulletin = serde_json::from_str("{}").unwrap();
        assert_eq!(b.id, None);
        assert_eq!(b.edition(), 1);
        assert_eq!(b.date(), "");
    }

    #[test]
    fn test_type_ref_name() {
        let json = r#"{"id": 1, "numero_edicion": 3, "tipo_boletin": "Ordinario"}"#;
        let b: Bulletin = serde_json::from_str(json).unwrap();
        assert_eq!(b.tipo_boletin, Some(TypeRef::Name("Ordinario".into())));
    }

    #[test]
    fn test_summary_null_content() {
        let json = r#"{"id": 1, "contenido": null, "id_categoria": 4, "id_boletin": 7}"#;
        let s: Summary = serde_json::from_str(json).unwrap();
        assert_eq!(s.content(), "");
    }
}
