//! Access to the bulletin REST API.
//!
//! The aggregation code only needs a handful of read operations, so they are
//! expressed as the [`BulletinSource`] trait. [`ApiClient`] implements it over
//! HTTP; tests use in-memory sources.

mod client;
pub mod endpoints;
mod types;

pub use client::ApiClient;
pub use types::{
    Article, Bulletin, BulletinType, Category, PublishedBulletin, PublishedSummary, Summary,
    TypeRef,
};

use crate::error::Result;

/// Read operations needed to assemble a bulletin.
///
/// Implementations must be shareable across threads: categories and
/// summaries are requested concurrently.
pub trait BulletinSource: Sync {
    /// Fetch a bulletin record by id.
    fn bulletin(&self, id: i64) -> Result<Bulletin>;

    /// Fetch a bulletin type by id.
    fn bulletin_type(&self, id: i64) -> Result<BulletinType>;

    /// Fetch every category.
    fn categories(&self) -> Result<Vec<Category>>;

    /// Fetch the summaries filed under a bulletin.
    fn summaries_for_bulletin(&self, bulletin_id: i64) -> Result<Vec<Summary>>;

    /// Fetch the articles of a document. Sources without articles return none.
    fn articles_for_document(&self, document_id: i64) -> Result<Vec<Article>> {
        let _ = document_id;
        Ok(Vec::new())
    }
}
