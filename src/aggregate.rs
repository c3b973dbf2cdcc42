//! Bulletin data aggregation.
//!
//! Fetches a bulletin, its categories and its summaries, and merges them into
//! the nested tree the page planner consumes:
//! bulletin → categories → summaries (→ articles).

use std::collections::HashMap;
use std::sync::LazyLock;

use rayon::prelude::*;
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::api::{Article, Bulletin, BulletinSource, Category, Summary, TypeRef};
use crate::error::{Error, Result};

/// Type name used when the bulletin type cannot be resolved.
pub const UNKNOWN_TYPE: &str = "Sin tipo";

/// Range bounds shown in the index when a summary carries no number.
pub const DEFAULT_RANGE: (&str, &str) = ("0001", "0002");

static NUMBER_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"N\s?[°º]\s*(\d+)").unwrap());

/// A category together with the summaries filed under it, in display order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategorySection {
    /// The category record
    pub category: Category,
    /// Summaries, sorted by their printed number where available
    pub summaries: Vec<Summary>,
}

impl CategorySection {
    /// Number range of the section for the index, e.g. ("0012", "0015").
    pub fn number_range(&self) -> (String, String) {
        let first = self
            .summaries
            .first()
            .and_then(|s| summary_number_text(s.content()))
            .unwrap_or(DEFAULT_RANGE.0);
        let last = self
            .summaries
            .last()
            .and_then(|s| summary_number_text(s.content()))
            .unwrap_or(DEFAULT_RANGE.1);
        (first.to_string(), last.to_string())
    }
}

/// Everything needed to compose one bulletin.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BulletinData {
    /// The bulletin record (guaranteed to have an id)
    pub bulletin: Bulletin,
    /// Resolved bulletin type name
    pub bulletin_type: String,
    /// Non-empty categories in fetch order
    pub categories: Vec<CategorySection>,
    /// Number of summaries across all sections
    pub total_summaries: usize,
    /// Articles keyed by the id of the summary/document they belong to
    #[serde(default)]
    pub articles: HashMap<i64, Vec<Article>>,
}

impl BulletinData {
    /// Assemble data from already-fetched records.
    ///
    /// Fails with [`Error::MissingBulletinId`] when the bulletin has no id and
    /// with [`Error::EmptyBulletin`] when no category ends up with summaries.
    pub fn assemble(
        bulletin: Bulletin,
        bulletin_type: impl Into<String>,
        categories: Vec<Category>,
        summaries: &[Summary],
    ) -> Result<Self> {
        let id = bulletin.id.ok_or(Error::MissingBulletinId)?;
        let categories = group_summaries(categories, summaries);
        if categories.is_empty() {
            return Err(Error::EmptyBulletin(id));
        }
        let total_summaries = categories.iter().map(|c| c.summaries.len()).sum();
        Ok(Self {
            bulletin,
            bulletin_type: bulletin_type.into(),
            categories,
            total_summaries,
            articles: HashMap::new(),
        })
    }

    /// Bulletin id.
    pub fn id(&self) -> i64 {
        self.bulletin.id.unwrap_or_default()
    }

    /// Edition number.
    pub fn edition(&self) -> u32 {
        self.bulletin.edition()
    }

    /// Pages the full document will have: cover, optional index, one page per
    /// category section and one per summary.
    pub fn estimated_pages(&self, include_index: bool) -> usize {
        1 + usize::from(include_index) + self.categories.len() + self.total_summaries
    }

    /// Articles attached to a summary, in display order.
    pub fn articles_for(&self, summary_id: i64) -> &[Article] {
        self.articles
            .get(&summary_id)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }
}

/// Fetch and merge everything needed for one bulletin.
///
/// The type lookup, the category list and the summary list are requested
/// concurrently. A failed type lookup is not fatal.
pub fn fetch_bulletin_data<S: BulletinSource + ?Sized>(source: &S, id: i64) -> Result<BulletinData> {
    let bulletin = source.bulletin(id)?;
    if bulletin.id.is_none() {
        return Err(Error::MissingBulletinId);
    }

    let type_ref = bulletin.tipo_boletin.clone();
    let (bulletin_type, (categories, summaries)) = rayon::join(
        || resolve_type(source, type_ref.as_ref()),
        || {
            rayon::join(
                || source.categories(),
                || source.summaries_for_bulletin(id),
            )
        },
    );
    let categories = categories?;
    let summaries = summaries?;
    log::debug!(
        "Bulletin {}: fetched {} categories and {} summaries",
        id,
        categories.len(),
        summaries.len()
    );

    BulletinData::assemble(bulletin, bulletin_type, categories, &summaries)
}

/// Fetch articles for every summary of the bulletin, concurrently.
pub fn fetch_articles<S: BulletinSource + ?Sized>(source: &S, data: &mut BulletinData) -> Result<()> {
    let ids: Vec<i64> = data
        .categories
        .iter()
        .flat_map(|c| c.summaries.iter().map(|s| s.id))
        .collect();

    let fetched: Vec<Article> = ids
        .par_iter()
        .map(|id| source.articles_for_document(*id))
        .collect::<Result<Vec<_>>>()?
        .into_iter()
        .flatten()
        .collect();

    data.articles = group_articles(fetched);
    Ok(())
}

fn resolve_type<S: BulletinSource + ?Sized>(source: &S, type_ref: Option<&TypeRef>) -> String {
    match type_ref {
        Some(TypeRef::Name(name)) if !name.trim().is_empty() => name.clone(),
        Some(TypeRef::Id(type_id)) => match source.bulletin_type(*type_id) {
            Ok(t) if !t.nombre.trim().is_empty() => t.nombre,
            Ok(_) => UNKNOWN_TYPE.to_string(),
            Err(e) => {
                log::warn!("Could not fetch bulletin type {}: {}", type_id, e);
                UNKNOWN_TYPE.to_string()
            }
        },
        _ => UNKNOWN_TYPE.to_string(),
    }
}

/// Group summaries under their categories.
///
/// Category order is kept as given; categories left without summaries are
/// dropped. Summaries whose category is unknown are ignored.
pub fn group_summaries(categories: Vec<Category>, summaries: &[Summary]) -> Vec<CategorySection> {
    let known: Vec<i64> = categories.iter().map(|c| c.id).collect();
    let orphans = summaries
        .iter()
        .filter(|s| !known.contains(&s.id_categoria))
        .count();
    if orphans > 0 {
        log::debug!("{} summaries reference unknown categories", orphans);
    }

    categories
        .into_iter()
        .filter_map(|category| {
            let mut items: Vec<Summary> = summaries
                .iter()
                .filter(|s| s.id_categoria == category.id)
                .cloned()
                .collect();
            if items.is_empty() {
                log::debug!("Dropping empty category {:?}", category.nombre);
                return None;
            }
            sort_by_number(&mut items);
            Some(CategorySection {
                category,
                summaries: items,
            })
        })
        .collect()
}

/// The digits following `N°`/`Nº` in the content, as printed.
pub fn summary_number_text(content: &str) -> Option<&str> {
    NUMBER_RE
        .captures(content)
        .and_then(|c| c.get(1))
        .map(|m| m.as_str())
}

/// The number following `N°`/`Nº` in the content.
pub fn summary_number(content: &str) -> Option<u64> {
    summary_number_text(content).and_then(|digits| digits.parse().ok())
}

/// Order summaries by their printed number.
///
/// Summaries carrying a number are sorted among themselves and put back into
/// the slots numbered summaries occupied; summaries without a number keep
/// their fetch position.
pub fn sort_by_number(summaries: &mut [Summary]) {
    let slots: Vec<usize> = summaries
        .iter()
        .enumerate()
        .filter(|(_, s)| summary_number(s.content()).is_some())
        .map(|(i, _)| i)
        .collect();
    if slots.len() < 2 {
        return;
    }

    let mut numbered: Vec<Summary> = slots.iter().map(|&i| summaries[i].clone()).collect();
    numbered.sort_by_key(|s| summary_number(s.content()));
    for (slot, summary) in slots.into_iter().zip(numbered) {
        summaries[slot] = summary;
    }
}

/// Group articles by owning document, each list ordered by `orden`.
pub fn group_articles(articles: Vec<Article>) -> HashMap<i64, Vec<Article>> {
    let mut grouped: HashMap<i64, Vec<Article>> = HashMap::new();
    for article in articles {
        grouped.entry(article.documento_id).or_default().push(article);
    }
    for list in grouped.values_mut() {
        list.sort_by_key(|a| a.orden);
    }
    grouped
}
