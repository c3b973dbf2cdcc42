//! Page planning.
//!
//! Assigns a page number to every category section page and every summary
//! page before anything is rendered. The index page and the body pages both
//! read their numbers from the same [`PagePlan`], so the numbers printed in
//! the index always match the pages the content lands on.

use serde::{Deserialize, Serialize};

use crate::aggregate::CategorySection;
use crate::render::PdfConfig;

/// One planned body page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageMapEntry {
    /// 1-based page number in the final document
    pub page_number: u32,
    /// Index of the category section
    pub category_index: usize,
    /// Index of the summary within the section; `None` for the section page
    pub item_index: Option<usize>,
}

impl PageMapEntry {
    /// True for a category section page.
    pub fn is_section(&self) -> bool {
        self.item_index.is_none()
    }
}

/// Page numbers of one category section.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SectionPages {
    /// Page of the section's own title page
    pub start_page: u32,
    /// Page of each summary, in order
    pub summary_pages: Vec<u32>,
}

impl SectionPages {
    /// Last page used by the section.
    pub fn end_page(&self) -> u32 {
        self.summary_pages.last().copied().unwrap_or(self.start_page)
    }
}

/// Page numbers for a whole bulletin.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PagePlan {
    /// Cover page, when enabled (always page 1)
    pub cover_page: Option<u32>,
    /// Index page, when enabled
    pub index_page: Option<u32>,
    /// Sections in body order
    pub sections: Vec<SectionPages>,
    /// Total number of pages
    pub total_pages: u32,
}

impl PagePlan {
    /// Plan pages for sections holding `summary_counts[i]` summaries each.
    ///
    /// Each section consumes one page for itself plus one per summary. A
    /// section with zero summaries still consumes its own page; empty
    /// categories are expected to be filtered out beforehand.
    pub fn new<I>(summary_counts: I, show_cover: bool, show_index: bool) -> Self
    where
        I: IntoIterator<Item = usize>,
    {
        let mut counter = 0u32;
        let cover_page = show_cover.then(|| {
            counter += 1;
            counter
        });
        let index_page = show_index.then(|| {
            counter += 1;
            counter
        });

        let mut next = counter + 1;
        let sections = summary_counts
            .into_iter()
            .map(|count| {
                let start_page = next;
                let summary_pages = (0..count as u32).map(|i| start_page + 1 + i).collect();
                next = start_page + 1 + count as u32;
                SectionPages {
                    start_page,
                    summary_pages,
                }
            })
            .collect();

        let plan = Self {
            cover_page,
            index_page,
            sections,
            total_pages: next - 1,
        };
        log::info!(
            "Planned {} pages ({} sections, first content page {})",
            plan.total_pages,
            plan.sections.len(),
            plan.first_content_page()
        );
        plan
    }

    /// Plan pages for aggregated sections under a render configuration.
    pub fn for_sections(sections: &[CategorySection], config: &PdfConfig) -> Self {
        Self::new(
            sections.iter().map(|s| s.summaries.len()),
            config.show_cover,
            config.show_index,
        )
    }

    /// Page number of the first category section page.
    pub fn first_content_page(&self) -> u32 {
        u32::from(self.cover_page.is_some()) + u32::from(self.index_page.is_some()) + 1
    }

    /// Start page of a section.
    pub fn section_start(&self, category_index: usize) -> Option<u32> {
        self.sections.get(category_index).map(|s| s.start_page)
    }

    /// Page of a summary.
    pub fn summary_page(&self, category_index: usize, item_index: usize) -> Option<u32> {
        self.sections
            .get(category_index)
            .and_then(|s| s.summary_pages.get(item_index))
            .copied()
    }

    /// Body pages in document order.
    pub fn entries(&self) -> Vec<PageMapEntry> {
        let mut entries = Vec::new();
        for (category_index, section) in self.sections.iter().enumerate() {
            entries.push(PageMapEntry {
                page_number: section.start_page,
                category_index,
                item_index: None,
            });
            for (item_index, &page_number) in section.summary_pages.iter().enumerate() {
                entries.push(PageMapEntry {
                    page_number,
                    category_index,
                    item_index: Some(item_index),
                });
            }
        }
        entries
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cover_and_index() {
        let plan = PagePlan::new([1, 2], true, true);
        assert_eq!(plan.cover_page, Some(1));
        assert_eq!(plan.index_page, Some(2));
        assert_eq!(plan.section_start(0), Some(3));
        assert_eq!(plan.summary_page(0, 0), Some(4));
        assert_eq!(plan.section_start(1), Some(5));
        assert_eq!(plan.sections[1].summary_pages, vec![6, 7]);
        assert_eq!(plan.total_pages, 7);
    }

    #[test]
    fn test_no_front_matter() {
        let plan = PagePlan::new([2], false, false);
        assert_eq!(plan.first_content_page(), 1);
        assert_eq!(plan.section_start(0), Some(1));
        assert_eq!(plan.sections[0].end_page(), 3);
    }

    #[test]
    fn test_index_without_cover() {
        let plan = PagePlan::new([1], false, true);
        assert_eq!(plan.cover_page, None);
        assert_eq!(plan.index_page, Some(1));
        assert_eq!(plan.section_start(0), Some(2));
    }

    #[test]
    fn test_entries_are_contiguous() {
        let plan = PagePlan::new([3, 1, 2], true, false);
        let pages: Vec<u32> = plan.entries().iter().map(|e| e.page_number).collect();
        assert_eq!(pages, (2..=10).collect::<Vec<_>>());
        assert_eq!(plan.total_pages, 10);
        assert!(plan.entries()[0].is_section());
    }

    #[test]
    fn test_empty_section_consumes_one_page() {
        let plan = PagePlan::new([0, 1], true, true);
        assert_eq!(plan.section_start(0), Some(3));
        assert_eq!(plan.section_start(1), Some(4));
    }

    #[test]
    fn test_out_of_range_lookups() {
        let plan = PagePlan::new([1], true, true);
        assert_eq!(plan.section_start(5), None);
        assert_eq!(plan.summary_page(0, 3), None);
    }
}
