//! Page range resolution
//!
//! Listing pages are 1-based. An explicit `to-page` is an exclusive bound,
//! `"ALL"` includes the last page of the category.

use serde::Deserialize;
use std::ops::Range;

/// Page sizes the listing endpoint accepts; anything else is ignored by the site
pub const ALLOWED_PAGE_SIZES: [u32; 6] = [1, 3, 5, 10, 15, 20];

/// Upper end of a crawl as written in the config file
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(try_from = "RawPageBound")]
pub enum PageBound {
    /// Every page of the category, last page included
    All,
    /// Stop before this page
    Page(u32),
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawPageBound {
    Page(u32),
    Keyword(String),
}

impl TryFrom<RawPageBound> for PageBound {
    type Error = String;

    fn try_from(raw: RawPageBound) -> Result<Self, Self::Error> {
        match raw {
            RawPageBound::Page(page) => Ok(Self::Page(page)),
            RawPageBound::Keyword(word) if word == "ALL" => Ok(Self::All),
            RawPageBound::Keyword(word) => Err(format!(
                "to-page must be a page number or \"ALL\", got \"{}\"",
                word
            )),
        }
    }
}

/// Pages a category crawl will visit
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRange {
    /// First page fetched
    pub start: u32,
    /// The resolved end page
    pub end_page: u32,
    /// Whether `end_page` itself is fetched
    pub inclusive: bool,
}

impl PageRange {
    /// Resolves the configured bounds against a category's size
    ///
    /// `start` is clamped to at least 1 and at most the resolved end page.
    pub fn resolve(from_page: u32, to_page: PageBound, total_pages: u32) -> Self {
        let (end_page, inclusive) = match to_page {
            PageBound::All => (total_pages, true),
            PageBound::Page(page) => (page.min(total_pages), false),
        };

        let start = from_page.max(1).min(end_page);

        Self {
            start,
            end_page,
            inclusive,
        }
    }

    /// Page numbers in crawl order
    pub fn pages(&self) -> Range<u32> {
        let end = if self.inclusive {
            self.end_page.saturating_add(1)
        } else {
            self.end_page
        };
        // An empty category resolves to end page 0; page 0 is never fetched
        self.start.max(1)..end.max(self.start.max(1))
    }

    pub fn len(&self) -> usize {
        self.pages().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Number of listing pages for a category holding `question_count` questions
///
/// `⌈question_count / questions_per_page⌉`
pub fn pages_for_category(question_count: u32, questions_per_page: u32) -> u32 {
    if questions_per_page == 0 {
        return 0;
    }
    question_count.div_ceil(questions_per_page)
}
