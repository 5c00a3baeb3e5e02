//! Site layout: endpoint URLs and listing pagination
//!
//! The quiz site has no lookup-by-id API. Everything is reached through a
//! handful of URL patterns relative to the site root:
//!
//! - listing: `categorie/{slug}/{page}/{page_size}/1/0` (newest first, base template)
//! - answer: `beantwoordevragen.php?vraagid={number}&page=categorie`
//! - category index: `categorie/`
//! - login: `login.php`

mod paging;

pub use paging::{pages_for_category, PageBound, PageRange, ALLOWED_PAGE_SIZES};

use url::Url;

/// Sort order "van nieuw naar oud"
const SORT_NEWEST_FIRST: u32 = 1;

/// The bare question template
const PAGE_TEMPLATE: u32 = 0;

/// Builds every URL the harvester requests
#[derive(Debug, Clone)]
pub struct SiteUrls {
    base: Url,
    questions_per_page: u32,
}

impl SiteUrls {
    /// Creates the URL builder for a site root
    ///
    /// A missing trailing slash is added so relative joins stay below the root.
    pub fn new(base_url: &str, questions_per_page: u32) -> Result<Self, url::ParseError> {
        let mut base = Url::parse(base_url)?;
        if !base.path().ends_with('/') {
            let path = format!("{}/", base.path());
            base.set_path(&path);
        }
        Ok(Self {
            base,
            questions_per_page,
        })
    }

    pub fn base(&self) -> &Url {
        &self.base
    }

    pub fn questions_per_page(&self) -> u32 {
        self.questions_per_page
    }

    /// Listing page `page` of `category`
    pub fn listing(&self, category: &str, page: u32) -> Result<Url, url::ParseError> {
        let url = self.base.join(&format!(
            "categorie/{}/{}/{}/{}/{}",
            category, page, self.questions_per_page, SORT_NEWEST_FIRST, PAGE_TEMPLATE
        ))?;
        tracing::debug!("Listing url constructed: {}", url);
        Ok(url)
    }

    /// The XHR endpoint that reveals the answer to question `number`
    pub fn answer(&self, number: i64) -> Result<Url, url::ParseError> {
        let mut url = self.base.join("beantwoordevragen.php")?;
        url.query_pairs_mut()
            .append_pair("vraagid", &number.to_string())
            .append_pair("page", "categorie");
        Ok(url)
    }

    /// Overview of all categories with their question counts
    pub fn category_index(&self) -> Result<Url, url::ParseError> {
        self.base.join("categorie/")
    }

    pub fn login(&self) -> Result<Url, url::ParseError> {
        self.base.join("login.php")
    }

    /// Resolves an `href`/`src` found on a page against the site root
    pub fn resolve(&self, reference: &str) -> Result<Url, url::ParseError> {
        self.base.join(reference.trim())
    }
}
