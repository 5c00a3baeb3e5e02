//! Crawler module for harvesting questions from the quiz site
//!
//! This module contains the core harvesting logic, including:
//! - The authenticated HTTP session
//! - HTML parsing of listing, answer and category pages
//! - Randomized pauses between rows
//! - Image downloads
//! - The page loop and the page locator

mod coordinator;
mod fetcher;
mod images;
mod locator;
mod parser;
mod politeness;

pub use coordinator::{
    crawl_category, crawl_page, crawl_pages, fetch_categories, find_category, process_row, CrawlPlan,
    CrawlReport, Harvester, PageOutcome, RowOutcome, StopPoint,
};
pub use fetcher::{authenticate, build_http_client, FetchedPage, Session};
pub use images::{download_image, image_filename};
pub use locator::{ceil_log2, fetch_ceiling, locate_question, LocateOutcome, Location, FETCH_SLACK};
pub use parser::{
    parse_answer, parse_category_index, parse_listing, parse_row_number, parse_youtube_reference,
    CategoryListing, QuestionRow, RowMedia, RowResult,
};
pub use politeness::Politeness;

use crate::config::Config;
use crate::HarvestError;

/// Runs a complete harvest
///
/// This is the main entry point for a scraping run. It will:
/// 1. Open the question database
/// 2. Log in to the site
/// 3. Read the category index
/// 4. Crawl every selected category, one run row each
///
/// Returns one report per crawled category.
pub async fn harvest(config: Config, config_hash: String) -> Result<Vec<CrawlReport>, HarvestError> {
    let mut harvester = Harvester::new(config, config_hash)?;
    harvester.run().await
}
