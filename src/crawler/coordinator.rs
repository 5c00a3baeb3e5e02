//! Crawl coordinator - main harvest orchestration logic
//!
//! This module contains the page loop that walks a category's listing pages
//! and, per row:
//! - checks the question number against the record store
//! - skips known questions, or ends the crawl at the first one
//! - fetches the answer and image of new questions
//! - writes the question with its references in one transaction

use crate::config::{CategorySelection, Config};
use crate::crawler::fetcher::{authenticate, Session};
use crate::crawler::images::download_image;
use crate::crawler::locator::{locate_question, LocateOutcome};
use crate::crawler::parser::{
    parse_answer, parse_category_index, parse_listing, CategoryListing, QuestionRow, RowMedia,
};
use crate::crawler::politeness::Politeness;
use crate::site::{pages_for_category, PageRange, SiteUrls};
use crate::storage::{
    open_storage, resolve_or_create, NewQuestion, RecordStore, ReferenceKey, RunStatus, SqliteStorage,
    StorageResult, VideoRef,
};
use crate::HarvestError;
use std::path::{Path, PathBuf};

/// What to crawl for one category
#[derive(Debug, Clone)]
pub struct CrawlPlan {
    pub category: String,
    pub pages: PageRange,
    /// End the crawl at the first question already in the store
    pub stop_at_first_known: bool,
    /// Folder receiving this category's images
    pub image_dir: PathBuf,
}

/// Where a stop-at-first-known crawl ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StopPoint {
    pub page: u32,
    /// Zero-based row index on that page
    pub row: usize,
    pub number: i64,
}

/// Tally of one category crawl
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CrawlReport {
    pub category: String,
    pub pages_visited: u32,
    pub questions_stored: u64,
    pub questions_skipped: u64,
    /// Pages abandoned at a row without a usable question number
    pub pages_abandoned: u32,
    pub stopped_at: Option<StopPoint>,
}

impl CrawlReport {
    pub fn stopped_early(&self) -> bool {
        self.stopped_at.is_some()
    }
}

/// Result of processing one row
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RowOutcome {
    Stored { question_id: i64 },
    Skipped,
    /// A known question was met under stop-at-first-known
    StopCrawl,
}

/// Whether the page loop moves on to the next page
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageOutcome {
    Continue,
    Stop,
}

/// Crawls the plan's page range for one category
///
/// Every page is fetched in order; the crawl ends after the last page or as
/// soon as a page reports [`PageOutcome::Stop`].
pub async fn crawl_category<S>(
    session: &Session,
    store: &mut S,
    politeness: &Politeness,
    plan: &CrawlPlan,
) -> Result<CrawlReport, HarvestError>
where
    S: RecordStore + ?Sized,
{
    let mut report = CrawlReport::default();
    crawl_pages(session, store, politeness, plan, &mut report).await?;
    Ok(report)
}

/// Page loop behind [`crawl_category`]
///
/// The tally lives in the caller's `report`, so rows committed before an
/// error are still counted.
pub async fn crawl_pages<S>(
    session: &Session,
    store: &mut S,
    politeness: &Politeness,
    plan: &CrawlPlan,
    report: &mut CrawlReport,
) -> Result<(), HarvestError>
where
    S: RecordStore + ?Sized,
{
    report.category = plan.category.clone();

    tracing::info!(
        "Crawling '{}' pages {:?} (stop at first known: {})",
        plan.category,
        plan.pages.pages(),
        plan.stop_at_first_known
    );

    for page in plan.pages.pages() {
        match crawl_page(session, store, politeness, plan, page, report).await? {
            PageOutcome::Continue => continue,
            PageOutcome::Stop => break,
        }
    }

    tracing::info!(
        "Finished '{}': {} pages, {} stored, {} skipped",
        report.category,
        report.pages_visited,
        report.questions_stored,
        report.questions_skipped
    );
    Ok(())
}

/// Fetches one listing page and processes its rows in order
pub async fn crawl_page<S>(
    session: &Session,
    store: &mut S,
    politeness: &Politeness,
    plan: &CrawlPlan,
    page: u32,
    report: &mut CrawlReport,
) -> Result<PageOutcome, HarvestError>
where
    S: RecordStore + ?Sized,
{
    tracing::info!("Fetching results for page {}", page);

    let url = session.urls().listing(&plan.category, page)?;
    let fetched = session.get_page(&url).await?;
    report.pages_visited += 1;

    let rows = parse_listing(&fetched.body, session.urls(), &fetched.url);

    for (index, row) in rows.into_iter().enumerate() {
        let row = match row {
            Ok(row) => row,
            Err(e) => {
                tracing::error!("Abandoning page {} at row {}: {}", page, index, e);
                report.pages_abandoned += 1;
                return Ok(PageOutcome::Continue);
            }
        };

        match process_row(session, store, plan, &row).await? {
            RowOutcome::Stored { .. } => {
                report.questions_stored += 1;
                politeness.pause_after_row().await;
            }
            RowOutcome::Skipped => {
                report.questions_skipped += 1;
                politeness.pause_after_skip().await;
            }
            RowOutcome::StopCrawl => {
                report.stopped_at = Some(StopPoint {
                    page,
                    row: index,
                    number: row.number,
                });
                return Ok(PageOutcome::Stop);
            }
        }
    }

    Ok(PageOutcome::Continue)
}

/// Decides the fate of one row and stores it when new
///
/// Remote lookups (answer, image) happen first; the inserts then run in a
/// single transaction that is rolled back if any of them fails.
pub async fn process_row<S>(
    session: &Session,
    store: &mut S,
    plan: &CrawlPlan,
    row: &QuestionRow,
) -> Result<RowOutcome, HarvestError>
where
    S: RecordStore + ?Sized,
{
    if store.question_exists(row.number)? {
        if plan.stop_at_first_known {
            tracing::info!(
                "Question {} is already present in the database, stopping",
                row.number
            );
            return Ok(RowOutcome::StopCrawl);
        }
        tracing::info!("Question {} is already present in the database", row.number);
        return Ok(RowOutcome::Skipped);
    }

    tracing::info!("Downloading question {}", row.number);

    let answer = fetch_answer(session, row.number).await;

    let image = match &row.media {
        RowMedia::Image(source) => {
            match download_image(session, source, row.number, &plan.image_dir).await {
                Ok(filename) => Some(filename),
                Err(e) => {
                    tracing::warn!("Question {}: image download failed: {}", row.number, e);
                    None
                }
            }
        }
        _ => None,
    };

    let video = match &row.media {
        RowMedia::Video(video) => Some(video),
        _ => None,
    };

    store.begin_row()?;
    let persisted = persist_row(store, &plan.category, row, &answer, image.as_deref(), video);
    let question_id = settle_row(store, row.number, persisted)?;
    tracing::info!(
        "All information for question {} was written to the database",
        row.number
    );
    Ok(RowOutcome::Stored { question_id })
}

/// Commits a persisted row or rolls it back
///
/// On failure the insert error is returned even when the rollback fails too.
fn settle_row<S>(
    store: &mut S,
    number: i64,
    persisted: StorageResult<i64>,
) -> Result<i64, HarvestError>
where
    S: RecordStore + ?Sized,
{
    match persisted {
        Ok(question_id) => {
            store.commit_row()?;
            Ok(question_id)
        }
        Err(e) => {
            if let Err(rollback) = store.rollback_row() {
                tracing::error!("Question {}: rollback failed: {}", number, rollback);
            }
            Err(e.into())
        }
    }
}

/// Answer text for a question; empty when it cannot be retrieved
async fn fetch_answer(session: &Session, number: i64) -> String {
    let url = match session.urls().answer(number) {
        Ok(url) => url,
        Err(e) => {
            tracing::warn!("Question {}: no answer url: {}", number, e);
            return String::new();
        }
    };

    match session.get_page(&url).await {
        Ok(page) => match parse_answer(&page.body) {
            Some(answer) => {
                tracing::debug!("Answer found for question {}: {}", number, answer);
                answer
            }
            None => {
                tracing::warn!("Question {}: answer page holds no answer", number);
                String::new()
            }
        },
        Err(e) => {
            tracing::warn!("Question {}: answer request failed: {}", number, e);
            String::new()
        }
    }
}

fn persist_row<S>(
    store: &mut S,
    category: &str,
    row: &QuestionRow,
    answer: &str,
    image: Option<&str>,
    video: Option<&VideoRef>,
) -> StorageResult<i64>
where
    S: RecordStore + ?Sized,
{
    let category_id = resolve_or_create(store, &ReferenceKey::Category(category))?;
    let quiz_id = row
        .quiz
        .as_ref()
        .map(|quiz| resolve_or_create(store, &ReferenceKey::Quiz(quiz)))
        .transpose()?;

    let question_id = store.insert_question(&NewQuestion {
        number: row.number,
        text: &row.text,
        answer,
        category_id,
        quiz_id,
        quiz_round: row.quiz.as_ref().and_then(|quiz| quiz.round.as_deref()),
    })?;

    if let Some(filename) = image {
        store.insert_image(filename, question_id)?;
    }

    if let Some(video) = video {
        store.insert_video(video, question_id)?;
    }

    for tag in &row.tags {
        let tag_id = resolve_or_create(store, &ReferenceKey::Tag(tag))?;
        store.link_tag(question_id, tag_id)?;
    }

    Ok(question_id)
}

/// Fetches the category overview with question counts
pub async fn fetch_categories(session: &Session) -> Result<Vec<CategoryListing>, HarvestError> {
    let url = session.urls().category_index()?;
    let page = session.get_page(&url).await?;
    let categories = parse_category_index(&page.body);
    tracing::info!("Category index lists {} categories", categories.len());
    Ok(categories)
}

/// Picks one category from the index by slug
pub fn find_category<'a>(
    categories: &'a [CategoryListing],
    slug: &str,
) -> Result<&'a CategoryListing, HarvestError> {
    categories
        .iter()
        .find(|listing| listing.slug == slug)
        .ok_or_else(|| HarvestError::UnknownCategory(slug.to_string()))
}

/// Main harvester structure
///
/// Owns the session, the record store and the run settings. Each category
/// crawl gets its own run row.
pub struct Harvester {
    config: Config,
    config_hash: String,
    session: Session,
    storage: SqliteStorage,
    politeness: Politeness,
}

impl Harvester {
    /// Opens the configured database and prepares the session
    pub fn new(config: Config, config_hash: String) -> Result<Self, HarvestError> {
        let storage = open_storage(Path::new(&config.output.database_path))?;
        Self::with_storage(config, config_hash, storage)
    }

    /// Uses an already opened store
    pub fn with_storage(
        config: Config,
        config_hash: String,
        storage: SqliteStorage,
    ) -> Result<Self, HarvestError> {
        let urls = SiteUrls::new(&config.site.base_url, config.crawler.questions_per_page)?;
        let session = Session::new(urls)?;
        let politeness =
            Politeness::from_secs(config.crawler.min_sleep_time, config.crawler.sleep_time);

        Ok(Self {
            config,
            config_hash,
            session,
            storage,
            politeness,
        })
    }

    /// Replaces the configured pauses
    pub fn set_politeness(&mut self, politeness: Politeness) {
        self.politeness = politeness;
    }

    pub fn storage(&self) -> &SqliteStorage {
        &self.storage
    }

    /// Logs in, then crawls every selected category in index order
    pub async fn run(&mut self) -> Result<Vec<CrawlReport>, HarvestError> {
        authenticate(&self.session, &self.config.site).await?;

        let categories = fetch_categories(&self.session).await?;
        let selected: Vec<CategoryListing> = match &self.config.crawler.category {
            CategorySelection::All => categories,
            CategorySelection::Single(slug) => vec![find_category(&categories, slug)?.clone()],
        };

        let mut reports = Vec::with_capacity(selected.len());
        for listing in &selected {
            reports.push(self.crawl_listing(listing).await?);
        }
        Ok(reports)
    }

    /// Crawls one category, recording the run
    pub async fn crawl_listing(
        &mut self,
        listing: &CategoryListing,
    ) -> Result<CrawlReport, HarvestError> {
        let total_pages =
            pages_for_category(listing.question_count, self.config.crawler.questions_per_page);
        tracing::debug!(
            "For category {}, there are {} pages",
            listing.slug,
            total_pages
        );

        let plan = CrawlPlan {
            category: listing.slug.clone(),
            pages: PageRange::resolve(
                self.config.crawler.from_page,
                self.config.crawler.to_page,
                total_pages,
            ),
            stop_at_first_known: self.config.crawler.only_new,
            image_dir: Path::new(&self.config.output.image_dir).join(&listing.slug),
        };

        let run_id = self.storage.create_run(&self.config_hash, &listing.slug)?;

        let mut report = CrawlReport::default();
        let crawled = crawl_pages(
            &self.session,
            &mut self.storage,
            &self.politeness,
            &plan,
            &mut report,
        )
        .await;

        match crawled {
            Ok(()) => {
                let status = if report.stopped_early() {
                    RunStatus::Stopped
                } else {
                    RunStatus::Completed
                };
                self.storage
                    .finish_run(run_id, status, report.questions_stored)?;
                Ok(report)
            }
            Err(e) => {
                tracing::error!("Crawl of '{}' failed: {}", listing.slug, e);
                self.storage
                    .finish_run(run_id, RunStatus::Failed, report.questions_stored)?;
                Err(e)
            }
        }
    }

    /// Logs in and runs the page locator for one question
    pub async fn locate(&self, category: &str, number: i64) -> Result<LocateOutcome, HarvestError> {
        authenticate(&self.session, &self.config.site).await?;

        let categories = fetch_categories(&self.session).await?;
        let listing = find_category(&categories, category)?;
        let total_pages =
            pages_for_category(listing.question_count, self.config.crawler.questions_per_page);

        locate_question(
            &self.session,
            category,
            total_pages,
            number,
            &self.politeness,
            self.config.crawler.gap_retries,
        )
        .await
    }
}
