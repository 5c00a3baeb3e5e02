//! Finds the listing page that holds a given question number
//!
//! Listing pages are ordered newest first, so question numbers fall as the
//! page number rises. The locator bisects the page interval on that order.
//! Numbers are not contiguous: a target that falls between two numbers on
//! the same page was deleted or never existed, and after a few retries the
//! search reports it absent instead of looping. An empty page means the
//! category index overstates the listing, so the search continues below it.

use crate::crawler::fetcher::Session;
use crate::crawler::parser::parse_listing;
use crate::crawler::politeness::Politeness;
use crate::HarvestError;

/// Fetches allowed on top of `ceil(log2(pages))` before the search gives up
pub const FETCH_SLACK: u32 = 4;

/// Where a question was found
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Location {
    pub page: u32,
    pub url: String,
    /// Zero-based row index on the page
    pub position: usize,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LocateOutcome {
    Found { location: Location, fetches: u32 },
    /// The interval closed, or the target fell in a numbering gap
    Absent { fetches: u32 },
    /// The fetch ceiling was reached first
    Exhausted { fetches: u32 },
}

impl LocateOutcome {
    pub fn fetches(&self) -> u32 {
        match self {
            Self::Found { fetches, .. } | Self::Absent { fetches } | Self::Exhausted { fetches } => {
                *fetches
            }
        }
    }
}

/// `ceil(log2(n))`, zero for a single page
pub fn ceil_log2(n: u32) -> u32 {
    if n <= 1 {
        0
    } else {
        u32::BITS - (n - 1).leading_zeros()
    }
}

/// Most listing fetches one search may spend
pub fn fetch_ceiling(total_pages: u32, gap_retries: u32) -> u32 {
    ceil_log2(total_pages) + FETCH_SLACK + gap_retries
}

/// Bisects pages `1..=total_pages` of `category` for question `target`
pub async fn locate_question(
    session: &Session,
    category: &str,
    total_pages: u32,
    target: i64,
    politeness: &Politeness,
    gap_retries: u32,
) -> Result<LocateOutcome, HarvestError> {
    if target <= 0 {
        return Err(HarvestError::Locator(format!(
            "question number must be positive, got {}",
            target
        )));
    }

    let ceiling = fetch_ceiling(total_pages, gap_retries);
    let mut start = 1u32;
    let mut end = total_pages;
    let mut retries_left = gap_retries;
    let mut fetches = 0u32;

    while start <= end {
        if fetches >= ceiling {
            tracing::warn!(
                "Giving up on question {} after {} fetches (interval {}..={})",
                target,
                fetches,
                start,
                end
            );
            return Ok(LocateOutcome::Exhausted { fetches });
        }

        let mid = start + (end - start).div_ceil(2);
        let url = session.urls().listing(category, mid)?;
        if fetches > 0 {
            politeness.pause_after_skip().await;
        }
        let page = session.get_page(&url).await?;
        fetches += 1;

        let numbers: Vec<(usize, i64)> = parse_listing(&page.body, session.urls(), &page.url)
            .into_iter()
            .enumerate()
            .filter_map(|(index, row)| row.ok().map(|row| (index, row.number)))
            .collect();

        if let Some(&(position, _)) = numbers.iter().find(|(_, number)| *number == target) {
            tracing::info!("Question {} is on page {} at row {}", target, mid, position);
            return Ok(LocateOutcome::Found {
                location: Location {
                    page: mid,
                    url: page.url,
                    position,
                },
                fetches,
            });
        }

        let (Some(newest), Some(oldest)) = (
            numbers.iter().map(|(_, n)| *n).max(),
            numbers.iter().map(|(_, n)| *n).min(),
        ) else {
            // The listing is shorter than the index claims
            tracing::debug!("Page {} is empty, searching below it", mid);
            end = mid - 1;
            continue;
        };

        tracing::debug!(
            "Page {} holds questions {}..={} (looking for {})",
            mid,
            oldest,
            newest,
            target
        );

        if target > newest {
            end = mid - 1;
        } else if target < oldest {
            start = mid + 1;
        } else if retries_left > 0 {
            retries_left -= 1;
            tracing::debug!("Question {} falls in a gap on page {}, retrying", target, mid);
        } else {
            tracing::info!("Question {} falls in a numbering gap on page {}", target, mid);
            return Ok(LocateOutcome::Absent { fetches });
        }
    }

    tracing::info!("Question {} is not listed in '{}'", target, category);
    Ok(LocateOutcome::Absent { fetches })
}
