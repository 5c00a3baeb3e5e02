//! Randomized pauses between requests
//!
//! The site is a hobby project; every row costs it up to three requests. A
//! random pause between rows keeps the load low and the traffic irregular.

use rand::Rng;
use std::time::Duration;

/// Upper bound of the short pause after a skipped row
const MAX_SKIP_PAUSE: Duration = Duration::from_secs(2);

/// Pause bounds for one run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Politeness {
    min: Duration,
    max: Duration,
}

impl Politeness {
    /// `min` larger than `max` is swapped
    pub fn new(min: Duration, max: Duration) -> Self {
        if min > max {
            Self { min: max, max: min }
        } else {
            Self { min, max }
        }
    }

    pub fn from_secs(min_secs: u64, max_secs: u64) -> Self {
        Self::new(Duration::from_secs(min_secs), Duration::from_secs(max_secs))
    }

    /// No pauses at all
    pub fn none() -> Self {
        Self::new(Duration::ZERO, Duration::ZERO)
    }

    /// Picks the pause after a fully processed row
    pub fn row_delay(&self) -> Duration {
        random_between(self.min, self.max)
    }

    /// Picks the shorter pause after a skipped row
    pub fn skip_delay(&self) -> Duration {
        random_between(Duration::ZERO, self.min.min(MAX_SKIP_PAUSE))
    }

    pub async fn pause_after_row(&self) {
        let delay = self.row_delay();
        tracing::info!("Sleeping for {:.1} seconds", delay.as_secs_f64());
        tokio::time::sleep(delay).await;
    }

    pub async fn pause_after_skip(&self) {
        let delay = self.skip_delay();
        tracing::trace!("Skip pause of {}ms", delay.as_millis());
        tokio::time::sleep(delay).await;
    }
}

fn random_between(min: Duration, max: Duration) -> Duration {
    if max <= min {
        return min;
    }
    let millis = rand::thread_rng().gen_range(min.as_millis() as u64..=max.as_millis() as u64);
    Duration::from_millis(millis)
}
