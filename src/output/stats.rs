//! Statistics generation from the question database
//!
//! This module provides functionality for extracting and displaying
//! harvest statistics from the record store.

use crate::storage::{CountedTable, RecordStore, RunRecord};
use crate::HarvestError;

/// Harvest statistics summary
#[derive(Debug, Clone)]
pub struct HarvestStatistics {
    /// Total number of stored questions
    pub total_questions: u64,

    /// Question count per category, sorted by category name
    pub questions_by_category: Vec<(String, u64)>,

    pub tags: u64,
    pub quizzes: u64,
    pub images: u64,
    pub video_fragments: u64,
    pub runs: u64,

    /// Most recent run, if any
    pub latest_run: Option<RunRecord>,
}

/// Loads statistics from storage
pub fn load_statistics<S>(store: &S) -> Result<HarvestStatistics, HarvestError>
where
    S: RecordStore + ?Sized,
{
    Ok(HarvestStatistics {
        total_questions: store.count_rows(CountedTable::Question)?,
        questions_by_category: store.count_questions_by_category()?,
        tags: store.count_rows(CountedTable::Tag)?,
        quizzes: store.count_rows(CountedTable::Quiz)?,
        images: store.count_rows(CountedTable::Image)?,
        video_fragments: store.count_rows(CountedTable::VideoFragment)?,
        runs: store.count_rows(CountedTable::Run)?,
        latest_run: store.get_latest_run()?,
    })
}

/// Prints statistics to stdout in a formatted manner
pub fn print_statistics(stats: &HarvestStatistics) {
    println!("=== Harvest Statistics ===\n");

    println!("Overview:");
    println!("  Questions: {}", stats.total_questions);
    println!("  Tags: {}", stats.tags);
    println!("  Quizzes: {}", stats.quizzes);
    println!("  Images: {}", stats.images);
    println!("  Video fragments: {}", stats.video_fragments);
    println!("  Runs: {}", stats.runs);
    println!();

    if !stats.questions_by_category.is_empty() {
        println!("Questions by Category:");
        for (category, count) in &stats.questions_by_category {
            let percentage = if stats.total_questions > 0 {
                (*count as f64 / stats.total_questions as f64) * 100.0
            } else {
                0.0
            };
            println!("  {}: {} ({:.1}%)", category, count, percentage);
        }
        println!();
    }

    if let Some(run) = &stats.latest_run {
        println!("Latest Run:");
        println!("  #{} '{}' started {}", run.id, run.category, run.started_at);
        println!(
            "  Status: {} ({} questions stored)",
            run.status.to_db_string(),
            run.questions_stored
        );
        if let Some(finished) = &run.finished_at {
            println!("  Finished: {}", finished);
        }
    }
}
