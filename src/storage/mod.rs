//! Storage module for harvested questions
//!
//! This module handles all database operations for the harvester, including:
//! - SQLite database initialization and schema management
//! - Get-or-create of categories, quizzes and tags
//! - Question, image and video fragment inserts keyed by question number
//! - Run tracking

mod schema;
mod sqlite;
mod traits;

pub use sqlite::SqliteStorage;
pub use traits::{CountedTable, RecordStore, StorageError, StorageResult};

use crate::HarvestError;

use std::path::Path;

/// Initializes or opens a storage database
pub fn open_storage(path: &Path) -> Result<SqliteStorage, HarvestError> {
    SqliteStorage::new(path)
}

/// Natural key of a lazily created reference row
#[derive(Debug, Clone, Copy)]
pub enum ReferenceKey<'a> {
    /// Keyed by category slug
    Category(&'a str),
    /// Keyed by the quiz's source URL
    Quiz(&'a QuizInfo),
    /// Keyed by tag name
    Tag(&'a str),
}

impl ReferenceKey<'_> {
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Category(_) => "category",
            Self::Quiz(_) => "quiz",
            Self::Tag(_) => "tag",
        }
    }

    pub fn natural_key(&self) -> &str {
        match self {
            Self::Category(name) | Self::Tag(name) => name,
            Self::Quiz(quiz) => &quiz.url,
        }
    }
}

/// Looks up a reference row by its natural key and inserts it only when absent
///
/// Returns the row id either way. Used for categories, quizzes and tags alike.
pub fn resolve_or_create<S>(store: &mut S, key: &ReferenceKey<'_>) -> StorageResult<i64>
where
    S: RecordStore + ?Sized,
{
    if let Some(id) = store.find_reference(key)? {
        tracing::trace!("{} '{}' already stored as {}", key.kind(), key.natural_key(), id);
        return Ok(id);
    }

    let id = store.insert_reference(key)?;
    tracing::debug!("Created {} '{}' with id {}", key.kind(), key.natural_key(), id);
    Ok(id)
}

/// Provenance of a question as printed under its row
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuizInfo {
    pub name: String,
    pub year: Option<i32>,
    /// Absolute URL of the quiz page; the quiz's natural key
    pub url: String,
    pub organiser: Option<String>,
    /// e.g. "ronde 1, vraag 11"
    pub round: Option<String>,
}

/// An embedded video, usually a YouTube fragment
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VideoRef {
    pub external_id: String,
    pub watch_url: String,
}

/// Fields of a question row about to be inserted
#[derive(Debug, Clone)]
pub struct NewQuestion<'a> {
    pub number: i64,
    pub text: &'a str,
    pub answer: &'a str,
    pub category_id: i64,
    pub quiz_id: Option<i64>,
    pub quiz_round: Option<&'a str>,
}

/// Represents a stored question
#[derive(Debug, Clone, PartialEq)]
pub struct QuestionRecord {
    pub id: i64,
    pub number: i64,
    pub text: String,
    pub answer: String,
    pub category_id: i64,
    pub quiz_id: Option<i64>,
    pub quiz_round: Option<String>,
    pub scraped_at: String,
}

/// One question joined with its image and video, as read by the exporter
#[derive(Debug, Clone, PartialEq)]
pub struct ExportRow {
    pub number: i64,
    pub question_text: String,
    pub answer_text: String,
    pub image_filename: Option<String>,
    pub watch_url: Option<String>,
}

/// Represents a crawl run
#[derive(Debug, Clone)]
pub struct RunRecord {
    pub id: i64,
    pub started_at: String,
    pub finished_at: Option<String>,
    pub config_hash: String,
    pub category: String,
    pub status: RunStatus,
    pub questions_stored: u64,
}

/// Status of a crawl run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunStatus {
    Running,
    Completed,
    /// Ended at the first already-stored question
    Stopped,
    Failed,
}

impl RunStatus {
    pub fn to_db_string(&self) -> &'static str {
        match self {
            Self::Running => "running",
            Self::Completed => "completed",
            Self::Stopped => "stopped",
            Self::Failed => "failed",
        }
    }

    pub fn from_db_string(s: &str) -> Option<Self> {
        match s {
            "running" => Some(Self::Running),
            "completed" => Some(Self::Completed),
            "stopped" => Some(Self::Stopped),
            "failed" => Some(Self::Failed),
            _ => None,
        }
    }
}
