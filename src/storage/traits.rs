//! Storage traits and error types
//!
//! This module defines the trait interface for storage backends and
//! associated error types.

use crate::storage::{
    ExportRow, NewQuestion, QuestionRecord, ReferenceKey, RunRecord, RunStatus, VideoRef,
};
use thiserror::Error;

/// Errors that can occur during storage operations
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Run not found: {0}")]
    RunNotFound(i64),

    #[error("Question {0} is already stored")]
    DuplicateQuestion(i64),

    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),
}

/// Result type for storage operations
pub type StorageResult<T> = Result<T, StorageError>;

/// Tables whose row counts are reported
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CountedTable {
    Category,
    Quiz,
    Question,
    Tag,
    QuestionTag,
    Image,
    VideoFragment,
    Run,
}

impl CountedTable {
    pub fn table_name(&self) -> &'static str {
        match self {
            Self::Category => "category",
            Self::Quiz => "quiz",
            Self::Question => "question",
            Self::Tag => "tag",
            Self::QuestionTag => "question_tag",
            Self::Image => "image",
            Self::VideoFragment => "video_fragment",
            Self::Run => "runs",
        }
    }
}

/// Trait for the record store behind the harvester
///
/// All operations are synchronous. Inserts return the generated row id.
pub trait RecordStore {
    // ===== Run Management =====

    /// Creates a new crawl run for one category
    fn create_run(&mut self, config_hash: &str, category: &str) -> StorageResult<i64>;

    /// Marks a run finished with its final status and stored-question count
    fn finish_run(
        &mut self,
        run_id: i64,
        status: RunStatus,
        questions_stored: u64,
    ) -> StorageResult<()>;

    /// Gets a run by ID
    fn get_run(&self, run_id: i64) -> StorageResult<RunRecord>;

    /// Gets the most recent run
    fn get_latest_run(&self) -> StorageResult<Option<RunRecord>>;

    // ===== Row Transactions =====

    /// Opens the transaction that covers one harvested row
    fn begin_row(&mut self) -> StorageResult<()>;

    /// Commits the current row
    fn commit_row(&mut self) -> StorageResult<()>;

    /// Discards everything written since `begin_row`
    fn rollback_row(&mut self) -> StorageResult<()>;

    // ===== Reference Rows =====

    /// Looks up a category, quiz or tag by its natural key
    fn find_reference(&self, key: &ReferenceKey<'_>) -> StorageResult<Option<i64>>;

    /// Inserts a category, quiz or tag without checking for an existing row
    ///
    /// Callers go through [`crate::storage::resolve_or_create`].
    fn insert_reference(&mut self, key: &ReferenceKey<'_>) -> StorageResult<i64>;

    // ===== Questions =====

    /// Checks whether a question number has been stored before
    fn question_exists(&self, number: i64) -> StorageResult<bool>;

    /// Gets a question by its site number
    fn get_question(&self, number: i64) -> StorageResult<Option<QuestionRecord>>;

    /// Inserts a question; fails with `DuplicateQuestion` if the number exists
    fn insert_question(&mut self, question: &NewQuestion<'_>) -> StorageResult<i64>;

    /// Records the downloaded image file of a question
    fn insert_image(&mut self, filename: &str, question_id: i64) -> StorageResult<i64>;

    /// Records the video fragment embedded in a question
    fn insert_video(&mut self, video: &VideoRef, question_id: i64) -> StorageResult<i64>;

    /// Links a tag to a question
    ///
    /// Returns false when the pair was already linked.
    fn link_tag(&mut self, question_id: i64, tag_id: i64) -> StorageResult<bool>;

    /// Tag names of a question, sorted
    fn tags_for_question(&self, question_id: i64) -> StorageResult<Vec<String>>;

    // ===== Export =====

    /// Questions of a category joined with image and video, by question number
    fn export_rows(&self, category_id: i64) -> StorageResult<Vec<ExportRow>>;

    // ===== Statistics =====

    /// Counts the rows of a table
    fn count_rows(&self, table: CountedTable) -> StorageResult<u64>;

    /// Question count per category name, sorted by name
    fn count_questions_by_category(&self) -> StorageResult<Vec<(String, u64)>>;
}
