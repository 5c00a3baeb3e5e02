//! SQLite storage implementation
//!
//! This module provides a SQLite-based implementation of the RecordStore trait.

use crate::storage::schema::initialize_schema;
use crate::storage::traits::{CountedTable, RecordStore, StorageError, StorageResult};
use crate::storage::{
    ExportRow, NewQuestion, QuestionRecord, ReferenceKey, RunRecord, RunStatus, VideoRef,
};
use crate::HarvestError;
use chrono::Utc;
use rusqlite::{params, Connection, OptionalExtension, Row};
use std::path::Path;

/// SQLite storage backend
pub struct SqliteStorage {
    conn: Connection,
}

impl SqliteStorage {
    /// Creates a new SqliteStorage instance
    ///
    /// # Arguments
    ///
    /// * `path` - Path to the SQLite database file
    ///
    /// # Returns
    ///
    /// * `Ok(SqliteStorage)` - Successfully opened/created database
    /// * `Err(HarvestError)` - Failed to open database
    pub fn new(path: &Path) -> Result<Self, HarvestError> {
        let conn = Connection::open(path)?;

        conn.execute_batch(
            "
            PRAGMA journal_mode = WAL;
            PRAGMA synchronous = NORMAL;
            PRAGMA foreign_keys = ON;
            PRAGMA temp_store = MEMORY;
        ",
        )?;

        initialize_schema(&conn)?;

        Ok(Self { conn })
    }

    /// Creates an in-memory database
    pub fn open_in_memory() -> Result<Self, HarvestError> {
        let conn = Connection::open_in_memory()?;
        conn.execute_batch("PRAGMA foreign_keys = ON;")?;
        initialize_schema(&conn)?;
        Ok(Self { conn })
    }
}

fn run_from_row(row: &Row<'_>) -> rusqlite::Result<RunRecord> {
    Ok(RunRecord {
        id: row.get(0)?,
        started_at: row.get(1)?,
        finished_at: row.get(2)?,
        config_hash: row.get(3)?,
        category: row.get(4)?,
        status: RunStatus::from_db_string(&row.get::<_, String>(5)?)
            .unwrap_or(RunStatus::Failed),
        questions_stored: row.get::<_, i64>(6)? as u64,
    })
}

const RUN_COLUMNS: &str =
    "id, started_at, finished_at, config_hash, category, status, questions_stored";

impl RecordStore for SqliteStorage {
    // ===== Run Management =====

    fn create_run(&mut self, config_hash: &str, category: &str) -> StorageResult<i64> {
        let now = Utc::now().to_rfc3339();
        self.conn.execute(
            "INSERT INTO runs (started_at, config_hash, category, status) VALUES (?1, ?2, ?3, ?4)",
            params![now, config_hash, category, RunStatus::Running.to_db_string()],
        )?;
        Ok(self.conn.last_insert_rowid())
    }

    fn finish_run(
        &mut self,
        run_id: i64,
        status: RunStatus,
        questions_stored: u64,
    ) -> StorageResult<()> {
        let now = Utc::now().to_rfc3339();
        let updated = self.conn.execute(
            "UPDATE runs SET status = ?1, finished_at = ?2, questions_stored = ?3 WHERE id = ?4",
            params![status.to_db_string(), now, questions_stored as i64, run_id],
        )?;
        if updated == 0 {
            return Err(StorageError::RunNotFound(run_id));
        }
        Ok(())
    }

    fn get_run(&self, run_id: i64) -> StorageResult<RunRecord> {
        self.conn
            .query_row(
                &format!("SELECT {} FROM runs WHERE id = ?1", RUN_COLUMNS),
                params![run_id],
                run_from_row,
            )
            .optional()?
            .ok_or(StorageError::RunNotFound(run_id))
    }

    fn get_latest_run(&self) -> StorageResult<Option<RunRecord>> {
        let run = self
            .conn
            .query_row(
                &format!("SELECT {} FROM runs ORDER BY id DESC LIMIT 1", RUN_COLUMNS),
                [],
                run_from_row,
            )
            .optional()?;
        Ok(run)
    }

    // ===== Row Transactions =====

    fn begin_row(&mut self) -> StorageResult<()> {
        self.conn.execute_batch("BEGIN IMMEDIATE;")?;
        Ok(())
    }

    fn commit_row(&mut self) -> StorageResult<()> {
        self.conn.execute_batch("COMMIT;")?;
        Ok(())
    }

    fn rollback_row(&mut self) -> StorageResult<()> {
        if !self.conn.is_autocommit() {
            self.conn.execute_batch("ROLLBACK;")?;
        }
        Ok(())
    }

    // ===== Reference Rows =====

    fn find_reference(&self, key: &ReferenceKey<'_>) -> StorageResult<Option<i64>> {
        let sql = match key {
            ReferenceKey::Category(_) => {
                "SELECT category_id FROM category WHERE category_name = ?1"
            }
            ReferenceKey::Quiz(_) => "SELECT quiz_id FROM quiz WHERE quiz_url = ?1",
            ReferenceKey::Tag(_) => "SELECT tag_id FROM tag WHERE tag_name = ?1",
        };

        let id = self
            .conn
            .query_row(sql, params![key.natural_key()], |row| row.get(0))
            .optional()?;
        Ok(id)
    }

    fn insert_reference(&mut self, key: &ReferenceKey<'_>) -> StorageResult<i64> {
        match key {
            ReferenceKey::Category(name) => {
                self.conn.execute(
                    "INSERT INTO category (category_name) VALUES (?1)",
                    params![name],
                )?;
            }
            ReferenceKey::Quiz(quiz) => {
                self.conn.execute(
                    "INSERT INTO quiz (quiz_name, quiz_year, quiz_url, quiz_organiser)
                     VALUES (?1, ?2, ?3, ?4)",
                    params![quiz.name, quiz.year, quiz.url, quiz.organiser],
                )?;
            }
            ReferenceKey::Tag(name) => {
                self.conn
                    .execute("INSERT INTO tag (tag_name) VALUES (?1)", params![name])?;
            }
        }
        Ok(self.conn.last_insert_rowid())
    }

    // ===== Questions =====

    fn question_exists(&self, number: i64) -> StorageResult<bool> {
        let exists: bool = self.conn.query_row(
            "SELECT EXISTS(SELECT 1 FROM question WHERE question_number = ?1)",
            params![number],
            |row| row.get(0),
        )?;
        Ok(exists)
    }

    fn get_question(&self, number: i64) -> StorageResult<Option<QuestionRecord>> {
        let question = self
            .conn
            .query_row(
                "SELECT question_id, question_number, question_text, answer_text,
                        category_id, quiz_id, quiz_round, scraped_at
                 FROM question WHERE question_number = ?1",
                params![number],
                |row| {
                    Ok(QuestionRecord {
                        id: row.get(0)?,
                        number: row.get(1)?,
                        text: row.get(2)?,
                        answer: row.get(3)?,
                        category_id: row.get(4)?,
                        quiz_id: row.get(5)?,
                        quiz_round: row.get(6)?,
                        scraped_at: row.get(7)?,
                    })
                },
            )
            .optional()?;
        Ok(question)
    }

    fn insert_question(&mut self, question: &NewQuestion<'_>) -> StorageResult<i64> {
        if self.question_exists(question.number)? {
            return Err(StorageError::DuplicateQuestion(question.number));
        }

        let now = Utc::now().to_rfc3339();
        self.conn.execute(
            "INSERT INTO question (question_number, question_text, answer_text, quiz_round,
                                   scraped_at, category_id, quiz_id)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
            params![
                question.number,
                question.text,
                question.answer,
                question.quiz_round,
                now,
                question.category_id,
                question.quiz_id
            ],
        )?;
        Ok(self.conn.last_insert_rowid())
    }

    fn insert_image(&mut self, filename: &str, question_id: i64) -> StorageResult<i64> {
        self.conn.execute(
            "INSERT INTO image (img_filename, question_id) VALUES (?1, ?2)",
            params![filename, question_id],
        )?;
        Ok(self.conn.last_insert_rowid())
    }

    fn insert_video(&mut self, video: &VideoRef, question_id: i64) -> StorageResult<i64> {
        self.conn.execute(
            "INSERT INTO video_fragment (external_id, watch_url, question_id) VALUES (?1, ?2, ?3)",
            params![video.external_id, video.watch_url, question_id],
        )?;
        Ok(self.conn.last_insert_rowid())
    }

    fn link_tag(&mut self, question_id: i64, tag_id: i64) -> StorageResult<bool> {
        let inserted = self.conn.execute(
            "INSERT OR IGNORE INTO question_tag (question_id, tag_id) VALUES (?1, ?2)",
            params![question_id, tag_id],
        )?;
        Ok(inserted > 0)
    }

    fn tags_for_question(&self, question_id: i64) -> StorageResult<Vec<String>> {
        let mut stmt = self.conn.prepare(
            "SELECT t.tag_name FROM question_tag qt
             JOIN tag t ON t.tag_id = qt.tag_id
             WHERE qt.question_id = ?1
             ORDER BY t.tag_name",
        )?;

        let tags = stmt
            .query_map(params![question_id], |row| row.get(0))?
            .collect::<Result<Vec<String>, _>>()?;
        Ok(tags)
    }

    // ===== Export =====

    fn export_rows(&self, category_id: i64) -> StorageResult<Vec<ExportRow>> {
        let mut stmt = self.conn.prepare(
            "SELECT q.question_number, q.question_text, q.answer_text,
                    MIN(i.img_filename), MIN(v.watch_url)
             FROM question q
             LEFT JOIN image i ON i.question_id = q.question_id
             LEFT JOIN video_fragment v ON v.question_id = q.question_id
             WHERE q.category_id = ?1
             GROUP BY q.question_id
             ORDER BY q.question_number",
        )?;

        let rows = stmt
            .query_map(params![category_id], |row| {
                Ok(ExportRow {
                    number: row.get(0)?,
                    question_text: row.get(1)?,
                    answer_text: row.get(2)?,
                    image_filename: row.get(3)?,
                    watch_url: row.get(4)?,
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(rows)
    }

    // ===== Statistics =====

    fn count_rows(&self, table: CountedTable) -> StorageResult<u64> {
        let count: i64 = self.conn.query_row(
            &format!("SELECT COUNT(*) FROM {}", table.table_name()),
            [],
            |row| row.get(0),
        )?;
        Ok(count as u64)
    }

    fn count_questions_by_category(&self) -> StorageResult<Vec<(String, u64)>> {
        let mut stmt = self.conn.prepare(
            "SELECT c.category_name, COUNT(q.question_id)
             FROM category c
             LEFT JOIN question q ON q.category_id = c.category_id
             GROUP BY c.category_id
             ORDER BY c.category_name",
        )?;

        let counts = stmt
            .query_map([], |row| {
                Ok((row.get::<_, String>(0)?, row.get::<_, i64>(1)? as u64))
            })?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(counts)
    }
}
