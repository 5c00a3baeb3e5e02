//! Database schema definitions
//!
//! This module contains all SQL schema definitions for the quiz-harvest database.

/// SQL schema for the database
pub const SCHEMA_SQL: &str = r#"
-- Track crawl runs, one per category crawled
CREATE TABLE IF NOT EXISTS runs (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    started_at TEXT NOT NULL,
    finished_at TEXT,
    config_hash TEXT NOT NULL,
    category TEXT NOT NULL,
    status TEXT NOT NULL,
    questions_stored INTEGER NOT NULL DEFAULT 0
);

CREATE TABLE IF NOT EXISTS category (
    category_id INTEGER PRIMARY KEY AUTOINCREMENT,
    category_name TEXT NOT NULL UNIQUE
);

-- A quiz may be referenced by many questions; its URL identifies it
CREATE TABLE IF NOT EXISTS quiz (
    quiz_id INTEGER PRIMARY KEY AUTOINCREMENT,
    quiz_name TEXT NOT NULL,
    quiz_year INTEGER,
    quiz_url TEXT NOT NULL UNIQUE,
    quiz_organiser TEXT
);

-- question_number is the site's identifier and the dedup key
CREATE TABLE IF NOT EXISTS question (
    question_id INTEGER PRIMARY KEY AUTOINCREMENT,
    question_number INTEGER NOT NULL UNIQUE,
    question_text TEXT NOT NULL,
    answer_text TEXT NOT NULL,
    quiz_round TEXT,
    scraped_at TEXT NOT NULL,
    category_id INTEGER NOT NULL REFERENCES category(category_id),
    quiz_id INTEGER REFERENCES quiz(quiz_id)
);

CREATE INDEX IF NOT EXISTS idx_question_category ON question(category_id);

CREATE TABLE IF NOT EXISTS tag (
    tag_id INTEGER PRIMARY KEY AUTOINCREMENT,
    tag_name TEXT NOT NULL UNIQUE
);

CREATE TABLE IF NOT EXISTS question_tag (
    question_id INTEGER NOT NULL REFERENCES question(question_id),
    tag_id INTEGER NOT NULL REFERENCES tag(tag_id),
    PRIMARY KEY (question_id, tag_id)
);

CREATE TABLE IF NOT EXISTS image (
    img_id INTEGER PRIMARY KEY AUTOINCREMENT,
    img_filename TEXT NOT NULL,
    question_id INTEGER NOT NULL REFERENCES question(question_id)
);

CREATE INDEX IF NOT EXISTS idx_image_question ON image(question_id);

CREATE TABLE IF NOT EXISTS video_fragment (
    video_id INTEGER PRIMARY KEY AUTOINCREMENT,
    external_id TEXT NOT NULL,
    watch_url TEXT NOT NULL,
    question_id INTEGER REFERENCES question(question_id)
);

CREATE INDEX IF NOT EXISTS idx_video_question ON video_fragment(question_id);
"#;

/// Initializes the database schema
pub fn initialize_schema(conn: &rusqlite::Connection) -> Result<(), rusqlite::Error> {
    conn.execute_batch(SCHEMA_SQL)?;
    Ok(())
}
