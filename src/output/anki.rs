//! Anki flat-file export of one stored category
//!
//! Each card is one `|`-delimited line with two `'`-quoted HTML fields:
//! the question (with image and video link) and the answer.

use crate::storage::{ExportRow, RecordStore, ReferenceKey};
use crate::HarvestError;
use chrono::NaiveDate;
use csv::{QuoteStyle, WriterBuilder};
use std::fs::OpenOptions;
use std::path::{Path, PathBuf};

const VIDEO_NOTICE: &str =
    "This question contains a youtube fragment, which you can watch by clicking on this link.";

/// Outcome of an export
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportSummary {
    pub path: PathBuf,
    pub rows_written: usize,
}

/// `{export_dir}/{category}/({date}) {category}.csv`
pub fn export_path(export_dir: &Path, category: &str, date: NaiveDate) -> PathBuf {
    export_dir
        .join(category)
        .join(format!("({}) {}.csv", date.format("%Y-%m-%d"), category))
}

/// Card front: question paragraph, image, video link
pub fn question_field(row: &ExportRow, image_dir: &str, category: &str) -> String {
    let mut field = format!("<p>{}</p>", row.question_text);

    if let Some(filename) = &row.image_filename {
        field.push_str(&format!(
            "<img src=\"{}/{}/{}\" />",
            image_dir.trim_end_matches('/'),
            category,
            filename
        ));
    }

    if let Some(watch_url) = &row.watch_url {
        field.push_str(&format!(
            "<p style=\"font-size: small; color: #3e3e40;\"><a href=\"{}\">{}</a></p>",
            watch_url, VIDEO_NOTICE
        ));
    }

    field
}

/// Card back: the answer with line breaks as `<br>`
pub fn answer_field(row: &ExportRow) -> String {
    row.answer_text.replace('\n', "<br>")
}

/// Appends every stored question of `category` to the day's export file
pub fn export_category<S>(
    store: &S,
    category: &str,
    image_dir: &str,
    export_dir: &Path,
    date: NaiveDate,
) -> Result<ExportSummary, HarvestError>
where
    S: RecordStore + ?Sized,
{
    let category_id = store
        .find_reference(&ReferenceKey::Category(category))?
        .ok_or_else(|| HarvestError::UnknownCategory(category.to_string()))?;

    let rows = store.export_rows(category_id)?;
    let path = export_path(export_dir, category, date);
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    let file = OpenOptions::new().create(true).append(true).open(&path)?;
    let mut writer = WriterBuilder::new()
        .has_headers(false)
        .delimiter(b'|')
        .quote(b'\'')
        .quote_style(QuoteStyle::Always)
        .from_writer(file);

    for row in &rows {
        writer.write_record([question_field(row, image_dir, category), answer_field(row)])?;
    }
    writer.flush()?;

    tracing::info!(
        "Exported {} questions of '{}' to {}",
        rows.len(),
        category,
        path.display()
    );

    Ok(ExportSummary {
        path,
        rows_written: rows.len(),
    })
}
