//! Question image downloads
//!
//! Images are stored as `{image_dir}/{category}/{question_number}.{ext}`,
//! keeping the extension the site served them with.

use crate::crawler::fetcher::Session;
use crate::HarvestError;
use std::path::{Path, PathBuf};
use url::Url;

/// Derives the stored filename from the question number and the source URL
///
/// `https://…/q/972d66f98fa6ccb0573b07d549ac3b76_131365.jpg` for question
/// 131365 becomes `131365.jpg`.
pub fn image_filename(number: i64, source: &Url) -> String {
    let extension = source
        .path_segments()
        .and_then(|mut segments| segments.next_back())
        .and_then(|basename| Path::new(basename).extension())
        .and_then(|ext| ext.to_str())
        .filter(|ext| !ext.is_empty() && ext.chars().all(|c| c.is_ascii_alphanumeric()));

    match extension {
        Some(ext) => format!("{}.{}", number, ext.to_ascii_lowercase()),
        None => number.to_string(),
    }
}

/// Downloads a question's image into the category's image folder
///
/// Returns the filename that was written.
pub async fn download_image(
    session: &Session,
    source: &str,
    number: i64,
    category_dir: &Path,
) -> Result<String, HarvestError> {
    let url = Url::parse(source)?;
    let filename = image_filename(number, &url);

    let bytes = session.get_bytes(&url).await?;

    tokio::fs::create_dir_all(category_dir).await?;
    let path: PathBuf = category_dir.join(&filename);
    tokio::fs::write(&path, &bytes).await?;

    tracing::debug!("{} downloaded to {}", filename, path.display());
    Ok(filename)
}
