use crate::site::PageBound;
use serde::Deserialize;

/// Main configuration structure for quiz-harvest
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub site: SiteConfig,
    pub crawler: CrawlerConfig,
    pub output: OutputConfig,
}

/// Remote site and credentials
#[derive(Debug, Clone, Deserialize)]
pub struct SiteConfig {
    /// Root of the quiz site, e.g. `https://www.quizarchief.be/`
    #[serde(rename = "base-url")]
    pub base_url: String,

    /// Account name; leave empty to scrape anonymously
    #[serde(default)]
    pub username: String,

    #[serde(default)]
    pub password: String,

    /// Abort the run when the login POST does not answer 200
    #[serde(rename = "abort-on-login-failure", default)]
    pub abort_on_login_failure: bool,
}

impl SiteConfig {
    pub fn has_credentials(&self) -> bool {
        !self.username.is_empty()
    }
}

/// Crawl range and pacing
#[derive(Debug, Clone, Deserialize)]
pub struct CrawlerConfig {
    /// A single category slug or every category on the site
    pub category: CategorySelection,

    /// First listing page to fetch (1-based)
    #[serde(rename = "from-page", default = "default_from_page")]
    pub from_page: u32,

    /// Exclusive page bound, or `"ALL"` for every page including the last
    #[serde(rename = "to-page", default = "default_to_page")]
    pub to_page: PageBound,

    /// Upper bound of the random pause between rows (seconds)
    #[serde(rename = "sleep-time")]
    pub sleep_time: u64,

    /// Lower bound of the random pause between rows (seconds)
    #[serde(rename = "min-sleep-time", default = "default_min_sleep_time")]
    pub min_sleep_time: u64,

    /// Stop the category crawl at the first question already stored
    #[serde(rename = "only-new", default = "default_only_new")]
    pub only_new: bool,

    #[serde(rename = "questions-per-page", default = "default_questions_per_page")]
    pub questions_per_page: u32,

    /// How often the page locator re-fetches an inconclusive page
    #[serde(rename = "gap-retries", default = "default_gap_retries")]
    pub gap_retries: u32,
}

/// Output locations
#[derive(Debug, Clone, Deserialize)]
pub struct OutputConfig {
    /// Path to the SQLite database file
    #[serde(rename = "database-path")]
    pub database_path: String,

    /// Images land in `{image-dir}/{category}/`
    #[serde(rename = "image-dir", default = "default_image_dir")]
    pub image_dir: String,

    /// Anki files land in `{export-dir}/{category}/`
    #[serde(rename = "export-dir", default = "default_export_dir")]
    pub export_dir: String,

    /// Debug-level log file
    #[serde(rename = "log-file", default = "default_log_file")]
    pub log_file: String,
}

/// Which categories a crawl covers
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(from = "String")]
pub enum CategorySelection {
    All,
    Single(String),
}

impl From<String> for CategorySelection {
    fn from(value: String) -> Self {
        if value == "ALL" {
            Self::All
        } else {
            Self::Single(value)
        }
    }
}

impl std::fmt::Display for CategorySelection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::All => write!(f, "ALL"),
            Self::Single(slug) => write!(f, "{}", slug),
        }
    }
}

fn default_from_page() -> u32 {
    1
}

fn default_to_page() -> PageBound {
    PageBound::All
}

fn default_min_sleep_time() -> u64 {
    1
}

fn default_only_new() -> bool {
    true
}

fn default_questions_per_page() -> u32 {
    20
}

fn default_gap_retries() -> u32 {
    1
}

fn default_image_dir() -> String {
    "images".to_string()
}

fn default_export_dir() -> String {
    "anki-export".to_string()
}

fn default_log_file() -> String {
    "quiz-harvest.log".to_string()
}
