use crate::config::types::{CategorySelection, Config, CrawlerConfig, OutputConfig, SiteConfig};
use crate::site::{PageBound, ALLOWED_PAGE_SIZES};
use crate::ConfigError;
use url::Url;

/// Validates the entire configuration
pub fn validate(config: &Config) -> Result<(), ConfigError> {
    validate_site_config(&config.site)?;
    validate_crawler_config(&config.crawler)?;
    validate_output_config(&config.output)?;
    Ok(())
}

/// Validates the remote site section
fn validate_site_config(config: &SiteConfig) -> Result<(), ConfigError> {
    let url = Url::parse(&config.base_url)
        .map_err(|e| ConfigError::InvalidUrl(format!("Invalid base-url: {}", e)))?;

    if url.scheme() != "https" && url.scheme() != "http" {
        return Err(ConfigError::InvalidUrl(format!(
            "base-url '{}' must use http or https",
            config.base_url
        )));
    }

    if config.has_credentials() && config.password.is_empty() {
        return Err(ConfigError::Validation(format!(
            "username '{}' is set but password is empty",
            config.username
        )));
    }

    Ok(())
}

/// Validates crawler configuration
fn validate_crawler_config(config: &CrawlerConfig) -> Result<(), ConfigError> {
    if let CategorySelection::Single(slug) = &config.category {
        validate_category_slug(slug)?;
    }

    if config.from_page < 1 {
        return Err(ConfigError::Validation(format!(
            "from-page must be >= 1, got {}",
            config.from_page
        )));
    }

    if let PageBound::Page(page) = config.to_page {
        if page < 1 {
            return Err(ConfigError::Validation(format!(
                "to-page must be >= 1 or \"ALL\", got {}",
                page
            )));
        }
    }

    if config.min_sleep_time > config.sleep_time {
        return Err(ConfigError::Validation(format!(
            "min-sleep-time ({}) cannot exceed sleep-time ({})",
            config.min_sleep_time, config.sleep_time
        )));
    }

    if !ALLOWED_PAGE_SIZES.contains(&config.questions_per_page) {
        return Err(ConfigError::Validation(format!(
            "questions-per-page must be one of {:?}, got {}",
            ALLOWED_PAGE_SIZES, config.questions_per_page
        )));
    }

    Ok(())
}

/// Validates output configuration
fn validate_output_config(config: &OutputConfig) -> Result<(), ConfigError> {
    for (name, value) in [
        ("database-path", &config.database_path),
        ("image-dir", &config.image_dir),
        ("export-dir", &config.export_dir),
        ("log-file", &config.log_file),
    ] {
        if value.is_empty() {
            return Err(ConfigError::Validation(format!("{} cannot be empty", name)));
        }
    }

    Ok(())
}

/// Category slugs as they appear in listing URLs, e.g. `kunst-cultuur`
pub(crate) fn validate_category_slug(slug: &str) -> Result<(), ConfigError> {
    if slug.is_empty() {
        return Err(ConfigError::Validation(
            "category cannot be empty".to_string(),
        ));
    }

    if !slug
        .chars()
        .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-')
    {
        return Err(ConfigError::Validation(format!(
            "category '{}' must contain only lowercase letters, digits and hyphens",
            slug
        )));
    }

    if slug.starts_with('-') || slug.ends_with('-') {
        return Err(ConfigError::Validation(format!(
            "category '{}' cannot start or end with '-'",
            slug
        )));
    }

    Ok(())
}
