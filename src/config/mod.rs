//! Configuration module for quiz-harvest
//!
//! This module handles loading, parsing, and validating TOML configuration files.
//!
//! # Example
//!
//! ```no_run
//! use quiz_harvest::config::load_config;
//! use std::path::Path;
//!
//! let config = load_config(Path::new("harvest.toml")).unwrap();
//! println!("Pausing up to {}s between questions", config.crawler.sleep_time);
//! ```

mod parser;
mod types;
mod validation;

pub use types::{CategorySelection, Config, CrawlerConfig, OutputConfig, SiteConfig};

pub use parser::{compute_config_hash, load_config, load_config_with_hash, parse_config};

use crate::ConfigError;

/// Replaces the configured category selection, e.g. from the command line
///
/// `"ALL"` selects every category; anything else must be a valid slug.
pub fn override_category(config: &mut Config, category: &str) -> Result<(), ConfigError> {
    let selection = CategorySelection::from(category.to_string());
    if let CategorySelection::Single(slug) = &selection {
        validation::validate_category_slug(slug)?;
    }
    config.crawler.category = selection;
    Ok(())
}
