//! Output module for exports and statistics
//!
//! This module handles:
//! - Exporting stored categories as Anki import files
//! - Reporting record store statistics

pub mod anki;
pub mod stats;

pub use anki::{export_category, export_path, ExportSummary};
pub use stats::{load_statistics, print_statistics, HarvestStatistics};
