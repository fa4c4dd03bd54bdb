//! Explicit pipeline configuration.
//!
//! The export directory and the run date are values passed into the
//! pipeline, never ambient process state; tests inject a fixed run date.

use std::path::PathBuf;

use chrono::{Local, NaiveDate};

#[derive(Clone, Debug)]
pub struct PipelineConfig {
    /// Directory holding per-source exports and combined artifacts.
    pub export_dir: PathBuf,
    /// The calendar date of this run, applied consistently to every record.
    pub run_date: NaiveDate,
}

impl PipelineConfig {
    pub fn new(export_dir: PathBuf, run_date: Option<NaiveDate>) -> Self {
        Self {
            export_dir,
            run_date: run_date.unwrap_or_else(|| Local::now().date_naive()),
        }
    }
}
