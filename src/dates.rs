//! Strict per-source deadline parsing.
//!
//! Each source documents exactly one format; anything else becomes missing.
//! Deliberately no fuzzy multi-format guessing: silently swapping day and
//! month in a deadline is worse than marking it missing.

use chrono::{NaiveDate, NaiveDateTime};

use crate::record::SENTINEL;
use crate::sources::Source;

/// Every deadline is re-rendered in this format for output.
pub const OUTPUT_DATE_FORMAT: &str = "%d-%m-%Y";

/// Parse a raw deadline value with the source's documented format.
/// Empty values, the sentinel, and format mismatches all become `None`.
pub fn parse_deadline(source: Source, raw: &str) -> Option<NaiveDate> {
    let raw = raw.trim();
    if raw.is_empty() || raw == SENTINEL {
        return None;
    }
    if source.has_time_component() {
        NaiveDateTime::parse_from_str(raw, source.date_format())
            .ok()
            .map(|dt| dt.date())
    } else {
        NaiveDate::parse_from_str(raw, source.date_format()).ok()
    }
}

/// Render a parsed deadline as `DD-MM-YYYY`, or the sentinel when missing.
pub fn render_deadline(date: Option<NaiveDate>) -> String {
    match date {
        Some(d) => d.format(OUTPUT_DATE_FORMAT).to_string(),
        None => SENTINEL.to_string(),
    }
}
