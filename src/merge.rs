//! Record Merger and Deadline Calculator.
//!
//! Sources are processed sequentially in fixed order; a failure in one
//! source is isolated, logged, and its contribution omitted. Only total
//! absence of usable data or an artifact write failure aborts the run.

use std::path::PathBuf;

use chrono::NaiveDate;
use tracing::{error, info, warn};

use crate::artifact;
use crate::config::PipelineConfig;
use crate::dates;
use crate::error::{PipelineError, Result};
use crate::normalize::{self, RawTable};
use crate::record::{CanonicalRecord, MergedRow, SENTINEL};
use crate::sources::{Source, ALL_SOURCES};

/// Outcome of one merge, before artifact writing.
pub struct MergedDataset {
    pub rows: Vec<MergedRow>,
    /// Sources whose latest export was present and parseable this run.
    pub sources_used: Vec<Source>,
}

/// Run the full pipeline: select exports, normalize, parse deadlines,
/// concatenate, compute days remaining, write the dated artifact.
///
/// Returns the artifact path and the merged row count.
pub fn combine(config: &PipelineConfig) -> Result<(PathBuf, usize)> {
    let dataset = run_merge(config)?;
    let path = artifact::write_artifact(&config.export_dir, config.run_date, &dataset.rows)?;
    info!(
        "Combined data saved to {} ({} rows from {} source(s))",
        path.display(),
        dataset.rows.len(),
        dataset.sources_used.len()
    );
    Ok((path, dataset.rows.len()))
}

/// Merge whatever subset of sources is available into one ordered dataset.
///
/// Fails with [`PipelineError::NoSourcesAvailable`] when no source
/// contributed; a present-but-empty export still counts as a contribution.
pub fn run_merge(config: &PipelineConfig) -> Result<MergedDataset> {
    let mut records: Vec<CanonicalRecord> = Vec::new();
    let mut sources_used: Vec<Source> = Vec::new();

    for source in ALL_SOURCES {
        match load_source(config, source) {
            Ok(mut source_records) => {
                info!(
                    "{}: {} record(s) normalized",
                    source,
                    source_records.len()
                );
                sources_used.push(source);
                records.append(&mut source_records);
            }
            Err(PipelineError::SourceUnavailable(_)) => {
                warn!("{}: no export file found, skipping", source);
            }
            Err(e) => {
                error!("Failed to process {} data: {}", source, e);
            }
        }
    }

    if sources_used.is_empty() {
        return Err(PipelineError::NoSourcesAvailable);
    }

    Ok(MergedDataset {
        rows: compute_days(records, config.run_date),
        sources_used,
    })
}

/// Load, normalize, and date-parse one source's latest export.
fn load_source(config: &PipelineConfig, source: Source) -> Result<Vec<CanonicalRecord>> {
    let path = source
        .latest_export(&config.export_dir)
        .ok_or_else(|| PipelineError::SourceUnavailable(source.name().to_string()))?;

    let table = RawTable::load(&path, source.delimiter()).map_err(|e| {
        PipelineError::SourceMalformed {
            source_name: source.name().to_string(),
            path: path.clone(),
            reason: e.to_string(),
        }
    })?;

    let normalized = normalize::normalize(source, &path, &table)?;

    let mut unparsed = 0usize;
    let records = normalized
        .into_iter()
        .map(|row| {
            let deadline = dates::parse_deadline(source, &row.raw_deadline);
            if deadline.is_none() {
                unparsed += 1;
            }
            CanonicalRecord {
                auction_id: row.auction_id,
                organisation_name: row.organisation_name,
                location: row.location,
                last_date_of_submission: deadline,
                reserve_price: row.reserve_price,
                emd: row.emd,
                category: row.category,
                source,
            }
        })
        .collect();

    // One warning per source, not one per row.
    if unparsed > 0 {
        warn!(
            "{}: {} row(s) had an unparseable last_date_of_submission",
            source, unparsed
        );
    }

    Ok(records)
}

/// Derive `days_until_submission` against the run date and render each
/// record as an output row. The run date is evaluated once per run.
pub fn compute_days(records: Vec<CanonicalRecord>, run_date: NaiveDate) -> Vec<MergedRow> {
    records
        .into_iter()
        .map(|record| {
            let days = record
                .last_date_of_submission
                .map(|deadline| (deadline - run_date).num_days());
            MergedRow {
                auction_id: record.auction_id,
                organisation_name: record.organisation_name,
                location: record.location,
                last_date_of_submission: dates::render_deadline(record.last_date_of_submission),
                reserve_price: record.reserve_price,
                emd: record.emd,
                category: record.category,
                source: record.source.tag().to_string(),
                days_until_submission: days
                    .map(|d| d.to_string())
                    .unwrap_or_else(|| SENTINEL.to_string()),
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(deadline: Option<NaiveDate>) -> CanonicalRecord {
        CanonicalRecord {
            auction_id: "A1".into(),
            organisation_name: "Bank".into(),
            location: SENTINEL.into(),
            last_date_of_submission: deadline,
            reserve_price: "1,00,000".into(),
            emd: SENTINEL.into(),
            category: SENTINEL.into(),
            source: Source::Ibbi,
        }
    }

    #[test]
    fn test_days_until_submission_is_signed() {
        let run_date = NaiveDate::from_ymd_opt(2025, 6, 1).unwrap();
        let rows = compute_days(
            vec![
                record(NaiveDate::from_ymd_opt(2025, 6, 8)),
                record(NaiveDate::from_ymd_opt(2025, 5, 20)),
                record(None),
            ],
            run_date,
        );
        assert_eq!(rows[0].days_until_submission, "7");
        assert_eq!(rows[1].days_until_submission, "-12");
        assert_eq!(rows[2].days_until_submission, SENTINEL);
        assert_eq!(rows[2].last_date_of_submission, SENTINEL);
        assert_eq!(rows[0].last_date_of_submission, "08-06-2025");
        assert_eq!(rows[0].source, "IBBI");
    }
}
