//! Artifact Writer and artifact lookup.
//!
//! One comma-delimited UTF-8 file per run, header row in fixed column
//! order, named `combined_auctions_<YYYYMMDD>.csv`. The write is
//! all-or-nothing: rows go to a temporary file that is renamed into place
//! only after a clean flush, so a failed run never leaves a partial file.

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use chrono::NaiveDate;

use crate::error::{PipelineError, Result};
use crate::record::{MergedRow, OUTPUT_COLUMNS};

pub const ARTIFACT_PREFIX: &str = "combined_auctions_";

pub fn artifact_path(dir: &Path, run_date: NaiveDate) -> PathBuf {
    dir.join(format!(
        "{}{}.csv",
        ARTIFACT_PREFIX,
        run_date.format("%Y%m%d")
    ))
}

/// Write the merged dataset to the run's dated artifact.
pub fn write_artifact(dir: &Path, run_date: NaiveDate, rows: &[MergedRow]) -> Result<PathBuf> {
    fs::create_dir_all(dir)?;
    let path = artifact_path(dir, run_date);
    let tmp = dir.join(format!(
        "{}{}.csv.tmp",
        ARTIFACT_PREFIX,
        run_date.format("%Y%m%d")
    ));

    let written = rows_to_csv(rows).and_then(|bytes| {
        let mut file = fs::File::create(&tmp)?;
        file.write_all(&bytes)?;
        file.flush()?;
        Ok(())
    });

    match written.and_then(|()| fs::rename(&tmp, &path).map_err(PipelineError::Io)) {
        Ok(()) => Ok(path),
        Err(e) => {
            let _ = fs::remove_file(&tmp);
            Err(PipelineError::ArtifactWrite {
                path,
                reason: e.to_string(),
            })
        }
    }
}

/// Serialize rows as CSV bytes: fixed header row, then one line per record.
/// The header is written even for an empty dataset.
pub fn rows_to_csv(rows: &[MergedRow]) -> Result<Vec<u8>> {
    let mut buf = Vec::new();
    {
        let mut writer = csv::WriterBuilder::new()
            .has_headers(false)
            .from_writer(&mut buf);
        writer.write_record(OUTPUT_COLUMNS)?;
        for row in rows {
            writer.serialize(row)?;
        }
        writer.flush()?;
    }
    Ok(buf)
}

/// The most recent combined artifact in `dir`, by the date stamp embedded
/// in the file name.
pub fn latest_artifact(dir: &Path) -> Result<PathBuf> {
    let entries = fs::read_dir(dir).map_err(|_| PipelineError::ArtifactMissing(dir.to_path_buf()))?;
    entries
        .filter_map(|entry| entry.ok())
        .filter_map(|entry| {
            let name = entry.file_name().to_str()?.to_string();
            if name.starts_with(ARTIFACT_PREFIX) && name.ends_with(".csv") {
                Some((name, entry.path()))
            } else {
                None
            }
        })
        .max_by(|(a, _), (b, _)| a.cmp(b))
        .map(|(_, path)| path)
        .ok_or_else(|| PipelineError::ArtifactMissing(dir.to_path_buf()))
}

/// Load a combined artifact back into rows (viewer and notifier input).
pub fn load_artifact(path: &Path) -> Result<Vec<MergedRow>> {
    let mut reader = csv::Reader::from_path(path)?;
    let rows = reader
        .deserialize()
        .collect::<std::result::Result<Vec<MergedRow>, _>>()?;
    Ok(rows)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::SENTINEL;

    fn row() -> MergedRow {
        MergedRow {
            auction_id: "A1".into(),
            organisation_name: "Acme, Ltd".into(),
            location: "Pune".into(),
            last_date_of_submission: "08-06-2025".into(),
            reserve_price: "1,00,000".into(),
            emd: SENTINEL.into(),
            category: "Residential".into(),
            source: "IBBI".into(),
            days_until_submission: "7".into(),
        }
    }

    #[test]
    fn test_header_written_even_when_empty() {
        let bytes = rows_to_csv(&[]).unwrap();
        let text = String::from_utf8(bytes).unwrap();
        assert_eq!(
            text.trim_end(),
            "auction_id,organisation_name,location,last_date_of_submission,\
             reserve_price,emd,category,source,days_until_submission"
        );
    }

    #[test]
    fn test_write_and_load_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let run_date = NaiveDate::from_ymd_opt(2025, 6, 1).unwrap();
        let path = write_artifact(dir.path(), run_date, &[row()]).unwrap();
        assert_eq!(
            path.file_name().unwrap().to_str().unwrap(),
            "combined_auctions_20250601.csv"
        );

        let loaded = load_artifact(&path).unwrap();
        assert_eq!(loaded, vec![row()]);
        // no temporary file left behind
        assert_eq!(fs::read_dir(dir.path()).unwrap().count(), 1);
    }

    #[test]
    fn test_latest_artifact_by_embedded_stamp() {
        let dir = tempfile::tempdir().unwrap();
        for stamp in ["20250520", "20250601", "20250530"] {
            let date = NaiveDate::parse_from_str(stamp, "%Y%m%d").unwrap();
            write_artifact(dir.path(), date, &[]).unwrap();
        }
        let latest = latest_artifact(dir.path()).unwrap();
        assert_eq!(
            latest.file_name().unwrap().to_str().unwrap(),
            "combined_auctions_20250601.csv"
        );
    }
}
