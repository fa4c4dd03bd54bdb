//! Schema Normalizer: maps each source's raw columns onto the canonical
//! record shape.
//!
//! Every source is described by one declarative [`Transform`] (a rename
//! table plus derived-field rules) so adding a source never touches the
//! merge, date, or output stages.

use std::path::Path;

use itertools::Itertools;
use lazy_static::lazy_static;
use regex::Regex;

use crate::error::{PipelineError, Result};
use crate::record::SENTINEL;
use crate::sources::Source;

lazy_static! {
    /// Web3 organisation chains embed the state as "Govt of <name>|...".
    static ref GOVT_RE: Regex = Regex::new(r"Govt of ([^|]*)").unwrap();
}

/// One raw export file, loaded whole: header row plus textual records.
pub struct RawTable {
    pub headers: Vec<String>,
    pub rows: Vec<csv::StringRecord>,
}

impl RawTable {
    pub fn load(path: &Path, delimiter: u8) -> Result<RawTable> {
        let mut reader = csv::ReaderBuilder::new()
            .delimiter(delimiter)
            .flexible(true)
            .from_path(path)?;
        let headers = reader
            .headers()?
            .iter()
            .map(|h| h.trim().to_string())
            .collect();
        let rows = reader
            .records()
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(RawTable { headers, rows })
    }

    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.headers.iter().position(|h| h == name)
    }
}

/// How one canonical field is produced from a raw row.
#[derive(Clone, Copy, Debug)]
enum FieldRule {
    /// Copy the named raw column verbatim.
    Column(&'static str),
    /// Copy the raw column at a fixed position (for unlabeled columns).
    ColumnAt(usize),
    /// The field is not available from this source.
    Sentinel,
    /// First whitespace-delimited token of the named raw column.
    FirstWord(&'static str),
    /// First `n` pipe-delimited segments of the named raw column, re-joined.
    PipePrefix(&'static str, usize),
    /// Substring after "Govt of " up to the next pipe, searched within the
    /// first `n` pipe segments of the named raw column, trimmed.
    GovtOf(&'static str, usize),
}

/// Declarative mapping from one source's raw columns onto the canonical
/// schema. One rule per canonical field, in canonical field order.
struct Transform {
    auction_id: FieldRule,
    organisation_name: FieldRule,
    location: FieldRule,
    deadline: FieldRule,
    reserve_price: FieldRule,
    emd: FieldRule,
    category: FieldRule,
    /// Replace any remaining empty value with the sentinel.
    fill_empty: bool,
}

fn transform_for(source: Source) -> Transform {
    use FieldRule::*;
    match source {
        Source::Ibbi => Transform {
            auction_id: Column("CIN No."),
            organisation_name: Column("Name of Corporate Debtor"),
            location: Sentinel,
            deadline: Column("Last date of Submission"),
            reserve_price: Column("Reserve Price"),
            emd: Sentinel,
            category: Sentinel,
            fill_empty: false,
        },
        Source::Albion => Transform {
            auction_id: Column("Auction ID"),
            organisation_name: Column("Bank Name"),
            location: Column("Location"),
            deadline: Column("Auction Date"),
            reserve_price: Column("Reserve Price"),
            emd: Sentinel,
            category: FirstWord("Heading"),
            fill_empty: false,
        },
        // The BankE table carries several unlabeled and unused columns
        // (serial index, DRT Name, Event Type, Asset on Auction); selecting
        // only the fields below drops them. The auction category lives in
        // the table's unlabeled fourteenth column.
        Source::BankE => Transform {
            auction_id: Column("Auction ID"),
            organisation_name: Column("Bank/Organisation Name"),
            location: Column("City/District"),
            deadline: Column("Sealed Bid Submission last date"),
            reserve_price: Column("Reserve Price"),
            emd: Column("EMD"),
            category: ColumnAt(13),
            fill_empty: false,
        },
        Source::Web3 => Transform {
            auction_id: Column("Auction ID"),
            organisation_name: PipePrefix("Organisation Chain", 3),
            location: GovtOf("Organisation Chain", 3),
            deadline: Column("Submission End Date"),
            reserve_price: Column("Starting Price"),
            emd: Column("EMD Amount"),
            category: Column("Product Category"),
            fill_empty: true,
        },
    }
}

impl Transform {
    fn rules(&self) -> [FieldRule; 7] {
        [
            self.auction_id,
            self.organisation_name,
            self.location,
            self.deadline,
            self.reserve_price,
            self.emd,
            self.category,
        ]
    }
}

/// A canonical-shaped row before deadline parsing: the deadline is still the
/// source's raw text.
#[derive(Clone, Debug, PartialEq)]
pub struct NormalizedRow {
    pub auction_id: String,
    pub organisation_name: String,
    pub location: String,
    pub raw_deadline: String,
    pub reserve_price: String,
    pub emd: String,
    pub category: String,
}

/// Normalize one source's raw table onto the canonical schema.
///
/// Fails with [`PipelineError::SourceMalformed`] when a column the source's
/// transform references is absent; the caller isolates that failure to this
/// source.
pub fn normalize(source: Source, path: &Path, table: &RawTable) -> Result<Vec<NormalizedRow>> {
    let transform = transform_for(source);
    validate_columns(source, path, table, &transform)?;

    let finish = |value: String| {
        if transform.fill_empty && value.is_empty() {
            SENTINEL.to_string()
        } else {
            value
        }
    };
    let rows = table
        .rows
        .iter()
        .map(|row| NormalizedRow {
            auction_id: finish(apply_rule(&transform.auction_id, table, row)),
            organisation_name: finish(apply_rule(&transform.organisation_name, table, row)),
            location: finish(apply_rule(&transform.location, table, row)),
            raw_deadline: finish(apply_rule(&transform.deadline, table, row)),
            reserve_price: finish(apply_rule(&transform.reserve_price, table, row)),
            emd: finish(apply_rule(&transform.emd, table, row)),
            category: finish(apply_rule(&transform.category, table, row)),
        })
        .collect();

    Ok(rows)
}

fn validate_columns(
    source: Source,
    path: &Path,
    table: &RawTable,
    transform: &Transform,
) -> Result<()> {
    let mut missing: Vec<String> = Vec::new();
    for rule in transform.rules() {
        match rule {
            FieldRule::Column(name)
            | FieldRule::FirstWord(name)
            | FieldRule::PipePrefix(name, _)
            | FieldRule::GovtOf(name, _) => {
                if table.column_index(name).is_none() {
                    missing.push(format!("'{}'", name));
                }
            }
            FieldRule::ColumnAt(idx) => {
                if table.headers.len() <= idx {
                    missing.push(format!(
                        "column at position {} (table has {})",
                        idx,
                        table.headers.len()
                    ));
                }
            }
            FieldRule::Sentinel => {}
        }
    }
    if missing.is_empty() {
        Ok(())
    } else {
        Err(PipelineError::SourceMalformed {
            source_name: source.name().to_string(),
            path: path.to_path_buf(),
            reason: format!("missing expected column(s): {}", missing.join(", ")),
        })
    }
}

fn apply_rule(rule: &FieldRule, table: &RawTable, row: &csv::StringRecord) -> String {
    let cell = |name: &str| -> String {
        table
            .column_index(name)
            .and_then(|idx| row.get(idx))
            .unwrap_or("")
            .trim()
            .to_string()
    };
    match rule {
        FieldRule::Column(name) => cell(name),
        FieldRule::ColumnAt(idx) => row.get(*idx).unwrap_or("").trim().to_string(),
        FieldRule::Sentinel => SENTINEL.to_string(),
        FieldRule::FirstWord(name) => cell(name)
            .split_whitespace()
            .next()
            .unwrap_or("")
            .to_string(),
        FieldRule::PipePrefix(name, n) => cell(name).split('|').take(*n).join("|"),
        FieldRule::GovtOf(name, n) => {
            let prefix = cell(name).split('|').take(*n).join("|");
            GOVT_RE
                .captures(&prefix)
                .and_then(|caps| caps.get(1))
                .map(|m| m.as_str().trim().to_string())
                .unwrap_or_default()
        }
    }
}
