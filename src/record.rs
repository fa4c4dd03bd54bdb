//! Canonical record shapes shared by the whole pipeline.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::sources::Source;

/// Literal marking an intentionally absent field value.
pub const SENTINEL: &str = "-";

/// Column order of the combined artifact, fixed across runs.
pub const OUTPUT_COLUMNS: [&str; 9] = [
    "auction_id",
    "organisation_name",
    "location",
    "last_date_of_submission",
    "reserve_price",
    "emd",
    "category",
    "source",
    "days_until_submission",
];

/// One normalized auction notice. The deadline is held as a parsed calendar
/// date (or missing) until output time; everything else stays textual
/// because raw currency formatting varies across sources and is not parsed.
#[derive(Clone, Debug, PartialEq)]
pub struct CanonicalRecord {
    pub auction_id: String,
    pub organisation_name: String,
    pub location: String,
    pub last_date_of_submission: Option<NaiveDate>,
    pub reserve_price: String,
    pub emd: String,
    pub category: String,
    pub source: Source,
}

/// One row of the combined artifact: the eight canonical fields rendered as
/// text plus the derived `days_until_submission`.
///
/// Serde field names are exactly the artifact's header names, so this type
/// round-trips through the CSV layer by name.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct MergedRow {
    pub auction_id: String,
    pub organisation_name: String,
    pub location: String,
    pub last_date_of_submission: String,
    pub reserve_price: String,
    pub emd: String,
    pub category: String,
    pub source: String,
    pub days_until_submission: String,
}

impl MergedRow {
    /// Numeric view of `days_until_submission`; the sentinel (or any other
    /// non-numeric text) is `None`.
    pub fn days(&self) -> Option<i64> {
        self.days_until_submission.trim().parse().ok()
    }

    /// Field values in artifact column order.
    pub fn values(&self) -> [&str; 9] {
        [
            &self.auction_id,
            &self.organisation_name,
            &self.location,
            &self.last_date_of_submission,
            &self.reserve_price,
            &self.emd,
            &self.category,
            &self.source,
            &self.days_until_submission,
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(days: &str) -> MergedRow {
        MergedRow {
            auction_id: "A1".into(),
            organisation_name: "Bank".into(),
            location: SENTINEL.into(),
            last_date_of_submission: "01-06-2025".into(),
            reserve_price: "1,00,000".into(),
            emd: SENTINEL.into(),
            category: SENTINEL.into(),
            source: "IBBI".into(),
            days_until_submission: days.into(),
        }
    }

    #[test]
    fn test_days_parses_signed_values() {
        assert_eq!(row("7").days(), Some(7));
        assert_eq!(row("-12").days(), Some(-12));
        assert_eq!(row(SENTINEL).days(), None);
        assert_eq!(row("soon").days(), None);
    }
}
