//! The four auction-notice origins and their file-level contracts.
//!
//! Each extractor drops one flat file per run into the export directory,
//! named `<prefix>_<stamp>.<ext>`. The merge step consumes the latest such
//! file per source; selection is by file name (the embedded `YYYYMMDD...`
//! stamp sorts lexicographically), never by filesystem timestamps.

use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

/// Merge order is fixed: IBBI, Albion, BankE, Web3.
pub const ALL_SOURCES: [Source; 4] = [Source::Ibbi, Source::Albion, Source::BankE, Source::Web3];

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Source {
    Ibbi,
    Albion,
    BankE,
    Web3,
}

impl Source {
    /// Short name used in logs and error messages.
    pub fn name(&self) -> &'static str {
        match self {
            Source::Ibbi => "IBBI",
            Source::Albion => "Albion",
            Source::BankE => "BankE",
            Source::Web3 => "Web3",
        }
    }

    /// The `source` tag written into every combined record.
    pub fn tag(&self) -> &'static str {
        match self {
            Source::Ibbi => "IBBI",
            Source::Albion => "Albion",
            Source::BankE => "link_of_e_auction",
            Source::Web3 => "link_of_website_web3",
        }
    }

    pub fn file_prefix(&self) -> &'static str {
        match self {
            Source::Ibbi => "ibbi_auctions_",
            Source::Albion => "albion_auctions_",
            Source::BankE => "bank_e_auctions_",
            Source::Web3 => "web3_auctions_",
        }
    }

    /// IBBI publishes tab-delimited text under an `.xls` extension.
    pub fn file_extension(&self) -> &'static str {
        match self {
            Source::Ibbi => ".xls",
            _ => ".csv",
        }
    }

    pub fn delimiter(&self) -> u8 {
        match self {
            Source::Ibbi => b'\t',
            _ => b',',
        }
    }

    /// Strict format string for this source's submission-deadline column.
    pub fn date_format(&self) -> &'static str {
        match self {
            Source::Ibbi => "%d-%m-%Y",
            Source::Albion => "%d/%m/%Y",
            Source::BankE => "%d %b %Y",
            Source::Web3 => "%d-%b-%Y %I:%M %p",
        }
    }

    /// Web3 deadlines carry a time of day; it is parsed and then dropped.
    pub fn has_time_component(&self) -> bool {
        matches!(self, Source::Web3)
    }

    /// Latest export file for this source in `dir`, or `None` when the
    /// source has never produced one. Deterministic: greatest file name
    /// among those matching the source's prefix and extension.
    pub fn latest_export(&self, dir: &Path) -> Option<PathBuf> {
        let entries = fs::read_dir(dir).ok()?;
        entries
            .filter_map(|entry| entry.ok())
            .filter_map(|entry| {
                let name = entry.file_name().to_str()?.to_string();
                if name.starts_with(self.file_prefix()) && name.ends_with(self.file_extension()) {
                    Some((name, entry.path()))
                } else {
                    None
                }
            })
            .max_by(|(a, _), (b, _)| a.cmp(b))
            .map(|(_, path)| path)
    }
}

impl fmt::Display for Source {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_latest_export_picks_greatest_stamp() {
        let dir = tempfile::tempdir().unwrap();
        for name in [
            "albion_auctions_20250520.csv",
            "albion_auctions_20250601.csv",
            "albion_auctions_20250530.csv",
            "bank_e_auctions_20250612.csv",
            "notes.txt",
        ] {
            fs::write(dir.path().join(name), "Auction ID\n").unwrap();
        }

        let latest = Source::Albion.latest_export(dir.path()).unwrap();
        assert_eq!(
            latest.file_name().unwrap().to_str().unwrap(),
            "albion_auctions_20250601.csv"
        );
        assert!(Source::Web3.latest_export(dir.path()).is_none());
    }

    #[test]
    fn test_ibbi_uses_xls_extension() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("ibbi_auctions_20250601.xls"), "CIN No.\n").unwrap();
        fs::write(dir.path().join("ibbi_auctions_20250602.csv"), "CIN No.\n").unwrap();

        let latest = Source::Ibbi.latest_export(dir.path()).unwrap();
        assert_eq!(
            latest.file_name().unwrap().to_str().unwrap(),
            "ibbi_auctions_20250601.xls"
        );
    }
}
