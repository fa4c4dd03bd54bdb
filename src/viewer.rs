//! Read-side filtering and display over the combined artifact.

use crate::record::{MergedRow, OUTPUT_COLUMNS};

/// Filters applied by the `view` command. All are optional; a days bound
/// drops rows whose `days_until_submission` is the sentinel.
#[derive(Clone, Debug, Default)]
pub struct ViewFilter {
    /// Exact match on the record's source tag.
    pub source: Option<String>,
    pub min_days: Option<i64>,
    pub max_days: Option<i64>,
}

pub fn filter_rows(rows: &[MergedRow], filter: &ViewFilter) -> Vec<MergedRow> {
    rows.iter()
        .filter(|row| {
            if let Some(source) = &filter.source {
                if &row.source != source {
                    return false;
                }
            }
            if filter.min_days.is_some() || filter.max_days.is_some() {
                let days = match row.days() {
                    Some(d) => d,
                    None => return false,
                };
                if let Some(min) = filter.min_days {
                    if days < min {
                        return false;
                    }
                }
                if let Some(max) = filter.max_days {
                    if days > max {
                        return false;
                    }
                }
            }
            true
        })
        .cloned()
        .collect()
}

/// Distinct source tags present, in first-seen order.
pub fn source_tags(rows: &[MergedRow]) -> Vec<String> {
    let mut tags: Vec<String> = Vec::new();
    for row in rows {
        if !tags.contains(&row.source) {
            tags.push(row.source.clone());
        }
    }
    tags
}

/// Render rows as an aligned plain-text table with the artifact's header.
pub fn render_table(rows: &[MergedRow]) -> String {
    let mut widths: Vec<usize> = OUTPUT_COLUMNS.iter().map(|c| c.len()).collect();
    for row in rows {
        for (i, value) in row.values().iter().enumerate() {
            widths[i] = widths[i].max(value.chars().count());
        }
    }

    let render_line = |values: &[&str]| -> String {
        values
            .iter()
            .enumerate()
            .map(|(i, v)| format!("{:<width$}", v, width = widths[i]))
            .collect::<Vec<_>>()
            .join("  ")
            .trim_end()
            .to_string()
    };

    let mut out = String::new();
    out.push_str(&render_line(&OUTPUT_COLUMNS));
    out.push('\n');
    for row in rows {
        out.push_str(&render_line(&row.values()));
        out.push('\n');
    }
    out
}
