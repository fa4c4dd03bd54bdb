//! Email digest of auctions closing within a deadline threshold.
//!
//! Filters the combined artifact to rows with a numeric
//! `days_until_submission` in `[0, threshold]`, then sends one plain-text
//! digest through the SendGrid v3 mail API, attaching the matching rows as
//! `upcoming_auctions.csv` when there are any.

use base64::{engine::general_purpose::STANDARD, Engine as _};
use chrono::NaiveDate;
use serde_json::json;
use tracing::info;

use crate::artifact;
use crate::error::{PipelineError, Result};
use crate::record::MergedRow;

const MAIL_API_URL: &str = "https://api.sendgrid.com/v3/mail/send";
const ATTACHMENT_NAME: &str = "upcoming_auctions.csv";

#[derive(Clone, Debug)]
pub struct NotifierConfig {
    pub api_key: String,
    pub sender: String,
    pub recipients: Vec<String>,
    /// Inclusive upper bound on days until submission (lower bound is 0).
    pub days_threshold: i64,
}

impl NotifierConfig {
    /// Load credentials from the environment (a `.env` file is honored).
    /// Requires `SENDGRID_API_KEY`, `SENDER_EMAIL`, and a comma-separated
    /// `RECIPIENT_EMAILS`.
    pub fn from_env(days_threshold: i64) -> Result<Self> {
        dotenv::dotenv().ok();
        let api_key = require_env("SENDGRID_API_KEY")?;
        let sender = require_env("SENDER_EMAIL")?;
        let recipients: Vec<String> = require_env("RECIPIENT_EMAILS")?
            .split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(String::from)
            .collect();

        if recipients.is_empty() {
            return Err(PipelineError::NotifierConfig(
                "RECIPIENT_EMAILS contains no addresses".to_string(),
            ));
        }
        if let Some(bad) = recipients.iter().find(|r| !r.contains('@')) {
            return Err(PipelineError::NotifierConfig(format!(
                "invalid email address in recipient list: {}",
                bad
            )));
        }

        Ok(Self {
            api_key,
            sender,
            recipients,
            days_threshold,
        })
    }
}

fn require_env(name: &str) -> Result<String> {
    std::env::var(name)
        .ok()
        .filter(|v| !v.trim().is_empty())
        .ok_or_else(|| PipelineError::NotifierConfig(format!("{} is not set", name)))
}

/// Rows with a numeric `days_until_submission` inside `[0, threshold]`,
/// sorted ascending by days remaining. Sentinel rows never match.
pub fn upcoming(rows: &[MergedRow], threshold: i64) -> Vec<MergedRow> {
    let mut hits: Vec<MergedRow> = rows
        .iter()
        .filter(|row| matches!(row.days(), Some(d) if (0..=threshold).contains(&d)))
        .cloned()
        .collect();
    hits.sort_by_key(|row| row.days().unwrap_or(i64::MAX));
    hits
}

/// Send the digest for one run. `run_date` stamps the subject line.
pub async fn send_digest(
    config: &NotifierConfig,
    rows: &[MergedRow],
    run_date: NaiveDate,
) -> Result<()> {
    let matches = upcoming(rows, config.days_threshold);

    let subject = format!(
        "Auction Alerts - Upcoming Deadlines ({})",
        run_date.format("%Y-%m-%d")
    );
    let body = if matches.is_empty() {
        format!(
            "No auctions with submission deadlines between 0 and {} days. No CSV file attached.",
            config.days_threshold
        )
    } else {
        format!(
            "Found {} auctions with submission deadlines between 0 and {} days.\n\n\
             Full details are attached in the CSV file.",
            matches.len(),
            config.days_threshold
        )
    };

    let to: Vec<serde_json::Value> = config
        .recipients
        .iter()
        .map(|email| json!({ "email": email }))
        .collect();
    let mut payload = json!({
        "personalizations": [{ "to": to }],
        "from": { "email": config.sender },
        "subject": subject,
        "content": [{ "type": "text/plain", "value": body }],
    });

    if !matches.is_empty() {
        let csv_bytes = artifact::rows_to_csv(&matches)?;
        payload["attachments"] = json!([{
            "content": STANDARD.encode(csv_bytes),
            "filename": ATTACHMENT_NAME,
            "type": "text/csv",
            "disposition": "attachment",
        }]);
    }

    let client = reqwest::Client::new();
    let response = client
        .post(MAIL_API_URL)
        .bearer_auth(&config.api_key)
        .json(&payload)
        .send()
        .await
        .map_err(|e| PipelineError::Mail(e.to_string()))?;

    let status = response.status();
    if !status.is_success() {
        let detail = response.text().await.unwrap_or_default();
        return Err(PipelineError::Mail(format!(
            "mail API returned {}: {}",
            status, detail
        )));
    }

    info!(
        "Digest sent to {} recipient(s): {} upcoming auction(s)",
        config.recipients.len(),
        matches.len()
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::SENTINEL;

    fn row(days: &str) -> MergedRow {
        MergedRow {
            auction_id: format!("A-{}", days),
            organisation_name: "Bank".into(),
            location: "Pune".into(),
            last_date_of_submission: "08-06-2025".into(),
            reserve_price: "1,00,000".into(),
            emd: SENTINEL.into(),
            category: "Residential".into(),
            source: "IBBI".into(),
            days_until_submission: days.into(),
        }
    }

    #[test]
    fn test_upcoming_keeps_inclusive_window() {
        let rows: Vec<MergedRow> = ["-1", "0", "3", "7", "8", SENTINEL]
            .iter()
            .map(|d| row(d))
            .collect();
        let kept = upcoming(&rows, 7);
        let days: Vec<_> = kept
            .iter()
            .map(|r| r.days_until_submission.as_str())
            .collect();
        assert_eq!(days, vec!["0", "3", "7"]);
    }

    #[test]
    fn test_upcoming_sorts_by_days_remaining() {
        let rows: Vec<MergedRow> = ["6", "2", "4"].iter().map(|d| row(d)).collect();
        let kept = upcoming(&rows, 7);
        let days: Vec<_> = kept
            .iter()
            .map(|r| r.days_until_submission.as_str())
            .collect();
        assert_eq!(days, vec!["2", "4", "6"]);
    }
}
