//! Lenient calendar-date parsing for client-supplied payloads.
//!
//! The front end and the AI drafts send `YYYY-MM-DD`, full RFC3339
//! timestamps, or an empty string for "not set".

use chrono::{DateTime, NaiveDate};
use serde::{Deserialize, Deserializer};

/// Parse `YYYY-MM-DD` or an RFC3339 timestamp (date part kept).
pub fn parse_date(raw: &str) -> Result<NaiveDate, String> {
    let raw = raw.trim();
    if let Ok(d) = NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
        return Ok(d);
    }
    DateTime::parse_from_rfc3339(raw)
        .map(|dt| dt.date_naive())
        .map_err(|_| format!("invalid date '{raw}', expected YYYY-MM-DD"))
}

/// `deserialize_with` helper: `null`, missing and `""` all become `None`.
pub fn deserialize_opt_date<'de, D>(deserializer: D) -> Result<Option<NaiveDate>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw: Option<String> = Option::deserialize(deserializer)?;
    match raw.as_deref().map(str::trim) {
        None | Some("") => Ok(None),
        Some(s) => parse_date(s).map(Some).map_err(serde::de::Error::custom),
    }
}
