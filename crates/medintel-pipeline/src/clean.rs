//! Normalization from validated raw rows to [`CanonicalRecord`]s.
//!
//! Only an unparseable date rejects a dataset. Every other malformed value is
//! defaulted: missing or non-numeric engagement counts become `0`, and text
//! columns pass through verbatim.

use chrono::{DateTime, NaiveDate, NaiveDateTime};

use crate::error::PipelineError;
use crate::schema::ValidatedDataset;
use crate::types::{CanonicalDataset, CanonicalRecord};

const DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%Y/%m/%d", "%m/%d/%Y"];
const DATETIME_FORMATS: &[&str] = &["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S"];

/// Lowercases a column name and replaces spaces with underscores.
#[must_use]
pub fn canonical_field_name(name: &str) -> String {
    name.to_lowercase().replace(' ', "_")
}

/// Parses a date cell.
///
/// Accepted, tried in order after trimming: `YYYY-MM-DD`, RFC 3339
/// date-times, `YYYY-MM-DD HH:MM:SS`, `YYYY-MM-DDTHH:MM:SS`, `YYYY/MM/DD`,
/// and month-first `MM/DD/YYYY`. Date-times keep only their date part.
#[must_use]
pub fn parse_date(raw: &str) -> Option<NaiveDate> {
    let s = raw.trim();
    if s.is_empty() {
        return None;
    }

    if let Ok(date) = NaiveDate::parse_from_str(s, DATE_FORMATS[0]) {
        return Some(date);
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.date_naive());
    }
    for fmt in DATETIME_FORMATS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(s, fmt) {
            return Some(dt.date());
        }
    }
    DATE_FORMATS[1..]
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(s, fmt).ok())
}

/// Parses an engagement cell into an integer count.
///
/// Absent, empty, non-numeric, and non-finite values yield `0`. Integers are
/// taken exactly; fractions and exponents truncate toward zero, and values
/// outside the `i64` range saturate.
#[must_use]
#[allow(clippy::cast_possible_truncation)]
pub fn parse_engagements(raw: Option<&str>) -> i64 {
    let Some(s) = raw.map(str::trim).filter(|s| !s.is_empty()) else {
        return 0;
    };
    if let Ok(exact) = s.parse::<i64>() {
        return exact;
    }
    match s.parse::<f64>() {
        Ok(v) if v.is_finite() => v.trunc() as i64,
        _ => 0,
    }
}

/// Cleans every record of a validated dataset, preserving order.
///
/// Negative engagement counts are kept and logged.
///
/// # Errors
///
/// Returns [`PipelineError::DateParse`] for the first record whose `Date`
/// cannot be parsed. No partial dataset is returned.
pub fn clean_dataset(dataset: &ValidatedDataset) -> Result<CanonicalDataset, PipelineError> {
    let mut records = Vec::with_capacity(dataset.records.len());

    for (idx, raw) in dataset.records.iter().enumerate() {
        let date_raw = raw.get("Date").unwrap_or_default();
        let date = parse_date(date_raw).ok_or_else(|| PipelineError::DateParse {
            record: idx + 1,
            value: date_raw.to_string(),
        })?;

        let engagements = parse_engagements(raw.get("Engagements"));
        if engagements < 0 {
            tracing::warn!(
                record = idx + 1,
                engagements,
                "negative engagement count kept as-is"
            );
        }

        let text = |field: &str| raw.get(field).unwrap_or_default().to_string();

        records.push(CanonicalRecord {
            date,
            platform: text("Platform"),
            sentiment: text("Sentiment"),
            location: text("Location"),
            engagements,
            media_type: text("Media Type"),
        });
    }

    tracing::debug!(records = records.len(), "dataset cleaned");
    Ok(CanonicalDataset::from_records(records))
}
