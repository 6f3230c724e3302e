use std::collections::HashMap;

use chrono::NaiveDate;
use serde::Serialize;

/// Column names an upload must expose, exactly as written in the CSV header.
pub const REQUIRED_FIELDS: [&str; 6] = [
    "Date",
    "Platform",
    "Sentiment",
    "Location",
    "Engagements",
    "Media Type",
];

/// Column names of a cleaned record, in export order.
pub const CANONICAL_FIELDS: [&str; 6] = [
    "date",
    "platform",
    "sentiment",
    "location",
    "engagements",
    "media_type",
];

/// One uploaded row, keyed by header name.
///
/// A value of `None` means the cell was empty (null); a missing key means the
/// row never had that column.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawRecord {
    values: HashMap<String, Option<String>>,
}

impl RawRecord {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insert, used for hand-built datasets.
    #[must_use]
    pub fn with(mut self, field: &str, value: Option<&str>) -> Self {
        self.insert(field, value.map(ToOwned::to_owned));
        self
    }

    pub fn insert(&mut self, field: impl Into<String>, value: Option<String>) {
        self.values.insert(field.into(), value);
    }

    /// Returns the cell value, or `None` when it is absent or null.
    #[must_use]
    pub fn get(&self, field: &str) -> Option<&str> {
        self.values.get(field).and_then(Option::as_deref)
    }
}

/// A header-defined table of raw rows, in upload order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawDataset {
    pub headers: Vec<String>,
    pub records: Vec<RawRecord>,
}

impl RawDataset {
    #[must_use]
    pub fn new(headers: Vec<String>, records: Vec<RawRecord>) -> Self {
        Self { headers, records }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

/// A cleaned row. Field names follow the canonical lowercase/underscore form.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CanonicalRecord {
    pub date: NaiveDate,
    pub platform: String,
    pub sentiment: String,
    pub location: String,
    /// Never absent. May be negative when the upload was.
    pub engagements: i64,
    pub media_type: String,
}

impl CanonicalRecord {
    /// Converts back into a raw row under the upload column names.
    #[must_use]
    pub fn to_raw(&self) -> RawRecord {
        RawRecord::new()
            .with("Date", Some(&self.date.format("%Y-%m-%d").to_string()))
            .with("Platform", Some(&self.platform))
            .with("Sentiment", Some(&self.sentiment))
            .with("Location", Some(&self.location))
            .with("Engagements", Some(&self.engagements.to_string()))
            .with("Media Type", Some(&self.media_type))
    }

    /// Values in [`CANONICAL_FIELDS`] order, as written to CSV.
    #[must_use]
    pub fn to_csv_row(&self) -> [String; 6] {
        [
            self.date.format("%Y-%m-%d").to_string(),
            self.platform.clone(),
            self.sentiment.clone(),
            self.location.clone(),
            self.engagements.to_string(),
            self.media_type.clone(),
        ]
    }
}

/// Cleaned records in upload order. Immutable once built.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct CanonicalDataset {
    records: Vec<CanonicalRecord>,
}

impl CanonicalDataset {
    #[must_use]
    pub fn from_records(records: Vec<CanonicalRecord>) -> Self {
        Self { records }
    }

    #[must_use]
    pub fn records(&self) -> &[CanonicalRecord] {
        &self.records
    }

    pub fn iter(&self) -> std::slice::Iter<'_, CanonicalRecord> {
        self.records.iter()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Converts back into a raw dataset with the required upload headers.
    #[must_use]
    pub fn to_raw(&self) -> RawDataset {
        RawDataset {
            headers: REQUIRED_FIELDS.iter().map(|f| (*f).to_string()).collect(),
            records: self.records.iter().map(CanonicalRecord::to_raw).collect(),
        }
    }
}

impl<'a> IntoIterator for &'a CanonicalDataset {
    type Item = &'a CanonicalRecord;
    type IntoIter = std::slice::Iter<'a, CanonicalRecord>;

    fn into_iter(self) -> Self::IntoIter {
        self.records.iter()
    }
}
