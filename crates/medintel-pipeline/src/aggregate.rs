//! The five dashboard summary tables.
//!
//! Each table is computed independently from the same [`CanonicalDataset`].
//! Category values are bucketed by exact string match, so `"twitter"` and
//! `"Twitter"` land in different rows.

use std::cmp::Reverse;
use std::collections::{BTreeMap, HashMap};

use chrono::{Datelike, Duration, NaiveDate};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use crate::error::PipelineError;
use crate::types::{CanonicalDataset, CanonicalRecord};

/// Maximum number of rows in the top-locations table.
pub const TOP_LOCATIONS_LIMIT: usize = 5;

/// The fixed set of dashboard charts, in display order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChartKind {
    SentimentBreakdown,
    EngagementTrend,
    PlatformEngagements,
    MediaTypeMix,
    TopLocations,
}

impl ChartKind {
    pub const ALL: [ChartKind; 5] = [
        ChartKind::SentimentBreakdown,
        ChartKind::EngagementTrend,
        ChartKind::PlatformEngagements,
        ChartKind::MediaTypeMix,
        ChartKind::TopLocations,
    ];

    #[must_use]
    pub fn key(self) -> &'static str {
        match self {
            Self::SentimentBreakdown => "sentiment_breakdown",
            Self::EngagementTrend => "engagement_trend",
            Self::PlatformEngagements => "platform_engagements",
            Self::MediaTypeMix => "media_type_mix",
            Self::TopLocations => "top_locations",
        }
    }

    #[must_use]
    pub fn from_key(key: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|kind| kind.key() == key)
    }

    #[must_use]
    pub fn title(self) -> &'static str {
        match self {
            Self::SentimentBreakdown => "Sentiment Breakdown",
            Self::EngagementTrend => "Engagement Trend over Time",
            Self::PlatformEngagements => "Platform Engagements",
            Self::MediaTypeMix => "Media Type Mix",
            Self::TopLocations => "Top 5 Locations by Engagements",
        }
    }

    /// Column names used when a table is serialized as records.
    #[must_use]
    pub fn columns(self) -> (&'static str, &'static str) {
        match self {
            Self::SentimentBreakdown => ("Sentiment", "Count"),
            Self::EngagementTrend => ("date", "engagements"),
            Self::PlatformEngagements => ("platform", "engagements"),
            Self::MediaTypeMix => ("Media Type", "Count"),
            Self::TopLocations => ("location", "engagements"),
        }
    }

    fn summary_label(self) -> &'static str {
        match self {
            Self::SentimentBreakdown => "Sentiment counts",
            Self::EngagementTrend => "Engagement trend data",
            Self::PlatformEngagements => "Platform engagements",
            Self::MediaTypeMix => "Media type mix",
            Self::TopLocations => "Top locations by engagements",
        }
    }
}

impl std::fmt::Display for ChartKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.key())
    }
}

/// One keyed value of a summary table. For the engagement trend the label
/// is the week's Monday as `YYYY-MM-DD`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableRow {
    pub label: String,
    pub value: i64,
}

impl TableRow {
    fn new(label: impl Into<String>, value: i64) -> Self {
        Self {
            label: label.into(),
            value,
        }
    }
}

/// A grouped-and-reduced summary keyed by one dimension.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AggregateTable {
    pub kind: ChartKind,
    pub rows: Vec<TableRow>,
}

impl AggregateTable {
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    #[must_use]
    pub fn total(&self) -> i64 {
        self.rows.iter().fold(0, |acc, r| acc.saturating_add(r.value))
    }

    /// Rows as a JSON array of objects under the chart's column names, label
    /// column first.
    #[must_use]
    pub fn records_json(&self) -> String {
        let (label_col, value_col) = self.kind.columns();
        let records: Vec<Value> = self
            .rows
            .iter()
            .map(|row| json!({ label_col: row.label, value_col: row.value }))
            .collect();
        Value::Array(records).to_string()
    }

    /// Text summary handed to the insight provider, e.g.
    /// `Platform engagements: [{"platform":"Twitter","engagements":190}]`.
    #[must_use]
    pub fn serialized_summary(&self) -> String {
        format!("{}: {}", self.kind.summary_label(), self.records_json())
    }
}

/// Monday of the ISO week containing `date`.
#[must_use]
pub fn week_start(date: NaiveDate) -> NaiveDate {
    date - Duration::days(i64::from(date.weekday().num_days_from_monday()))
}

/// Computes one summary table.
///
/// # Errors
///
/// Returns [`PipelineError::Aggregation`] if a sum or count overflows `i64`.
pub fn compute_table(
    kind: ChartKind,
    dataset: &CanonicalDataset,
) -> Result<AggregateTable, PipelineError> {
    let rows = match kind {
        ChartKind::SentimentBreakdown => count_by(kind, dataset, |r| &r.sentiment)?,
        ChartKind::MediaTypeMix => count_by(kind, dataset, |r| &r.media_type)?,
        ChartKind::EngagementTrend => weekly_engagements(kind, dataset)?,
        ChartKind::PlatformEngagements => {
            let mut rows = sum_by(kind, dataset, |r| &r.platform)?;
            rows.sort_by(|a, b| a.label.cmp(&b.label));
            rows
        }
        ChartKind::TopLocations => {
            let mut rows = sum_by(kind, dataset, |r| &r.location)?;
            // Stable: equal sums keep first-appearance order.
            rows.sort_by_key(|r| Reverse(r.value));
            rows.truncate(TOP_LOCATIONS_LIMIT);
            rows
        }
    };
    Ok(AggregateTable { kind, rows })
}

/// Computes all five tables in [`ChartKind::ALL`] order.
///
/// A failure in one table does not prevent the others from being computed.
#[must_use]
pub fn aggregate(dataset: &CanonicalDataset) -> Vec<Result<AggregateTable, PipelineError>> {
    ChartKind::ALL
        .into_iter()
        .map(|kind| {
            let result = compute_table(kind, dataset);
            if let Err(e) = &result {
                tracing::warn!(chart = kind.key(), error = %e, "aggregation failed");
            }
            result
        })
        .collect()
}

fn overflow(kind: ChartKind, what: &str) -> PipelineError {
    PipelineError::Aggregation {
        chart: kind.key(),
        reason: format!("{what} overflowed a 64-bit integer"),
    }
}

/// Groups records by `key`, keeping buckets in first-appearance order.
fn group_by<'a, F, A>(
    dataset: &'a CanonicalDataset,
    key: F,
    mut accumulate: A,
) -> Option<Vec<TableRow>>
where
    F: Fn(&'a CanonicalRecord) -> &'a String,
    A: FnMut(i64, &'a CanonicalRecord) -> Option<i64>,
{
    let mut index: HashMap<&str, usize> = HashMap::new();
    let mut rows: Vec<TableRow> = Vec::new();

    for record in dataset {
        let label = key(record).as_str();
        let slot = *index.entry(label).or_insert_with(|| {
            rows.push(TableRow::new(label, 0));
            rows.len() - 1
        });
        rows[slot].value = accumulate(rows[slot].value, record)?;
    }
    Some(rows)
}

/// Counts records per distinct value, most frequent first. Ties keep
/// first-appearance order.
fn count_by<'a, F>(
    kind: ChartKind,
    dataset: &'a CanonicalDataset,
    key: F,
) -> Result<Vec<TableRow>, PipelineError>
where
    F: Fn(&'a CanonicalRecord) -> &'a String,
{
    let mut rows = group_by(dataset, key, |acc, _| acc.checked_add(1))
        .ok_or_else(|| overflow(kind, "count"))?;
    rows.sort_by_key(|r| Reverse(r.value));
    Ok(rows)
}

/// Sums engagements per distinct value, in first-appearance order.
fn sum_by<'a, F>(
    kind: ChartKind,
    dataset: &'a CanonicalDataset,
    key: F,
) -> Result<Vec<TableRow>, PipelineError>
where
    F: Fn(&'a CanonicalRecord) -> &'a String,
{
    group_by(dataset, key, |acc, r| acc.checked_add(r.engagements))
        .ok_or_else(|| overflow(kind, "engagement sum"))
}

/// Sums engagements per ISO week, ascending. Weeks without records are
/// omitted.
fn weekly_engagements(
    kind: ChartKind,
    dataset: &CanonicalDataset,
) -> Result<Vec<TableRow>, PipelineError> {
    let mut weeks: BTreeMap<NaiveDate, i64> = BTreeMap::new();
    for record in dataset {
        let total = weeks.entry(week_start(record.date)).or_insert(0);
        *total = total
            .checked_add(record.engagements)
            .ok_or_else(|| overflow(kind, "weekly engagement sum"))?;
    }
    Ok(weeks
        .into_iter()
        .map(|(week, total)| TableRow::new(week.format("%Y-%m-%d").to_string(), total))
        .collect())
}
