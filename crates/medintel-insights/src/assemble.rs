//! Dashboard assembly: one presentation record per chart.
//!
//! Insight requests for the five charts run concurrently, each bounded by its
//! own timeout. A failed or timed-out request degrades only its own chart to
//! a placeholder.

use std::time::Duration;

use futures::future::join_all;
use medintel_pipeline::{
    aggregate, clean_dataset, validate_schema, AggregateTable, CanonicalDataset, ChartKind,
    PipelineError, RawDataset,
};
use serde::Serialize;

use crate::error::InsightError;
use crate::provider::TextInsightProvider;

/// Shown when no credential is configured.
pub const DISABLED_PLACEHOLDER: &str = "Insights unavailable: no API key configured.";
/// Shown when the request for a chart failed or timed out.
pub const FAILED_PLACEHOLDER: &str = "Failed to generate insights.";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum InsightStatus {
    Generated,
    Disabled,
    Failed,
}

/// A chart's table, title, and insight list, ready for display or export.
#[derive(Debug, Clone, Serialize)]
pub struct PresentationRecord {
    pub key: ChartKind,
    pub title: &'static str,
    /// `None` only when this chart's aggregation failed.
    pub table: Option<AggregateTable>,
    pub insights: Vec<String>,
    pub insight_status: InsightStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// The five presentation records of one run, in [`ChartKind::ALL`] order.
#[derive(Debug, Clone, Serialize)]
pub struct Dashboard {
    pub record_count: usize,
    pub charts: Vec<PresentationRecord>,
}

impl Dashboard {
    #[must_use]
    pub fn chart(&self, kind: ChartKind) -> Option<&PresentationRecord> {
        self.charts.iter().find(|c| c.key == kind)
    }
}

/// Everything one processing run produces.
#[derive(Debug, Clone)]
pub struct DashboardRun {
    pub canonical: CanonicalDataset,
    pub dashboard: Dashboard,
}

async fn insights_for<P: TextInsightProvider>(
    provider: &P,
    table: &AggregateTable,
    call_timeout: Duration,
) -> (Vec<String>, InsightStatus) {
    let title = table.kind.title();
    let summary = table.serialized_summary();

    let result = tokio::time::timeout(call_timeout, provider.summarize(title, &summary))
        .await
        .unwrap_or_else(|_| {
            Err(InsightError::Timeout {
                secs: call_timeout.as_secs(),
            })
        });

    match result {
        Ok(insights) => (insights, InsightStatus::Generated),
        Err(InsightError::Disabled) => (
            vec![DISABLED_PLACEHOLDER.to_string()],
            InsightStatus::Disabled,
        ),
        Err(e) => {
            tracing::warn!(chart = table.kind.key(), error = %e, "insight request failed");
            (vec![FAILED_PLACEHOLDER.to_string()], InsightStatus::Failed)
        }
    }
}

/// Pairs each table with its insights.
///
/// `tables` must be in [`ChartKind::ALL`] order, as returned by
/// [`aggregate`]. A chart whose aggregation failed gets no insight request
/// and carries the error message instead.
pub async fn assemble_dashboard<P: TextInsightProvider>(
    provider: &P,
    record_count: usize,
    tables: Vec<Result<AggregateTable, PipelineError>>,
    call_timeout: Duration,
) -> Dashboard {
    let requests = ChartKind::ALL
        .into_iter()
        .zip(tables)
        .map(|(kind, table)| async move {
            match table {
                Ok(table) => {
                    let (insights, insight_status) =
                        insights_for(provider, &table, call_timeout).await;
                    PresentationRecord {
                        key: kind,
                        title: kind.title(),
                        table: Some(table),
                        insights,
                        insight_status,
                        error: None,
                    }
                }
                Err(e) => PresentationRecord {
                    key: kind,
                    title: kind.title(),
                    table: None,
                    insights: vec![FAILED_PLACEHOLDER.to_string()],
                    insight_status: InsightStatus::Failed,
                    error: Some(e.to_string()),
                },
            }
        });

    Dashboard {
        record_count,
        charts: join_all(requests).await,
    }
}

/// Runs validation, cleaning, aggregation, and assembly for one upload.
///
/// # Errors
///
/// Returns [`PipelineError::Schema`] or [`PipelineError::DateParse`] before
/// any table is computed. Aggregation and insight failures never fail the
/// run; they are recorded per chart.
pub async fn process_dataset<P: TextInsightProvider>(
    raw: RawDataset,
    provider: &P,
    call_timeout: Duration,
) -> Result<DashboardRun, PipelineError> {
    let validated = validate_schema(raw)?;
    let canonical = clean_dataset(&validated)?;
    let tables = aggregate(&canonical);
    let dashboard = assemble_dashboard(provider, canonical.len(), tables, call_timeout).await;
    tracing::info!(records = canonical.len(), "dashboard assembled");
    Ok(DashboardRun {
        canonical,
        dashboard,
    })
}
