//! Dashboard assembly against in-process fake providers.

use std::time::Duration;

use medintel_insights::{
    process_dataset, InsightError, InsightStatus, NoopProvider, TextInsightProvider,
    DISABLED_PLACEHOLDER, FAILED_PLACEHOLDER,
};
use medintel_pipeline::{sample_dataset, ChartKind, PipelineError, RawDataset, RawRecord};

const TIMEOUT: Duration = Duration::from_secs(5);

/// Echoes the chart title back as a single insight.
struct EchoProvider;

impl TextInsightProvider for EchoProvider {
    async fn summarize(&self, title: &str, _summary: &str) -> Result<Vec<String>, InsightError> {
        Ok(vec![format!("insight for {title}")])
    }
}

/// Fails only for the chart with the given title.
struct FailOneProvider(&'static str);

impl TextInsightProvider for FailOneProvider {
    async fn summarize(&self, title: &str, _summary: &str) -> Result<Vec<String>, InsightError> {
        if title == self.0 {
            Err(InsightError::Api {
                status: 500,
                body: "boom".to_string(),
            })
        } else {
            Ok(vec![format!("insight for {title}")])
        }
    }
}

/// Never answers within any reasonable timeout.
struct SlowProvider;

impl TextInsightProvider for SlowProvider {
    async fn summarize(&self, _title: &str, _summary: &str) -> Result<Vec<String>, InsightError> {
        tokio::time::sleep(Duration::from_secs(60)).await;
        Ok(vec!["too late".to_string()])
    }
}

fn header_only() -> RawDataset {
    RawDataset::new(
        ["Date", "Platform", "Sentiment", "Location", "Engagements", "Media Type"]
            .map(String::from)
            .to_vec(),
        Vec::new(),
    )
}

#[tokio::test]
async fn charts_follow_fixed_order() {
    let run = process_dataset(sample_dataset(), &EchoProvider, TIMEOUT)
        .await
        .unwrap();

    let keys: Vec<ChartKind> = run.dashboard.charts.iter().map(|c| c.key).collect();
    assert_eq!(keys, ChartKind::ALL.to_vec());
    assert_eq!(run.dashboard.record_count, 7);
    assert_eq!(run.canonical.len(), 7);

    for chart in &run.dashboard.charts {
        assert_eq!(chart.insight_status, InsightStatus::Generated);
        assert_eq!(chart.insights, vec![format!("insight for {}", chart.title)]);
        assert!(chart.table.is_some());
        assert!(chart.error.is_none());
    }
}

#[tokio::test]
async fn one_failed_request_leaves_other_charts_intact() {
    let failing = ChartKind::PlatformEngagements.title();
    let run = process_dataset(sample_dataset(), &FailOneProvider(failing), TIMEOUT)
        .await
        .unwrap();

    let failed = run.dashboard.chart(ChartKind::PlatformEngagements).unwrap();
    assert_eq!(failed.insight_status, InsightStatus::Failed);
    assert_eq!(failed.insights, vec![FAILED_PLACEHOLDER]);
    assert!(failed.table.is_some(), "table survives an insight failure");

    let generated = run
        .dashboard
        .charts
        .iter()
        .filter(|c| c.insight_status == InsightStatus::Generated)
        .count();
    assert_eq!(generated, 4);
}

#[tokio::test]
async fn noop_provider_yields_disabled_placeholder() {
    let run = process_dataset(sample_dataset(), &NoopProvider, TIMEOUT)
        .await
        .unwrap();

    for chart in &run.dashboard.charts {
        assert_eq!(chart.insight_status, InsightStatus::Disabled);
        assert_eq!(chart.insights, vec![DISABLED_PLACEHOLDER]);
    }
}

#[tokio::test]
async fn slow_provider_times_out_per_chart() {
    let run = process_dataset(sample_dataset(), &SlowProvider, Duration::from_millis(50))
        .await
        .unwrap();

    for chart in &run.dashboard.charts {
        assert_eq!(chart.insight_status, InsightStatus::Failed);
        assert_eq!(chart.insights, vec![FAILED_PLACEHOLDER]);
        assert!(chart.table.is_some());
    }
}

#[tokio::test]
async fn empty_dataset_yields_five_empty_tables() {
    let run = process_dataset(header_only(), &EchoProvider, TIMEOUT)
        .await
        .unwrap();

    assert_eq!(run.dashboard.record_count, 0);
    assert_eq!(run.dashboard.charts.len(), 5);
    for chart in &run.dashboard.charts {
        assert!(chart.table.as_ref().is_some_and(|t| t.is_empty()));
    }
}

#[tokio::test]
async fn schema_error_fails_before_any_request() {
    let raw = RawDataset::new(
        ["Date", "Platform", "Engagements"].map(String::from).to_vec(),
        vec![RawRecord::new()
            .with("Date", Some("2024-03-01"))
            .with("Platform", Some("Twitter"))
            .with("Engagements", Some("10"))],
    );

    let err = process_dataset(raw, &SlowProvider, Duration::from_secs(60))
        .await
        .unwrap_err();
    match err {
        PipelineError::Schema { missing } => {
            assert_eq!(missing, vec!["Location", "Media Type", "Sentiment"]);
        }
        other => panic!("expected schema error, got {other:?}"),
    }
}

#[tokio::test]
async fn dashboard_serializes_with_snake_case_keys() {
    let run = process_dataset(sample_dataset(), &NoopProvider, TIMEOUT)
        .await
        .unwrap();
    let json = serde_json::to_value(&run.dashboard).unwrap();

    assert_eq!(json["charts"][0]["key"], "sentiment_breakdown");
    assert_eq!(json["charts"][0]["insight_status"], "disabled");
    assert!(json["charts"][0].get("error").is_none());
}
