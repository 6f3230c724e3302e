use std::time::Duration;

use medintel_insights::{process_dataset, NoopProvider};
use medintel_pipeline::sample_dataset;

use super::*;

#[test]
fn parses_process_with_defaults() {
    let cli = Cli::try_parse_from(["medintel", "process", "data.csv"]).expect("valid cli args");

    match cli.command {
        Commands::Process {
            csv,
            out,
            no_insights,
        } => {
            assert_eq!(csv, PathBuf::from("data.csv"));
            assert_eq!(out, PathBuf::from("."));
            assert!(!no_insights);
        }
        other => panic!("expected process, got {other:?}"),
    }
}

#[test]
fn parses_process_with_out_and_no_insights() {
    let cli = Cli::try_parse_from([
        "medintel",
        "process",
        "data.csv",
        "--out",
        "report",
        "--no-insights",
    ])
    .expect("valid cli args");

    assert!(matches!(
        cli.command,
        Commands::Process { ref out, no_insights: true, .. } if out == &PathBuf::from("report")
    ));
}

#[test]
fn parses_validate() {
    let cli = Cli::try_parse_from(["medintel", "validate", "data.csv"]).expect("valid cli args");
    assert!(matches!(cli.command, Commands::Validate { .. }));
}

#[test]
fn parses_sample() {
    let cli =
        Cli::try_parse_from(["medintel", "sample", "--no-insights"]).expect("valid cli args");
    assert!(matches!(
        cli.command,
        Commands::Sample {
            no_insights: true,
            ..
        }
    ));
}

#[test]
fn command_is_required() {
    assert!(Cli::try_parse_from(["medintel"]).is_err());
}

#[test]
fn validate_requires_csv_path() {
    assert!(Cli::try_parse_from(["medintel", "validate"]).is_err());
}

#[tokio::test]
async fn write_outputs_creates_all_artifacts() {
    let run = process_dataset(sample_dataset(), &NoopProvider, Duration::from_secs(1))
        .await
        .expect("sample processes");
    let out_dir = std::env::temp_dir().join(format!("medintel-cli-{}", uuid::Uuid::new_v4()));

    let written = dashboard::write_outputs(&run, &out_dir).expect("outputs written");
    assert_eq!(written.len(), 7);

    for name in [
        "cleaned_media_intelligence_data.csv",
        "sentiment_breakdown_chart.html",
        "engagement_trend_chart.html",
        "platform_engagements_chart.html",
        "media_type_mix_chart.html",
        "top_locations_chart.html",
        "dashboard.json",
    ] {
        assert!(out_dir.join(name).is_file(), "{name} missing");
    }

    let csv = std::fs::read_to_string(out_dir.join("cleaned_media_intelligence_data.csv"))
        .expect("read csv");
    assert_eq!(csv.lines().count(), 8);

    let json: serde_json::Value = serde_json::from_slice(
        &std::fs::read(out_dir.join("dashboard.json")).expect("read json"),
    )
    .expect("parse json");
    assert_eq!(json["record_count"], 7);

    std::fs::remove_dir_all(&out_dir).expect("cleanup");
}
