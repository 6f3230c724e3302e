//! Command handlers that run the pipeline and write dashboard artifacts.

use std::fs::{self, File};
use std::io::BufWriter;
use std::path::{Path, PathBuf};

use anyhow::Context;
use medintel_core::AppConfig;
use medintel_insights::{process_dataset, ConfiguredProvider, DashboardRun, NoopProvider};
use medintel_pipeline::{
    chart_file_name, clean_dataset, read_raw_csv, render_chart_html, sample_dataset,
    validate_schema, write_canonical_csv, RawDataset, CLEANED_CSV_FILE_NAME,
};

const DASHBOARD_JSON_FILE_NAME: &str = "dashboard.json";

fn select_provider(config: &AppConfig, no_insights: bool) -> anyhow::Result<ConfiguredProvider> {
    if no_insights {
        return Ok(ConfiguredProvider::Disabled(NoopProvider));
    }
    Ok(ConfiguredProvider::from_config(config)?)
}

fn read_csv_file(path: &Path) -> anyhow::Result<RawDataset> {
    let file = File::open(path).with_context(|| format!("opening {}", path.display()))?;
    read_raw_csv(file).with_context(|| format!("reading {}", path.display()))
}

/// Writes the cleaned CSV, one HTML file per chart with a table, and the
/// dashboard as JSON. Returns the paths written.
///
/// # Errors
///
/// Returns an error if the directory or any file cannot be written.
pub(crate) fn write_outputs(run: &DashboardRun, out_dir: &Path) -> anyhow::Result<Vec<PathBuf>> {
    fs::create_dir_all(out_dir).with_context(|| format!("creating {}", out_dir.display()))?;
    let mut written = Vec::new();

    let csv_path = out_dir.join(CLEANED_CSV_FILE_NAME);
    let file = File::create(&csv_path).with_context(|| format!("creating {}", csv_path.display()))?;
    write_canonical_csv(&run.canonical, BufWriter::new(file))?;
    written.push(csv_path);

    for chart in &run.dashboard.charts {
        let Some(table) = &chart.table else {
            tracing::warn!(chart = chart.key.key(), "no table for chart; skipping HTML export");
            continue;
        };
        let path = out_dir.join(chart_file_name(chart.key));
        fs::write(&path, render_chart_html(table))
            .with_context(|| format!("writing {}", path.display()))?;
        written.push(path);
    }

    let json_path = out_dir.join(DASHBOARD_JSON_FILE_NAME);
    let json = serde_json::to_vec_pretty(&run.dashboard)?;
    fs::write(&json_path, json).with_context(|| format!("writing {}", json_path.display()))?;
    written.push(json_path);

    Ok(written)
}

fn print_dashboard(run: &DashboardRun) {
    println!("{} records processed", run.dashboard.record_count);
    for chart in &run.dashboard.charts {
        println!();
        println!("## {}", chart.title);
        if let Some(error) = &chart.error {
            println!("  (table unavailable: {error})");
        }
        for insight in &chart.insights {
            println!("  - {insight}");
        }
    }
}

async fn run_dataset(
    config: &AppConfig,
    raw: RawDataset,
    out_dir: &Path,
    no_insights: bool,
) -> anyhow::Result<()> {
    let provider = select_provider(config, no_insights)?;
    let timeout = config.insight_deadline();
    let run = process_dataset(raw, &provider, timeout).await?;

    let written = write_outputs(&run, out_dir)?;
    print_dashboard(&run);
    println!();
    for path in &written {
        println!("wrote {}", path.display());
    }
    Ok(())
}

/// Runs the full pipeline over a CSV file.
///
/// # Errors
///
/// Returns an error if the file cannot be read, fails validation or
/// cleaning, or the outputs cannot be written.
pub(crate) async fn run_process(
    config: &AppConfig,
    csv: &Path,
    out_dir: &Path,
    no_insights: bool,
) -> anyhow::Result<()> {
    let raw = read_csv_file(csv)?;
    run_dataset(config, raw, out_dir, no_insights).await
}

/// Runs the full pipeline over the built-in sample dataset.
///
/// # Errors
///
/// Returns an error if the outputs cannot be written.
pub(crate) async fn run_sample(
    config: &AppConfig,
    out_dir: &Path,
    no_insights: bool,
) -> anyhow::Result<()> {
    run_dataset(config, sample_dataset(), out_dir, no_insights).await
}

/// Validates a CSV without aggregating it.
///
/// # Errors
///
/// Returns an error naming the missing columns or the first unparseable date.
pub(crate) fn run_validate(csv: &Path) -> anyhow::Result<()> {
    let raw = read_csv_file(csv)?;
    let validated = validate_schema(raw)?;
    let canonical = clean_dataset(&validated)?;
    println!("{}: {} records valid", csv.display(), canonical.len());
    Ok(())
}
