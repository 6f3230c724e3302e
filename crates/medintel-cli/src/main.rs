mod dashboard;

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(name = "medintel")]
#[command(about = "Media intelligence dashboard command line interface")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Clean, aggregate, and chart an uploaded CSV
    Process {
        /// Path to the CSV file
        csv: PathBuf,

        /// Directory for the cleaned CSV, chart files, and dashboard.json
        #[arg(long, default_value = ".")]
        out: PathBuf,

        /// Skip model insights even when an API key is configured
        #[arg(long)]
        no_insights: bool,
    },
    /// Check a CSV for required columns and parseable dates
    Validate {
        /// Path to the CSV file
        csv: PathBuf,
    },
    /// Run the full pipeline over the built-in sample dataset
    Sample {
        /// Directory for the cleaned CSV, chart files, and dashboard.json
        #[arg(long, default_value = ".")]
        out: PathBuf,

        /// Skip model insights even when an API key is configured
        #[arg(long)]
        no_insights: bool,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let config = medintel_core::load_app_config()?;
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(config.log_level.clone()))?;
    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    match cli.command {
        Commands::Process {
            csv,
            out,
            no_insights,
        } => dashboard::run_process(&config, &csv, &out, no_insights).await,
        Commands::Validate { csv } => dashboard::run_validate(&csv),
        Commands::Sample { out, no_insights } => {
            dashboard::run_sample(&config, &out, no_insights).await
        }
    }
}

#[cfg(test)]
mod tests;
