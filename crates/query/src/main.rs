use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use serde::Serialize;
use tariff_core::Config;
use tariff_query::{format_query, Dashboard, QueryResult, SummaryTable};
use tracing_subscriber::EnvFilter;

/// Tariff and trade summary for one six-digit subheading.
#[derive(Debug, Parser)]
#[command(name = "tariff-dash", version, about = "Mexico/US tariff dashboard")]
struct Cli {
    /// Six-digit subheading code, e.g. 870321.
    code: String,

    /// Workbook file (.xlsx) or directory of per-sheet CSV files.
    #[arg(short, long)]
    workbook: Option<PathBuf>,

    /// JSON configuration file.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Print the result as JSON instead of text.
    #[arg(long)]
    json: bool,
}

#[derive(Serialize)]
struct JsonReport<'a> {
    #[serde(flatten)]
    result: &'a QueryResult,
    table: Option<SummaryTable>,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => Config::from_json_file(path)
            .with_context(|| format!("reading config {}", path.display()))?,
        None => Config::default(),
    };
    if let Some(path) = cli.workbook {
        config.dataset.path = path;
    }
    config.validate()?;

    let dashboard = Dashboard::from_config(config);
    let result = dashboard
        .query(&cli.code)
        .context("loading tariff workbook")?;

    if cli.json {
        let report = JsonReport {
            table: dashboard.summary_table(&result),
            result: &result,
        };
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        print!("{}", format_query(&result));
    }

    Ok(())
}
