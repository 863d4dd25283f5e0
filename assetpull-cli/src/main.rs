//! assetpull CLI: download, inspect and defaults commands.
//!
//! Commands:
//! - `download`: fetch daily bars from Yahoo Finance and write raw CSV files
//! - `inspect`: summarize a CSV written by `download`
//! - `defaults`: print the built-in batch configuration as TOML

use anyhow::{Context, Result};
use assetpull_core::data::{
    combine, fetch_all, read_series, CsvSink, LogProgress, YahooProvider,
};
use assetpull_core::BatchConfig;
use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use log::{info, warn};
use std::path::{Path, PathBuf};

#[derive(Parser)]
#[command(
    name = "assetpull",
    about = "assetpull: historical price download for crypto and traditional assets"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Download daily bars and write per-symbol and combined CSV files.
    Download {
        /// Symbols to download (e.g., SPY BTC-USD ^VIX). Defaults to the configured list.
        symbols: Vec<String>,

        /// Start date (YYYY-MM-DD), inclusive.
        #[arg(long)]
        start: Option<String>,

        /// End date (YYYY-MM-DD), exclusive.
        #[arg(long)]
        end: Option<String>,

        /// Output directory. Defaults to ./data/raw.
        #[arg(long)]
        output_dir: Option<PathBuf>,

        /// TOML batch config; flags override its values.
        #[arg(long)]
        config: Option<PathBuf>,

        /// Alternative chart API endpoint.
        #[arg(long)]
        base_url: Option<String>,
    },
    /// Summarize a CSV file written by `download`.
    Inspect {
        /// Path to a *_raw.csv or all_assets_raw.csv file.
        file: PathBuf,
    },
    /// Print the default batch configuration as TOML.
    Defaults,
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Download {
            symbols,
            start,
            end,
            output_dir,
            config,
            base_url,
        } => {
            let batch = resolve_config(symbols, start, end, output_dir, config)?;
            run_download(&batch, base_url)
        }
        Commands::Inspect { file } => run_inspect(&file),
        Commands::Defaults => {
            print!("{}", BatchConfig::default().to_toml()?);
            Ok(())
        }
    }
}

/// Layer defaults, then the config file, then command-line flags.
fn resolve_config(
    symbols: Vec<String>,
    start: Option<String>,
    end: Option<String>,
    output_dir: Option<PathBuf>,
    config_path: Option<PathBuf>,
) -> Result<BatchConfig> {
    let mut batch = match config_path {
        Some(path) => BatchConfig::from_file(&path)
            .with_context(|| format!("failed to load config {}", path.display()))?,
        None => BatchConfig::default(),
    };

    if !symbols.is_empty() {
        batch.symbols = symbols;
    }
    if let Some(s) = start.as_deref() {
        batch.start = parse_date(s)?;
    }
    if let Some(e) = end.as_deref() {
        batch.end = parse_date(e)?;
    }
    if let Some(dir) = output_dir {
        batch.output_dir = dir;
    }

    batch.validate()?;
    Ok(batch)
}

fn parse_date(s: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(s, "%Y-%m-%d").with_context(|| format!("invalid date '{s}'"))
}

fn run_download(batch: &BatchConfig, base_url: Option<String>) -> Result<()> {
    let range = batch.range()?;
    let symbols = batch.symbol_refs();

    info!("=== ASSET DATA EXTRACTION ===");
    info!("Timeframe: {range}");
    info!("Assets to download: {symbols:?}");

    let provider = match base_url {
        Some(url) => YahooProvider::with_base_url(url)?,
        None => YahooProvider::new()?,
    };
    let sink = CsvSink::new(&batch.output_dir);

    let report = fetch_all(&provider, &symbols, range, &sink, &LogProgress).with_context(|| {
        format!(
            "failed to create output directory {}",
            batch.output_dir.display()
        )
    })?;

    match combine(&report.results, &sink)? {
        Some(combined) => info!(
            "Combined dataset saved: {} ({} total rows)",
            combined.path.display(),
            combined.series.len()
        ),
        None => warn!("No successful downloads; combined dataset not written"),
    }

    info!("=== EXTRACTION COMPLETE ===");
    Ok(())
}

fn run_inspect(file: &Path) -> Result<()> {
    let series =
        read_series(file).with_context(|| format!("failed to read {}", file.display()))?;

    println!("File: {}", file.display());
    println!("Rows: {}", series.len());
    match series.date_span() {
        Some((first, last)) => println!("Dates: {first} to {last}"),
        None => println!("Dates: (none)"),
    }
    println!("Tickers: {}", series.tickers().join(", "));

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flags_override_defaults() {
        let batch = resolve_config(
            vec!["SPY".into()],
            Some("2020-01-01".into()),
            None,
            Some(PathBuf::from("out")),
            None,
        )
        .unwrap();

        assert_eq!(batch.symbols, vec!["SPY"]);
        assert_eq!(batch.start.to_string(), "2020-01-01");
        assert_eq!(batch.end, BatchConfig::default().end);
        assert_eq!(batch.output_dir, PathBuf::from("out"));
    }

    #[test]
    fn no_flags_is_reference_run() {
        let batch = resolve_config(vec![], None, None, None, None).unwrap();
        assert_eq!(batch, BatchConfig::default());
    }

    #[test]
    fn inverted_range_is_rejected() {
        let result = resolve_config(
            vec![],
            Some("2025-01-01".into()),
            Some("2024-01-01".into()),
            None,
            None,
        );
        assert!(result.is_err());
    }

    #[test]
    fn bad_date_is_rejected() {
        assert!(parse_date("01/02/2024").is_err());
    }

    #[test]
    fn cli_parses_download_flags() {
        let cli = Cli::try_parse_from([
            "assetpull",
            "download",
            "SPY",
            "^VIX",
            "--start",
            "2024-01-01",
            "--output-dir",
            "tmp/raw",
        ])
        .unwrap();

        match cli.command {
            Commands::Download {
                symbols,
                start,
                output_dir,
                ..
            } => {
                assert_eq!(symbols, vec!["SPY", "^VIX"]);
                assert_eq!(start.as_deref(), Some("2024-01-01"));
                assert_eq!(output_dir, Some(PathBuf::from("tmp/raw")));
            }
            _ => panic!("expected download command"),
        }
    }
}
