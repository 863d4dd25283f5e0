//! Progress reporting for batch downloads.
//!
//! The fetcher never talks to a global logger directly: callers inject a
//! [`DownloadProgress`] scoped to one batch. [`LogProgress`] forwards to the
//! `log` facade, [`SilentProgress`] drops everything.

use super::download::{BatchReport, FetchOutcome};
use super::provider::DateRange;
use log::{error, info, warn};

/// Progress callback for multi-symbol operations.
pub trait DownloadProgress: Send {
    /// Called once, after duplicates are removed.
    fn on_batch_start(&self, provider: &str, total: usize, range: DateRange);

    /// Called when starting to fetch a symbol.
    fn on_start(&self, symbol: &str, index: usize, total: usize);

    /// Called when a symbol has been fetched (or failed to).
    fn on_complete(&self, symbol: &str, index: usize, total: usize, outcome: &FetchOutcome);

    /// Called for a repeated symbol at input position `index`.
    fn on_skip_duplicate(&self, symbol: &str, index: usize);

    /// Called when the entire batch is done.
    fn on_batch_complete(&self, report: &BatchReport);
}

/// Reports through `log` records (info / warn / error).
#[derive(Debug, Default, Clone, Copy)]
pub struct LogProgress;

impl DownloadProgress for LogProgress {
    fn on_batch_start(&self, provider: &str, total: usize, range: DateRange) {
        info!("Starting download for {total} assets from {range} via {provider}");
    }

    fn on_start(&self, symbol: &str, index: usize, total: usize) {
        info!("[{}/{}] Downloading {symbol}...", index + 1, total);
    }

    fn on_complete(&self, symbol: &str, _index: usize, _total: usize, outcome: &FetchOutcome) {
        match outcome {
            FetchOutcome::Fetched { series, path } => {
                info!("{symbol}: {} rows saved to {}", series.len(), path.display())
            }
            FetchOutcome::Empty => warn!("No data found for {symbol}"),
            FetchOutcome::Failed(e) => error!("Failed to download {symbol}: {e}"),
        }
    }

    fn on_skip_duplicate(&self, symbol: &str, index: usize) {
        warn!("Skipping duplicate symbol {symbol} at position {}", index + 1);
    }

    fn on_batch_complete(&self, report: &BatchReport) {
        info!(
            "Download complete: {}/{} successful",
            report.succeeded(),
            report.total
        );
        if !report.all_succeeded() {
            warn!(
                "Failed downloads ({}): {:?}",
                report.failed(),
                report.failed_symbols()
            );
        }
    }
}

/// Discards all progress events.
#[derive(Debug, Default, Clone, Copy)]
pub struct SilentProgress;

impl DownloadProgress for SilentProgress {
    fn on_batch_start(&self, _provider: &str, _total: usize, _range: DateRange) {}
    fn on_start(&self, _symbol: &str, _index: usize, _total: usize) {}
    fn on_complete(&self, _symbol: &str, _index: usize, _total: usize, _outcome: &FetchOutcome) {}
    fn on_skip_duplicate(&self, _symbol: &str, _index: usize) {}
    fn on_batch_complete(&self, _report: &BatchReport) {}
}
