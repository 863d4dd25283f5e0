//! Batch fetcher: sequential multi-symbol download with per-symbol failure
//! isolation, plus the combine step that concatenates successful series.

use super::progress::DownloadProgress;
use super::provider::{DataError, DataProvider, DateRange};
use super::series::PriceSeries;
use super::sink::CsvSink;
use indexmap::IndexMap;
use std::path::PathBuf;
use thiserror::Error;

/// What happened to one identifier.
#[derive(Debug)]
pub enum FetchOutcome {
    /// Non-empty series, already written to `path`.
    Fetched { series: PriceSeries, path: PathBuf },
    /// Provider returned zero rows for the window.
    Empty,
    /// Request, normalization or write failed.
    Failed(DataError),
}

/// Why an identifier ended up in the failure list.
#[derive(Debug, Error)]
pub enum FailureReason {
    #[error("no data returned for the requested range")]
    Empty,

    #[error(transparent)]
    Error(#[from] DataError),
}

/// Summary of a batch download.
#[derive(Debug, Default)]
pub struct BatchReport {
    /// Successful series in download order.
    pub results: IndexMap<String, PriceSeries>,
    /// Failed identifiers in download order, with the reason.
    pub failures: Vec<(String, FailureReason)>,
    /// Distinct identifiers processed.
    pub total: usize,
}

impl BatchReport {
    pub fn succeeded(&self) -> usize {
        self.results.len()
    }

    pub fn failed(&self) -> usize {
        self.failures.len()
    }

    pub fn all_succeeded(&self) -> bool {
        self.failures.is_empty()
    }

    pub fn failed_symbols(&self) -> Vec<&str> {
        self.failures.iter().map(|(s, _)| s.as_str()).collect()
    }

    fn record(&mut self, symbol: &str, outcome: FetchOutcome) {
        match outcome {
            FetchOutcome::Fetched { series, .. } => {
                self.results.insert(symbol.to_string(), series);
            }
            FetchOutcome::Empty => self.failures.push((symbol.to_string(), FailureReason::Empty)),
            FetchOutcome::Failed(e) => self
                .failures
                .push((symbol.to_string(), FailureReason::Error(e))),
        }
    }
}

/// Download every symbol in order, writing one CSV per success.
///
/// Only a failure to create the output directory is returned as an error.
/// Everything that goes wrong for a single symbol is recorded in the report
/// and the loop moves on. Repeated symbols are processed once, and a symbol
/// whose file name clashes with an earlier one fails without being fetched.
pub fn fetch_all(
    provider: &dyn DataProvider,
    symbols: &[&str],
    range: DateRange,
    sink: &CsvSink,
    progress: &dyn DownloadProgress,
) -> Result<BatchReport, DataError> {
    sink.ensure_dir()?;

    let mut unique: Vec<&str> = Vec::with_capacity(symbols.len());
    for (i, &symbol) in symbols.iter().enumerate() {
        if unique.contains(&symbol) {
            progress.on_skip_duplicate(symbol, i);
        } else {
            unique.push(symbol);
        }
    }

    let total = unique.len();
    progress.on_batch_start(provider.name(), total, range);

    let mut report = BatchReport {
        total,
        ..BatchReport::default()
    };
    let mut written: Vec<(PathBuf, &str)> = Vec::with_capacity(total);

    for (i, &symbol) in unique.iter().enumerate() {
        progress.on_start(symbol, i, total);
        let outcome = match check_output_path(sink, symbol, &written) {
            Ok(()) => fetch_single(provider, sink, symbol, range),
            Err(e) => FetchOutcome::Failed(e),
        };
        if let FetchOutcome::Fetched { path, .. } = &outcome {
            written.push((path.clone(), symbol));
        }
        progress.on_complete(symbol, i, total, &outcome);
        report.record(symbol, outcome);
    }

    progress.on_batch_complete(&report);
    Ok(report)
}

/// Refuse a symbol whose sanitized file name is the combined file or was
/// already written earlier in this batch (`BTC-USD` and `BTC_USD`).
fn check_output_path(
    sink: &CsvSink,
    symbol: &str,
    written: &[(PathBuf, &str)],
) -> Result<(), DataError> {
    let path = sink.series_path(symbol);
    let owner = if path == sink.combined_path() {
        Some("the combined dataset".to_string())
    } else {
        written
            .iter()
            .find(|(p, _)| *p == path)
            .map(|(_, other)| other.to_string())
    };

    match owner {
        Some(owner) => Err(DataError::OutputCollision {
            symbol: symbol.to_string(),
            path,
            owner,
        }),
        None => Ok(()),
    }
}

/// Download a single symbol: fetch → flatten → tag → write.
fn fetch_single(
    provider: &dyn DataProvider,
    sink: &CsvSink,
    symbol: &str,
    range: DateRange,
) -> FetchOutcome {
    let frame = match provider.fetch(symbol, range) {
        Ok(frame) => frame,
        Err(e) => return FetchOutcome::Failed(e),
    };

    if frame.is_empty() {
        return FetchOutcome::Empty;
    }

    let series = match frame.flatten().into_series(symbol) {
        Ok(series) => series,
        Err(e) => return FetchOutcome::Failed(e),
    };

    match sink.write_series(symbol, &series) {
        Ok(path) => FetchOutcome::Fetched { series, path },
        Err(e) => FetchOutcome::Failed(e),
    }
}

/// The combined dataset and where it was written.
#[derive(Debug)]
pub struct CombinedOutput {
    pub series: PriceSeries,
    pub path: PathBuf,
}

/// Concatenate all successful series in map order and write the combined file.
///
/// An empty map writes nothing and returns `Ok(None)`.
pub fn combine(
    results: &IndexMap<String, PriceSeries>,
    sink: &CsvSink,
) -> Result<Option<CombinedOutput>, DataError> {
    if results.is_empty() {
        return Ok(None);
    }

    let series = PriceSeries::concat(results.values());
    let path = sink.write_combined(&series)?;
    Ok(Some(CombinedOutput { series, path }))
}
