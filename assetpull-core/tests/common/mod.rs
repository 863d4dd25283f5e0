//! Shared stubs for batch-fetch integration tests.

#![allow(dead_code)]

use assetpull_core::data::{
    BatchReport, ColumnKey, DataError, DataProvider, DateRange, DownloadProgress, FetchOutcome,
    ProviderFrame,
};
use chrono::{Duration, NaiveDate};
use std::collections::HashMap;
use std::sync::Mutex;

/// What the stub provider does for one symbol.
#[derive(Debug, Clone, Copy)]
pub enum Script {
    /// `n` rows with single-level columns.
    Flat(usize),
    /// `n` rows with ticker-qualified columns.
    Qualified(usize),
    /// Zero rows.
    Empty,
    /// Provider error.
    Fail,
}

/// Deterministic provider driven by a per-symbol script.
pub struct ScriptedProvider {
    scripts: HashMap<String, Script>,
    calls: Mutex<Vec<String>>,
}

impl ScriptedProvider {
    pub fn new(scripts: &[(&str, Script)]) -> Self {
        Self {
            scripts: scripts
                .iter()
                .map(|(s, script)| (s.to_string(), *script))
                .collect(),
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }
}

impl DataProvider for ScriptedProvider {
    fn name(&self) -> &str {
        "scripted"
    }

    fn fetch(&self, symbol: &str, range: DateRange) -> Result<ProviderFrame, DataError> {
        self.calls.lock().unwrap().push(symbol.to_string());
        match self.scripts.get(symbol).copied().unwrap_or(Script::Empty) {
            Script::Flat(n) => Ok(frame(symbol, range.start, n, false)),
            Script::Qualified(n) => Ok(frame(symbol, range.start, n, true)),
            Script::Empty => Ok(ProviderFrame::empty()),
            Script::Fail => Err(DataError::Network(format!("connection reset for {symbol}"))),
        }
    }
}

/// `n` consecutive daily rows starting at `start`, prices derived from the row index.
pub fn frame(symbol: &str, start: NaiveDate, n: usize, qualified: bool) -> ProviderFrame {
    let fields = ["Open", "High", "Low", "Close", "Adj Close", "Volume"];
    let columns = fields
        .iter()
        .map(|f| {
            if qualified {
                ColumnKey::qualified(*f, symbol)
            } else {
                ColumnKey::flat(*f)
            }
        })
        .collect();

    let mut frame = ProviderFrame::new(columns);
    for i in 0..n {
        let base = 100.0 + i as f64 * 0.5;
        frame
            .push_row(
                start + Duration::days(i as i64),
                vec![
                    Some(base),
                    Some(base + 1.25),
                    Some(base - 0.75),
                    Some(base + 0.5),
                    Some(base + 0.25),
                    Some(1_000.0 + i as f64),
                ],
            )
            .unwrap();
    }
    frame
}

pub fn range() -> DateRange {
    DateRange::parse("2018-01-01", "2025-06-12").unwrap()
}

/// Records every progress event as a short string.
#[derive(Default)]
pub struct RecordingProgress {
    pub events: Mutex<Vec<String>>,
}

impl RecordingProgress {
    pub fn events(&self) -> Vec<String> {
        self.events.lock().unwrap().clone()
    }

    fn push(&self, event: String) {
        self.events.lock().unwrap().push(event);
    }
}

impl DownloadProgress for RecordingProgress {
    fn on_batch_start(&self, provider: &str, total: usize, _range: DateRange) {
        self.push(format!("batch_start {provider} {total}"));
    }

    fn on_start(&self, symbol: &str, index: usize, total: usize) {
        self.push(format!("start {symbol} {}/{total}", index + 1));
    }

    fn on_complete(&self, symbol: &str, _index: usize, _total: usize, outcome: &FetchOutcome) {
        let what = match outcome {
            FetchOutcome::Fetched { series, .. } => format!("ok {}", series.len()),
            FetchOutcome::Empty => "empty".to_string(),
            FetchOutcome::Failed(_) => "failed".to_string(),
        };
        self.push(format!("complete {symbol} {what}"));
    }

    fn on_skip_duplicate(&self, symbol: &str, index: usize) {
        self.push(format!("duplicate {symbol} {index}"));
    }

    fn on_batch_complete(&self, report: &BatchReport) {
        self.push(format!("batch_complete {}/{}", report.succeeded(), report.total));
    }
}
