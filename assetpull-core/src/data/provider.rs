//! Data provider trait and structured error types.
//!
//! The DataProvider trait abstracts over market-data sources so the batch
//! fetcher can run against Yahoo Finance in production and canned frames in
//! tests.

use super::frame::ProviderFrame;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;
use thiserror::Error;

/// Structured error types for data operations.
///
/// Everything that can go wrong for a single identifier lands here, so the
/// fetcher can record it as a per-identifier failure and move on.
#[derive(Debug, Error)]
pub enum DataError {
    #[error("network unreachable: {0}")]
    Network(String),

    #[error("provider returned HTTP {status}")]
    Http { status: u16 },

    #[error("response parse error: {0}")]
    Parse(String),

    #[error("provider error [{code}]: {description}")]
    Api { code: String, description: String },

    #[error("symbol not found: {symbol}")]
    SymbolNotFound { symbol: String },

    #[error("invalid date range: {0}")]
    InvalidRange(String),

    #[error("{symbol}: output file {} is already used by {owner}", .path.display())]
    OutputCollision {
        symbol: String,
        path: PathBuf,
        owner: String,
    },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("data error: {0}")]
    Other(String),
}

/// Calendar window for a historical query: `start` inclusive, `end` exclusive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateRange {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl DateRange {
    pub fn new(start: NaiveDate, end: NaiveDate) -> Result<Self, DataError> {
        if end <= start {
            return Err(DataError::InvalidRange(format!(
                "end {end} must be after start {start}"
            )));
        }
        Ok(Self { start, end })
    }

    /// Parse a range from two `YYYY-MM-DD` strings.
    pub fn parse(start: &str, end: &str) -> Result<Self, DataError> {
        let parse = |s: &str| {
            NaiveDate::parse_from_str(s.trim(), "%Y-%m-%d")
                .map_err(|e| DataError::InvalidRange(format!("'{s}': {e}")))
        };
        Self::new(parse(start)?, parse(end)?)
    }
}

impl fmt::Display for DateRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} to {}", self.start, self.end)
    }
}

/// Trait for market-data providers.
///
/// Given an identifier and a date range, return the provider's table of dated
/// rows. An empty frame means "no data for this window" and is not an error.
pub trait DataProvider: Send + Sync {
    /// Human-readable name of this provider.
    fn name(&self) -> &str;

    /// Fetch daily bars for a symbol over `[range.start, range.end)`.
    fn fetch(&self, symbol: &str, range: DateRange) -> Result<ProviderFrame, DataError>;
}
