//! Normalized price rows and the row-sequence type used for persistence.
//!
//! Column order on disk is fixed: Date, Open, High, Low, Close, Adj Close,
//! Volume, Ticker. Serde renames carry the on-disk names so the CSV header is
//! derived from the struct itself.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// One daily record, tagged with the identifier it was fetched for.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PriceRow {
    #[serde(rename = "Date")]
    pub date: NaiveDate,
    #[serde(rename = "Open")]
    pub open: Option<f64>,
    #[serde(rename = "High")]
    pub high: Option<f64>,
    #[serde(rename = "Low")]
    pub low: Option<f64>,
    #[serde(rename = "Close")]
    pub close: Option<f64>,
    #[serde(rename = "Adj Close")]
    pub adj_close: Option<f64>,
    #[serde(rename = "Volume")]
    pub volume: Option<u64>,
    #[serde(rename = "Ticker")]
    pub ticker: String,
}

impl PriceRow {
    /// CSV header, in serialization order.
    pub const HEADER: [&'static str; 8] = [
        "Date",
        "Open",
        "High",
        "Low",
        "Close",
        "Adj Close",
        "Volume",
        "Ticker",
    ];
}

/// Ordered sequence of price rows.
///
/// Row position is the only index; concatenation is a plain append, so the
/// combined dataset keeps download order rather than date order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PriceSeries {
    rows: Vec<PriceRow>,
}

impl PriceSeries {
    pub fn new(rows: Vec<PriceRow>) -> Self {
        Self { rows }
    }

    pub fn rows(&self) -> &[PriceRow] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Append all rows of `other` after the rows of `self`.
    pub fn append(&mut self, other: &PriceSeries) {
        self.rows.extend_from_slice(&other.rows);
    }

    /// Concatenate series in iteration order.
    pub fn concat<'a>(parts: impl IntoIterator<Item = &'a PriceSeries>) -> PriceSeries {
        let mut combined = PriceSeries::default();
        for part in parts {
            combined.append(part);
        }
        combined
    }

    /// Distinct ticker tags in first-seen order.
    pub fn tickers(&self) -> Vec<&str> {
        let mut seen: Vec<&str> = Vec::new();
        for row in &self.rows {
            if !seen.contains(&row.ticker.as_str()) {
                seen.push(&row.ticker);
            }
        }
        seen
    }

    /// Earliest and latest dates present, if any rows exist.
    pub fn date_span(&self) -> Option<(NaiveDate, NaiveDate)> {
        let first = self.rows.iter().map(|r| r.date).min()?;
        let last = self.rows.iter().map(|r| r.date).max()?;
        Some((first, last))
    }
}

impl FromIterator<PriceRow> for PriceSeries {
    fn from_iter<I: IntoIterator<Item = PriceRow>>(iter: I) -> Self {
        Self::new(iter.into_iter().collect())
    }
}
