//! Yahoo Finance data provider.
//!
//! Fetches daily OHLCV bars from Yahoo's v8 chart API with a single blocking
//! request per symbol. No retries, no rate limiting: a failed request is the
//! caller's per-symbol failure.
//!
//! Yahoo Finance has no official API and is subject to unannounced format
//! changes. Columns come back ticker-qualified, mirroring the multi-level
//! shape of the upstream tooling, and are flattened by the fetcher.

use super::frame::{ColumnKey, ProviderFrame};
use super::provider::{DataError, DataProvider, DateRange};
use chrono::NaiveDate;
use reqwest::{StatusCode, Url};
use serde::Deserialize;

/// Chart API endpoint; the symbol is appended as a path segment.
pub const DEFAULT_BASE_URL: &str = "https://query2.finance.yahoo.com/v8/finance/chart";

const USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36";

/// Yahoo Finance v8 chart API response.
#[derive(Debug, Deserialize)]
struct ChartResponse {
    chart: ChartResult,
}

#[derive(Debug, Deserialize)]
struct ChartResult {
    result: Option<Vec<ChartData>>,
    error: Option<ChartError>,
}

#[derive(Debug, Deserialize)]
struct ChartError {
    code: String,
    description: String,
}

#[derive(Debug, Deserialize)]
struct ChartData {
    #[serde(default)]
    meta: Option<ChartMeta>,
    timestamp: Option<Vec<i64>>,
    indicators: Indicators,
}

#[derive(Debug, Deserialize)]
struct ChartMeta {
    symbol: Option<String>,
    #[serde(default)]
    gmtoffset: i64,
}

#[derive(Debug, Deserialize)]
struct Indicators {
    #[serde(default)]
    quote: Vec<QuoteData>,
    adjclose: Option<Vec<AdjCloseData>>,
}

#[derive(Debug, Default, Deserialize)]
struct QuoteData {
    #[serde(default)]
    open: Vec<Option<f64>>,
    #[serde(default)]
    high: Vec<Option<f64>>,
    #[serde(default)]
    low: Vec<Option<f64>>,
    #[serde(default)]
    close: Vec<Option<f64>>,
    #[serde(default)]
    volume: Vec<Option<f64>>,
}

#[derive(Debug, Deserialize)]
struct AdjCloseData {
    #[serde(default)]
    adjclose: Vec<Option<f64>>,
}

/// Yahoo Finance data provider.
pub struct YahooProvider {
    client: reqwest::blocking::Client,
    base_url: Url,
}

impl YahooProvider {
    /// Provider against the public chart endpoint.
    pub fn new() -> Result<Self, DataError> {
        Self::with_base_url(DEFAULT_BASE_URL)
    }

    /// Provider against a custom endpoint (proxies, local mocks).
    ///
    /// The client keeps reqwest's default timeout.
    pub fn with_base_url(base_url: impl Into<String>) -> Result<Self, DataError> {
        let client = reqwest::blocking::Client::builder()
            .user_agent(USER_AGENT)
            .build()
            .map_err(|e| DataError::Network(format!("failed to build HTTP client: {e}")))?;

        let base_url = base_url.into();
        let url = Url::parse(&base_url)
            .map_err(|e| DataError::Other(format!("invalid base URL '{base_url}': {e}")))?;
        if url.cannot_be_a_base() {
            return Err(DataError::Other(format!(
                "base URL '{base_url}' cannot take a symbol path segment"
            )));
        }

        Ok(Self {
            client,
            base_url: url,
        })
    }

    /// Build the chart API request for a symbol and date range.
    ///
    /// The symbol is appended as one encoded path segment. `period2` is
    /// midnight UTC of the end date, so the end is exclusive.
    fn chart_request(
        &self,
        symbol: &str,
        range: DateRange,
    ) -> Result<reqwest::blocking::Request, DataError> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|()| DataError::Other(format!("base URL {} cannot be extended", self.base_url)))?
            .pop_if_empty()
            .push(symbol.trim());

        self.client
            .get(url)
            .query(&[
                ("period1", midnight_utc(range.start).to_string()),
                ("period2", midnight_utc(range.end).to_string()),
                ("interval", "1d".to_string()),
                ("includeAdjustedClose", "true".to_string()),
                ("events", "history".to_string()),
            ])
            .build()
            .map_err(|e| DataError::Other(format!("failed to build request for {symbol}: {e}")))
    }

    /// Turn an HTTP status and body into a frame or a classified error.
    ///
    /// Yahoo reports unknown symbols as 404 with a chart error payload, so
    /// non-2xx bodies are checked for that before falling back to `Http`.
    fn map_response(symbol: &str, status: StatusCode, body: &str) -> Result<ProviderFrame, DataError> {
        if !status.is_success() {
            if let Ok(chart) = serde_json::from_str::<ChartResponse>(body) {
                if let Some(err) = chart.chart.error {
                    return Err(chart_error(symbol, err));
                }
            }
            return Err(DataError::Http {
                status: status.as_u16(),
            });
        }

        Self::parse_body(symbol, body)
    }

    /// Parse a chart API body into a ticker-qualified frame.
    pub fn parse_body(symbol: &str, body: &str) -> Result<ProviderFrame, DataError> {
        let chart: ChartResponse = serde_json::from_str(body)
            .map_err(|e| DataError::Parse(format!("failed to parse response for {symbol}: {e}")))?;
        Self::parse_response(symbol, chart)
    }

    fn parse_response(symbol: &str, resp: ChartResponse) -> Result<ProviderFrame, DataError> {
        if let Some(err) = resp.chart.error {
            return Err(chart_error(symbol, err));
        }

        let Some(data) = resp.chart.result.and_then(|r| r.into_iter().next()) else {
            return Ok(ProviderFrame::empty());
        };

        // No timestamps: Yahoo knows the symbol but has nothing in the window.
        let timestamps = match data.timestamp {
            Some(ts) if !ts.is_empty() => ts,
            _ => return Ok(ProviderFrame::empty()),
        };

        let (ticker, gmtoffset) = match &data.meta {
            Some(meta) => (
                meta.symbol.clone().unwrap_or_else(|| symbol.to_string()),
                meta.gmtoffset,
            ),
            None => (symbol.to_string(), 0),
        };

        let quote = data.indicators.quote.into_iter().next().unwrap_or_default();
        let adj_closes = data
            .indicators
            .adjclose
            .and_then(|v| v.into_iter().next())
            .map(|a| a.adjclose);

        let mut columns: Vec<ColumnKey> = ["Open", "High", "Low", "Close"]
            .into_iter()
            .map(|field| ColumnKey::qualified(field, &ticker))
            .collect();
        if adj_closes.is_some() {
            columns.push(ColumnKey::qualified("Adj Close", &ticker));
        }
        columns.push(ColumnKey::qualified("Volume", &ticker));

        let mut frame = ProviderFrame::new(columns);

        for (i, &ts) in timestamps.iter().enumerate() {
            let date = ts
                .checked_add(gmtoffset)
                .and_then(|local| chrono::DateTime::from_timestamp(local, 0))
                .map(|dt| dt.naive_utc().date())
                .ok_or_else(|| {
                    DataError::Parse(format!("invalid timestamp {ts} (gmtoffset {gmtoffset})"))
                })?;

            let open = quote.open.get(i).copied().flatten();
            let high = quote.high.get(i).copied().flatten();
            let low = quote.low.get(i).copied().flatten();
            let close = quote.close.get(i).copied().flatten();
            let volume = quote.volume.get(i).copied().flatten();

            // Skip bars where all OHLCV are None (holidays/non-trading days)
            if open.is_none()
                && high.is_none()
                && low.is_none()
                && close.is_none()
                && volume.is_none()
            {
                continue;
            }

            let mut values = vec![open, high, low, close];
            if let Some(adj) = &adj_closes {
                values.push(adj.get(i).copied().flatten());
            }
            values.push(volume);

            frame.push_row(date, values)?;
        }

        Ok(frame)
    }
}

impl DataProvider for YahooProvider {
    fn name(&self) -> &str {
        "yahoo_finance"
    }

    fn fetch(&self, symbol: &str, range: DateRange) -> Result<ProviderFrame, DataError> {
        let request = self.chart_request(symbol, range)?;

        let resp = self
            .client
            .execute(request)
            .map_err(|e| DataError::Network(e.to_string()))?;
        let status = resp.status();
        let body = resp
            .text()
            .map_err(|e| DataError::Network(format!("failed to read body for {symbol}: {e}")))?;

        Self::map_response(symbol, status, &body)
    }
}

fn chart_error(symbol: &str, err: ChartError) -> DataError {
    if err.code == "Not Found" {
        DataError::SymbolNotFound {
            symbol: symbol.to_string(),
        }
    } else {
        DataError::Api {
            code: err.code,
            description: err.description,
        }
    }
}

fn midnight_utc(date: NaiveDate) -> i64 {
    date.and_time(chrono::NaiveTime::MIN).and_utc().timestamp()
}
