//! CSV persistence for per-identifier and combined price files.
//!
//! Layout:
//! - `{dir}/{sanitized}_raw.csv` per successful identifier
//! - `{dir}/all_assets_raw.csv` for the combined dataset
//!
//! Writes are atomic: write to `.tmp`, then rename into place.

use super::provider::DataError;
use super::series::{PriceRow, PriceSeries};
use std::fs;
use std::path::{Path, PathBuf};

/// File name of the combined dataset.
pub const COMBINED_FILE_NAME: &str = "all_assets_raw.csv";

/// Suffix appended to each per-identifier file stem.
const SERIES_SUFFIX: &str = "_raw.csv";

/// Make an identifier safe to use as a file stem.
///
/// `-` becomes `_` (so `BTC-USD` → `BTC_USD`), as does any character that is
/// not allowed in file names on common filesystems.
pub fn sanitize_identifier(identifier: &str) -> String {
    identifier
        .trim()
        .chars()
        .map(|c| match c {
            '-' | '/' | '\\' | ':' | '*' | '?' | '"' | '<' | '>' | '|' => '_',
            c if c.is_control() => '_',
            c => c,
        })
        .collect()
}

/// Writes price series as CSV under one output directory.
#[derive(Debug, Clone)]
pub struct CsvSink {
    dir: PathBuf,
}

impl CsvSink {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Create the output directory and its parents. Idempotent.
    pub fn ensure_dir(&self) -> Result<(), DataError> {
        fs::create_dir_all(&self.dir)?;
        Ok(())
    }

    pub fn series_path(&self, identifier: &str) -> PathBuf {
        self.dir
            .join(format!("{}{SERIES_SUFFIX}", sanitize_identifier(identifier)))
    }

    pub fn combined_path(&self) -> PathBuf {
        self.dir.join(COMBINED_FILE_NAME)
    }

    /// Write one identifier's series to `{dir}/{sanitized}_raw.csv`.
    pub fn write_series(&self, identifier: &str, series: &PriceSeries) -> Result<PathBuf, DataError> {
        let path = self.series_path(identifier);
        write_atomic(&path, series)?;
        Ok(path)
    }

    /// Write the combined dataset to `{dir}/all_assets_raw.csv`.
    pub fn write_combined(&self, series: &PriceSeries) -> Result<PathBuf, DataError> {
        let path = self.combined_path();
        write_atomic(&path, series)?;
        Ok(path)
    }
}

fn write_atomic(path: &Path, series: &PriceSeries) -> Result<(), DataError> {
    let tmp_path = path.with_extension("csv.tmp");

    let result = write_csv(&tmp_path, series).and_then(|()| {
        fs::rename(&tmp_path, path).map_err(DataError::from)
    });
    if result.is_err() {
        let _ = fs::remove_file(&tmp_path);
    }
    result
}

fn write_csv(path: &Path, series: &PriceSeries) -> Result<(), DataError> {
    let mut wtr = csv::WriterBuilder::new()
        .has_headers(false)
        .terminator(csv::Terminator::Any(b'\n'))
        .from_path(path)?;

    // Header written explicitly so even an empty series gets one.
    wtr.write_record(PriceRow::HEADER)?;
    for row in series.rows() {
        wtr.serialize(row)?;
    }
    wtr.flush()?;
    Ok(())
}

/// Load a file written by [`CsvSink`] back into memory.
pub fn read_series(path: &Path) -> Result<PriceSeries, DataError> {
    let mut rdr = csv::Reader::from_path(path)?;

    let header = rdr.headers()?.clone();
    if header.iter().ne(PriceRow::HEADER) {
        return Err(DataError::Parse(format!(
            "unexpected header in {}: {:?}",
            path.display(),
            header
        )));
    }

    rdr.deserialize::<PriceRow>()
        .map(|row| row.map_err(DataError::from))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn sample() -> PriceSeries {
        PriceSeries::new(vec![
            PriceRow {
                date: NaiveDate::from_ymd_opt(2024, 1, 2).unwrap(),
                open: Some(100.0),
                high: Some(102.5),
                low: Some(99.25),
                close: Some(101.0),
                adj_close: Some(100.75),
                volume: Some(1000),
                ticker: "SPY".into(),
            },
            PriceRow {
                date: NaiveDate::from_ymd_opt(2024, 1, 3).unwrap(),
                open: None,
                high: None,
                low: None,
                close: Some(102.0),
                adj_close: None,
                volume: None,
                ticker: "SPY".into(),
            },
        ])
    }

    #[test]
    fn sanitizes_separators() {
        assert_eq!(sanitize_identifier("BTC-USD"), "BTC_USD");
        assert_eq!(sanitize_identifier("^VIX"), "^VIX");
        assert_eq!(sanitize_identifier("BRK/B"), "BRK_B");
        assert_eq!(sanitize_identifier(" SPY "), "SPY");
    }

    #[test]
    fn file_layout() {
        let sink = CsvSink::new("data/raw");
        assert_eq!(sink.series_path("ETH-USD"), Path::new("data/raw/ETH_USD_raw.csv"));
        assert_eq!(sink.combined_path(), Path::new("data/raw/all_assets_raw.csv"));
    }

    #[test]
    fn writes_header_then_rows() {
        let dir = tempfile::tempdir().unwrap();
        let sink = CsvSink::new(dir.path());

        let path = sink.write_series("SPY", &sample()).unwrap();
        let text = fs::read_to_string(&path).unwrap();
        let lines: Vec<&str> = text.lines().collect();

        assert_eq!(lines[0], "Date,Open,High,Low,Close,Adj Close,Volume,Ticker");
        assert_eq!(lines[1], "2024-01-02,100.0,102.5,99.25,101.0,100.75,1000,SPY");
        assert_eq!(lines[2], "2024-01-03,,,,102.0,,,SPY");
        assert!(!path.with_extension("csv.tmp").exists());
    }

    #[test]
    fn read_back_matches_written() {
        let dir = tempfile::tempdir().unwrap();
        let sink = CsvSink::new(dir.path());
        let path = sink.write_combined(&sample()).unwrap();

        let loaded = read_series(&path).unwrap();
        assert_eq!(loaded, sample());
    }

    #[test]
    fn ensure_dir_creates_parents_and_is_idempotent() {
        let dir = tempfile::tempdir().unwrap();
        let sink = CsvSink::new(dir.path().join("data").join("raw"));
        sink.ensure_dir().unwrap();
        sink.ensure_dir().unwrap();
        assert!(sink.dir().is_dir());
    }

    #[test]
    fn ensure_dir_fails_when_path_is_a_file() {
        let dir = tempfile::tempdir().unwrap();
        let blocker = dir.path().join("blocker");
        fs::write(&blocker, "x").unwrap();

        let sink = CsvSink::new(blocker.join("raw"));
        assert!(matches!(sink.ensure_dir(), Err(DataError::Io(_))));
    }

    #[test]
    fn rejects_foreign_header() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("other.csv");
        fs::write(&path, "a,b\n1,2\n").unwrap();
        assert!(matches!(read_series(&path), Err(DataError::Parse(_))));
    }
}
