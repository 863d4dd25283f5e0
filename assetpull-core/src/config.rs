//! Batch configuration: which symbols to pull, over which window, into
//! which directory.
//!
//! Stored as TOML. Any key left out falls back to the reference run:
//!
//! ```toml
//! symbols = ["BTC-USD", "ETH-USD", "SPY", "QQQ", "^VIX", "GLD", "TLT"]
//! start = "2018-01-01"
//! end = "2025-06-12"
//! output_dir = "data/raw"
//! ```

use crate::data::{DataError, DateRange};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Reference asset universe: crypto first, then traditional markets.
pub const DEFAULT_SYMBOLS: [&str; 7] = [
    // Crypto
    "BTC-USD",
    "ETH-USD",
    // Traditional markets
    "SPY",  // US equities
    "QQQ",  // tech-heavy equities
    "^VIX", // implied volatility
    "GLD",  // gold ETF
    "TLT",  // 20-year Treasury ETF
];

pub const DEFAULT_START: &str = "2018-01-01";
pub const DEFAULT_END: &str = "2025-06-12";
pub const DEFAULT_OUTPUT_DIR: &str = "data/raw";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("read config {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("parse config TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("serialize config TOML: {0}")]
    Serialize(#[from] toml::ser::Error),

    #[error("invalid config: {0}")]
    Invalid(String),
}

/// Settings for one batch run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BatchConfig {
    pub symbols: Vec<String>,
    pub start: NaiveDate,
    pub end: NaiveDate,
    pub output_dir: PathBuf,
}

impl Default for BatchConfig {
    fn default() -> Self {
        Self {
            symbols: DEFAULT_SYMBOLS.iter().map(|s| s.to_string()).collect(),
            start: parse_const_date(DEFAULT_START),
            end: parse_const_date(DEFAULT_END),
            output_dir: PathBuf::from(DEFAULT_OUTPUT_DIR),
        }
    }
}

impl BatchConfig {
    /// Load a config from a TOML file.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml(&content)
    }

    /// Parse and validate a config from a TOML string.
    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        let config: BatchConfig = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Serialize the config to TOML.
    pub fn to_toml(&self) -> Result<String, ConfigError> {
        Ok(toml::to_string_pretty(self)?)
    }

    /// Reject configs that cannot describe a batch.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.symbols.iter().all(|s| s.trim().is_empty()) {
            return Err(ConfigError::Invalid("symbol list is empty".into()));
        }
        self.range()?;
        Ok(())
    }

    pub fn range(&self) -> Result<DateRange, ConfigError> {
        DateRange::new(self.start, self.end).map_err(|e| match e {
            DataError::InvalidRange(msg) => ConfigError::Invalid(msg),
            other => ConfigError::Invalid(other.to_string()),
        })
    }

    /// Symbols with surrounding whitespace removed and blanks dropped.
    pub fn symbol_refs(&self) -> Vec<&str> {
        self.symbols
            .iter()
            .map(|s| s.trim())
            .filter(|s| !s.is_empty())
            .collect()
    }
}

fn parse_const_date(s: &str) -> NaiveDate {
    NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_is_reference_run() {
        let c = BatchConfig::default();
        assert_eq!(c.symbols.len(), 7);
        assert!(c.symbols.contains(&"^VIX".to_string()));
        assert_eq!(c.start.to_string(), "2018-01-01");
        assert_eq!(c.end.to_string(), "2025-06-12");
        assert_eq!(c.output_dir, PathBuf::from("data/raw"));
        assert!(c.validate().is_ok());
    }

    #[test]
    fn partial_toml_falls_back_to_defaults() {
        let c = BatchConfig::from_toml(r#"symbols = ["SPY", "TLT"]"#).unwrap();
        assert_eq!(c.symbols, vec!["SPY", "TLT"]);
        assert_eq!(c.start, BatchConfig::default().start);
        assert_eq!(c.output_dir, PathBuf::from(DEFAULT_OUTPUT_DIR));
    }

    #[test]
    fn toml_roundtrip() {
        let c = BatchConfig::default();
        let parsed = BatchConfig::from_toml(&c.to_toml().unwrap()).unwrap();
        assert_eq!(c, parsed);
    }

    #[test]
    fn rejects_empty_symbols_and_inverted_range() {
        assert!(matches!(
            BatchConfig::from_toml("symbols = []"),
            Err(ConfigError::Invalid(_))
        ));
        assert!(matches!(
            BatchConfig::from_toml(r#"start = "2024-01-02"
end = "2024-01-01""#),
            Err(ConfigError::Invalid(_))
        ));
    }

    #[test]
    fn rejects_malformed_toml() {
        assert!(matches!(
            BatchConfig::from_toml("symbols = ["),
            Err(ConfigError::Parse(_))
        ));
    }

    #[test]
    fn symbol_refs_trims_blanks() {
        let c = BatchConfig {
            symbols: vec![" SPY".into(), "".into(), "GLD ".into()],
            ..BatchConfig::default()
        };
        assert_eq!(c.symbol_refs(), vec!["SPY", "GLD"]);
    }

    #[test]
    fn missing_file_is_read_error() {
        let err = BatchConfig::from_file(Path::new("/nonexistent/assetpull.toml")).unwrap_err();
        assert!(matches!(err, ConfigError::Read { .. }));
    }
}
