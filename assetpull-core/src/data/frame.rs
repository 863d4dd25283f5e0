//! Provider-shaped tables and column flattening.
//!
//! Providers hand back a date-indexed table whose columns are either plain
//! field names (`Close`) or ticker-qualified pairs (`(Close, SPY)`). Flattening
//! drops the ticker level so every instrument ends up with the same header.

use super::provider::DataError;
use super::series::{PriceRow, PriceSeries};
use chrono::NaiveDate;
use std::fmt;

/// A column header as returned by the provider.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ColumnKey {
    /// Single-level column name.
    Flat(String),
    /// Two-level column: price field plus ticker qualifier.
    Qualified { field: String, ticker: String },
}

impl ColumnKey {
    pub fn flat(name: impl Into<String>) -> Self {
        ColumnKey::Flat(name.into())
    }

    pub fn qualified(field: impl Into<String>, ticker: impl Into<String>) -> Self {
        ColumnKey::Qualified {
            field: field.into(),
            ticker: ticker.into(),
        }
    }

    /// The first level of the key.
    pub fn field(&self) -> &str {
        match self {
            ColumnKey::Flat(name) => name,
            ColumnKey::Qualified { field, .. } => field,
        }
    }

    /// Drop the secondary level, if any.
    pub fn flattened(self) -> ColumnKey {
        match self {
            ColumnKey::Qualified { field, .. } => ColumnKey::Flat(field),
            flat => flat,
        }
    }
}

impl fmt::Display for ColumnKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ColumnKey::Flat(name) => write!(f, "{name}"),
            ColumnKey::Qualified { field, ticker } => write!(f, "({field}, {ticker})"),
        }
    }
}

/// Canonical price fields a provider column can map onto.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Field {
    Open,
    High,
    Low,
    Close,
    AdjClose,
    Volume,
}

impl Field {
    fn from_column(name: &str) -> Option<Field> {
        let norm: String = name
            .chars()
            .filter(|c| c.is_ascii_alphanumeric())
            .map(|c| c.to_ascii_lowercase())
            .collect();
        match norm.as_str() {
            "open" => Some(Field::Open),
            "high" => Some(Field::High),
            "low" => Some(Field::Low),
            "close" => Some(Field::Close),
            "adjclose" | "adjustedclose" => Some(Field::AdjClose),
            "volume" => Some(Field::Volume),
            _ => None,
        }
    }
}

/// Raw date-indexed table from a provider. Cells are row-major.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProviderFrame {
    columns: Vec<ColumnKey>,
    index: Vec<NaiveDate>,
    cells: Vec<Vec<Option<f64>>>,
}

impl ProviderFrame {
    pub fn new(columns: Vec<ColumnKey>) -> Self {
        Self {
            columns,
            index: Vec::new(),
            cells: Vec::new(),
        }
    }

    /// Frame with no columns and no rows.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Append one dated row. The value count must match the column count.
    pub fn push_row(&mut self, date: NaiveDate, values: Vec<Option<f64>>) -> Result<(), DataError> {
        if values.len() != self.columns.len() {
            return Err(DataError::Parse(format!(
                "row for {date} has {} values, expected {}",
                values.len(),
                self.columns.len()
            )));
        }
        self.index.push(date);
        self.cells.push(values);
        Ok(())
    }

    pub fn columns(&self) -> &[ColumnKey] {
        &self.columns
    }

    pub fn index(&self) -> &[NaiveDate] {
        &self.index
    }

    pub fn len(&self) -> usize {
        self.index.len()
    }

    pub fn is_empty(&self) -> bool {
        self.index.is_empty()
    }

    pub fn is_multi_level(&self) -> bool {
        self.columns
            .iter()
            .any(|c| matches!(c, ColumnKey::Qualified { .. }))
    }

    /// Collapse two-level column keys to their field name.
    pub fn flatten(self) -> ProviderFrame {
        if !self.is_multi_level() {
            return self;
        }
        ProviderFrame {
            columns: self.columns.into_iter().map(ColumnKey::flattened).collect(),
            index: self.index,
            cells: self.cells,
        }
    }

    /// Convert a flat frame into a tagged price series.
    ///
    /// Unknown columns are ignored and missing fields become empty cells.
    /// Fails if the frame still has qualified columns or if two columns map
    /// onto the same field.
    pub fn into_series(self, identifier: &str) -> Result<PriceSeries, DataError> {
        let mut slots: Vec<(Field, usize)> = Vec::new();
        for (pos, key) in self.columns.iter().enumerate() {
            let ColumnKey::Flat(name) = key else {
                return Err(DataError::Parse(format!(
                    "column {key} must be flattened before conversion"
                )));
            };
            let Some(field) = Field::from_column(name) else {
                continue;
            };
            if slots.iter().any(|(f, _)| *f == field) {
                return Err(DataError::Parse(format!(
                    "duplicate column '{name}' for {identifier}"
                )));
            }
            slots.push((field, pos));
        }

        let lookup = |values: &[Option<f64>], field: Field| -> Option<f64> {
            slots
                .iter()
                .find(|(f, _)| *f == field)
                .and_then(|(_, pos)| values.get(*pos).copied().flatten())
        };

        let rows = self
            .index
            .into_iter()
            .zip(self.cells)
            .map(|(date, values)| PriceRow {
                date,
                open: lookup(&values, Field::Open),
                high: lookup(&values, Field::High),
                low: lookup(&values, Field::Low),
                close: lookup(&values, Field::Close),
                adj_close: lookup(&values, Field::AdjClose),
                volume: lookup(&values, Field::Volume)
                    .filter(|v| v.is_finite() && *v >= 0.0)
                    .map(|v| v as u64),
                ticker: identifier.to_string(),
            })
            .collect();

        Ok(PriceSeries::new(rows))
    }
}
