//! Multi-ticker price history as returned by the market-data provider

use std::fmt;

use chrono::{DateTime, Utc};

/// Column of a provider price table
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Field {
    Open,
    High,
    Low,
    Close,
    AdjClose,
    Volume,
}

impl Field {
    pub fn as_str(&self) -> &'static str {
        match self {
            Field::Open => "Open",
            Field::High => "High",
            Field::Low => "Low",
            Field::Close => "Close",
            Field::AdjClose => "Adj Close",
            Field::Volume => "Volume",
        }
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Daily history for one ticker, one entry per trading day.
///
/// Every column has the same length as `timestamps`; a `None` cell is a day
/// the provider reported without a value.
#[derive(Debug, Clone)]
pub struct TickerHistory {
    pub ticker: String,
    pub timestamps: Vec<DateTime<Utc>>,
    pub columns: Vec<(Field, Vec<Option<f64>>)>,
}

impl TickerHistory {
    pub fn new(ticker: impl Into<String>, timestamps: Vec<DateTime<Utc>>) -> Self {
        Self {
            ticker: ticker.into(),
            timestamps,
            columns: Vec::new(),
        }
    }

    /// Attach a column, padding or truncating it to the row count
    pub fn with_column(mut self, field: Field, mut values: Vec<Option<f64>>) -> Self {
        values.resize(self.timestamps.len(), None);
        self.columns.retain(|(f, _)| *f != field);
        self.columns.push((field, values));
        self
    }

    pub fn column(&self, field: Field) -> Option<&[Option<f64>]> {
        self.columns
            .iter()
            .find(|(f, _)| *f == field)
            .map(|(_, values)| values.as_slice())
    }

    pub fn len(&self) -> usize {
        self.timestamps.len()
    }
}

/// Table keyed by (field, ticker), tickers kept in request order
#[derive(Debug, Clone, Default)]
pub struct PriceTable {
    histories: Vec<TickerHistory>,
}

impl PriceTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, history: TickerHistory) {
        self.histories.push(history);
    }

    pub fn tickers(&self) -> impl Iterator<Item = &str> {
        self.histories.iter().map(|h| h.ticker.as_str())
    }

    pub fn history(&self, ticker: &str) -> Option<&TickerHistory> {
        self.histories.iter().find(|h| h.ticker == ticker)
    }

    pub fn len(&self) -> usize {
        self.histories.len()
    }
}
