//! In-memory provider and fixtures shared by service tests

use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;
use chrono::{DateTime, Datelike, Duration, TimeZone, Utc, Weekday};

use crate::api::{ApiError, MarketDataProvider};
use crate::config::Period;
use crate::models::{Field, PriceTable, TickerHistory};
use crate::utils::ChartError;

/// `n` consecutive weekdays starting 2024-03-01, at the US market open
pub fn trading_days(n: usize) -> Vec<DateTime<Utc>> {
    let mut day = Utc.with_ymd_and_hms(2024, 3, 1, 14, 30, 0).unwrap();
    let mut days = Vec::with_capacity(n);
    while days.len() < n {
        if !matches!(day.weekday(), Weekday::Sat | Weekday::Sun) {
            days.push(day);
        }
        day += Duration::days(1);
    }
    days
}

/// History with every field filled, adjusted close drifting upwards
pub fn history_with_adj_close(ticker: &str, days: usize) -> TickerHistory {
    let base = 10.0 + ticker.len() as f64;
    let closes: Vec<Option<f64>> = (0..days).map(|i| Some(base + i as f64 * 0.25)).collect();
    let adjusted: Vec<Option<f64>> = closes.iter().map(|c| c.map(|v| v * 0.98)).collect();

    TickerHistory::new(ticker, trading_days(days))
        .with_column(Field::Open, closes.clone())
        .with_column(Field::High, closes.iter().map(|c| c.map(|v| v + 0.5)).collect())
        .with_column(Field::Low, closes.iter().map(|c| c.map(|v| v - 0.5)).collect())
        .with_column(Field::Close, closes)
        .with_column(Field::AdjClose, adjusted)
        .with_column(Field::Volume, vec![Some(1_000.0); days])
}

/// Provider that answers from canned per-ticker responses
pub struct FakeProvider {
    responses: HashMap<String, Result<TickerHistory, ApiError>>,
    requested: Mutex<Vec<String>>,
}

impl FakeProvider {
    pub fn new() -> Self {
        Self {
            responses: HashMap::new(),
            requested: Mutex::new(Vec::new()),
        }
    }

    pub fn with_history(mut self, history: TickerHistory) -> Self {
        self.responses.insert(history.ticker.clone(), Ok(history));
        self
    }

    pub fn with_failure(mut self, ticker: &str, error: ApiError) -> Self {
        self.responses.insert(ticker.to_string(), Err(error));
        self
    }

    /// Tickers asked for, in order, across all calls
    pub fn requested(&self) -> Vec<String> {
        self.requested.lock().unwrap().clone()
    }

    pub fn calls(&self) -> usize {
        self.requested.lock().unwrap().len()
    }
}

#[async_trait]
impl MarketDataProvider for FakeProvider {
    async fn download(&self, tickers: &[String], _period: Period) -> Result<PriceTable, ChartError> {
        let mut table = PriceTable::new();

        for ticker in tickers {
            self.requested.lock().unwrap().push(ticker.clone());
            let response = self
                .responses
                .get(ticker)
                .cloned()
                .unwrap_or_else(|| Err(ApiError::NotFound(format!("{} not found", ticker))));
            let history = response.map_err(|source| ChartError::Provider {
                ticker: ticker.clone(),
                source,
            })?;
            table.push(history);
        }

        Ok(table)
    }
}
