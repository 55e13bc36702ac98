use tracing::{debug, info};

use crate::api::MarketDataProvider;
use crate::config::Period;
use crate::models::{Field, PricePoint, PriceSeries, PriceTable};
use crate::utils::ChartError;

const MAX_TICKER_LEN: usize = 12;

/// Validate and normalize a ticker symbol
/// Accepts ASCII letters, digits and `. - ^ =` (e.g. "BRK-B", "^GSPC", "EURUSD=X")
pub fn parse_ticker(raw: &str) -> Result<String, ChartError> {
    let ticker = raw.trim().to_uppercase();

    let valid_chars = ticker
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | '^' | '='));

    if ticker.is_empty() || ticker.len() > MAX_TICKER_LEN || !valid_chars {
        return Err(ChartError::InvalidTicker(raw.to_string()));
    }

    Ok(ticker)
}

/// Validate a whole ticker set, keeping its order
pub fn validate_tickers(tickers: &[String]) -> Result<Vec<String>, ChartError> {
    if tickers.is_empty() {
        return Err(ChartError::EmptyTickerSet);
    }

    tickers.iter().map(|t| parse_ticker(t)).collect()
}

/// Fetch the price table for every ticker over `period`
pub async fn fetch(
    provider: &dyn MarketDataProvider,
    tickers: &[String],
    period: Period,
) -> Result<PriceTable, ChartError> {
    let tickers = validate_tickers(tickers)?;
    info!("Fetching {} of daily history for {} ticker(s)", period.as_str(), tickers.len());

    let table = provider.download(&tickers, period).await?;

    // The provider must answer for every ticker we asked about
    if let Some(missing) = tickers.iter().find(|t| table.history(t).is_none()) {
        return Err(ChartError::NoData(missing.clone()));
    }

    Ok(table)
}

/// Pull one field out of the table as a series per ticker.
///
/// Days without a value are skipped. A ticker without the field at all is
/// `MissingField`; one left with no points is `NoData`.
pub fn select_series(table: &PriceTable, field: Field) -> Result<Vec<PriceSeries>, ChartError> {
    let mut series = Vec::with_capacity(table.len());

    for ticker in table.tickers() {
        let history = table
            .history(ticker)
            .ok_or_else(|| ChartError::NoData(ticker.to_string()))?;
        let values = history.column(field).ok_or_else(|| ChartError::MissingField {
            field,
            ticker: ticker.to_string(),
        })?;

        let points: Vec<PricePoint> = history
            .timestamps
            .iter()
            .zip(values)
            .filter_map(|(timestamp, value)| match value {
                Some(price) if price.is_finite() => Some(PricePoint {
                    timestamp: *timestamp,
                    price: *price,
                }),
                _ => None,
            })
            .collect();

        if points.is_empty() {
            return Err(ChartError::NoData(ticker.to_string()));
        }

        debug!("{}: {} of {} days have '{}'", ticker, points.len(), history.len(), field);
        series.push(PriceSeries::new(ticker, points));
    }

    Ok(series)
}
