use thiserror::Error;

use crate::api::ApiError;
use crate::models::Field;

/// Errors raised by the fetch -> select -> render -> persist pipeline
#[derive(Debug, Error)]
pub enum ChartError {
    #[error("Ticker set is empty, nothing to fetch")]
    EmptyTickerSet,
    #[error("Invalid ticker symbol: '{0}'")]
    InvalidTicker(String),
    #[error("Invalid configuration: {0}")]
    Config(String),
    #[error("Provider failed for {ticker}: {source}")]
    Provider {
        ticker: String,
        #[source]
        source: ApiError,
    },
    #[error("Field '{field}' missing for {ticker}")]
    MissingField { field: Field, ticker: String },
    #[error("No price data for {0}")]
    NoData(String),
    #[error("Render failed: {0}")]
    Render(String),
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Extract a one-line message from a provider error body
///
/// Yahoo wraps failures as:
/// `{"chart":{"result":null,"error":{"code":"Not Found","description":"No data found, symbol may be delisted"}}}`
///
/// Returns only the description:
/// "No data found, symbol may be delisted"
///
/// Anything that is not such an envelope comes back trimmed, first line only.
pub fn extract_clean_error(body: &str) -> String {
    if let Ok(value) = serde_json::from_str::<serde_json::Value>(body) {
        let error = value
            .get("chart")
            .or_else(|| value.get("finance"))
            .and_then(|v| v.get("error"));
        if let Some(error) = error {
            if let Some(description) = error.get("description").and_then(|v| v.as_str()) {
                return description.trim().to_string();
            }
            if let Some(code) = error.get("code").and_then(|v| v.as_str()) {
                return code.trim().to_string();
            }
        }
    }

    body.lines().next().unwrap_or_default().trim().to_string()
}
