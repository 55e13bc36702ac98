use async_trait::async_trait;

use crate::config::Period;
use crate::models::PriceTable;
use crate::utils::ChartError;

pub mod yahoo;

pub use yahoo::{ApiError, YahooClient};

/// Source of daily price history for a batch of tickers
#[async_trait]
pub trait MarketDataProvider: Send + Sync {
    /// Fetch `period` of daily history for every ticker, in order.
    ///
    /// Any ticker the provider cannot serve fails the whole batch with
    /// `ChartError::Provider` naming that ticker.
    async fn download(&self, tickers: &[String], period: Period) -> Result<PriceTable, ChartError>;
}
