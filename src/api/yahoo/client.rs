use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, RETRY_AFTER, USER_AGENT};
use reqwest::Client as HttpClient;
use tracing::{debug, warn};

use super::models::{ApiError, ChartResponse};
use crate::api::MarketDataProvider;
use crate::config::Period;
use crate::models::{Field, PriceTable, TickerHistory};
use crate::utils::{extract_clean_error, ChartError};

/// Yahoo Finance chart API client, the market-data provider for the pipeline
pub struct YahooClient {
    http_client: HttpClient,
    base_url: String,
}

impl YahooClient {
    const DAILY_INTERVAL: &'static str = "1d";
    const BROWSER_USER_AGENT: &'static str =
        "Mozilla/5.0 (X11; Linux x86_64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0 Safari/537.36";

    /// Create a client against `base_url` (the public endpoint unless overridden)
    pub fn with_base_url(base_url: String, timeout: Duration) -> Result<Self, ApiError> {
        let http_client = HttpClient::builder()
            .default_headers(Self::create_headers())
            .timeout(timeout)
            .build()
            .map_err(|e| ApiError::RequestError(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            http_client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    /// Yahoo answers requests without a browser user agent with 429
    fn create_headers() -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(USER_AGENT, HeaderValue::from_static(Self::BROWSER_USER_AGENT));
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));
        headers
    }

    /// Map a non-success status and its body to an `ApiError`
    fn error_from_status(status: reqwest::StatusCode, retry_after: Option<u64>, body_text: &str) -> ApiError {
        let message = extract_clean_error(body_text);

        match status.as_u16() {
            400 => ApiError::BadRequest(message),
            401 => ApiError::Unauthorized(message),
            403 => ApiError::Forbidden(message),
            404 => ApiError::NotFound(message),
            429 => {
                warn!("Rate limited by provider, retry after {:?} s", retry_after);
                ApiError::RateLimited { retry_after }
            }
            code @ 500..=599 => {
                warn!("Server error {}: {}", code, message);
                ApiError::ServerError(code, message)
            }
            code => ApiError::HttpError(code, message),
        }
    }

    /// GET /v8/finance/chart/{ticker}
    ///
    /// Retrieves daily OHLCV plus adjusted close for one ticker over `period`.
    pub async fn get_chart(&self, ticker: &str, period: Period) -> Result<TickerHistory, ApiError> {
        let url = format!("{}/v8/finance/chart/{}", self.base_url, ticker);
        debug!("GET {} range={}", url, period.as_str());

        let response = self
            .http_client
            .get(&url)
            .query(&[
                ("range", period.as_str()),
                ("interval", Self::DAILY_INTERVAL),
                ("events", "div,splits"),
                ("includeAdjustedClose", "true"),
            ])
            .send()
            .await
            .map_err(|e| ApiError::RequestError(format!("Request failed: {}", e)))?;

        let status = response.status();
        let retry_after = response
            .headers()
            .get(RETRY_AFTER)
            .and_then(|v| v.to_str().ok())
            .and_then(|s| s.parse().ok());
        let body_text = response
            .text()
            .await
            .map_err(|e| ApiError::RequestError(format!("Failed to read response body: {}", e)))?;

        if !status.is_success() {
            return Err(Self::error_from_status(status, retry_after, &body_text));
        }

        parse_chart_response(ticker, &body_text)
    }
}

#[async_trait]
impl MarketDataProvider for YahooClient {
    async fn download(&self, tickers: &[String], period: Period) -> Result<PriceTable, ChartError> {
        let mut table = PriceTable::new();

        for ticker in tickers {
            let history = self
                .get_chart(ticker, period)
                .await
                .map_err(|source| ChartError::Provider {
                    ticker: ticker.clone(),
                    source,
                })?;
            debug!("{}: {} rows", ticker, history.len());
            table.push(history);
        }

        Ok(table)
    }
}

/// Convert a chart response body into a `TickerHistory`
pub fn parse_chart_response(ticker: &str, body: &str) -> Result<TickerHistory, ApiError> {
    let response: ChartResponse = serde_json::from_str(body)
        .map_err(|e| ApiError::DeserializationError(format!("Failed to parse chart: {}", e)))?;

    if let Some(error) = response.chart.error {
        let message = error
            .description
            .or(error.code)
            .unwrap_or_else(|| "unknown chart error".to_string());
        return Err(ApiError::NotFound(message));
    }

    let result = response
        .chart
        .result
        .and_then(|results| results.into_iter().next())
        .ok_or_else(|| ApiError::NotFound(format!("No chart data returned for {}", ticker)))?;

    let timestamps = result
        .timestamp
        .unwrap_or_default()
        .into_iter()
        .map(|ts| {
            DateTime::<Utc>::from_timestamp(ts, 0)
                .ok_or_else(|| ApiError::DeserializationError(format!("Invalid timestamp: {}", ts)))
        })
        .collect::<Result<Vec<_>, _>>()?;

    let quote = result.indicators.quote.into_iter().next().unwrap_or_default();
    let mut history = TickerHistory::new(ticker, timestamps)
        .with_column(Field::Open, quote.open)
        .with_column(Field::High, quote.high)
        .with_column(Field::Low, quote.low)
        .with_column(Field::Close, quote.close)
        .with_column(Field::Volume, quote.volume);

    if let Some(adjclose) = result
        .indicators
        .adjclose
        .and_then(|series| series.into_iter().next())
    {
        history = history.with_column(Field::AdjClose, adjclose.adjclose);
    }

    Ok(history)
}
