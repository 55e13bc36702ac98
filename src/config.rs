use std::path::PathBuf;
use std::time::Duration;

use crate::utils::ChartError;

/// Tickers charted when `CHART_TICKERS` is not set
pub const DEFAULT_TICKERS: [&str; 11] = [
    "RYCEY", "JMIA", "PDCO", "RYCEF", "OPK", "SPOT", "ACB", "BNDSY", "SPR", "ACIW", "LSPD",
];

pub const DEFAULT_YAHOO_BASE_URL: &str = "https://query1.finance.yahoo.com";

/// Lookback window understood by the provider's `range` parameter
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Period {
    Day1,
    Day5,
    #[default]
    Month1,
    Month3,
    Month6,
    Year1,
    Year2,
    Year5,
    Year10,
    YearToDate,
    Max,
}

impl Period {
    /// Parse a period string
    /// Supported: 1d, 5d, 1mo, 3mo, 6mo, 1y, 2y, 5y, 10y, ytd, max
    pub fn parse(period: &str) -> Result<Self, ChartError> {
        match period.trim().to_lowercase().as_str() {
            "1d" => Ok(Period::Day1),
            "5d" => Ok(Period::Day5),
            "1mo" => Ok(Period::Month1),
            "3mo" => Ok(Period::Month3),
            "6mo" => Ok(Period::Month6),
            "1y" => Ok(Period::Year1),
            "2y" => Ok(Period::Year2),
            "5y" => Ok(Period::Year5),
            "10y" => Ok(Period::Year10),
            "ytd" => Ok(Period::YearToDate),
            "max" => Ok(Period::Max),
            _ => Err(ChartError::Config(format!(
                "Unknown period: '{}'. Supported: 1d, 5d, 1mo, 3mo, 6mo, 1y, 2y, 5y, 10y, ytd, max",
                period
            ))),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Period::Day1 => "1d",
            Period::Day5 => "5d",
            Period::Month1 => "1mo",
            Period::Month3 => "3mo",
            Period::Month6 => "6mo",
            Period::Year1 => "1y",
            Period::Year2 => "2y",
            Period::Year5 => "5y",
            Period::Year10 => "10y",
            Period::YearToDate => "ytd",
            Period::Max => "max",
        }
    }
}

/// Everything the chart generator needs for one run
#[derive(Debug, Clone)]
pub struct ChartConfig {
    pub tickers: Vec<String>,
    pub period: Period,
    pub output_path: PathBuf,
    pub width: u32,
    pub height: u32,
    pub title: String,
    pub x_label: String,
    pub y_label: String,
    pub request_timeout: Duration,
    pub provider_base_url: String,
}

impl Default for ChartConfig {
    fn default() -> Self {
        Self {
            tickers: DEFAULT_TICKERS.iter().map(|t| t.to_string()).collect(),
            period: Period::default(),
            output_path: PathBuf::from("test.png"),
            // 20x20 inch figure at 100 dpi
            width: 2000,
            height: 2000,
            title: "Top Gainer Regression Test".to_string(),
            x_label: "x - axis".to_string(),
            y_label: "y - axis".to_string(),
            request_timeout: Duration::from_secs(30),
            provider_base_url: DEFAULT_YAHOO_BASE_URL.to_string(),
        }
    }
}

impl ChartConfig {
    /// Defaults with overrides from the process environment (and `.env`)
    pub fn from_env() -> Result<Self, ChartError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup<F>(lookup: F) -> Result<Self, ChartError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(tickers) = lookup("CHART_TICKERS") {
            config.tickers = tickers
                .split(',')
                .map(|t| t.trim().to_string())
                .filter(|t| !t.is_empty())
                .collect();
        }
        if let Some(output) = lookup("CHART_OUTPUT") {
            config.output_path = PathBuf::from(output);
        }
        if let Some(period) = lookup("CHART_PERIOD") {
            config.period = Period::parse(&period)?;
        }
        if let Some(width) = lookup("CHART_WIDTH") {
            config.width = parse_dimension("CHART_WIDTH", &width)?;
        }
        if let Some(height) = lookup("CHART_HEIGHT") {
            config.height = parse_dimension("CHART_HEIGHT", &height)?;
        }
        if let Some(secs) = lookup("CHART_TIMEOUT_SECS") {
            let secs: u64 = secs.trim().parse().map_err(|_| {
                ChartError::Config(format!("CHART_TIMEOUT_SECS must be a number of seconds, got '{}'", secs))
            })?;
            config.request_timeout = Duration::from_secs(secs);
        }
        if let Some(base_url) = lookup("YAHOO_BASE_URL") {
            config.provider_base_url = base_url.trim_end_matches('/').to_string();
        }

        Ok(config)
    }
}

fn parse_dimension(key: &str, value: &str) -> Result<u32, ChartError> {
    match value.trim().parse::<u32>() {
        Ok(px) if px > 0 => Ok(px),
        _ => Err(ChartError::Config(format!(
            "{} must be a positive pixel count, got '{}'",
            key, value
        ))),
    }
}
