//! Chart generation models

use chrono::{DateTime, Utc};

/// A single data point on a price chart
#[derive(Debug, Clone, PartialEq)]
pub struct PricePoint {
    pub timestamp: DateTime<Utc>,
    pub price: f64,
}

/// One plotted line: a ticker and its adjusted close history
#[derive(Debug, Clone)]
pub struct PriceSeries {
    pub ticker: String,
    pub points: Vec<PricePoint>,
}

impl PriceSeries {
    pub fn new(ticker: impl Into<String>, points: Vec<PricePoint>) -> Self {
        Self {
            ticker: ticker.into(),
            points,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }
}

/// Result of rendering a chart, PNG bytes plus what was drawn on it
#[derive(Debug)]
pub struct RenderedChart {
    pub png: Vec<u8>,
    pub series_drawn: usize,
    pub title: String,
    pub x_label: String,
    pub y_label: String,
}
