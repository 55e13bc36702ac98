//! Data models for the chart pipeline
//!
//! Provider output (`PriceTable`) flows into per-ticker `PriceSeries`,
//! which are rendered into a `RenderedChart`.

pub mod chart;
pub mod price;

pub use chart::{PricePoint, PriceSeries, RenderedChart};
pub use price::{Field, PriceTable, TickerHistory};
