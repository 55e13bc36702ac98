use std::fs;
use std::path::Path;
use std::sync::atomic::{AtomicU64, Ordering};

use chrono::{DateTime, Duration, Utc};
use plotters::prelude::*;
use tracing::{debug, info};

use crate::api::MarketDataProvider;
use crate::config::ChartConfig;
use crate::models::{Field, PriceSeries, RenderedChart};
use crate::services::price_service;
use crate::utils::ChartError;

static RENDER_SEQ: AtomicU64 = AtomicU64::new(0);

/// Run the whole pipeline: fetch -> select -> render -> persist
pub async fn generate_chart(
    provider: &dyn MarketDataProvider,
    config: &ChartConfig,
) -> Result<RenderedChart, ChartError> {
    let table = price_service::fetch(provider, &config.tickers, config.period).await?;
    info!("Fetched history for {} ticker(s)", table.len());

    let series = price_service::select_series(&table, Field::AdjClose)?;

    let chart = render(&series, config)?;
    info!("Rendered {} series ({} bytes)", chart.series_drawn, chart.png.len());

    persist(&chart, &config.output_path)?;
    info!("Chart written to {}", config.output_path.display());

    Ok(chart)
}

/// Render every series onto one set of axes and return the PNG bytes.
///
/// Nothing at the output path is touched here, so a failed render leaves any
/// previous chart in place.
pub fn render(series: &[PriceSeries], config: &ChartConfig) -> Result<RenderedChart, ChartError> {
    if series.iter().all(PriceSeries::is_empty) {
        return Err(ChartError::Render("no price points to plot".to_string()));
    }

    // BitMapBackend picks the encoder from the file extension
    let temp_file = std::env::temp_dir().join(format!(
        "top_gainer_chart_{}_{}_{}.png",
        std::process::id(),
        Utc::now().timestamp_millis(),
        RENDER_SEQ.fetch_add(1, Ordering::Relaxed),
    ));

    let drawn = draw_chart(&temp_file, series, config);
    let png = drawn.and_then(|series_drawn| {
        let png = fs::read(&temp_file)?;
        Ok((series_drawn, png))
    });

    // Clean up temporary file
    let _ = fs::remove_file(&temp_file);

    let (series_drawn, png) = png?;
    if png.is_empty() {
        return Err(ChartError::Render("renderer produced empty image data".to_string()));
    }

    Ok(RenderedChart {
        png,
        series_drawn,
        title: config.title.clone(),
        x_label: config.x_label.clone(),
        y_label: config.y_label.clone(),
    })
}

/// Write the rendered chart to `path`, replacing whatever was there
pub fn persist(chart: &RenderedChart, path: &Path) -> Result<u64, ChartError> {
    fs::write(path, &chart.png)?;
    let written = fs::metadata(path)?.len();
    debug!("Wrote {} bytes to {}", written, path.display());
    Ok(written)
}

/// Draw the chart into a PNG file, returning how many lines were plotted
fn draw_chart(path: &Path, series: &[PriceSeries], config: &ChartConfig) -> Result<usize, ChartError> {
    let backend = BitMapBackend::new(path, (config.width, config.height));
    let root = backend.into_drawing_area();
    root.fill(&WHITE)
        .map_err(|e| ChartError::Render(format!("Failed to fill canvas: {}", e)))?;

    let points = series.iter().flat_map(|s| s.points.iter());

    // Find price range
    let (min_price, max_price) = points
        .clone()
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), p| (lo.min(p.price), hi.max(p.price)));

    // Add some padding to the price range
    let price_range = (max_price - min_price).max(1e-8);
    let padding = price_range * 0.1;
    let y_min = (min_price - padding).max(0.0);
    let y_max = max_price + padding;

    // Get time range, widened when every point shares one day
    let x_min: DateTime<Utc> = points
        .clone()
        .map(|p| p.timestamp)
        .min()
        .ok_or_else(|| ChartError::Render("no price points to plot".to_string()))?;
    let mut x_max: DateTime<Utc> = points.map(|p| p.timestamp).max().unwrap_or(x_min);
    if x_max <= x_min {
        x_max = x_min + Duration::days(1);
    }

    let scale = (config.height.min(config.width) as f64 / 1000.0).max(0.5);
    let font = |size: f64| ("sans-serif", size * scale);

    let mut chart = ChartBuilder::on(&root)
        .caption(&config.title, font(40.0).into_font())
        .margin((15.0 * scale) as u32)
        .x_label_area_size((60.0 * scale) as u32)
        .y_label_area_size((90.0 * scale) as u32)
        .build_cartesian_2d(x_min..x_max, y_min..y_max)
        .map_err(|e| ChartError::Render(format!("Failed to build chart: {}", e)))?;

    chart
        .configure_mesh()
        .x_desc(&config.x_label)
        .y_desc(&config.y_label)
        .x_label_formatter(&|d: &DateTime<Utc>| d.format("%Y-%m-%d").to_string())
        .label_style(font(16.0))
        .axis_desc_style(font(22.0))
        .draw()
        .map_err(|e| ChartError::Render(format!("Failed to draw mesh: {}", e)))?;

    let mut drawn = 0;
    for (idx, s) in series.iter().enumerate().filter(|(_, s)| !s.is_empty()) {
        let color = Palette99::pick(idx).to_rgba();
        let stroke = (2.0 * scale).round().max(1.0) as u32;

        chart
            .draw_series(LineSeries::new(
                s.points.iter().map(|p| (p.timestamp, p.price)),
                color.stroke_width(stroke),
            ))
            .map_err(|e| ChartError::Render(format!("Failed to draw {}: {}", s.ticker, e)))?
            .label(s.ticker.as_str())
            .legend(move |(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], color.stroke_width(stroke)));

        drawn += 1;
    }

    chart
        .configure_series_labels()
        .position(SeriesLabelPosition::UpperLeft)
        .label_font(font(16.0))
        .background_style(&WHITE.mix(0.8))
        .border_style(&BLACK)
        .draw()
        .map_err(|e| ChartError::Render(format!("Failed to draw legend: {}", e)))?;

    root.present()
        .map_err(|e| ChartError::Render(format!("Failed to render chart: {}", e)))?;

    Ok(drawn)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::ApiError;
    use crate::models::PricePoint;
    use crate::services::test_helpers::{history_with_adj_close, trading_days, FakeProvider};

    fn test_config(dir: &tempfile::TempDir, tickers: &[&str]) -> ChartConfig {
        ChartConfig {
            tickers: tickers.iter().map(|t| t.to_string()).collect(),
            output_path: dir.path().join("test.png"),
            width: 400,
            height: 300,
            ..ChartConfig::default()
        }
    }

    const PNG_MAGIC: &[u8] = b"\x89PNG\r\n\x1a\n";

    #[tokio::test]
    async fn test_two_tickers_produce_two_series() {
        let dir = tempfile::tempdir().unwrap();
        let config = test_config(&dir, &["AAA", "BBB"]);
        let provider = FakeProvider::new()
            .with_history(history_with_adj_close("AAA", 21))
            .with_history(history_with_adj_close("BBB", 21));

        let chart = generate_chart(&provider, &config).await.unwrap();

        assert_eq!(chart.series_drawn, 2);
        assert_eq!(chart.x_label, "x - axis");
        assert_eq!(chart.y_label, "y - axis");
        assert_eq!(chart.title, "Top Gainer Regression Test");

        let written = fs::read(&config.output_path).unwrap();
        assert!(!written.is_empty());
        assert!(written.starts_with(PNG_MAGIC));
    }

    #[tokio::test]
    async fn test_provider_failure_writes_no_chart() {
        let dir = tempfile::tempdir().unwrap();
        let config = test_config(&dir, &["AAA", "ZZZZ", "BBB"]);
        let provider = FakeProvider::new()
            .with_history(history_with_adj_close("AAA", 21))
            .with_failure("ZZZZ", ApiError::NotFound("No data found, symbol may be delisted".to_string()))
            .with_history(history_with_adj_close("BBB", 21));

        let err = generate_chart(&provider, &config).await.unwrap_err();

        assert!(matches!(err, ChartError::Provider { ref ticker, .. } if ticker == "ZZZZ"));
        assert!(!config.output_path.exists());
    }

    #[tokio::test]
    async fn test_empty_ticker_set_fails_before_fetch() {
        let dir = tempfile::tempdir().unwrap();
        let config = test_config(&dir, &[]);
        let provider = FakeProvider::new();

        let err = generate_chart(&provider, &config).await.unwrap_err();

        assert!(matches!(err, ChartError::EmptyTickerSet));
        assert_eq!(provider.calls(), 0);
        assert!(!config.output_path.exists());
    }

    #[tokio::test]
    async fn test_rerun_overwrites_previous_chart() {
        let dir = tempfile::tempdir().unwrap();
        let config = test_config(&dir, &["AAA"]);
        fs::write(&config.output_path, b"stale").unwrap();
        let provider = FakeProvider::new().with_history(history_with_adj_close("AAA", 21));

        generate_chart(&provider, &config).await.unwrap();
        generate_chart(&provider, &config).await.unwrap();

        let written = fs::read(&config.output_path).unwrap();
        assert!(written.starts_with(PNG_MAGIC));
    }

    #[test]
    fn test_render_single_day_series() {
        let dir = tempfile::tempdir().unwrap();
        let config = test_config(&dir, &["AAA"]);
        let day = trading_days(1)[0];
        let series = vec![PriceSeries::new("AAA", vec![PricePoint { timestamp: day, price: 5.0 }])];

        let chart = render(&series, &config).unwrap();

        assert_eq!(chart.series_drawn, 1);
        assert!(chart.png.starts_with(PNG_MAGIC));
        // render alone never writes the output
        assert!(!config.output_path.exists());
    }

    #[test]
    fn test_render_rejects_empty_input() {
        let dir = tempfile::tempdir().unwrap();
        let config = test_config(&dir, &[]);

        assert!(matches!(render(&[], &config), Err(ChartError::Render(_))));
        assert!(matches!(
            render(&[PriceSeries::new("AAA", vec![])], &config),
            Err(ChartError::Render(_))
        ));
    }

    #[test]
    fn test_persist_into_missing_directory_fails() {
        let dir = tempfile::tempdir().unwrap();
        let chart = RenderedChart {
            png: PNG_MAGIC.to_vec(),
            series_drawn: 0,
            title: String::new(),
            x_label: String::new(),
            y_label: String::new(),
        };

        assert_eq!(persist(&chart, &dir.path().join("chart.png")).unwrap(), PNG_MAGIC.len() as u64);
        assert!(matches!(
            persist(&chart, &dir.path().join("missing").join("chart.png")),
            Err(ChartError::Io(_))
        ));
    }
}
