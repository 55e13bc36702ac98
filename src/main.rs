use std::process::ExitCode;

use tracing::{error, info};
use tracing_subscriber::EnvFilter;

mod api;
mod config;
mod models;
mod services;
mod utils;

use api::YahooClient;
use config::ChartConfig;
use services::chart_service;

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    dotenv::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env()
            .add_directive("top_gainer_chart=debug".parse().unwrap())
            .add_directive("reqwest=warn".parse().unwrap()))
        .with_target(true)
        .with_thread_ids(true)
        .init();

    let config = match ChartConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            error!("{}", e);
            return ExitCode::FAILURE;
        }
    };

    info!(
        "Charting {} ticker(s) over {} -> {}",
        config.tickers.len(),
        config.period.as_str(),
        config.output_path.display()
    );

    let provider = match YahooClient::with_base_url(config.provider_base_url.clone(), config.request_timeout) {
        Ok(client) => client,
        Err(e) => {
            error!("Failed to create market-data client: {}", e);
            return ExitCode::FAILURE;
        }
    };

    match chart_service::generate_chart(&provider, &config).await {
        Ok(chart) => {
            info!(
                "Done: '{}' ({} / {}), {} series, {} bytes written to {}",
                chart.title,
                chart.x_label,
                chart.y_label,
                chart.series_drawn,
                chart.png.len(),
                config.output_path.display()
            );
            ExitCode::SUCCESS
        }
        Err(e) => {
            error!("Chart generation failed: {}", e);
            ExitCode::FAILURE
        }
    }
}
