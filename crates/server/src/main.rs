// Server Main
// Wires configuration, the market data refresh loop and the HTTP API

use actix_web::{middleware::Logger, web, App, HttpServer};
use log::info;
use reqwest::Client;
use std::sync::{Arc, Mutex};
use std::time::Duration;

// Module declarations
mod assistant;
mod config;
mod data;
mod error;
mod fallback;
mod handlers;
mod registry;
mod sources;
mod types;

use assistant::Assistant;
use config::ServerConfig;
use data::{fetch_data_periodically, refresh_market_data};
use sources::HttpMarketSource;
use types::AppState;

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    // Load configuration
    let config = ServerConfig::load().map_err(|e| {
        eprintln!("Failed to load server configuration: {}", e);
        std::io::Error::new(std::io::ErrorKind::Other, e)
    })?;

    // Setup logging
    config.setup_logging();

    let client = Client::builder()
        .timeout(Duration::from_secs(15))
        .build()
        .map_err(|e| std::io::Error::new(std::io::ErrorKind::Other, e))?;

    let source = HttpMarketSource::new(
        client.clone(),
        config.endpoints.clone(),
        config.coingecko_api_key.clone(),
    );
    let assistant = Assistant::new(
        client,
        config.gemini_api_key.clone(),
        config.gemini_api_url.clone(),
        config.gemini_model.clone(),
    );

    if !assistant.is_enabled() {
        info!("Assistant disabled: no Gemini API key configured");
    }

    let state = web::Data::new(AppState {
        snapshot: Arc::new(Mutex::new(None)),
        source: Arc::new(source),
        assistant,
        update_interval_seconds: config.update_interval_seconds,
    });

    // First snapshot before accepting requests; never fails, worst case is fallback data
    info!("Fetching initial market data...");
    refresh_market_data(&state).await;

    let state_clone = state.clone();
    tokio::spawn(async move {
        fetch_data_periodically(state_clone).await;
    });

    info!("Starting crypto calculator server on http://0.0.0.0:{}", config.http_port);
    info!("Refreshing market data every {}s", config.update_interval_seconds);

    HttpServer::new(move || {
        App::new()
            .app_data(state.clone())
            .wrap(Logger::default())
            .configure(handlers::configure)
    })
    .bind(("0.0.0.0", config.http_port))?
    .run()
    .await
}
