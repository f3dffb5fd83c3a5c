//! Fishing Weather Analyzer — Binary Entrypoint
//! Boots the Axum HTTP server, wiring the weather provider, geocoder,
//! favorites store and shared state.

use std::sync::Arc;

use anyhow::{Context, Result};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use fishing_weather_analyzer::api::{create_router, AppState};
use fishing_weather_analyzer::clients::geocoding::GeocodingClient;
use fishing_weather_analyzer::clients::open_meteo::OpenMeteoClient;
use fishing_weather_analyzer::clients::qweather::QWeatherClient;
use fishing_weather_analyzer::clients::WeatherProvider;
use fishing_weather_analyzer::config::{Config, ProviderKind};
use fishing_weather_analyzer::favorites::FavoritesStore;
use fishing_weather_analyzer::history::History;

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().compact())
        .init();
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env in local/dev; no-op when the file is absent.
    let _ = dotenvy::dotenv();
    init_tracing();

    let config = Config::from_env()?;

    let provider: Arc<dyn WeatherProvider> = match config.provider {
        ProviderKind::OpenMeteo => Arc::new(OpenMeteoClient::new(&config.user_agent)?),
        ProviderKind::QWeather => Arc::new(
            QWeatherClient::new(
                &config.user_agent,
                &config.qweather_api_host,
                &config.qweather_project_id,
                &config.qweather_credential_id,
                &config.qweather_private_key_pem,
            )
            .context("configuring QWeather client")?,
        ),
    };

    let state = AppState {
        provider,
        geocoder: Arc::new(GeocodingClient::new(&config.user_agent)?),
        favorites: Arc::new(FavoritesStore::load_from_file(&config.favorites_path)),
        history: Arc::new(History::with_capacity(2000)),
    };
    let router = create_router(state);

    let listener = tokio::net::TcpListener::bind(&config.bind_addr)
        .await
        .with_context(|| format!("binding {}", config.bind_addr))?;
    tracing::info!(addr = %config.bind_addr, provider = ?config.provider, "listening");
    axum::serve(listener, router).await?;
    Ok(())
}
