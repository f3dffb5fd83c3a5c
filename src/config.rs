//! config.rs — environment-driven runtime configuration.
//!
//! `.env` loading happens once in `main` via dotenvy; everything here reads
//! plain env vars so tests can construct a `Config` directly.

use anyhow::Result;

/// Which upstream weather provider to wire in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProviderKind {
    /// Numeric WMO-code provider (no credentials required).
    OpenMeteo,
    /// Free-text provider behind JWT bearer auth.
    QWeather,
}

#[derive(Debug, Clone)]
pub struct Config {
    pub bind_addr: String,
    pub provider: ProviderKind,
    pub user_agent: String,
    pub favorites_path: String,
    /// QWeather credentials; unused for Open-Meteo.
    pub qweather_api_host: String,
    pub qweather_project_id: String,
    pub qweather_credential_id: String,
    pub qweather_private_key_pem: String,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        let provider = match std::env::var("WEATHER_PROVIDER")
            .unwrap_or_default()
            .to_ascii_lowercase()
            .as_str()
        {
            "qweather" => ProviderKind::QWeather,
            _ => ProviderKind::OpenMeteo,
        };

        let pem = match std::env::var("QWEATHER_PRIVATE_KEY_PATH") {
            Ok(path) => std::fs::read_to_string(&path).unwrap_or_default(),
            Err(_) => String::new(),
        };

        Ok(Self {
            bind_addr: std::env::var("BIND_ADDR").unwrap_or_else(|_| "0.0.0.0:8000".into()),
            provider,
            user_agent: std::env::var("HTTP_USER_AGENT")
                .unwrap_or_else(|_| "fishing-weather-analyzer/0.1".into()),
            favorites_path: std::env::var("FAVORITES_PATH")
                .unwrap_or_else(|_| "fishing_locations.json".into()),
            qweather_api_host: std::env::var("QWEATHER_API_HOST")
                .unwrap_or_else(|_| "https://devapi.qweather.com".into()),
            qweather_project_id: std::env::var("QWEATHER_PROJECT_ID").unwrap_or_default(),
            qweather_credential_id: std::env::var("QWEATHER_CREDENTIAL_ID").unwrap_or_default(),
            qweather_private_key_pem: pem,
        })
    }
}
