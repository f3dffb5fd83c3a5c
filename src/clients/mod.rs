//! clients — outward-facing collaborators: geocoding and weather providers.
//!
//! The scoring core never performs I/O; these adapters fetch provider
//! payloads and hand them to the normalizer, so everything behind the
//! [`WeatherProvider`] seam already speaks `WeatherObservation`.

pub mod geocoding;
pub mod open_meteo;
pub mod qweather;

use anyhow::Result;
use async_trait::async_trait;

use crate::normalize::ForecastDay;
use crate::observation::WeatherObservation;

/// Port over the two provider shapes: current conditions plus a multi-day
/// forecast, both already normalized.
#[async_trait]
pub trait WeatherProvider: Send + Sync {
    async fn current(&self, lat: f64, lon: f64) -> Result<WeatherObservation>;
    async fn forecast(&self, lat: f64, lon: f64) -> Result<Vec<ForecastDay>>;
}
