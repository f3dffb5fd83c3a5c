//! open_meteo.rs — numeric-code weather provider (no credentials).
//!
//! Requests wind in m/s so the normalizer only converts for providers that
//! report km/h. The daily forecast skips today and keeps the next seven days,
//! matching the original per-day summary list.

use anyhow::{Context, Result};
use async_trait::async_trait;
use serde::Deserialize;

use crate::normalize::{
    normalize_wmo_current, normalize_wmo_day, ForecastDay, WindUnit, WmoCurrentPayload,
    WmoDailyPayload,
};
use crate::observation::WeatherObservation;

use super::WeatherProvider;

const BASE_URL: &str = "https://api.open-meteo.com/v1/forecast";

const CURRENT_FIELDS: &str = "temperature_2m,relative_humidity_2m,apparent_temperature,precipitation,weather_code,surface_pressure,wind_speed_10m";
const DAILY_FIELDS: &str = "temperature_2m_max,temperature_2m_min,wind_speed_10m_max,precipitation_sum,relative_humidity_2m_mean,surface_pressure_mean,weather_code";

pub struct OpenMeteoClient {
    client: reqwest::Client,
    base_url: String,
}

#[derive(Debug, Deserialize)]
struct CurrentResponse {
    current: WmoCurrentPayload,
}

#[derive(Debug, Deserialize)]
struct ForecastResponse {
    daily: DailyBlock,
}

/// Column-oriented daily block as the API ships it; zipped into per-day
/// payloads before normalization.
#[derive(Debug, Deserialize)]
struct DailyBlock {
    time: Vec<String>,
    #[serde(default)]
    temperature_2m_max: Vec<Option<f64>>,
    #[serde(default)]
    temperature_2m_min: Vec<Option<f64>>,
    #[serde(default)]
    wind_speed_10m_max: Vec<Option<f64>>,
    #[serde(default)]
    precipitation_sum: Vec<Option<f64>>,
    #[serde(default)]
    relative_humidity_2m_mean: Vec<Option<f64>>,
    #[serde(default)]
    surface_pressure_mean: Vec<Option<f64>>,
    #[serde(default)]
    weather_code: Vec<Option<u16>>,
}

impl OpenMeteoClient {
    pub fn new(user_agent: &str) -> Result<Self> {
        Ok(Self {
            client: reqwest::Client::builder()
                .user_agent(user_agent.to_string())
                .timeout(std::time::Duration::from_secs(10))
                .build()?,
            base_url: BASE_URL.to_string(),
        })
    }

    fn row(daily: &DailyBlock, i: usize) -> WmoDailyPayload {
        let pick = |v: &Vec<Option<f64>>| v.get(i).copied().flatten();
        WmoDailyPayload {
            date: daily.time[i].clone(),
            temperature_2m_max: pick(&daily.temperature_2m_max),
            temperature_2m_min: pick(&daily.temperature_2m_min),
            wind_speed_10m_max: pick(&daily.wind_speed_10m_max),
            precipitation_sum: pick(&daily.precipitation_sum),
            relative_humidity_2m_mean: pick(&daily.relative_humidity_2m_mean),
            surface_pressure_mean: pick(&daily.surface_pressure_mean),
            weather_code: daily.weather_code.get(i).copied().flatten(),
        }
    }
}

#[async_trait]
impl WeatherProvider for OpenMeteoClient {
    async fn current(&self, lat: f64, lon: f64) -> Result<WeatherObservation> {
        let url = format!(
            "{}?latitude={lat}&longitude={lon}&current={CURRENT_FIELDS}&wind_speed_unit=ms&timezone=auto",
            self.base_url
        );
        let resp: CurrentResponse = self
            .client
            .get(&url)
            .send()
            .await?
            .error_for_status()?
            .json()
            .await
            .context("parsing open-meteo current response")?;

        normalize_wmo_current(&resp.current, WindUnit::MetersPerSecond)
            .context("normalizing open-meteo current conditions")
    }

    async fn forecast(&self, lat: f64, lon: f64) -> Result<Vec<ForecastDay>> {
        let url = format!(
            "{}?latitude={lat}&longitude={lon}&daily={DAILY_FIELDS}&wind_speed_unit=ms&timezone=auto&forecast_days=8",
            self.base_url
        );
        let resp: ForecastResponse = self
            .client
            .get(&url)
            .send()
            .await?
            .error_for_status()?
            .json()
            .await
            .context("parsing open-meteo forecast response")?;

        // Skip today; the current-conditions card already covers it.
        let mut days = Vec::new();
        for i in 1..resp.daily.time.len() {
            let payload = Self::row(&resp.daily, i);
            let day = normalize_wmo_day(&payload, WindUnit::MetersPerSecond)
                .with_context(|| format!("normalizing forecast day {}", payload.date))?;
            days.push(day);
        }
        Ok(days)
    }
}
