//! observation.rs — Normalized weather values shared by the normalizer and scorer.
//!
//! A `WeatherObservation` is the only thing the scorer ever sees: fixed units
//! (°C, m/s, %, hPa, mm) and an enumerated condition tag produced once at
//! normalization time. The scorer never re-parses free text.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Coarse condition bucket derived from a provider-specific code.
/// Matches the display-icon granularity of the original UI.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ConditionCategory {
    Clear,
    Clouds,
    Rain,
    Snow,
    Thunderstorm,
}

/// Fine-grained condition tag used by the weighted scorer.
///
/// Classified exactly once, at normalization time, either from a numeric
/// weather code or from the provider's free-text description.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConditionKind {
    Clear,
    PartlyCloudy,
    Overcast,
    Drizzle,
    LightRain,
    ModerateRain,
    HeavyRain,
    Thunderstorm,
    Snow,
    Fog,
}

impl ConditionKind {
    /// Collapse to the coarse display bucket.
    pub fn coarse(self) -> ConditionCategory {
        match self {
            ConditionKind::Clear => ConditionCategory::Clear,
            ConditionKind::PartlyCloudy | ConditionKind::Overcast | ConditionKind::Fog => {
                ConditionCategory::Clouds
            }
            ConditionKind::Drizzle
            | ConditionKind::LightRain
            | ConditionKind::ModerateRain
            | ConditionKind::HeavyRain => ConditionCategory::Rain,
            ConditionKind::Snow => ConditionCategory::Snow,
            ConditionKind::Thunderstorm => ConditionCategory::Thunderstorm,
        }
    }

    /// Classify a free-text condition description (Chinese or English).
    ///
    /// Match order matters: thunder dominates rain ("雷暴" contains neither
    /// 雨 nor snow markers, but "雷阵雨" contains both), snow dominates rain
    /// ("雨夹雪"), and intensity qualifiers refine the rain bucket.
    pub fn classify(text: &str) -> Result<Self, NormalizationError> {
        let t = text.trim();
        if t.is_empty() {
            return Err(NormalizationError::EmptyCondition);
        }
        let lower = t.to_lowercase();
        let has = |kw: &str| t.contains(kw) || lower.contains(kw);

        if has("雷") || lower.contains("thunder") {
            return Ok(ConditionKind::Thunderstorm);
        }
        if has("雪") || lower.contains("snow") || lower.contains("sleet") {
            return Ok(ConditionKind::Snow);
        }
        if has("雨") || lower.contains("rain") || lower.contains("drizzle") {
            if has("毛毛") || lower.contains("drizzle") {
                return Ok(ConditionKind::Drizzle);
            }
            if has("暴") || has("大") || lower.contains("heavy") || lower.contains("storm") {
                return Ok(ConditionKind::HeavyRain);
            }
            if has("中") || lower.contains("moderate") {
                return Ok(ConditionKind::ModerateRain);
            }
            // 小雨 / 阵雨 / bare "rain" all land in the light bucket.
            return Ok(ConditionKind::LightRain);
        }
        if has("雾") || has("霾") || lower.contains("fog") || lower.contains("haze") || lower.contains("mist") {
            return Ok(ConditionKind::Fog);
        }
        if has("阴") || lower.contains("overcast") {
            return Ok(ConditionKind::Overcast);
        }
        if has("云") || lower.contains("cloud") {
            return Ok(ConditionKind::PartlyCloudy);
        }
        if has("晴") || lower.contains("clear") || lower.contains("sunny") {
            return Ok(ConditionKind::Clear);
        }

        // Unrecognized but non-empty text: neutral cloud bucket, same as the
        // original's default icon.
        Ok(ConditionKind::PartlyCloudy)
    }
}

/// One normalized weather snapshot — current conditions or a single forecast day.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeatherObservation {
    /// Ambient temperature, Celsius.
    pub temperature_c: f64,
    /// Apparent temperature, Celsius. Display-only; never scored.
    pub feels_like_c: f64,
    /// Relative humidity, 0–100.
    pub humidity_pct: u8,
    /// Surface pressure, hectopascals.
    pub pressure_hpa: f64,
    /// Wind speed, meters per second.
    pub wind_speed_ms: f64,
    /// Enumerated condition tag (classified once at normalization).
    pub condition: ConditionKind,
    /// Display string as the provider describes it.
    pub condition_text: String,
    /// Daily precipitation sum in mm; present for forecast-day observations only.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub precipitation_mm: Option<f64>,
}

impl WeatherObservation {
    /// Validating constructor: rejects NaN/∞ and out-of-range humidity so the
    /// scorer never receives a partially-populated observation.
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        temperature_c: f64,
        feels_like_c: f64,
        humidity_pct: i64,
        pressure_hpa: f64,
        wind_speed_ms: f64,
        condition: ConditionKind,
        condition_text: impl Into<String>,
        precipitation_mm: Option<f64>,
    ) -> Result<Self, NormalizationError> {
        for (name, v) in [
            ("temperature_c", temperature_c),
            ("feels_like_c", feels_like_c),
            ("pressure_hpa", pressure_hpa),
            ("wind_speed_ms", wind_speed_ms),
        ] {
            if !v.is_finite() {
                return Err(NormalizationError::InvalidNumber(name));
            }
        }
        if let Some(p) = precipitation_mm {
            if !p.is_finite() {
                return Err(NormalizationError::InvalidNumber("precipitation_mm"));
            }
        }
        if !(0..=100).contains(&humidity_pct) {
            return Err(NormalizationError::HumidityOutOfRange(humidity_pct));
        }
        let condition_text = condition_text.into();
        if condition_text.trim().is_empty() {
            return Err(NormalizationError::EmptyCondition);
        }
        Ok(Self {
            temperature_c,
            feels_like_c,
            humidity_pct: humidity_pct as u8,
            pressure_hpa,
            wind_speed_ms,
            condition,
            condition_text,
            precipitation_mm,
        })
    }
}

/// Rejected normalization: a required provider field was missing, non-numeric,
/// or out of its valid domain. Never retried here — retry, if any, belongs to
/// the network collaborator.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum NormalizationError {
    #[error("missing required field `{0}`")]
    MissingField(&'static str),
    #[error("field `{0}` is not a finite number")]
    InvalidNumber(&'static str),
    #[error("condition description is empty")]
    EmptyCondition,
    #[error("humidity {0} outside 0–100")]
    HumidityOutOfRange(i64),
}
