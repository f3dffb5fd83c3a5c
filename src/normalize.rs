//! normalize.rs — Provider payloads → canonical `WeatherObservation`.
//!
//! Two upstream shapes are supported:
//! - a numeric WMO-style weather-code scheme (Open-Meteo) where codes map to a
//!   coarse category plus an exact-match Chinese description table, and
//! - a free-text scheme (QWeather) where the provider's description is both
//!   the category signal and the display string, with wind speeds in km/h.
//!
//! Parse failures become `NormalizationError`, never silent zeros; the scorer
//! downstream can assume every field is finite and in range.

use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::observation::{
    ConditionCategory, ConditionKind, NormalizationError, WeatherObservation,
};

/// Wind-speed unit of the source payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WindUnit {
    MetersPerSecond,
    KilometersPerHour,
}

/// km/h → m/s, rounded to one decimal place.
pub fn kmh_to_ms(kmh: f64) -> f64 {
    (kmh / 3.6 * 10.0).round() / 10.0
}

fn convert_wind(speed: f64, unit: WindUnit) -> f64 {
    match unit {
        WindUnit::MetersPerSecond => speed,
        WindUnit::KilometersPerHour => kmh_to_ms(speed),
    }
}

// ── WMO code scheme ──

/// Coarse category from a WMO-style code (disjoint ranges; out-of-table codes
/// fall back to `Clouds`).
pub fn wmo_category(code: u16) -> ConditionCategory {
    match code {
        0 => ConditionCategory::Clear,
        1..=3 => ConditionCategory::Clouds,
        51..=67 | 80..=82 => ConditionCategory::Rain,
        71..=77 | 85..=86 => ConditionCategory::Snow,
        95..=99 => ConditionCategory::Thunderstorm,
        _ => ConditionCategory::Clouds,
    }
}

/// Fine condition tag from a WMO-style code.
pub fn wmo_condition_kind(code: u16) -> ConditionKind {
    match code {
        0 => ConditionKind::Clear,
        1 | 2 => ConditionKind::PartlyCloudy,
        3 => ConditionKind::Overcast,
        45 | 48 => ConditionKind::Fog,
        51..=57 => ConditionKind::Drizzle,
        61 | 66 | 80 => ConditionKind::LightRain,
        63 | 81 => ConditionKind::ModerateRain,
        65 | 67 | 82 => ConditionKind::HeavyRain,
        71..=77 | 85 | 86 => ConditionKind::Snow,
        95..=99 => ConditionKind::Thunderstorm,
        _ => ConditionKind::PartlyCloudy,
    }
}

/// Exact-match description table for WMO codes 0–99 (44 entries).
static WMO_DESCRIPTIONS: Lazy<HashMap<u16, &'static str>> = Lazy::new(|| {
    HashMap::from([
        (0, "晴朗"),
        (1, "基本晴朗"),
        (2, "部分多云"),
        (3, "阴天"),
        (4, "烟雾"),
        (5, "霾"),
        (6, "浮尘"),
        (7, "扬沙"),
        (8, "尘卷风"),
        (9, "沙尘暴"),
        (10, "轻雾"),
        (13, "闪电"),
        (17, "雷声"),
        (18, "飑"),
        (30, "弱沙尘暴"),
        (38, "吹雪"),
        (45, "有雾"),
        (48, "雾凇"),
        (51, "小毛毛雨"),
        (53, "中等毛毛雨"),
        (55, "大毛毛雨"),
        (56, "冻毛毛雨"),
        (57, "大冻毛毛雨"),
        (61, "小雨"),
        (63, "中雨"),
        (65, "大雨"),
        (66, "冻小雨"),
        (67, "冻大雨"),
        (71, "小雪"),
        (73, "中雪"),
        (75, "大雪"),
        (77, "雪粒"),
        (80, "小阵雨"),
        (81, "中阵雨"),
        (82, "大阵雨"),
        (83, "小雨夹雪阵"),
        (84, "大雨夹雪阵"),
        (85, "小阵雪"),
        (86, "大阵雪"),
        (87, "小阵霰"),
        (89, "小阵冰雹"),
        (95, "雷暴"),
        (96, "雷暴伴小冰雹"),
        (99, "雷暴伴大冰雹"),
    ])
});

/// Detailed description for a WMO code; unknown codes map to the sentinel.
pub fn wmo_description(code: u16) -> &'static str {
    WMO_DESCRIPTIONS.get(&code).copied().unwrap_or("未知")
}

// ── QWeather icon-code scheme ──

/// Coarse category from a QWeather icon code (100–899). Anything outside the
/// defined ranges defaults to `Clouds`, same as the original cloud icon.
pub fn icon_category(code: u16) -> ConditionCategory {
    match code {
        100 => ConditionCategory::Clear,
        300..=399 => ConditionCategory::Rain,
        400..=499 => ConditionCategory::Snow,
        _ => ConditionCategory::Clouds,
    }
}

/// Fine condition tag from a QWeather icon code; 300–303 are the drizzle
/// variants, everything else in 300–399 is plain rain.
pub fn icon_condition_kind(code: u16) -> ConditionKind {
    match code {
        100 => ConditionKind::Clear,
        101..=103 | 150..=154 => ConditionKind::PartlyCloudy,
        104 => ConditionKind::Overcast,
        300..=303 => ConditionKind::Drizzle,
        304..=399 => ConditionKind::LightRain,
        400..=499 => ConditionKind::Snow,
        500..=515 => ConditionKind::Fog,
        _ => ConditionKind::PartlyCloudy,
    }
}

// ── Payload shapes ──

/// Current-conditions block of the numeric-code provider (Open-Meteo
/// `current=` response). Fields stay optional so absence is an explicit
/// normalization error instead of a deserialization failure.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct WmoCurrentPayload {
    pub temperature_2m: Option<f64>,
    pub apparent_temperature: Option<f64>,
    pub relative_humidity_2m: Option<f64>,
    pub surface_pressure: Option<f64>,
    pub wind_speed_10m: Option<f64>,
    pub weather_code: Option<u16>,
}

/// One day of the numeric-code provider's daily forecast.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct WmoDailyPayload {
    pub date: String,
    pub temperature_2m_max: Option<f64>,
    pub temperature_2m_min: Option<f64>,
    pub wind_speed_10m_max: Option<f64>,
    pub precipitation_sum: Option<f64>,
    pub relative_humidity_2m_mean: Option<f64>,
    pub surface_pressure_mean: Option<f64>,
    pub weather_code: Option<u16>,
}

/// `now` block of the free-text provider (QWeather `/v7/weather/now`).
/// Numeric fields arrive as strings and must parse to finite numbers.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TextCurrentPayload {
    pub temp: Option<String>,
    pub feels_like: Option<String>,
    pub humidity: Option<String>,
    pub pressure: Option<String>,
    /// km/h as the provider reports it.
    pub wind_speed: Option<String>,
    pub text: Option<String>,
}

/// One day of the free-text provider's 7-day forecast.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TextDailyPayload {
    pub fx_date: String,
    pub temp_max: Option<String>,
    pub temp_min: Option<String>,
    /// km/h as the provider reports it.
    pub wind_speed_day: Option<String>,
    pub icon_day: Option<String>,
    pub precip: Option<String>,
    pub text_day: Option<String>,
    pub humidity: Option<String>,
    pub pressure: Option<String>,
}

/// One normalized forecast day: the observation plus display extremes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForecastDay {
    pub date: String,
    pub temp_max_c: f64,
    pub temp_min_c: f64,
    /// Coarse bucket for the day's display icon.
    pub category: ConditionCategory,
    pub observation: WeatherObservation,
}

// ── Normalization entry points ──

fn require<T: Copy>(name: &'static str, v: Option<T>) -> Result<T, NormalizationError> {
    v.ok_or(NormalizationError::MissingField(name))
}

fn parse_num(name: &'static str, v: Option<&String>) -> Result<f64, NormalizationError> {
    let s = v.ok_or(NormalizationError::MissingField(name))?;
    let n: f64 = s
        .trim()
        .parse()
        .map_err(|_| NormalizationError::InvalidNumber(name))?;
    if !n.is_finite() {
        return Err(NormalizationError::InvalidNumber(name));
    }
    Ok(n)
}

/// Numeric-code provider, current conditions. Wind arrives in the unit the
/// client requested; precipitation stays absent for "now" observations.
pub fn normalize_wmo_current(
    payload: &WmoCurrentPayload,
    wind_unit: WindUnit,
) -> Result<WeatherObservation, NormalizationError> {
    let code = require("weather_code", payload.weather_code)?;
    let humidity = require("relative_humidity_2m", payload.relative_humidity_2m)?;
    if !humidity.is_finite() {
        return Err(NormalizationError::InvalidNumber("relative_humidity_2m"));
    }
    let wind = require("wind_speed_10m", payload.wind_speed_10m)?;
    if !wind.is_finite() {
        return Err(NormalizationError::InvalidNumber("wind_speed_10m"));
    }

    WeatherObservation::new(
        require("temperature_2m", payload.temperature_2m)?,
        require("apparent_temperature", payload.apparent_temperature)?,
        humidity.round() as i64,
        require("surface_pressure", payload.surface_pressure)?,
        convert_wind(wind, wind_unit),
        wmo_condition_kind(code),
        wmo_description(code),
        None,
    )
}

/// Numeric-code provider, one forecast day.
pub fn normalize_wmo_day(
    payload: &WmoDailyPayload,
    wind_unit: WindUnit,
) -> Result<ForecastDay, NormalizationError> {
    let code = require("weather_code", payload.weather_code)?;
    let max = require("temperature_2m_max", payload.temperature_2m_max)?;
    let min = require("temperature_2m_min", payload.temperature_2m_min)?;
    if !max.is_finite() || !min.is_finite() {
        return Err(NormalizationError::InvalidNumber("temperature_2m_max"));
    }
    let humidity = require("relative_humidity_2m_mean", payload.relative_humidity_2m_mean)?;
    if !humidity.is_finite() {
        return Err(NormalizationError::InvalidNumber("relative_humidity_2m_mean"));
    }
    let wind = require("wind_speed_10m_max", payload.wind_speed_10m_max)?;
    if !wind.is_finite() {
        return Err(NormalizationError::InvalidNumber("wind_speed_10m_max"));
    }

    let temp = ((max + min) / 2.0).round();
    let observation = WeatherObservation::new(
        temp,
        temp,
        humidity.round() as i64,
        require("surface_pressure_mean", payload.surface_pressure_mean)?,
        convert_wind(wind, wind_unit),
        wmo_condition_kind(code),
        wmo_description(code),
        Some(require("precipitation_sum", payload.precipitation_sum)?),
    )?;

    Ok(ForecastDay {
        date: payload.date.clone(),
        temp_max_c: max,
        temp_min_c: min,
        category: wmo_category(code),
        observation,
    })
}

/// Free-text provider, current conditions. The text is classified once into
/// the condition tag and kept verbatim as the display string; wind converts
/// from km/h.
pub fn normalize_text_current(
    payload: &TextCurrentPayload,
) -> Result<WeatherObservation, NormalizationError> {
    let text = payload
        .text
        .as_deref()
        .ok_or(NormalizationError::MissingField("text"))?;
    let kind = ConditionKind::classify(text)?;

    WeatherObservation::new(
        parse_num("temp", payload.temp.as_ref())?,
        parse_num("feelsLike", payload.feels_like.as_ref())?,
        parse_num("humidity", payload.humidity.as_ref())?.round() as i64,
        parse_num("pressure", payload.pressure.as_ref())?,
        kmh_to_ms(parse_num("windSpeed", payload.wind_speed.as_ref())?),
        kind,
        text,
        None,
    )
}

/// Free-text provider, one forecast day. Day temperature is the rounded
/// mean of the extremes, matching the original conversion.
pub fn normalize_text_day(payload: &TextDailyPayload) -> Result<ForecastDay, NormalizationError> {
    let text = payload
        .text_day
        .as_deref()
        .ok_or(NormalizationError::MissingField("textDay"))?;
    let kind = ConditionKind::classify(text)?;

    let max = parse_num("tempMax", payload.temp_max.as_ref())?;
    let min = parse_num("tempMin", payload.temp_min.as_ref())?;
    let temp = ((max + min) / 2.0).round();

    let icon: u16 = payload
        .icon_day
        .as_deref()
        .ok_or(NormalizationError::MissingField("iconDay"))?
        .trim()
        .parse()
        .map_err(|_| NormalizationError::InvalidNumber("iconDay"))?;

    let observation = WeatherObservation::new(
        temp,
        temp,
        parse_num("humidity", payload.humidity.as_ref())?.round() as i64,
        parse_num("pressure", payload.pressure.as_ref())?,
        kmh_to_ms(parse_num("windSpeed", payload.wind_speed_day.as_ref())?),
        kind,
        text,
        Some(parse_num("precip", payload.precip.as_ref())?),
    )?;

    Ok(ForecastDay {
        date: payload.fx_date.clone(),
        temp_max_c: max,
        temp_min_c: min,
        category: icon_category(icon),
        observation,
    })
}
