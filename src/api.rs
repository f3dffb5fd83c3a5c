use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    routing::{delete, get, post},
    Json, Router,
};
use chrono::Timelike;
use tower_http::cors::CorsLayer;

use crate::clients::geocoding::GeocodingClient;
use crate::clients::WeatherProvider;
use crate::engine;
use crate::favorites::{AddError, FavoritesStore, SavedLocation};
use crate::history::{History, HistoryEntry};
use crate::normalize::ForecastDay;
use crate::observation::{ConditionKind, WeatherObservation};
use crate::suitability::SuitabilityResult;

#[derive(Clone)]
pub struct AppState {
    pub provider: Arc<dyn WeatherProvider>,
    pub geocoder: Arc<GeocodingClient>,
    pub favorites: Arc<FavoritesStore>,
    pub history: Arc<History>,
}

pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(|| async { "ok" }))
        .route("/analyze", post(analyze))
        .route("/quick", post(quick))
        .route("/weather", get(weather_by_city))
        .route("/weather/coords", get(weather_by_coords))
        .route("/locations", get(list_locations).post(add_location))
        .route("/locations/{id}", delete(remove_location))
        .route("/debug/history", get(debug_history))
        .layer(CorsLayer::very_permissive())
        .with_state(state)
}

type ApiError = (StatusCode, Json<ErrorBody>);

#[derive(serde::Serialize)]
struct ErrorBody {
    error: String,
}

fn err(status: StatusCode, msg: impl Into<String>) -> ApiError {
    (status, Json(ErrorBody { error: msg.into() }))
}

#[derive(serde::Deserialize)]
struct AnalyzeReq {
    temperature_c: f64,
    #[serde(default)]
    feels_like_c: Option<f64>,
    humidity_pct: i64,
    pressure_hpa: f64,
    wind_speed_ms: f64,
    /// Free-text condition, e.g. "多云" or "小雨".
    condition: String,
    #[serde(default)]
    precipitation_mm: Option<f64>,
    /// 0–23; defaults to the server's local hour.
    #[serde(default)]
    hour: Option<u8>,
}

impl AnalyzeReq {
    fn into_observation(self) -> Result<(WeatherObservation, u8), ApiError> {
        let kind = ConditionKind::classify(&self.condition)
            .map_err(|e| err(StatusCode::BAD_REQUEST, e.to_string()))?;
        let obs = WeatherObservation::new(
            self.temperature_c,
            self.feels_like_c.unwrap_or(self.temperature_c),
            self.humidity_pct,
            self.pressure_hpa,
            self.wind_speed_ms,
            kind,
            &self.condition,
            self.precipitation_mm,
        )
        .map_err(|e| err(StatusCode::BAD_REQUEST, e.to_string()))?;

        let hour = match self.hour {
            Some(h) if h > 23 => {
                return Err(err(StatusCode::BAD_REQUEST, "hour must be 0-23"));
            }
            Some(h) => h,
            None => chrono::Local::now().hour() as u8,
        };
        Ok((obs, hour))
    }
}

async fn analyze(
    State(state): State<AppState>,
    Json(body): Json<AnalyzeReq>,
) -> Result<Json<SuitabilityResult>, ApiError> {
    let (obs, hour) = body.into_observation()?;
    let result = engine::analyze(&obs, hour);
    state.history.push("手动分析", &result);
    Ok(Json(result))
}

async fn quick(
    State(state): State<AppState>,
    Json(body): Json<AnalyzeReq>,
) -> Result<Json<SuitabilityResult>, ApiError> {
    let (obs, _) = body.into_observation()?;
    let result = engine::quick_score(&obs);
    state.history.push("快速评分", &result);
    Ok(Json(result))
}

#[derive(serde::Deserialize)]
struct CityQuery {
    city: String,
}

#[derive(serde::Deserialize)]
struct CoordsQuery {
    lat: f64,
    lon: f64,
}

#[derive(serde::Serialize)]
struct ForecastDayReport {
    #[serde(flatten)]
    day: ForecastDay,
    suitability: SuitabilityResult,
}

#[derive(serde::Serialize)]
struct WeatherReport {
    location: String,
    latitude: f64,
    longitude: f64,
    current: WeatherObservation,
    suitability: SuitabilityResult,
    forecast: Vec<ForecastDayReport>,
}

async fn weather_by_city(
    State(state): State<AppState>,
    Query(q): Query<CityQuery>,
) -> Result<Json<WeatherReport>, ApiError> {
    let place = q.city.trim();
    if place.is_empty() {
        return Err(err(StatusCode::BAD_REQUEST, "城市名称不能为空"));
    }
    let point = state
        .geocoder
        .geocode(place)
        .await
        .map_err(|e| {
            tracing::warn!(city = place, error = ?e, "geocoding failed");
            err(StatusCode::NOT_FOUND, "未找到该地点")
        })?;
    build_report(&state, point.display_name, point.latitude, point.longitude).await
}

async fn weather_by_coords(
    State(state): State<AppState>,
    Query(q): Query<CoordsQuery>,
) -> Result<Json<WeatherReport>, ApiError> {
    if !(-90.0..=90.0).contains(&q.lat) || !(-180.0..=180.0).contains(&q.lon) {
        return Err(err(StatusCode::BAD_REQUEST, "坐标超出有效范围"));
    }
    let name = state.geocoder.reverse(q.lat, q.lon).await;
    build_report(&state, name, q.lat, q.lon).await
}

async fn build_report(
    state: &AppState,
    location: String,
    lat: f64,
    lon: f64,
) -> Result<Json<WeatherReport>, ApiError> {
    let current = state.provider.current(lat, lon).await.map_err(|e| {
        tracing::error!(%lat, %lon, error = ?e, "fetching current weather failed");
        err(StatusCode::BAD_GATEWAY, "获取天气信息失败")
    })?;
    let forecast = state.provider.forecast(lat, lon).await.map_err(|e| {
        tracing::error!(%lat, %lon, error = ?e, "fetching forecast failed");
        err(StatusCode::BAD_GATEWAY, "获取天气信息失败")
    })?;

    let hour = chrono::Local::now().hour() as u8;
    let suitability = engine::analyze(&current, hour);
    state.history.push(&location, &suitability);

    let forecast = forecast
        .into_iter()
        .map(|day| {
            let suitability = engine::quick_score(&day.observation);
            ForecastDayReport { day, suitability }
        })
        .collect();

    Ok(Json(WeatherReport {
        location,
        latitude: lat,
        longitude: lon,
        current,
        suitability,
        forecast,
    }))
}

async fn list_locations(State(state): State<AppState>) -> Json<Vec<SavedLocation>> {
    Json(state.favorites.snapshot())
}

#[derive(serde::Deserialize)]
struct AddLocationReq {
    name: String,
}

async fn add_location(
    State(state): State<AppState>,
    Json(body): Json<AddLocationReq>,
) -> Result<(StatusCode, Json<SavedLocation>), ApiError> {
    match state.favorites.add(&body.name) {
        Ok(loc) => Ok((StatusCode::CREATED, Json(loc))),
        Err(AddError::EmptyName) => Err(err(StatusCode::BAD_REQUEST, "钓点名称不能为空")),
        Err(AddError::AlreadySaved) => Err(err(StatusCode::CONFLICT, "该地点已在常用钓点中")),
    }
}

async fn remove_location(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<StatusCode, ApiError> {
    if state.favorites.remove(id) {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(err(StatusCode::NOT_FOUND, "未找到该钓点"))
    }
}

#[derive(serde::Deserialize)]
struct HistoryQuery {
    #[serde(default = "default_history_limit")]
    limit: usize,
}

fn default_history_limit() -> usize {
    20
}

async fn debug_history(
    State(state): State<AppState>,
    Query(q): Query<HistoryQuery>,
) -> Json<Vec<HistoryEntry>> {
    Json(state.history.snapshot_last_n(q.limit.min(200)))
}
