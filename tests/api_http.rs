// tests/api_http.rs
//
// HTTP-level tests for the public API Router without opening sockets.
// We exercise the router directly via tower::ServiceExt::oneshot, with a
// canned weather provider so nothing leaves the process for the core routes.
//
// Covered:
// - GET  /health
// - POST /analyze (happy path + validation errors)
// - POST /quick
// - GET/POST/DELETE /locations
// - GET  /debug/history

use std::sync::Arc;

use anyhow::Result;
use async_trait::async_trait;
use axum::{
    body::{self, Body},
    http::{Request, StatusCode},
    Router,
};
use serde_json::{json, Value as Json};
use tower::ServiceExt as _; // for `oneshot`

use fishing_weather_analyzer::api::{create_router, AppState};
use fishing_weather_analyzer::clients::geocoding::GeocodingClient;
use fishing_weather_analyzer::clients::WeatherProvider;
use fishing_weather_analyzer::favorites::FavoritesStore;
use fishing_weather_analyzer::history::History;
use fishing_weather_analyzer::normalize::{normalize_text_day, ForecastDay, TextDailyPayload};
use fishing_weather_analyzer::observation::{ConditionKind, WeatherObservation};

const BODY_LIMIT: usize = 1024 * 1024; // 1MB, safe for tests

/// Provider that returns fixed, favorable conditions.
struct CannedProvider;

#[async_trait]
impl WeatherProvider for CannedProvider {
    async fn current(&self, _lat: f64, _lon: f64) -> Result<WeatherObservation> {
        Ok(WeatherObservation::new(
            20.0,
            19.0,
            75,
            1012.0,
            3.0,
            ConditionKind::PartlyCloudy,
            "多云",
            None,
        )?)
    }

    async fn forecast(&self, _lat: f64, _lon: f64) -> Result<Vec<ForecastDay>> {
        let day = TextDailyPayload {
            fx_date: "2026-08-25".into(),
            temp_max: Some("26".into()),
            temp_min: Some("18".into()),
            wind_speed_day: Some("12".into()),
            icon_day: Some("101".into()),
            precip: Some("0.0".into()),
            text_day: Some("多云".into()),
            humidity: Some("70".into()),
            pressure: Some("1010".into()),
        };
        Ok(vec![normalize_text_day(&day)?])
    }
}

/// Build the same Router the binary uses, backed by the canned provider and a
/// throwaway favorites file.
fn test_router(tag: &str) -> Router {
    let path = std::env::temp_dir().join(format!(
        "fishing-api-test-{tag}-{}.json",
        std::process::id()
    ));
    let _ = std::fs::remove_file(&path);
    let state = AppState {
        provider: Arc::new(CannedProvider),
        geocoder: Arc::new(GeocodingClient::new("fishing-weather-analyzer-test").unwrap()),
        favorites: Arc::new(FavoritesStore::load_from_file(path)),
        history: Arc::new(History::with_capacity(100)),
    };
    create_router(state)
}

async fn read_json(resp: axum::response::Response) -> Json {
    let bytes = body::to_bytes(resp.into_body(), BODY_LIMIT)
        .await
        .expect("read body")
        .to_vec();
    serde_json::from_slice(&bytes).expect("parse json")
}

fn post_json(uri: &str, payload: &Json) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(payload.to_string()))
        .expect("build request")
}

#[tokio::test]
async fn api_health_returns_200_and_ok_body() {
    let app = test_router("health");

    let req = Request::builder()
        .method("GET")
        .uri("/health")
        .body(Body::empty())
        .expect("build GET /health");

    let resp = app.oneshot(req).await.expect("oneshot /health");
    assert_eq!(resp.status(), StatusCode::OK, "health should be 200");

    let bytes = body::to_bytes(resp.into_body(), BODY_LIMIT)
        .await
        .expect("read body")
        .to_vec();
    assert_eq!(String::from_utf8(bytes).expect("utf8").trim(), "ok");
}

#[tokio::test]
async fn api_analyze_returns_expected_json_fields() {
    let app = test_router("analyze");

    let payload = json!({
        "temperature_c": 20.0,
        "humidity_pct": 75,
        "pressure_hpa": 1012.0,
        "wind_speed_ms": 3.0,
        "condition": "多云",
        "hour": 7
    });
    let resp = app
        .oneshot(post_json("/analyze", &payload))
        .await
        .expect("oneshot /analyze");
    assert!(
        resp.status().is_success(),
        "POST /analyze should be 2xx, got {}",
        resp.status()
    );

    let v = read_json(resp).await;
    // Contract checks for UI consumers.
    assert_eq!(v["score"], json!(100));
    assert_eq!(v["level"], json!("Excellent"));
    assert_eq!(v["recommendation"], json!("非常适合钓鱼！"));
    assert!(v["reasons"].as_array().unwrap().is_empty());
    let tips: Vec<&str> = v["tips"]
        .as_array()
        .unwrap()
        .iter()
        .map(|t| t.as_str().unwrap())
        .collect();
    assert_eq!(tips[0], "多项条件叠加利好，钓况值得期待");
    assert!(tips.iter().any(|t| t.contains("高峰时段")));
}

#[tokio::test]
async fn api_analyze_rejects_bad_input() {
    let app = test_router("analyze-bad");

    // Hour out of range.
    let payload = json!({
        "temperature_c": 20.0,
        "humidity_pct": 75,
        "pressure_hpa": 1012.0,
        "wind_speed_ms": 3.0,
        "condition": "多云",
        "hour": 24
    });
    let resp = app
        .clone()
        .oneshot(post_json("/analyze", &payload))
        .await
        .expect("oneshot");
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

    // Humidity out of range.
    let payload = json!({
        "temperature_c": 20.0,
        "humidity_pct": 140,
        "pressure_hpa": 1012.0,
        "wind_speed_ms": 3.0,
        "condition": "多云"
    });
    let resp = app
        .clone()
        .oneshot(post_json("/analyze", &payload))
        .await
        .expect("oneshot");
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

    // Blank condition text.
    let payload = json!({
        "temperature_c": 20.0,
        "humidity_pct": 75,
        "pressure_hpa": 1012.0,
        "wind_speed_ms": 3.0,
        "condition": "  "
    });
    let resp = app
        .oneshot(post_json("/analyze", &payload))
        .await
        .expect("oneshot");
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let v = read_json(resp).await;
    assert!(v.get("error").is_some(), "error body must name the problem");
}

#[tokio::test]
async fn api_quick_uses_the_subtract_only_model() {
    let app = test_router("quick");

    let payload = json!({
        "temperature_c": 20.0,
        "humidity_pct": 60,
        "pressure_hpa": 1010.0,
        "wind_speed_ms": 3.0,
        "condition": "大雨",
        "precipitation_mm": 15.0
    });
    let resp = app
        .oneshot(post_json("/quick", &payload))
        .await
        .expect("oneshot /quick");
    assert!(resp.status().is_success());

    let v = read_json(resp).await;
    assert_eq!(v["score"], json!(80));
    assert!(v["reasons"]
        .as_array()
        .unwrap()
        .iter()
        .any(|r| r == "降水量较大"));
}

#[tokio::test]
async fn api_locations_roundtrip() {
    let app = test_router("locations");

    // Starts empty.
    let resp = app
        .clone()
        .oneshot(
            Request::builder()
                .uri("/locations")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .expect("oneshot GET /locations");
    assert_eq!(resp.status(), StatusCode::OK);
    assert!(read_json(resp).await.as_array().unwrap().is_empty());

    // Add one.
    let resp = app
        .clone()
        .oneshot(post_json("/locations", &json!({ "name": "  武汉东湖  " })))
        .await
        .expect("oneshot POST /locations");
    assert_eq!(resp.status(), StatusCode::CREATED);
    let loc = read_json(resp).await;
    assert_eq!(loc["name"], json!("武汉东湖"));
    let id = loc["id"].as_i64().expect("id is i64 millis");

    // Duplicate by trimmed name conflicts.
    let resp = app
        .clone()
        .oneshot(post_json("/locations", &json!({ "name": "武汉东湖" })))
        .await
        .expect("oneshot duplicate");
    assert_eq!(resp.status(), StatusCode::CONFLICT);
    let v = read_json(resp).await;
    assert_eq!(v["error"], json!("该地点已在常用钓点中"));

    // Empty name rejected.
    let resp = app
        .clone()
        .oneshot(post_json("/locations", &json!({ "name": "   " })))
        .await
        .expect("oneshot empty");
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

    // Delete, then deleting again is a 404.
    let resp = app
        .clone()
        .oneshot(
            Request::builder()
                .method("DELETE")
                .uri(format!("/locations/{id}"))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .expect("oneshot DELETE");
    assert_eq!(resp.status(), StatusCode::NO_CONTENT);

    let resp = app
        .oneshot(
            Request::builder()
                .method("DELETE")
                .uri(format!("/locations/{id}"))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .expect("oneshot DELETE again");
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn api_debug_history_records_analyses() {
    let app = test_router("history");

    let payload = json!({
        "temperature_c": 38.0,
        "humidity_pct": 40,
        "pressure_hpa": 980.0,
        "wind_speed_ms": 12.0,
        "condition": "雷暴",
        "hour": 12
    });
    let resp = app
        .clone()
        .oneshot(post_json("/analyze", &payload))
        .await
        .expect("oneshot /analyze");
    assert!(resp.status().is_success());

    let resp = app
        .oneshot(
            Request::builder()
                .uri("/debug/history?limit=5")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .expect("oneshot /debug/history");
    assert_eq!(resp.status(), StatusCode::OK);

    let entries = read_json(resp).await;
    let entries = entries.as_array().unwrap();
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0]["score"], json!(0));
    assert_eq!(entries[0]["level"], json!("VeryPoor"));
    // Only the first three negative factors are kept.
    assert_eq!(entries[0]["top_reasons"].as_array().unwrap().len(), 3);
}
