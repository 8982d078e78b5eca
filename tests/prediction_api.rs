//! End-to-end tests of the prediction page API.
//!
//! The router is driven in-process with `oneshot`; the Open-Meteo services are
//! replaced by a wiremock server.

use std::sync::Arc;
use std::time::Duration;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use chrono::{Duration as Days, Local, NaiveDate};
use http_body_util::BodyExt;
use serde_json::{Value, json};
use tempcast::api::AppState;
use tempcast::config::{ForecastConfig, ShellConfig, WeatherConfig};
use tempcast::{OpenMeteoClient, PredictionService, web};
use tower::ServiceExt;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn kolkata_geocoding() -> Value {
    json!({
        "results": [{
            "name": "Kolkata",
            "latitude": 22.57,
            "longitude": 88.36,
            "timezone": "Asia/Kolkata",
            "country": "India",
            "admin1": "West Bengal"
        }]
    })
}

/// Archive body with one row per mean temperature, ending yesterday
fn archive_ending_yesterday(means: &[f64]) -> Value {
    let today = Local::now().date_naive();
    let first = today - Days::days(means.len() as i64);
    let time: Vec<String> = (0..means.len())
        .map(|i| (first + Days::days(i as i64)).format("%Y-%m-%d").to_string())
        .collect();
    let max: Vec<f64> = means.iter().map(|m| m + 4.0).collect();
    let min: Vec<f64> = means.iter().map(|m| m - 4.0).collect();
    json!({
        "daily": {
            "time": time,
            "temperature_2m_max": max,
            "temperature_2m_min": min
        }
    })
}

async fn mount_geocoding(server: &MockServer, body: Value) {
    Mock::given(method("GET"))
        .and(path("/v1/search"))
        .respond_with(ResponseTemplate::new(200).set_body_json(body))
        .mount(server)
        .await;
}

fn app_for(server: &MockServer) -> axum::Router {
    let weather = WeatherConfig {
        geocoding_url: format!("{}/v1/search", server.uri()),
        archive_url: format!("{}/v1/archive", server.uri()),
        timeout_seconds: 5,
    };
    let client = Arc::new(OpenMeteoClient::new(&weather).unwrap());
    let shell = ShellConfig::default();
    let service = PredictionService::new(
        client.clone(),
        client,
        ForecastConfig::default(),
        shell.outlook,
    );
    web::app(AppState::new(service, shell), Duration::from_secs(30))
}

async fn get(app: axum::Router, uri: &str) -> (StatusCode, Value) {
    let response = app
        .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
        .await
        .unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    (status, serde_json::from_slice(&bytes).unwrap())
}

#[tokio::test]
async fn test_cities_lists_configured_options() {
    let server = MockServer::start().await;
    let (status, body) = get(app_for(&server), "/api/cities").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["title"], "Future Temperature Predictor");
    assert_eq!(body["cities"][0], "Kolkata");
    assert_eq!(body["cities"].as_array().unwrap().len(), 6);
}

#[tokio::test]
async fn test_index_page_is_served() {
    let server = MockServer::start().await;
    let response = app_for(&server)
        .oneshot(Request::builder().uri("/").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    assert!(String::from_utf8_lossy(&bytes).contains("/api/predict"));
}

#[tokio::test]
async fn test_kolkata_prediction_end_to_end() {
    let server = MockServer::start().await;
    mount_geocoding(&server, kolkata_geocoding()).await;
    Mock::given(method("GET"))
        .and(path("/v1/archive"))
        .and(query_param("timezone", "Asia/Kolkata"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(archive_ending_yesterday(&[28.0, 29.0, 30.0, 29.0, 28.0])),
        )
        .expect(1)
        .mount(&server)
        .await;

    let today: NaiveDate = Local::now().date_naive();
    let uri = format!("/api/predict?city=Kolkata&date={}", today.format("%Y-%m-%d"));
    let (status, body) = get(app_for(&server), &uri).await;

    assert_eq!(status, StatusCode::OK, "{body}");
    let predicted = body["prediction"]["predicted_temp_mean"].as_f64().unwrap();
    assert!(predicted > 25.0 && predicted < 33.0, "predicted {predicted}");
    assert_eq!(body["city"], "Kolkata");
    assert_eq!(body["place"]["timezone"], "Asia/Kolkata");
    assert_eq!(body["history"].as_array().unwrap().len(), 5);
    assert_eq!(body["history"][2]["temp_mean"], 30.0);
    assert!(body["message"].as_str().is_some());
}

#[tokio::test]
async fn test_unknown_city_is_bad_request() {
    let server = MockServer::start().await;
    let (status, body) = get(app_for(&server), "/api/predict?city=Paris").await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].as_str().unwrap().contains("Unknown city 'Paris'"));
}

#[tokio::test]
async fn test_bad_date_is_bad_request() {
    let server = MockServer::start().await;
    let (status, _) = get(app_for(&server), "/api/predict?city=Delhi&date=tomorrow").await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_geocoding_miss_is_not_found() {
    let server = MockServer::start().await;
    mount_geocoding(&server, json!({ "results": [] })).await;

    let (status, body) = get(app_for(&server), "/api/predict?city=Mumbai").await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert!(body["error"].as_str().unwrap().contains("'Mumbai'"));
}

#[tokio::test]
async fn test_empty_archive_is_no_history() {
    let server = MockServer::start().await;
    mount_geocoding(&server, kolkata_geocoding()).await;
    Mock::given(method("GET"))
        .and(path("/v1/archive"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "daily": {} })))
        .mount(&server)
        .await;

    let (status, body) = get(app_for(&server), "/api/predict?city=Kolkata").await;

    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["error"], "No historical data available.");
}

#[tokio::test]
async fn test_too_short_history_is_unprocessable() {
    let server = MockServer::start().await;
    mount_geocoding(&server, kolkata_geocoding()).await;
    Mock::given(method("GET"))
        .and(path("/v1/archive"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(archive_ending_yesterday(&[28.0, 29.0])),
        )
        .mount(&server)
        .await;

    let (status, body) = get(app_for(&server), "/api/predict?city=Kolkata").await;

    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert!(body["error"].as_str().unwrap().contains("at least 4"));
}

#[tokio::test]
async fn test_archive_failure_is_bad_gateway() {
    let server = MockServer::start().await;
    mount_geocoding(&server, kolkata_geocoding()).await;
    Mock::given(method("GET"))
        .and(path("/v1/archive"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let (status, body) = get(app_for(&server), "/api/predict?city=Kolkata").await;

    assert_eq!(status, StatusCode::BAD_GATEWAY);
    assert!(body["error"].as_str().unwrap().contains("Unable to reach"));
}
