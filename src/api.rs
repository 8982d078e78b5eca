//! JSON API of the prediction page

use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
};
use chrono::{Duration, Local, NaiveDate};
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::TempcastError;
use crate::config::ShellConfig;
use crate::forecast::PredictionService;
use crate::models::PredictionReport;

/// Shared state of the web application, fixed at startup
#[derive(Clone)]
pub struct AppState {
    pub service: PredictionService,
    pub shell: Arc<ShellConfig>,
}

impl AppState {
    pub fn new(service: PredictionService, shell: ShellConfig) -> Self {
        Self {
            service,
            shell: Arc::new(shell),
        }
    }
}

#[derive(Serialize, Deserialize)]
pub struct CitiesResponse {
    pub title: String,
    pub cities: Vec<String>,
}

#[derive(Debug, Deserialize)]
pub struct PredictQuery {
    pub city: Option<String>,
    /// ISO date, defaults to tomorrow
    pub date: Option<String>,
}

#[derive(Serialize, Deserialize)]
pub struct ErrorBody {
    pub error: String,
}

/// Error returned by API handlers, rendered as `{"error": "..."}`
pub struct ApiError(TempcastError);

impl From<TempcastError> for ApiError {
    fn from(err: TempcastError) -> Self {
        Self(err)
    }
}

impl ApiError {
    fn status(&self) -> StatusCode {
        match self.0 {
            TempcastError::Validation { .. } => StatusCode::BAD_REQUEST,
            TempcastError::NotFound { .. } => StatusCode::NOT_FOUND,
            TempcastError::NoHistory
            | TempcastError::EmptyHistory
            | TempcastError::InsufficientHistory { .. } => StatusCode::UNPROCESSABLE_ENTITY,
            TempcastError::Transport { .. } => StatusCode::BAD_GATEWAY,
            TempcastError::Config { .. } | TempcastError::Io { .. } => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        warn!("Prediction request failed ({}): {}", status, self.0);
        let body = ErrorBody {
            error: self.0.user_message(),
        };
        (status, Json(body)).into_response()
    }
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/cities", get(get_cities))
        .route("/predict", get(get_prediction))
        .with_state(state)
}

async fn get_cities(State(state): State<AppState>) -> Json<CitiesResponse> {
    Json(CitiesResponse {
        title: state.shell.title.clone(),
        cities: state.shell.cities.clone(),
    })
}

fn parse_target_date(raw: Option<&str>) -> Result<NaiveDate, TempcastError> {
    match raw.map(str::trim).filter(|s| !s.is_empty()) {
        None => Ok(Local::now().date_naive() + Duration::days(1)),
        Some(raw) => NaiveDate::parse_from_str(raw, "%Y-%m-%d").map_err(|_| {
            TempcastError::validation(format!("'{raw}' is not a date in YYYY-MM-DD format"))
        }),
    }
}

async fn get_prediction(
    State(state): State<AppState>,
    Query(query): Query<PredictQuery>,
) -> Result<Json<PredictionReport>, ApiError> {
    let requested = query.city.as_deref().unwrap_or_default();
    let city = state.shell.find_city(requested).ok_or_else(|| {
        TempcastError::validation(format!(
            "Unknown city '{}'. Choose one of: {}",
            requested.trim(),
            state.shell.cities.join(", ")
        ))
    })?;
    let target_date = parse_target_date(query.date.as_deref())?;

    let report = state.service.predict(city, target_date).await?;
    Ok(Json(report))
}
