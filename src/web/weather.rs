//! Weather lookup and preload handlers.

use crate::state::AppState;
use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::response::Json;
use serde::{Deserialize, Serialize};
use tracing::info;

#[derive(Debug, Deserialize)]
pub struct CityParam {
    city: String,
}

#[derive(Serialize)]
pub struct WeatherResponse {
    city: String,
    /// `null` when no data is available for the city.
    weather: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct PreloadRequest {
    cities: Vec<String>,
}

#[derive(Serialize)]
pub struct PreloadResponse {
    cities: usize,
}

/// `GET /api/weather?city=...` is always 200; failures are a `null` weather.
pub(super) async fn lookup(
    State(state): State<AppState>,
    Query(params): Query<CityParam>,
) -> Json<WeatherResponse> {
    let weather = state.weather.get(&params.city).await;
    Json(WeatherResponse {
        city: params.city,
        weather,
    })
}

/// `POST /api/weather/preload` kicks off a fire-and-forget cache warm-up.
pub(super) async fn preload(
    State(state): State<AppState>,
    Json(request): Json<PreloadRequest>,
) -> (StatusCode, Json<PreloadResponse>) {
    let count = request.cities.len();
    info!(cities = count, "weather preload requested");
    let weather = state.weather.clone();
    tokio::spawn(async move { weather.preload(&request.cities).await });
    (StatusCode::ACCEPTED, Json(PreloadResponse { cities: count }))
}
