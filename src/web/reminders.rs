//! Reminder CRUD handlers.
//!
//! Creation and city changes resolve a weather annotation through the cache
//! unless the client supplied one explicitly; an unavailable lookup simply
//! leaves the annotation unset.

use crate::data::{NewReminder, Reminder, ReminderPatch};
use crate::state::AppState;
use crate::web::error::ApiError;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::Json;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tracing::debug;

#[derive(Debug, Deserialize)]
pub struct DateParam {
    date: NaiveDate,
}

#[derive(Serialize)]
pub struct RemovedResponse {
    removed: usize,
}

/// `GET /api/reminders?date=YYYY-MM-DD` lists a day's reminders sorted by time.
pub(super) async fn list(
    State(state): State<AppState>,
    Query(params): Query<DateParam>,
) -> Json<Vec<Reminder>> {
    Json(state.reminders.for_date(params.date).await)
}

/// `POST /api/reminders`
pub(super) async fn create(
    State(state): State<AppState>,
    Json(mut payload): Json<NewReminder>,
) -> Result<(StatusCode, Json<Reminder>), ApiError> {
    if payload.weather.is_none() {
        payload.weather = state.weather.get(&payload.city).await;
    }
    let reminder = state.reminders.add(payload).await?;
    debug!(id = %reminder.id, date = %reminder.date, "reminder created");
    Ok((StatusCode::CREATED, Json(reminder)))
}

/// `PUT /api/reminders/{id}`
pub(super) async fn update(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(mut patch): Json<ReminderPatch>,
) -> Result<Json<Reminder>, ApiError> {
    // A city change invalidates the old annotation; re-resolve it unless the
    // client set one explicitly. An absent lookup clears it.
    if patch.weather.is_none()
        && let Some(ref city) = patch.city
    {
        patch.weather = Some(state.weather.get(city).await);
    }
    let reminder = state.reminders.update(&id, patch).await?;
    Ok(Json(reminder))
}

/// `DELETE /api/reminders/{id}`
pub(super) async fn delete(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<StatusCode, ApiError> {
    state.reminders.remove(&id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// `DELETE /api/reminders?date=YYYY-MM-DD` clears a whole day.
pub(super) async fn delete_for_date(
    State(state): State<AppState>,
    Query(params): Query<DateParam>,
) -> Json<RemovedResponse> {
    let removed = state.reminders.remove_all_for_date(params.date).await;
    debug!(date = %params.date, removed, "reminders cleared for date");
    Json(RemovedResponse { removed })
}
