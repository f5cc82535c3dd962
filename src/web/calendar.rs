//! Calendar grid handler.

use crate::calendar::{self, CalendarDay, WEEKDAY_NAMES};
use crate::web::error::{ApiError, ApiErrorCode};
use axum::extract::{Path, Query};
use axum::response::Json;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Layout {
    /// Fixed 6x7 grid padded with neighbor-month days.
    #[default]
    Grid,
    /// The month with 1 leading and 2 trailing neighbor days.
    Strip,
}

#[derive(Debug, Deserialize)]
pub struct CalendarParams {
    #[serde(default)]
    layout: Layout,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MonthView {
    year: i32,
    month: u32,
    month_name: &'static str,
    week_days: [&'static str; 7],
    days: Vec<CalendarDay>,
}

/// `GET /api/calendar/{year}/{month}?layout=grid|strip`
pub(super) async fn month_view(
    Path((year, month)): Path<(i32, u32)>,
    Query(params): Query<CalendarParams>,
) -> Result<Json<MonthView>, ApiError> {
    let today = chrono::Local::now().date_naive();
    let days = match params.layout {
        Layout::Grid => calendar::calendar_grid(year, month, today),
        Layout::Strip => calendar::month_with_neighbors(year, month, today),
    }
    .ok_or_else(|| {
        ApiError::new(
            ApiErrorCode::InvalidMonth,
            format!("no month {month} in year {year}"),
        )
    })?;

    Ok(Json(MonthView {
        year,
        month,
        month_name: calendar::month_name(month).unwrap_or_default(),
        week_days: WEEKDAY_NAMES,
        days,
    }))
}
