//! Typed JSON error responses for the web API.

use crate::data::ReminderError;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Json, Response};
use serde::Serialize;
use serde_json::json;

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ApiErrorCode {
    InvalidMonth,
    InvalidReminder,
    ReminderNotFound,
}

impl ApiErrorCode {
    fn status(self) -> StatusCode {
        match self {
            ApiErrorCode::InvalidMonth => StatusCode::BAD_REQUEST,
            ApiErrorCode::InvalidReminder => StatusCode::UNPROCESSABLE_ENTITY,
            ApiErrorCode::ReminderNotFound => StatusCode::NOT_FOUND,
        }
    }
}

/// An error payload of the shape `{ "error": { "code", "message" } }`.
#[derive(Debug)]
pub struct ApiError {
    code: ApiErrorCode,
    message: String,
}

impl ApiError {
    pub fn new(code: ApiErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (
            self.code.status(),
            Json(json!({
                "error": {
                    "code": self.code,
                    "message": self.message,
                }
            })),
        )
            .into_response()
    }
}

impl From<ReminderError> for ApiError {
    fn from(err: ReminderError) -> Self {
        let code = match err {
            ReminderError::NotFound(_) => ApiErrorCode::ReminderNotFound,
            _ => ApiErrorCode::InvalidReminder,
        };
        ApiError::new(code, err.to_string())
    }
}
