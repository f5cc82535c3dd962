//! Web API router construction.

use crate::state::AppState;
use crate::web::{calendar, reminders, status, weather};
use axum::Router;
use axum::routing::{get, post, put};
use std::time::Duration;
use tower_http::cors::CorsLayer;
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;

/// Creates the web server router
pub fn create_router(app_state: AppState) -> Router {
    let api_router = Router::new()
        .route("/health", get(status::health))
        .route("/status", get(status::status))
        .route("/calendar/{year}/{month}", get(calendar::month_view))
        .route(
            "/reminders",
            get(reminders::list)
                .post(reminders::create)
                .delete(reminders::delete_for_date),
        )
        .route(
            "/reminders/{id}",
            put(reminders::update).delete(reminders::delete),
        )
        .route("/weather", get(weather::lookup))
        .route("/weather/preload", post(weather::preload))
        .with_state(app_state);

    Router::new().nest("/api", api_router).layer((
        TraceLayer::new_for_http(),
        // The browser client is served from a separate origin in development.
        CorsLayer::permissive(),
        TimeoutLayer::new(Duration::from_secs(30)),
    ))
}
