//! Application wiring and lifecycle.

use crate::config::Config;
use crate::state::AppState;
use crate::weather::{SWEEP_INTERVAL, WeatherClient};
use crate::web::create_router;
use anyhow::Context;
use std::net::SocketAddr;
use std::sync::Arc;
use tracing::{info, warn};

/// Main application struct containing all necessary components
pub struct App {
    config: Config,
    app_state: AppState,
}

impl App {
    /// Create a new App instance with all necessary components initialized
    pub fn new(config: Config) -> Result<Self, anyhow::Error> {
        if config.openweather_api_key.is_none() {
            warn!("OPENWEATHER_API_KEY is not set; weather lookups will return no data");
        }
        let client = WeatherClient::with_base_url(
            config.openweather_api_key.clone(),
            config.weather_base_url.clone(),
        )
        .context("Failed to create weather client")?;

        let app_state = AppState::new(Arc::new(client));
        Ok(App { config, app_state })
    }

    /// Shared state, exposed for integration tests.
    pub fn state(&self) -> &AppState {
        &self.app_state
    }

    /// Serve the API until a shutdown signal arrives.
    pub async fn run(self) -> Result<(), anyhow::Error> {
        // The sweep is owned by this process: started here, stopped on the
        // way out so no background task outlives the server.
        self.app_state.weather.start_sweeper(SWEEP_INTERVAL);

        let preload = self.config.preload_city_list();
        if !preload.is_empty() {
            let weather = self.app_state.weather.clone();
            tokio::spawn(async move { weather.preload(&preload).await });
        }

        let router = create_router(self.app_state.clone());
        let addr = SocketAddr::from(([0, 0, 0, 0], self.config.port));
        let listener = tokio::net::TcpListener::bind(addr)
            .await
            .with_context(|| format!("Failed to bind {addr}"))?;
        info!(port = self.config.port, "web server listening");

        axum::serve(listener, router)
            .with_graceful_shutdown(shutdown_signal())
            .await
            .context("server error")?;

        self.app_state.weather.stop_sweeper();
        info!("shutdown complete");
        Ok(())
    }
}

/// Resolves on SIGINT or SIGTERM.
async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
    info!("shutdown signal received");
}
