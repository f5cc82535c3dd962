//! Error types for the weather provider client.

/// Maximum city name length accepted by the provider, in characters.
pub const MAX_CITY_LEN: usize = 100;

#[derive(Debug, thiserror::Error)]
pub enum WeatherError {
    #[error("city name must be 1-100 characters after trimming")]
    InvalidInput,
    #[error("weather provider API key is not configured")]
    ConfigurationMissing,
    #[error("weather request timed out")]
    Timeout,
    #[error("weather provider rejected the API key")]
    Auth,
    #[error("weather provider rate limit exceeded")]
    RateLimited,
    #[error("weather provider returned status {0}")]
    Provider(u16),
    #[error("malformed provider response: {0}")]
    MalformedResponse(String),
    #[error("network error reaching weather provider: {0}")]
    Network(#[source] reqwest::Error),
    #[error("city not found")]
    NotFound,
}

impl WeatherError {
    /// Soft failures are expected operational conditions (no credential,
    /// unknown city, transient connectivity). They are logged at debug
    /// level; everything else is a provider-side problem worth a warning.
    pub fn is_soft(&self) -> bool {
        matches!(
            self,
            WeatherError::ConfigurationMissing
                | WeatherError::Timeout
                | WeatherError::Network(_)
                | WeatherError::NotFound
        )
    }
}
