//! OpenWeatherMap client: one bounded GET per lookup, with status-based
//! error classification and payload validation.

use crate::weather::errors::{MAX_CITY_LEN, WeatherError};
use crate::weather::json::parse_with_path;
use async_trait::async_trait;
use serde::Deserialize;
use std::time::Duration;
use tracing::debug;

/// Default provider endpoint. Overridable via config for tests and proxies.
pub const DEFAULT_BASE_URL: &str = "https://api.openweathermap.org/data/2.5/weather";

/// Hard cap on a single provider round-trip.
pub const FETCH_TIMEOUT: Duration = Duration::from_secs(5);

/// Current conditions for a city, normalized from the provider payload.
#[derive(Debug, Clone, PartialEq)]
pub struct WeatherRecord {
    /// Condition group, e.g. "Clear", "Rain".
    pub condition: String,
    /// Human-readable description, e.g. "scattered clouds".
    pub description: String,
    /// Provider icon code, e.g. "04d".
    pub icon_code: String,
    /// Rounded to the nearest whole degree.
    pub temperature_celsius: i32,
}

impl WeatherRecord {
    /// The display string handed to UI callers: `"<emoji> <description> <temp>°C"`.
    pub fn display(&self) -> String {
        format!(
            "{} {} {}°C",
            condition_emoji(&self.condition),
            self.description,
            self.temperature_celsius
        )
    }
}

/// Emoji for a provider condition group. Unknown groups get a neutral sun-behind-cloud.
pub fn condition_emoji(condition: &str) -> &'static str {
    match condition {
        "Clear" => "☀️",
        "Clouds" => "☁️",
        "Rain" => "🌧️",
        "Drizzle" => "🌦️",
        "Thunderstorm" => "⛈️",
        "Snow" => "❄️",
        "Mist" | "Fog" | "Haze" => "🌫️",
        "Dust" | "Sand" | "Tornado" => "🌪️",
        "Ash" => "🌋",
        "Squall" => "💨",
        _ => "🌤️",
    }
}

/// Seam between the cache coordinator and the network, so the coordinator is
/// testable with a stub fetcher.
#[async_trait]
pub trait FetchWeather: Send + Sync {
    async fn fetch(&self, city: &str) -> Result<WeatherRecord, WeatherError>;
}

/// Client for fetching current conditions from OpenWeatherMap.
pub struct WeatherClient {
    http: reqwest::Client,
    base_url: String,
    api_key: Option<String>,
}

impl WeatherClient {
    pub fn new(api_key: Option<String>) -> anyhow::Result<Self> {
        Self::with_base_url(api_key, DEFAULT_BASE_URL.to_owned())
    }

    pub fn with_base_url(api_key: Option<String>, base_url: String) -> anyhow::Result<Self> {
        let http = reqwest::Client::builder().timeout(FETCH_TIMEOUT).build()?;
        Ok(Self {
            http,
            base_url,
            api_key,
        })
    }
}

#[async_trait]
impl FetchWeather for WeatherClient {
    async fn fetch(&self, city: &str) -> Result<WeatherRecord, WeatherError> {
        let city = city.trim();
        if city.is_empty() || city.chars().count() > MAX_CITY_LEN {
            return Err(WeatherError::InvalidInput);
        }
        let key = self
            .api_key
            .as_deref()
            .ok_or(WeatherError::ConfigurationMissing)?;

        debug!(city, "fetching weather");
        let resp = self
            .http
            .get(&self.base_url)
            .query(&[("q", city), ("appid", key), ("units", "metric"), ("lang", "en")])
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    WeatherError::Timeout
                } else {
                    WeatherError::Network(e)
                }
            })?;

        match resp.status().as_u16() {
            404 => return Err(WeatherError::NotFound),
            401 => return Err(WeatherError::Auth),
            429 => return Err(WeatherError::RateLimited),
            status if !(200..300).contains(&status) => {
                return Err(WeatherError::Provider(status));
            }
            _ => {}
        }

        let body = resp.text().await.map_err(WeatherError::Network)?;
        parse_record(&body)
    }
}

/// Validate and normalize a 2xx provider body into a `WeatherRecord`.
fn parse_record(body: &str) -> Result<WeatherRecord, WeatherError> {
    let parsed: ProviderResponse =
        parse_with_path(body).map_err(WeatherError::MalformedResponse)?;

    // The provider mirrors an HTTP-style code in the body; trust it over a
    // misleading 2xx transport status.
    if let Some(cod) = parsed.cod.as_ref().and_then(body_code)
        && cod != 200
    {
        return Err(WeatherError::Provider(cod as u16));
    }

    let condition = parsed
        .weather
        .into_iter()
        .next()
        .ok_or_else(|| WeatherError::MalformedResponse("empty weather conditions".to_owned()))?;
    let main = parsed
        .main
        .ok_or_else(|| WeatherError::MalformedResponse("missing temperature".to_owned()))?;

    Ok(WeatherRecord {
        condition: condition.main,
        description: condition.description,
        icon_code: condition.icon,
        temperature_celsius: main.temp.round() as i32,
    })
}

/// `cod` arrives as a number on success and a quoted string on some error
/// payloads; accept both.
fn body_code(value: &serde_json::Value) -> Option<i64> {
    value
        .as_i64()
        .or_else(|| value.as_str().and_then(|s| s.parse().ok()))
}

#[derive(Debug, Deserialize)]
struct ProviderResponse {
    #[serde(default)]
    weather: Vec<ProviderCondition>,
    main: Option<ProviderMain>,
    #[serde(default)]
    cod: Option<serde_json::Value>,
}

#[derive(Debug, Deserialize)]
struct ProviderCondition {
    main: String,
    description: String,
    icon: String,
}

#[derive(Debug, Deserialize)]
struct ProviderMain {
    temp: f64,
}
