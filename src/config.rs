//! Environment-sourced configuration.

use figment::providers::Env;
use figment::Figment;
use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    #[serde(default = "default_port")]
    pub port: u16,
    /// OpenWeatherMap credential. Absence is recoverable: the service runs
    /// and weather lookups return no data.
    #[serde(default)]
    pub openweather_api_key: Option<String>,
    #[serde(default = "default_weather_base_url")]
    pub weather_base_url: String,
    #[serde(default = "default_log_level")]
    pub log_level: String,
    /// Comma-separated city names warmed into the cache at startup.
    #[serde(default)]
    pub preload_cities: Option<String>,
}

impl Config {
    pub fn load() -> Result<Self, figment::Error> {
        Figment::new().merge(Env::raw()).extract()
    }

    pub fn preload_city_list(&self) -> Vec<String> {
        self.preload_cities
            .as_deref()
            .unwrap_or_default()
            .split(',')
            .map(str::trim)
            .filter(|c| !c.is_empty())
            .map(str::to_owned)
            .collect()
    }
}

fn default_port() -> u16 {
    8080
}

fn default_weather_base_url() -> String {
    crate::weather::client::DEFAULT_BASE_URL.to_owned()
}

fn default_log_level() -> String {
    "info".to_owned()
}
