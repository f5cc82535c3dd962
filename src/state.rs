//! Application state shared across components (web handlers, sweeper).

use crate::data::ReminderStore;
use crate::weather::{FetchWeather, WeatherCache};
use std::sync::Arc;

#[derive(Clone)]
pub struct AppState {
    pub weather: WeatherCache,
    pub reminders: ReminderStore,
}

impl AppState {
    pub fn new(fetcher: Arc<dyn FetchWeather>) -> Self {
        Self {
            weather: WeatherCache::new(fetcher),
            reminders: ReminderStore::new(),
        }
    }
}
