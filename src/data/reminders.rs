//! In-memory reminder store.
//!
//! Reminders live for the lifetime of the process; there is no persistence
//! layer by design. The store is clone-cheap and shared across handlers.

use chrono::{NaiveDate, NaiveTime};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tokio::sync::RwLock;
use ulid::Ulid;

/// Reminder text is limited to a short calendar-cell-sized blurb.
pub const TEXT_MAX_LENGTH: usize = 30;

/// Color applied when the client does not pick one.
pub const DEFAULT_COLOR: &str = "#2196f3";

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Reminder {
    pub id: String,
    pub text: String,
    pub date: NaiveDate,
    pub time: NaiveTime,
    pub city: String,
    pub color: String,
    /// Display string like `"☀️ clear sky 18°C"`, when a lookup succeeded.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub weather: Option<String>,
}

/// Payload for creating a reminder.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewReminder {
    pub text: String,
    pub date: NaiveDate,
    pub time: NaiveTime,
    pub city: String,
    #[serde(default = "default_color")]
    pub color: String,
    #[serde(default)]
    pub weather: Option<String>,
}

/// Partial update; absent fields keep their current value.
///
/// `weather` distinguishes three cases: field absent (keep), `null` (clear
/// the annotation), and a string (replace it).
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReminderPatch {
    pub text: Option<String>,
    pub date: Option<NaiveDate>,
    pub time: Option<NaiveTime>,
    pub city: Option<String>,
    pub color: Option<String>,
    #[serde(default, deserialize_with = "double_option")]
    pub weather: Option<Option<String>>,
}

/// Wraps a present-but-maybe-null field so absence and `null` stay distinct.
fn double_option<'de, D>(de: D) -> Result<Option<Option<String>>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    Option::<String>::deserialize(de).map(Some)
}

fn default_color() -> String {
    DEFAULT_COLOR.to_owned()
}

#[derive(Debug, thiserror::Error, PartialEq)]
pub enum ReminderError {
    #[error("reminder text must be 1-{TEXT_MAX_LENGTH} characters")]
    InvalidText,
    #[error("city must not be empty")]
    EmptyCity,
    #[error("color must be a hex value like #2196f3")]
    InvalidColor,
    #[error("no reminder with id {0}")]
    NotFound(String),
}

/// Thread-safe in-memory reminder collection.
#[derive(Clone, Default)]
pub struct ReminderStore {
    inner: Arc<RwLock<Vec<Reminder>>>,
}

impl ReminderStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Validate and insert, returning the stored reminder with its new ID.
    pub async fn add(&self, new: NewReminder) -> Result<Reminder, ReminderError> {
        validate_text(&new.text)?;
        validate_city(&new.city)?;
        validate_color(&new.color)?;

        let reminder = Reminder {
            id: Ulid::new().to_string(),
            text: new.text,
            date: new.date,
            time: new.time,
            city: new.city,
            color: new.color,
            weather: new.weather,
        };
        self.inner.write().await.push(reminder.clone());
        Ok(reminder)
    }

    /// Apply a partial update, returning the updated reminder.
    pub async fn update(&self, id: &str, patch: ReminderPatch) -> Result<Reminder, ReminderError> {
        if let Some(ref text) = patch.text {
            validate_text(text)?;
        }
        if let Some(ref city) = patch.city {
            validate_city(city)?;
        }
        if let Some(ref color) = patch.color {
            validate_color(color)?;
        }

        let mut reminders = self.inner.write().await;
        let reminder = reminders
            .iter_mut()
            .find(|r| r.id == id)
            .ok_or_else(|| ReminderError::NotFound(id.to_owned()))?;

        if let Some(text) = patch.text {
            reminder.text = text;
        }
        if let Some(date) = patch.date {
            reminder.date = date;
        }
        if let Some(time) = patch.time {
            reminder.time = time;
        }
        if let Some(city) = patch.city {
            reminder.city = city;
        }
        if let Some(color) = patch.color {
            reminder.color = color;
        }
        if let Some(weather) = patch.weather {
            reminder.weather = weather;
        }
        Ok(reminder.clone())
    }

    pub async fn remove(&self, id: &str) -> Result<(), ReminderError> {
        let mut reminders = self.inner.write().await;
        let before = reminders.len();
        reminders.retain(|r| r.id != id);
        if reminders.len() == before {
            return Err(ReminderError::NotFound(id.to_owned()));
        }
        Ok(())
    }

    /// Delete every reminder on a date; returns how many were removed.
    pub async fn remove_all_for_date(&self, date: NaiveDate) -> usize {
        let mut reminders = self.inner.write().await;
        let before = reminders.len();
        reminders.retain(|r| r.date != date);
        before - reminders.len()
    }

    /// Reminders for a date, sorted by time (stable for equal times).
    pub async fn for_date(&self, date: NaiveDate) -> Vec<Reminder> {
        let mut matched: Vec<Reminder> = self
            .inner
            .read()
            .await
            .iter()
            .filter(|r| r.date == date)
            .cloned()
            .collect();
        matched.sort_by_key(|r| r.time);
        matched
    }

    pub async fn get(&self, id: &str) -> Option<Reminder> {
        self.inner.read().await.iter().find(|r| r.id == id).cloned()
    }

    pub async fn len(&self) -> usize {
        self.inner.read().await.len()
    }
}

fn validate_text(text: &str) -> Result<(), ReminderError> {
    let len = text.chars().count();
    if len == 0 || len > TEXT_MAX_LENGTH {
        return Err(ReminderError::InvalidText);
    }
    Ok(())
}

fn validate_city(city: &str) -> Result<(), ReminderError> {
    if city.trim().is_empty() {
        return Err(ReminderError::EmptyCity);
    }
    Ok(())
}

/// Accepts `#rgb` and `#rrggbb`.
fn validate_color(color: &str) -> Result<(), ReminderError> {
    let hex = color
        .strip_prefix('#')
        .ok_or(ReminderError::InvalidColor)?;
    if !matches!(hex.len(), 3 | 6) || !hex.chars().all(|c| c.is_ascii_hexdigit()) {
        return Err(ReminderError::InvalidColor);
    }
    Ok(())
}
