//! In-memory data stores shared across handlers.

pub mod reminders;

pub use reminders::{NewReminder, Reminder, ReminderError, ReminderPatch, ReminderStore};
