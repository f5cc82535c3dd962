//! Month-grid generation for the calendar view.
//!
//! Months are 1-based. Weeks start on Sunday, and names are fixed English.

use chrono::{Datelike, Days, NaiveDate, Weekday};
use serde::Serialize;

/// A full grid is always 6 weeks, so month transitions don't resize the view.
pub const GRID_WEEKS: usize = 6;
pub const DAYS_PER_WEEK: usize = 7;
pub const GRID_DAYS: usize = GRID_WEEKS * DAYS_PER_WEEK;

pub const MONTH_NAMES: [&str; 12] = [
    "January",
    "February",
    "March",
    "April",
    "May",
    "June",
    "July",
    "August",
    "September",
    "October",
    "November",
    "December",
];

/// Sunday-first, matching the grid layout.
pub const WEEKDAY_NAMES: [&str; 7] = [
    "Sunday",
    "Monday",
    "Tuesday",
    "Wednesday",
    "Thursday",
    "Friday",
    "Saturday",
];

/// One cell of the calendar view.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CalendarDay {
    pub date: NaiveDate,
    pub is_current_month: bool,
    pub is_today: bool,
    pub is_weekend: bool,
}

/// All days of a month, or `None` for an invalid year/month.
pub fn month_days(year: i32, month: u32) -> Option<Vec<NaiveDate>> {
    let first = NaiveDate::from_ymd_opt(year, month, 1)?;
    Some(first.iter_days().take_while(|d| d.month() == month).collect())
}

/// The 42-cell grid for a month: starts at the Sunday on or before the 1st,
/// padded with neighbor-month days to exactly 6 weeks.
pub fn calendar_grid(year: i32, month: u32, today: NaiveDate) -> Option<Vec<CalendarDay>> {
    let first = NaiveDate::from_ymd_opt(year, month, 1)?;
    let start = first.checked_sub_days(Days::new(first.weekday().num_days_from_sunday() as u64))?;

    Some(
        start
            .iter_days()
            .take(GRID_DAYS)
            .map(|date| CalendarDay {
                date,
                is_current_month: date.month() == month && date.year() == year,
                is_today: date == today,
                is_weekend: is_weekend(date),
            })
            .collect(),
    )
}

/// A compact strip: exactly 1 trailing day of the previous month, the full
/// month, and 2 leading days of the next month. Neighbor cells never carry
/// the today marker.
pub fn month_with_neighbors(year: i32, month: u32, today: NaiveDate) -> Option<Vec<CalendarDay>> {
    let first = NaiveDate::from_ymd_opt(year, month, 1)?;
    let previous = first.checked_sub_days(Days::new(1))?;
    let in_month = month_days(year, month)?;
    let last = *in_month.last()?;

    let mut days = Vec::with_capacity(in_month.len() + 3);
    days.push(neighbor_cell(previous));
    days.extend(in_month.into_iter().map(|date| CalendarDay {
        date,
        is_current_month: true,
        is_today: date == today,
        is_weekend: is_weekend(date),
    }));
    for offset in 1..=2 {
        days.push(neighbor_cell(last.checked_add_days(Days::new(offset))?));
    }
    Some(days)
}

fn neighbor_cell(date: NaiveDate) -> CalendarDay {
    CalendarDay {
        date,
        is_current_month: false,
        is_today: false,
        is_weekend: is_weekend(date),
    }
}

pub fn is_weekend(date: NaiveDate) -> bool {
    matches!(date.weekday(), Weekday::Sat | Weekday::Sun)
}

/// English month name for a 1-based month.
pub fn month_name(month: u32) -> Option<&'static str> {
    MONTH_NAMES.get(month.checked_sub(1)? as usize).copied()
}
