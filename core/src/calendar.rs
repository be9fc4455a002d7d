//! Calendar helpers: the ordered date axis the simulation walks,
//! and the derived attributes of each date.

use chrono::{Datelike, Duration, NaiveDate, Weekday};

/// Every day in [start, end], ascending. Empty when end < start.
pub fn date_range(start: NaiveDate, end: NaiveDate) -> Vec<NaiveDate> {
    start.iter_days().take_while(|d| *d <= end).collect()
}

/// The Monday on or before `date`.
pub fn week_start(date: NaiveDate) -> NaiveDate {
    date - Duration::days(date.weekday().num_days_from_monday() as i64)
}

/// Replenishment arrives on the first weekday of each week.
pub fn is_replenishment_day(date: NaiveDate) -> bool {
    date.weekday() == Weekday::Mon
}

pub fn month_name(date: NaiveDate) -> String {
    date.format("%b").to_string()
}

pub fn day_name(date: NaiveDate) -> String {
    date.format("%a").to_string()
}

pub fn iso_week(date: NaiveDate) -> u32 {
    date.iso_week().week()
}
