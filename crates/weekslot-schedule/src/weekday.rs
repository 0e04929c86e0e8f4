//! Day-of-week numbering and day-name translation.
//!
//! Weekdays are numbered from Sunday (0) to Saturday (6). Day names scraped
//! from French pages are translated to English before parsing; names with no
//! translation are passed through unchanged.

use chrono::Weekday;

use crate::error::{ScheduleError, ScheduleResult};

const FRENCH_DAY_NAMES: [(&str, &str); 7] = [
    ("lundi", "monday"),
    ("mardi", "tuesday"),
    ("mercredi", "wednesday"),
    ("jeudi", "thursday"),
    ("vendredi", "friday"),
    ("samedi", "saturday"),
    ("dimanche", "sunday"),
];

const ENGLISH_DAY_NAMES: [&str; 7] = [
    "Sunday",
    "Monday",
    "Tuesday",
    "Wednesday",
    "Thursday",
    "Friday",
    "Saturday",
];

/// Translates a lowercase French day name to English.
///
/// Unmapped names are returned as-is.
#[must_use]
pub fn translate_day_name(name: &str) -> &str {
    FRENCH_DAY_NAMES
        .iter()
        .find(|(french, _)| *french == name)
        .map_or(name, |(_, english)| *english)
}

/// ## Summary
/// Parses a French or English day name (full or three-letter English
/// abbreviation), ignoring case and surrounding whitespace.
///
/// ## Errors
/// Returns [`ScheduleError::UnknownDayName`] if the name is not a weekday.
pub fn parse_weekday(name: &str) -> ScheduleResult<Weekday> {
    let lowered = name.trim().to_lowercase();
    translate_day_name(&lowered)
        .parse::<Weekday>()
        .map_err(|_err| ScheduleError::UnknownDayName(name.to_string()))
}

/// Returns the Sunday-based number (0-6) of a weekday.
#[must_use]
pub fn weekday_number(weekday: Weekday) -> u32 {
    weekday.num_days_from_sunday()
}

/// ## Summary
/// Converts a Sunday-based number (0-6) into a weekday.
///
/// ## Errors
/// Returns [`ScheduleError::InvalidWeekday`] for numbers above 6.
pub fn weekday_from_number(number: u32) -> ScheduleResult<Weekday> {
    match number {
        0 => Ok(Weekday::Sun),
        1 => Ok(Weekday::Mon),
        2 => Ok(Weekday::Tue),
        3 => Ok(Weekday::Wed),
        4 => Ok(Weekday::Thu),
        5 => Ok(Weekday::Fri),
        6 => Ok(Weekday::Sat),
        other => Err(ScheduleError::InvalidWeekday(other)),
    }
}

/// English display name of a weekday.
#[must_use]
pub fn day_name(weekday: Weekday) -> &'static str {
    ENGLISH_DAY_NAMES[weekday.num_days_from_sunday() as usize]
}
