//! Persisted form of an [`Event`].
//!
//! Derived values (`first_day`, `last_day`, the anchor date-times) are written
//! for downstream readers. On read, the anchor date-times are ignored and the
//! day bounds fall back to their derivations when absent.

use chrono::{DateTime, FixedOffset, NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

use super::serde_helpers::{flexible_date, flexible_timestamp};
use super::{ClockTime, Event, Period};
use crate::error::ScheduleError;
use crate::weekday::{weekday_from_number, weekday_number};

#[derive(Debug, Serialize, Deserialize)]
pub(crate) struct EventRecord {
    title: String,
    weekday: u32,
    start_time: ClockTime,
    end_time: ClockTime,
    #[serde(with = "flexible_date")]
    period_start: NaiveDate,
    #[serde(with = "flexible_date")]
    period_end: NaiveDate,
    section: String,
    #[serde(default)]
    notice: Option<String>,
    #[serde(default)]
    notice_details: Option<String>,
    #[serde(default, with = "flexible_date::option")]
    first_day: Option<NaiveDate>,
    #[serde(default, skip_deserializing)]
    start_datetime: Option<NaiveDateTime>,
    #[serde(default, skip_deserializing)]
    end_datetime: Option<NaiveDateTime>,
    #[serde(
        default = "super::serde_helpers::epoch",
        with = "flexible_timestamp"
    )]
    created_at: DateTime<FixedOffset>,
    #[serde(
        default = "super::serde_helpers::epoch",
        with = "flexible_timestamp"
    )]
    updated_at: DateTime<FixedOffset>,
    #[serde(default, with = "flexible_date::option")]
    last_day: Option<NaiveDate>,
}

impl From<Event> for EventRecord {
    fn from(event: Event) -> Self {
        Self {
            start_datetime: Some(event.start_datetime()),
            end_datetime: Some(event.end_datetime()),
            title: event.title,
            weekday: weekday_number(event.weekday),
            start_time: event.start_time,
            end_time: event.end_time,
            period_start: event.period.start,
            period_end: event.period.end,
            section: event.section,
            notice: event.notice,
            notice_details: event.notice_details,
            first_day: Some(event.first_day),
            created_at: event.created_at,
            updated_at: event.updated_at,
            last_day: Some(event.last_day),
        }
    }
}

impl TryFrom<EventRecord> for Event {
    type Error = ScheduleError;

    fn try_from(record: EventRecord) -> Result<Self, Self::Error> {
        let weekday = weekday_from_number(record.weekday)?;
        let period = Period::new(record.period_start, record.period_end);

        Ok(Self {
            weekday,
            start_time: record.start_time,
            end_time: record.end_time,
            section: record.section,
            title: record.title,
            first_day: record
                .first_day
                .unwrap_or_else(|| super::next_occurrence(period.start, weekday)),
            last_day: record.last_day.unwrap_or(period.end),
            period,
            notice: record.notice,
            notice_details: record.notice_details,
            created_at: record.created_at,
            updated_at: record.updated_at,
            seen: false,
        })
    }
}
