//! A single weekly recurring slot.
//!
//! ## Summary
//! An [`Event`] recurs every week on one weekday, between a start and end
//! time of day, for as long as its `[first_day, last_day]` window lasts. The
//! window starts out as the declared [`Period`] and is then moved by
//! reconciliation: [`Event::end_before`] closes it, [`Event::start_after`]
//! opens it later. Both derived bounds are stored and recomputed only by
//! those mutators.
//!
//! Two digests identify an event. The static hash covers the fields that say
//! which slot this is; the dynamic hash adds the transient notice, so two
//! events with the same static hash but different dynamic hashes are versions
//! of one slot.

mod clock;
pub mod hash;
mod record;
pub mod serde_helpers;

use chrono::{DateTime, Datelike, Days, FixedOffset, NaiveDate, NaiveDateTime, Weekday};
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};

pub use clock::ClockTime;

use crate::error::{ScheduleError, ScheduleResult};
use crate::source::PlaceSource;
use crate::weekday::{day_name, weekday_number};

/// Inclusive calendar bounds during which a weekly pattern is valid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Period {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl Period {
    #[must_use]
    pub const fn new(start: NaiveDate, end: NaiveDate) -> Self {
        Self { start, end }
    }

    #[must_use]
    pub fn contains(&self, day: NaiveDate) -> bool {
        self.start <= day && day <= self.end
    }
}

/// The scraped shape of a slot: when it recurs and under which section.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Slot {
    pub weekday: Weekday,
    pub start_time: ClockTime,
    pub end_time: ClockTime,
    pub section: String,
}

impl Slot {
    #[must_use]
    pub fn new(
        weekday: Weekday,
        start_time: ClockTime,
        end_time: ClockTime,
        section: impl Into<String>,
    ) -> Self {
        Self {
            weekday,
            start_time,
            end_time,
            section: section.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "record::EventRecord", into = "record::EventRecord")]
pub struct Event {
    weekday: Weekday,
    start_time: ClockTime,
    end_time: ClockTime,
    section: String,
    title: String,
    period: Period,
    first_day: NaiveDate,
    last_day: NaiveDate,
    notice: Option<String>,
    notice_details: Option<String>,
    created_at: DateTime<FixedOffset>,
    updated_at: DateTime<FixedOffset>,
    seen: bool,
}

/// First date on or after `day` that falls on `weekday`.
pub(crate) fn next_occurrence(day: NaiveDate, weekday: Weekday) -> NaiveDate {
    let ahead = (7 + weekday_number(weekday) - weekday_number(day.weekday())) % 7;
    day + Days::new(u64::from(ahead))
}

impl Event {
    /// Creates an event valid over `period`, stamped as created at `now`.
    #[must_use]
    pub fn new(
        slot: Slot,
        title: impl Into<String>,
        period: Period,
        now: DateTime<FixedOffset>,
    ) -> Self {
        Self {
            first_day: next_occurrence(period.start, slot.weekday),
            last_day: period.end,
            weekday: slot.weekday,
            start_time: slot.start_time,
            end_time: slot.end_time,
            section: slot.section,
            title: title.into(),
            period,
            notice: None,
            notice_details: None,
            created_at: now,
            updated_at: now,
            seen: false,
        }
    }

    /// Creates an event for a slot scraped from `source`.
    ///
    /// The title is the place title followed by the lower-cased section; the
    /// validity window and notice come from the source.
    #[must_use]
    pub fn from_source(source: &dyn PlaceSource, slot: Slot, now: DateTime<FixedOffset>) -> Self {
        let title = format!("{} {}", source.event_title(), slot.section.to_lowercase());
        Self::new(slot, title, source.season(), now).with_notice(
            source.notice().map(str::to_string),
            source.notice_details().map(str::to_string),
        )
    }

    #[must_use]
    pub fn with_notice(mut self, notice: Option<String>, notice_details: Option<String>) -> Self {
        self.notice = notice;
        self.notice_details = notice_details;
        self
    }

    #[must_use]
    pub fn weekday(&self) -> Weekday {
        self.weekday
    }

    #[must_use]
    pub fn start_time(&self) -> ClockTime {
        self.start_time
    }

    #[must_use]
    pub fn end_time(&self) -> ClockTime {
        self.end_time
    }

    #[must_use]
    pub fn section(&self) -> &str {
        &self.section
    }

    #[must_use]
    pub fn title(&self) -> &str {
        &self.title
    }

    #[must_use]
    pub fn period(&self) -> Period {
        self.period
    }

    #[must_use]
    pub fn first_day(&self) -> NaiveDate {
        self.first_day
    }

    #[must_use]
    pub fn last_day(&self) -> NaiveDate {
        self.last_day
    }

    /// Moves the end of the validity window.
    pub fn set_last_day(&mut self, last_day: NaiveDate) {
        self.last_day = last_day;
    }

    #[must_use]
    pub fn notice(&self) -> Option<&str> {
        self.notice.as_deref()
    }

    #[must_use]
    pub fn notice_details(&self) -> Option<&str> {
        self.notice_details.as_deref()
    }

    #[must_use]
    pub fn created_at(&self) -> DateTime<FixedOffset> {
        self.created_at
    }

    #[must_use]
    pub fn updated_at(&self) -> DateTime<FixedOffset> {
        self.updated_at
    }

    pub(crate) fn touch(&mut self, now: DateTime<FixedOffset>) {
        self.updated_at = now;
    }

    #[must_use]
    pub fn is_seen(&self) -> bool {
        self.seen
    }

    pub fn mark_seen(&mut self) {
        self.seen = true;
    }

    pub(crate) fn clear_seen(&mut self) {
        self.seen = false;
    }

    /// First occurrence, as local wall-clock time.
    #[must_use]
    pub fn start_datetime(&self) -> NaiveDateTime {
        self.first_day.and_time(self.start_time.as_naive())
    }

    /// End of the first occurrence, as local wall-clock time.
    #[must_use]
    pub fn end_datetime(&self) -> NaiveDateTime {
        self.first_day.and_time(self.end_time.as_naive())
    }

    /// Whether the validity window is empty.
    #[must_use]
    pub fn is_degenerate(&self) -> bool {
        self.last_day < self.first_day
    }

    /// ## Summary
    /// Ends the validity window no later than the day before `cutoff`,
    /// recording `cutoff` as the last update when the window shrinks.
    ///
    /// A window that already ends earlier is left as is.
    pub fn end_before(&mut self, cutoff: DateTime<FixedOffset>) {
        let previous = self.last_day;
        self.close_before_day(cutoff.date_naive());
        if self.last_day != previous {
            self.updated_at = cutoff;
        }
    }

    /// Ends the validity window no later than the day before `day`, leaving
    /// `updated_at` alone.
    pub fn close_before_day(&mut self, day: NaiveDate) {
        self.last_day = self.last_day.min(day - Days::new(1));
    }

    /// ## Summary
    /// Starts the validity window no earlier than the first matching weekday
    /// on or after the date of `cutoff`.
    ///
    /// A window that already starts later is left as is.
    pub fn start_after(&mut self, cutoff: DateTime<FixedOffset>) {
        self.open_from_day(cutoff.date_naive());
    }

    /// Starts the validity window no earlier than the first matching weekday
    /// on or after `day`.
    pub fn open_from_day(&mut self, day: NaiveDate) {
        self.first_day = self.first_day.max(next_occurrence(day, self.weekday));
    }

    /// ## Summary
    /// Returns copies of this event with `[exclude_start, exclude_end)` cut out
    /// of the validity window.
    ///
    /// Yields the unchanged event when the ranges do not meet, nothing when
    /// the excluded range covers the whole window, and otherwise a fragment
    /// before and/or after the excluded range.
    pub fn without_period(
        &self,
        exclude_start: NaiveDate,
        exclude_end: NaiveDate,
    ) -> impl Iterator<Item = Event> + use<> {
        let disjoint = exclude_end <= self.first_day || exclude_start > self.last_day;

        let unchanged = disjoint.then(|| self.clone());
        let before = (!disjoint && exclude_start > self.first_day).then(|| {
            let mut fragment = self.clone();
            fragment.close_before_day(exclude_start);
            fragment
        });
        let after = (!disjoint && exclude_end <= self.last_day).then(|| {
            let mut fragment = self.clone();
            fragment.open_from_day(exclude_end);
            fragment
        });

        unchanged.into_iter().chain(before).chain(after)
    }

    /// Whether the two validity windows share at least one day.
    #[must_use]
    pub fn overlap(&self, other: &Event) -> bool {
        !(other.last_day < self.first_day || other.first_day > self.last_day)
    }

    fn static_fields(&self) -> Vec<(&'static str, Value)> {
        vec![
            ("title", json!(self.title)),
            ("weekday", json!(weekday_number(self.weekday))),
            ("start_time", json!([self.start_time.hour(), self.start_time.minute()])),
            ("end_time", json!([self.end_time.hour(), self.end_time.minute()])),
            ("period_start", json!(self.period.start.to_string())),
            ("period_end", json!(self.period.end.to_string())),
            ("section", json!(self.section)),
        ]
    }

    fn dynamic_fields(&self) -> Vec<(&'static str, Value)> {
        let mut fields = self.static_fields();
        fields.push(("notice", json!(self.notice)));
        fields.push(("notice_details", json!(self.notice_details)));
        fields
    }

    /// Digest of the fields identifying the slot.
    #[must_use]
    pub fn static_hash(&self) -> String {
        hash::digest_fields(self.static_fields())
    }

    /// Digest of the identifying fields plus the current notice.
    #[must_use]
    pub fn dynamic_hash(&self) -> String {
        hash::digest_fields(self.dynamic_fields())
    }

    /// Sort key: `(first_day, start_time, end_time, section)`.
    #[must_use]
    pub fn sort_key(&self) -> (NaiveDate, ClockTime, ClockTime, &str) {
        (self.first_day, self.start_time, self.end_time, &self.section)
    }

    /// Weekly recurrence rule ending on `last_day`.
    #[must_use]
    pub fn rrule(&self) -> String {
        format!("FREQ=WEEKLY;UNTIL={}", self.last_day.format("%Y%m%d"))
    }

    /// ## Summary
    /// Expands the weekly recurrence into the dates it occurs on, at most
    /// `limit` of them.
    ///
    /// ## Errors
    /// Returns an error if the recurrence rule cannot be built.
    pub fn occurrences(&self, limit: u16) -> ScheduleResult<Vec<NaiveDate>> {
        if self.is_degenerate() {
            return Ok(Vec::new());
        }

        let rule = format!(
            "DTSTART:{}Z\nRRULE:FREQ=WEEKLY;UNTIL={}T235959Z",
            self.start_datetime().format("%Y%m%dT%H%M%S"),
            self.last_day.format("%Y%m%d"),
        );
        let set = rule
            .parse::<rrule::RRuleSet>()
            .map_err(|err| ScheduleError::Recurrence(err.to_string()))?;

        Ok(set
            .all(limit)
            .dates
            .into_iter()
            .map(|occurrence| occurrence.date_naive())
            .collect())
    }
}

impl std::fmt::Display for Event {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} ({}, {}-{})",
            self.title,
            day_name(self.weekday),
            self.start_time,
            self.end_time
        )
    }
}
