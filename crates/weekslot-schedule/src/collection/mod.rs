//! Sorted collection of events and the reconciliation engine over it.
//!
//! ## Summary
//! The collection is always sorted by `(first_day, start_time, end_time,
//! section)`. That order is the output contract and also the tie-break for
//! "most recent version" lookups during reconciliation. No two events with
//! the same static hash may have overlapping validity windows; see
//! [`EventCollection::identity_conflicts`].

mod overlay;
mod reconcile;

use chrono::{DateTime, FixedOffset, Months, NaiveDate};
use serde::{Serialize, Serializer};
use serde_json::Value;

pub use overlay::OverrideWindow;
pub use reconcile::{ReconcileReport, UpsertOutcome};

use crate::error::{ScheduleError, ScheduleResult};
use crate::event::Event;
use weekslot_core::constants::DEFAULT_RETENTION_MONTHS;

#[derive(Debug, Clone, PartialEq)]
pub struct EventCollection {
    events: Vec<Event>,
    retention_months: u32,
}

impl Default for EventCollection {
    fn default() -> Self {
        Self {
            events: Vec::new(),
            retention_months: DEFAULT_RETENTION_MONTHS,
        }
    }
}

impl EventCollection {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a sorted collection from arbitrary events.
    #[must_use]
    pub fn from_events(events: impl IntoIterator<Item = Event>) -> Self {
        let mut collection = Self {
            events: events.into_iter().collect(),
            ..Self::default()
        };
        collection.sort();
        collection
    }

    /// Sets how many months of ended history survive cleanup.
    #[must_use]
    pub fn with_retention_months(mut self, months: u32) -> Self {
        self.retention_months = months;
        self
    }

    #[must_use]
    pub fn retention_months(&self) -> u32 {
        self.retention_months
    }

    /// ## Summary
    /// Parses a persisted JSON array of event records.
    ///
    /// ## Errors
    /// Returns [`ScheduleError::NotAnEvent`] for an element that is not a JSON
    /// object, [`ScheduleError::InvalidRecord`] for an object that does not
    /// decode as an event, and [`ScheduleError::Serialization`] if the text is
    /// not a JSON array.
    pub fn from_json(text: &str) -> ScheduleResult<Self> {
        let elements: Vec<Value> = serde_json::from_str(text)?;
        let mut events = Vec::with_capacity(elements.len());

        for (index, element) in elements.into_iter().enumerate() {
            if !element.is_object() {
                return Err(ScheduleError::NotAnEvent { index });
            }
            let event = serde_json::from_value::<Event>(element)
                .map_err(|source| ScheduleError::InvalidRecord { index, source })?;
            events.push(event);
        }

        Ok(Self::from_events(events))
    }

    /// ## Summary
    /// Renders the collection as a pretty-printed JSON array.
    ///
    /// ## Errors
    /// Returns an error if an event fails to serialize.
    pub fn to_json_pretty(&self) -> ScheduleResult<String> {
        Ok(serde_json::to_string_pretty(&self.events)?)
    }

    /// Appends one event and restores the sort order.
    pub fn push(&mut self, event: Event) {
        self.events.push(event);
        self.sort();
    }

    pub fn sort(&mut self) {
        self.events.sort_by(|a, b| a.sort_key().cmp(&b.sort_key()));
    }

    #[must_use]
    pub fn is_sorted(&self) -> bool {
        self.events
            .is_sorted_by(|a, b| a.sort_key() <= b.sort_key())
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.events.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Event> {
        self.events.iter()
    }

    #[must_use]
    pub fn events(&self) -> &[Event] {
        &self.events
    }

    #[must_use]
    pub fn into_events(self) -> Vec<Event> {
        self.events
    }

    /// Marks every event as matched by the current batch.
    pub fn mark_all_seen(&mut self) {
        self.events.iter_mut().for_each(Event::mark_seen);
    }

    /// Earliest declared period start.
    #[must_use]
    pub fn period_start(&self) -> Option<NaiveDate> {
        self.events.iter().map(|event| event.period().start).min()
    }

    /// Latest declared period end.
    #[must_use]
    pub fn period_end(&self) -> Option<NaiveDate> {
        self.events.iter().map(|event| event.period().end).max()
    }

    /// Earliest first occurrence.
    #[must_use]
    pub fn start_date(&self) -> Option<NaiveDate> {
        self.events.iter().map(Event::first_day).min()
    }

    /// Latest last valid day.
    #[must_use]
    pub fn end_date(&self) -> Option<NaiveDate> {
        self.events.iter().map(Event::last_day).max()
    }

    /// Events ending before this day are pruned by cleanup.
    #[must_use]
    pub fn expiry_threshold(&self, now: DateTime<FixedOffset>) -> NaiveDate {
        now.date_naive()
            .checked_sub_months(Months::new(self.retention_months))
            .unwrap_or(NaiveDate::MIN)
    }

    /// ## Summary
    /// Returns index pairs of events that share a static hash and have
    /// overlapping validity windows.
    #[must_use]
    pub fn identity_conflicts(&self) -> Vec<(usize, usize)> {
        let hashes: Vec<String> = self.events.iter().map(Event::static_hash).collect();
        let mut conflicts = Vec::new();

        for (i, first) in self.events.iter().enumerate() {
            for (j, second) in self.events.iter().enumerate().skip(i + 1) {
                if hashes[i] == hashes[j] && first.overlap(second) {
                    conflicts.push((i, j));
                }
            }
        }

        conflicts
    }

    /// ## Summary
    /// Checks the no-overlapping-versions invariant.
    ///
    /// ## Errors
    /// Returns [`ScheduleError::IdentityOverlap`] naming the first offending pair.
    pub fn ensure_no_identity_conflicts(&self) -> ScheduleResult<()> {
        match self.identity_conflicts().first() {
            Some(&(i, j)) => Err(ScheduleError::IdentityOverlap {
                first: self.events[i].to_string(),
                second: self.events[j].to_string(),
            }),
            None => Ok(()),
        }
    }
}

impl Serialize for EventCollection {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_seq(&self.events)
    }
}

impl<'a> IntoIterator for &'a EventCollection {
    type Item = &'a Event;
    type IntoIter = std::slice::Iter<'a, Event>;

    fn into_iter(self) -> Self::IntoIter {
        self.events.iter()
    }
}

impl IntoIterator for EventCollection {
    type Item = Event;
    type IntoIter = std::vec::IntoIter<Event>;

    fn into_iter(self) -> Self::IntoIter {
        self.events.into_iter()
    }
}

impl FromIterator<Event> for EventCollection {
    fn from_iter<I: IntoIterator<Item = Event>>(iter: I) -> Self {
        Self::from_events(iter)
    }
}
