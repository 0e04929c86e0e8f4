//! Layering special-period schedules over a base schedule.

use chrono::{DateTime, Days, FixedOffset};

use super::EventCollection;

/// Which bounds of the overriding collection define the window it replaces.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OverrideWindow {
    /// Declared period bounds: earliest `period.start` to latest `period.end`.
    Period,
    /// Actual occurrence bounds: earliest `first_day` to latest `last_day`.
    Occurrences,
}

impl EventCollection {
    /// ## Summary
    /// Replaces this collection's events during the window covered by
    /// `other` with the events of `other`.
    ///
    /// Every event here is cut around the inclusive window; the fragments are
    /// kept alongside all of `other`'s events, then the result is sorted and
    /// cleaned up. An empty `other` leaves the collection unchanged.
    pub fn override_with(
        &mut self,
        other: &EventCollection,
        window: OverrideWindow,
        now: DateTime<FixedOffset>,
    ) {
        let bounds = match window {
            OverrideWindow::Period => other.period_start().zip(other.period_end()),
            OverrideWindow::Occurrences => other.start_date().zip(other.end_date()),
        };
        let Some((start, end)) = bounds else {
            return;
        };
        let exclude_end = end + Days::new(1);

        tracing::debug!(%start, %end, ?window, replacing = other.len(), "Overriding schedule window");

        let mut events: Vec<_> = std::mem::take(&mut self.events)
            .iter()
            .flat_map(|event| event.without_period(start, exclude_end))
            .collect();
        events.extend(other.events.iter().cloned());

        self.events = events;
        self.sort();
        self.cleanup(now);
    }

    /// ## Summary
    /// Builds a schedule from a base collection and successive special-period
    /// collections, each overriding by its declared period.
    #[must_use]
    pub fn compose(
        base: EventCollection,
        overrides: impl IntoIterator<Item = EventCollection>,
        now: DateTime<FixedOffset>,
    ) -> EventCollection {
        overrides.into_iter().fold(base, |mut schedule, special| {
            schedule.override_with(&special, OverrideWindow::Period, now);
            schedule
        })
    }
}
