//! Upsert, end-unseen and cleanup.
//!
//! Each logical slot (one static hash) moves through
//! `Active -> Closed + new Active -> ... -> Expired`. A changed notice never
//! overwrites an event: the current version is closed as of today and a new
//! version opens on the next matching weekday.

use chrono::{DateTime, FixedOffset};

use super::EventCollection;
use crate::event::Event;

/// What [`EventCollection::upsert`] did with an incoming event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpsertOutcome {
    /// No existing version matched; the event was added as a new slot.
    Inserted,
    /// The latest version already carried the same state; its window was refreshed.
    Unchanged,
    /// The latest version was closed and the event added as its successor.
    Versioned,
}

/// Counters for one [`EventCollection::upsert_all`] pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ReconcileReport {
    pub inserted: usize,
    pub unchanged: usize,
    pub versioned: usize,
    pub ended: usize,
    pub pruned: usize,
}

impl ReconcileReport {
    fn record(&mut self, outcome: UpsertOutcome) {
        match outcome {
            UpsertOutcome::Inserted => self.inserted += 1,
            UpsertOutcome::Unchanged => self.unchanged += 1,
            UpsertOutcome::Versioned => self.versioned += 1,
        }
    }
}

impl EventCollection {
    /// ## Summary
    /// Index of the latest event, in sort order, that is a version of the same
    /// slot as `event` and whose non-empty validity window overlaps it.
    #[must_use]
    pub fn latest_version_of(&self, event: &Event) -> Option<usize> {
        let wanted = event.static_hash();
        let mut latest = None;

        for (index, candidate) in self.events.iter().enumerate() {
            if !candidate.is_degenerate()
                && candidate.overlap(event)
                && candidate.static_hash() == wanted
            {
                latest = Some(index);
            }
        }

        latest
    }

    /// ## Summary
    /// Reconciles a single freshly observed event, then prunes degenerate and
    /// expired events.
    pub fn upsert(&mut self, event: Event, now: DateTime<FixedOffset>) -> UpsertOutcome {
        let outcome = self.upsert_deferred(event, now);
        self.cleanup(now);
        outcome
    }

    fn upsert_deferred(&mut self, mut event: Event, now: DateTime<FixedOffset>) -> UpsertOutcome {
        let Some(index) = self.latest_version_of(&event) else {
            tracing::debug!(event = %event, "New slot");
            event.mark_seen();
            self.push(event);
            return UpsertOutcome::Inserted;
        };

        let current = &mut self.events[index];

        if current.dynamic_hash() == event.dynamic_hash() {
            if current.last_day() != event.last_day() {
                tracing::trace!(
                    event = %current,
                    from = %current.last_day(),
                    to = %event.last_day(),
                    "Refreshing validity window"
                );
                current.set_last_day(event.last_day());
                current.touch(now);
            }
            current.mark_seen();
            return UpsertOutcome::Unchanged;
        }

        tracing::debug!(
            event = %event,
            previous_notice = ?current.notice(),
            notice = ?event.notice(),
            "Slot changed, versioning"
        );
        current.end_before(now);
        event.start_after(now);
        if event.is_degenerate() {
            tracing::trace!(event = %event, "Changed slot has no occurrence left");
        } else {
            event.mark_seen();
            self.push(event);
        }
        UpsertOutcome::Versioned
    }

    /// ## Summary
    /// Reconciles a full batch scraped for one place/language pair.
    ///
    /// Every event in `batch` is upserted in sort order, so fragments of one
    /// slot are matched earliest first whatever order they arrive in. Events
    /// of the previous state that the batch did not match are closed as of
    /// `now`; degenerate and expired events are pruned.
    pub fn upsert_all(
        &mut self,
        batch: impl IntoIterator<Item = Event>,
        now: DateTime<FixedOffset>,
    ) -> ReconcileReport {
        let mut report = ReconcileReport::default();

        let mut batch: Vec<Event> = batch.into_iter().collect();
        batch.sort_by(|a, b| a.sort_key().cmp(&b.sort_key()));

        for event in &mut self.events {
            event.clear_seen();
        }

        for event in batch {
            let outcome = self.upsert_deferred(event, now);
            report.record(outcome);
        }

        report.ended = self.end_unseen(now);
        report.pruned = self.cleanup(now);
        self.sort();

        for (i, j) in self.identity_conflicts() {
            tracing::warn!(
                first = %self.events[i],
                second = %self.events[j],
                "Overlapping versions of the same slot"
            );
        }

        tracing::debug!(?report, remaining = self.len(), "Reconciliation pass complete");
        report
    }

    /// ## Summary
    /// Closes, as of `now`, every event not matched in the current pass that
    /// is still valid today or later. Returns how many were closed.
    pub fn end_unseen(&mut self, now: DateTime<FixedOffset>) -> usize {
        let today = now.date_naive();
        let mut ended = 0;

        for event in &mut self.events {
            if !event.is_seen() && event.last_day() >= today {
                tracing::debug!(event = %event, "Slot no longer listed, ending");
                event.end_before(now);
                ended += 1;
            }
        }

        ended
    }

    /// ## Summary
    /// Removes events whose window is empty or that ended before the expiry
    /// threshold. Returns how many were removed.
    pub fn cleanup(&mut self, now: DateTime<FixedOffset>) -> usize {
        let threshold = self.expiry_threshold(now);
        let before = self.events.len();

        self.events.retain(|event| {
            let keep = !event.is_degenerate() && event.last_day() >= threshold;
            if !keep {
                tracing::trace!(event = %event, last_day = %event.last_day(), "Pruning");
            }
            keep
        });

        before - self.events.len()
    }
}
