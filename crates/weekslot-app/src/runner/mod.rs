//! Drives one reconciliation pass per place/language pair.
//!
//! ## Summary
//! A pass fetches the freshly scraped batch, loads the persisted collection,
//! reconciles and saves it. Passes for different pairs are independent: they
//! run on blocking tasks, at most `max_parallel` at a time, and a failing
//! pair is reported without stopping the others.

use std::sync::Arc;

use chrono::{DateTime, FixedOffset, Utc};
use chrono_tz::Tz;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;

use weekslot_core::types::PlaceTarget;
use weekslot_schedule::{Event, EventCollection, ReconcileReport};
use weekslot_store::EventStore;

use crate::error::{AppError, AppResult};

/// Upstream producer of scraped batches.
pub trait BatchSource: Send + Sync {
    /// ## Summary
    /// Returns the events currently listed for `target`.
    ///
    /// ## Errors
    /// Returns an error if the listing cannot be obtained or understood.
    fn fetch(&self, target: &PlaceTarget, now: DateTime<FixedOffset>) -> AppResult<Vec<Event>>;
}

/// Source of "now" for each pass.
#[derive(Debug, Clone, Copy)]
pub enum Clock {
    /// Wall clock in the given timezone.
    System(Tz),
    /// Pinned instant.
    Fixed(DateTime<FixedOffset>),
}

impl Clock {
    #[must_use]
    pub fn now(&self) -> DateTime<FixedOffset> {
        match self {
            Self::System(tz) => Utc::now().with_timezone(tz).fixed_offset(),
            Self::Fixed(now) => *now,
        }
    }
}

/// Outcome of a [`Runner::run`] call, ordered by target.
#[derive(Debug, Default)]
pub struct RunSummary {
    pub succeeded: Vec<(PlaceTarget, ReconcileReport)>,
    pub failed: Vec<(PlaceTarget, AppError)>,
}

impl RunSummary {
    #[must_use]
    pub fn is_success(&self) -> bool {
        self.failed.is_empty()
    }
}

pub struct Runner {
    source: Arc<dyn BatchSource>,
    store: Arc<EventStore>,
    clock: Clock,
    max_parallel: usize,
}

impl Runner {
    #[must_use]
    pub fn new(source: Arc<dyn BatchSource>, store: EventStore, clock: Clock) -> Self {
        Self {
            source,
            store: Arc::new(store),
            clock,
            max_parallel: 1,
        }
    }

    /// Bounds how many pairs are processed at once; zero is treated as one.
    #[must_use]
    pub fn with_max_parallel(mut self, max_parallel: usize) -> Self {
        self.max_parallel = max_parallel.max(1);
        self
    }

    #[must_use]
    pub fn store(&self) -> &EventStore {
        &self.store
    }

    /// ## Summary
    /// Runs one pass for every distinct target and reports per-pair outcomes.
    pub async fn run(&self, targets: impl IntoIterator<Item = PlaceTarget>) -> RunSummary {
        let mut distinct: Vec<PlaceTarget> = Vec::new();
        for target in targets {
            if !distinct.contains(&target) {
                distinct.push(target);
            }
        }

        tracing::info!(
            pairs = distinct.len(),
            max_parallel = self.max_parallel,
            "Starting reconciliation run"
        );

        let permits = Arc::new(Semaphore::new(self.max_parallel));
        let mut pending = distinct.clone();
        let mut tasks = JoinSet::new();
        let mut summary = RunSummary::default();

        for target in distinct {
            let permit = match Arc::clone(&permits).acquire_owned().await {
                Ok(permit) => permit,
                Err(e) => {
                    pending.retain(|other| other != &target);
                    summary.failed.push((target, AppError::Task(e.to_string())));
                    continue;
                }
            };
            let source = Arc::clone(&self.source);
            let store = Arc::clone(&self.store);
            let clock = self.clock;

            tasks.spawn_blocking(move || {
                let span = tracing::info_span!(
                    "pass",
                    place = %target.place,
                    language = %target.language
                );
                let outcome =
                    span.in_scope(|| reconcile_pair(source.as_ref(), &store, &target, clock.now()));
                drop(permit);
                (target, outcome)
            });
        }

        let mut aborted = Vec::new();
        while let Some(joined) = tasks.join_next().await {
            match joined {
                Ok((target, outcome)) => {
                    pending.retain(|other| other != &target);
                    match outcome {
                        Ok(report) => summary.succeeded.push((target, report)),
                        Err(e) => {
                            tracing::error!(pair = %target, error = %e, "Pass failed");
                            summary.failed.push((target, e));
                        }
                    }
                }
                Err(e) => {
                    tracing::error!(error = %e, "Pass task aborted");
                    aborted.push(e.to_string());
                }
            }
        }

        // Passes that never reported back are failures of their own pair.
        let reason = aborted.join("; ");
        for target in pending {
            tracing::error!(pair = %target, "Pass did not complete");
            summary.failed.push((target, AppError::Task(reason.clone())));
        }

        summary.succeeded.sort_by(|a, b| a.0.cmp(&b.0));
        summary.failed.sort_by(|a, b| a.0.cmp(&b.0));

        tracing::info!(
            succeeded = summary.succeeded.len(),
            failed = summary.failed.len(),
            "Reconciliation run complete"
        );
        summary
    }
}

/// ## Summary
/// Runs a single pass for `target`: fetch, load, reconcile, save.
///
/// ## Errors
/// Returns [`AppError::NoEvents`] when the scraped batch is empty,
/// [`AppError::EmptyReconciliation`] when nothing survives the pass, and any
/// fetch or save error. Persisted state is left untouched on error.
pub fn reconcile_pair(
    source: &dyn BatchSource,
    store: &EventStore,
    target: &PlaceTarget,
    now: DateTime<FixedOffset>,
) -> AppResult<ReconcileReport> {
    let mut batch = EventCollection::from_events(source.fetch(target, now)?);
    if batch.is_empty() {
        return Err(AppError::NoEvents {
            target: target.clone(),
        });
    }
    batch.mark_all_seen();
    let batch_len = batch.len();

    let mut collection = store.load(target);
    let previous = collection.len();
    let report = collection.upsert_all(batch, now);

    if collection.is_empty() {
        return Err(AppError::EmptyReconciliation {
            target: target.clone(),
            batch_len,
        });
    }

    let path = store.save(target, &collection)?;
    tracing::info!(
        path = %path.display(),
        scraped = batch_len,
        previous,
        stored = collection.len(),
        inserted = report.inserted,
        versioned = report.versioned,
        ended = report.ended,
        pruned = report.pruned,
        "Pass complete"
    );

    Ok(report)
}
