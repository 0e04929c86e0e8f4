//! Weekly recurring slots and the reconciliation engine that versions them.
//!
//! An [`Event`](event::Event) is one weekly slot valid between two calendar
//! bounds. An [`EventCollection`](collection::EventCollection) keeps events
//! sorted and reconciles freshly scraped batches against persisted state.

pub mod collection;
pub mod error;
pub mod event;
pub mod source;
pub mod weekday;

pub use collection::{EventCollection, OverrideWindow, ReconcileReport, UpsertOutcome};
pub use event::{ClockTime, Event, Period, Slot};
pub use source::PlaceSource;
