//! Batch driver: reads scraped snapshots, reconciles them against persisted
//! state and writes the result back, one place/language pair at a time.

pub mod error;
pub mod logging;
pub mod runner;
pub mod snapshot;

pub use error::{AppError, AppResult};
pub use runner::{BatchSource, Clock, RunSummary, Runner};
pub use snapshot::{Snapshot, SnapshotSource};
