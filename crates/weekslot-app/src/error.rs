use std::path::PathBuf;

use thiserror::Error;
use weekslot_core::types::PlaceTarget;

/// Application-level errors (batch driver)
#[derive(Error, Debug)]
pub enum AppError {
    #[error("No events found for {target}")]
    NoEvents { target: PlaceTarget },

    #[error("Reconciling {batch_len} scraped events left nothing for {target}")]
    EmptyReconciliation { target: PlaceTarget, batch_len: usize },

    #[error("Cannot read snapshot {path}: {source}")]
    SnapshotIo {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Malformed snapshot {path}: {source}")]
    SnapshotFormat {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("Pass task failed: {0}")]
    Task(String),

    #[error(transparent)]
    StoreError(#[from] weekslot_store::error::StoreError),

    #[error(transparent)]
    ScheduleError(#[from] weekslot_schedule::error::ScheduleError),

    #[error(transparent)]
    CoreError(#[from] weekslot_core::error::CoreError),
}

pub type AppResult<T> = std::result::Result<T, AppError>;
