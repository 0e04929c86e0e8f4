use thiserror::Error;

/// Schedule model and reconciliation errors
#[derive(Error, Debug)]
pub enum ScheduleError {
    #[error("Element {index} is not an event record")]
    NotAnEvent { index: usize },

    #[error("Invalid event record at {index}: {source}")]
    InvalidRecord {
        index: usize,
        #[source]
        source: serde_json::Error,
    },

    #[error("Invalid weekday number: {0}")]
    InvalidWeekday(u32),

    #[error("Invalid clock time: {0}")]
    InvalidClockTime(String),

    #[error("Unknown day name: {0}")]
    UnknownDayName(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Recurrence error: {0}")]
    Recurrence(String),

    #[error("Overlapping versions of the same slot: {first} / {second}")]
    IdentityOverlap { first: String, second: String },

    #[error(transparent)]
    CoreError(#[from] weekslot_core::error::CoreError),
}

pub type ScheduleResult<T> = std::result::Result<T, ScheduleError>;
