//! Wall-clock time of day for slot bounds.

use chrono::{NaiveTime, Timelike};
use serde::{Deserialize, Serialize};

use crate::error::{ScheduleError, ScheduleResult};

/// An (hour, minute) pair, serialized as `[hour, minute]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "[u32; 2]", into = "[u32; 2]")]
pub struct ClockTime(NaiveTime);

impl ClockTime {
    /// ## Summary
    /// Creates a time of day.
    ///
    /// ## Errors
    /// Returns an error if `hour >= 24` or `minute >= 60`.
    pub fn new(hour: u32, minute: u32) -> ScheduleResult<Self> {
        NaiveTime::from_hms_opt(hour, minute, 0)
            .map(Self)
            .ok_or_else(|| ScheduleError::InvalidClockTime(format!("{hour}:{minute}")))
    }

    /// ## Summary
    /// Parses `HH:MM` or the French `HHhMM` notation (`9h`, `9 h 30`).
    ///
    /// ## Errors
    /// Returns an error if the text is not a valid time of day.
    pub fn parse(text: &str) -> ScheduleResult<Self> {
        let invalid = || ScheduleError::InvalidClockTime(text.to_string());
        let compact: String = text.chars().filter(|c| !c.is_whitespace()).collect();
        let (hour, minute) = compact
            .split_once(':')
            .or_else(|| compact.split_once(['h', 'H']))
            .ok_or_else(invalid)?;

        let hour = hour.parse::<u32>().map_err(|_err| invalid())?;
        let minute = if minute.is_empty() {
            0
        } else {
            minute.parse::<u32>().map_err(|_err| invalid())?
        };

        Self::new(hour, minute)
    }

    #[must_use]
    pub fn hour(self) -> u32 {
        self.0.hour()
    }

    #[must_use]
    pub fn minute(self) -> u32 {
        self.0.minute()
    }

    #[must_use]
    pub const fn as_naive(self) -> NaiveTime {
        self.0
    }
}

impl TryFrom<[u32; 2]> for ClockTime {
    type Error = ScheduleError;

    fn try_from([hour, minute]: [u32; 2]) -> ScheduleResult<Self> {
        Self::new(hour, minute)
    }
}

impl From<ClockTime> for [u32; 2] {
    fn from(time: ClockTime) -> Self {
        [time.hour(), time.minute()]
    }
}

impl std::fmt::Display for ClockTime {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:02}h{:02}", self.hour(), self.minute())
    }
}
