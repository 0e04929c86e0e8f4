//! Lenient date and timestamp encodings for persisted event records.
//!
//! Each field decides for itself how to read a string: date fields accept a
//! plain `YYYY-MM-DD` or any ISO date-time (keeping the date part), timestamp
//! fields accept an RFC 3339 date-time, a naive date-time (read as UTC) or a
//! plain date (midnight UTC).

use chrono::{DateTime, FixedOffset, NaiveDate, NaiveDateTime, SecondsFormat, Utc};

const NAIVE_DATETIME_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.f";
const DATE_FORMAT: &str = "%Y-%m-%d";

/// Parses an ISO date, or the date part of an ISO date-time.
#[must_use]
pub fn parse_date(raw: &str) -> Option<NaiveDate> {
    let raw = raw.trim();
    if raw.contains('T') {
        if let Ok(datetime) = DateTime::parse_from_rfc3339(raw) {
            return Some(datetime.date_naive());
        }
        if let Ok(datetime) = NaiveDateTime::parse_from_str(raw, NAIVE_DATETIME_FORMAT) {
            return Some(datetime.date());
        }
    }
    NaiveDate::parse_from_str(raw.get(..10)?, DATE_FORMAT).ok()
}

/// Parses an ISO timestamp, falling back to UTC for naive values.
#[must_use]
pub fn parse_timestamp(raw: &str) -> Option<DateTime<FixedOffset>> {
    let raw = raw.trim();
    if let Ok(datetime) = DateTime::parse_from_rfc3339(raw) {
        return Some(datetime);
    }
    if let Ok(datetime) = NaiveDateTime::parse_from_str(raw, NAIVE_DATETIME_FORMAT) {
        return Some(datetime.and_utc().fixed_offset());
    }
    NaiveDate::parse_from_str(raw, DATE_FORMAT)
        .ok()
        .map(|date| date.and_time(chrono::NaiveTime::MIN).and_utc().fixed_offset())
}

/// Serialize a `NaiveDate` as `YYYY-MM-DD`; deserialize leniently.
pub mod flexible_date {
    use chrono::NaiveDate;
    use serde::{Deserialize, Deserializer, Serializer, de::Error};

    pub fn serialize<S: Serializer>(date: &NaiveDate, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(date)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<NaiveDate, D::Error> {
        let raw = String::deserialize(deserializer)?;
        super::parse_date(&raw).ok_or_else(|| D::Error::custom(format!("invalid date: {raw}")))
    }

    /// Same encoding for optional dates; `null` and absent both read as `None`.
    pub mod option {
        use chrono::NaiveDate;
        use serde::{Deserialize, Deserializer, Serializer, de::Error};

        pub fn serialize<S: Serializer>(
            date: &Option<NaiveDate>,
            serializer: S,
        ) -> Result<S::Ok, S::Error> {
            match date {
                Some(date) => serializer.collect_str(date),
                None => serializer.serialize_none(),
            }
        }

        pub fn deserialize<'de, D: Deserializer<'de>>(
            deserializer: D,
        ) -> Result<Option<NaiveDate>, D::Error> {
            Option::<String>::deserialize(deserializer)?
                .map(|raw| {
                    crate::event::serde_helpers::parse_date(&raw)
                        .ok_or_else(|| D::Error::custom(format!("invalid date: {raw}")))
                })
                .transpose()
        }
    }
}

/// Serialize a timestamp as RFC 3339; deserialize leniently.
pub mod flexible_timestamp {
    use chrono::{DateTime, FixedOffset};
    use serde::{Deserialize, Deserializer, Serializer, de::Error};

    pub fn serialize<S: Serializer>(
        timestamp: &DateTime<FixedOffset>,
        serializer: S,
    ) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&super::format_timestamp(timestamp))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<DateTime<FixedOffset>, D::Error> {
        let raw = String::deserialize(deserializer)?;
        super::parse_timestamp(&raw)
            .ok_or_else(|| D::Error::custom(format!("invalid timestamp: {raw}")))
    }
}

fn format_timestamp(timestamp: &DateTime<FixedOffset>) -> String {
    timestamp.to_rfc3339_opts(SecondsFormat::AutoSi, false)
}

/// Fallback creation time for records that predate timestamps.
pub(crate) fn epoch() -> DateTime<FixedOffset> {
    DateTime::<Utc>::UNIX_EPOCH.fixed_offset()
}
