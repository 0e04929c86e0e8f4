//! File-backed scrape results.
//!
//! ## Summary
//! A snapshot is the JSON rendering of one place page: its title, the
//! current notice, the season bounds, the regular weekly table grouped by
//! section and any special periods (holidays, breaks) that replace the
//! regular table for a few days. [`SnapshotSource`] reads one file per
//! place/language pair from the input directory and turns it into the batch
//! of events a reconciliation pass consumes.

use std::fs;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Datelike, FixedOffset, NaiveDate};
use serde::Deserialize;

use weekslot_core::constants::SNAPSHOT_FILE_EXTENSION;
use weekslot_core::error::CoreError;
use weekslot_core::types::PlaceTarget;
use weekslot_schedule::event::serde_helpers::flexible_date;
use weekslot_schedule::weekday::parse_weekday;
use weekslot_schedule::{ClockTime, Event, EventCollection, Period, PlaceSource, Slot};

use crate::error::{AppError, AppResult};
use crate::runner::BatchSource;

/// One line of a weekly table.
#[derive(Debug, Clone, Deserialize)]
pub struct SlotRow {
    pub day: String,
    pub start: String,
    pub end: String,
}

/// A titled block of the regular weekly table.
#[derive(Debug, Clone, Deserialize)]
pub struct Section {
    pub name: String,
    #[serde(default)]
    pub rows: Vec<SlotRow>,
}

/// A weekly table that replaces the regular one between two dates.
#[derive(Debug, Clone, Deserialize)]
pub struct SpecialPeriod {
    pub name: String,
    #[serde(with = "flexible_date")]
    pub from: NaiveDate,
    #[serde(with = "flexible_date")]
    pub to: NaiveDate,
    #[serde(default)]
    pub rows: Vec<SlotRow>,
}

/// Raw snapshot document as written by the scraper.
#[derive(Debug, Clone, Deserialize)]
pub struct SnapshotDocument {
    pub title: String,
    #[serde(default)]
    pub notice: Option<String>,
    #[serde(default)]
    pub notice_details: Option<String>,
    #[serde(default, with = "flexible_date::option")]
    pub season_from: Option<NaiveDate>,
    #[serde(default, with = "flexible_date::option")]
    pub season_to: Option<NaiveDate>,
    #[serde(default)]
    pub sections: Vec<Section>,
    #[serde(default)]
    pub special_periods: Vec<SpecialPeriod>,
}

/// A snapshot with its season resolved against the day it is read.
#[derive(Debug, Clone)]
pub struct Snapshot {
    document: SnapshotDocument,
    season: Period,
}

fn default_season(today: NaiveDate) -> AppResult<Period> {
    let start = NaiveDate::from_ymd_opt(today.year() - 1, 1, 1);
    let end = NaiveDate::from_ymd_opt(today.year() + 1, 12, 31);

    start
        .zip(end)
        .map(|(start, end)| Period::new(start, end))
        .ok_or(AppError::CoreError(CoreError::InvariantViolation(
            "default season outside the supported calendar",
        )))
}

impl Snapshot {
    /// ## Summary
    /// Resolves missing season bounds to January 1 of last year and
    /// December 31 of next year, relative to `today`.
    ///
    /// ## Errors
    /// Returns an error if the default season cannot be represented.
    pub fn new(document: SnapshotDocument, today: NaiveDate) -> AppResult<Self> {
        let fallback = default_season(today)?;
        let season = Period::new(
            document.season_from.unwrap_or(fallback.start),
            document.season_to.unwrap_or(fallback.end),
        );

        Ok(Self { document, season })
    }

    #[must_use]
    pub fn document(&self) -> &SnapshotDocument {
        &self.document
    }

    /// ## Summary
    /// Builds the events scraped from this snapshot.
    ///
    /// The regular sections form the base schedule; each special period then
    /// overrides the base over its declared dates.
    ///
    /// ## Errors
    /// Returns an error if a row names an unknown day or an unreadable time.
    pub fn build_batch(&self, now: DateTime<FixedOffset>) -> AppResult<Vec<Event>> {
        let mut base = Vec::new();
        for section in &self.document.sections {
            for row in &section.rows {
                let slot = parse_row(row, &section.name)?;
                base.push(Event::from_source(self, slot, now));
            }
        }

        let mut overrides = Vec::with_capacity(self.document.special_periods.len());
        for special in &self.document.special_periods {
            let period = Period::new(special.from, special.to);
            let title = format!("{} {}", self.event_title(), special.name.to_lowercase());
            let mut events = Vec::with_capacity(special.rows.len());
            for row in &special.rows {
                let slot = parse_row(row, &special.name)?;
                events.push(
                    Event::new(slot, title.clone(), period, now).with_notice(
                        self.document.notice.clone(),
                        self.document.notice_details.clone(),
                    ),
                );
            }
            overrides.push(EventCollection::from_events(events));
        }

        let schedule = EventCollection::compose(EventCollection::from_events(base), overrides, now);
        tracing::debug!(
            title = %self.event_title(),
            sections = self.document.sections.len(),
            special_periods = self.document.special_periods.len(),
            events = schedule.len(),
            "Built batch from snapshot"
        );

        Ok(schedule.into_events())
    }
}

fn parse_row(row: &SlotRow, section: &str) -> AppResult<Slot> {
    Ok(Slot::new(
        parse_weekday(&row.day)?,
        ClockTime::parse(&row.start)?,
        ClockTime::parse(&row.end)?,
        section,
    ))
}

impl PlaceSource for Snapshot {
    fn event_title(&self) -> &str {
        &self.document.title
    }

    fn notice(&self) -> Option<&str> {
        self.document.notice.as_deref()
    }

    fn notice_details(&self) -> Option<&str> {
        self.document.notice_details.as_deref()
    }

    fn season_from(&self) -> NaiveDate {
        self.season.start
    }

    fn season_to(&self) -> NaiveDate {
        self.season.end
    }

    fn season(&self) -> Period {
        self.season
    }
}

/// Reads `{input_dir}/{place}.{language}.json` snapshots.
#[derive(Debug, Clone)]
pub struct SnapshotSource {
    input_dir: PathBuf,
}

impl SnapshotSource {
    #[must_use]
    pub fn new(input_dir: impl Into<PathBuf>) -> Self {
        Self {
            input_dir: input_dir.into(),
        }
    }

    #[must_use]
    pub fn input_dir(&self) -> &Path {
        &self.input_dir
    }

    #[must_use]
    pub fn path_for(&self, target: &PlaceTarget) -> PathBuf {
        self.input_dir
            .join(format!("{}.{SNAPSHOT_FILE_EXTENSION}", target.file_stem()))
    }

    /// ## Summary
    /// Reads and resolves the snapshot for `target`.
    ///
    /// ## Errors
    /// Returns an error if the file cannot be read or does not decode.
    pub fn read(&self, target: &PlaceTarget, today: NaiveDate) -> AppResult<Snapshot> {
        let path = self.path_for(target);
        let text = fs::read_to_string(&path).map_err(|source| AppError::SnapshotIo {
            path: path.clone(),
            source,
        })?;

        let document = serde_json::from_str::<SnapshotDocument>(&text)
            .map_err(|source| AppError::SnapshotFormat { path, source })?;

        Snapshot::new(document, today)
    }
}

impl BatchSource for SnapshotSource {
    fn fetch(&self, target: &PlaceTarget, now: DateTime<FixedOffset>) -> AppResult<Vec<Event>> {
        self.read(target, now.date_naive())?.build_batch(now)
    }
}
