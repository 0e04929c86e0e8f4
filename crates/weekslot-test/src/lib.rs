//! Integration test support for the weekslot workspace.
//!
//! Re-exports the workspace crates under one roof and provides an isolated
//! on-disk workspace (snapshot input directory plus data directory) per test.

use std::fs;
use std::path::{Path, PathBuf};

use chrono::{DateTime, FixedOffset};
use tempfile::TempDir;

pub use {weekslot_app, weekslot_core, weekslot_schedule, weekslot_store};

use weekslot_app::runner::{Clock, Runner};
use weekslot_app::snapshot::SnapshotSource;
use weekslot_core::config::Settings;
use weekslot_core::types::PlaceTarget;
use weekslot_store::EventStore;

/// Temporary directory tree laid out like a deployment.
pub struct TestWorkspace {
    root: TempDir,
}

impl TestWorkspace {
    /// ## Summary
    /// Creates an empty workspace with `snapshots/` and `data/` directories.
    ///
    /// ## Errors
    /// Returns an error if the temporary directories cannot be created.
    pub fn new() -> anyhow::Result<Self> {
        let root = TempDir::new()?;
        fs::create_dir_all(root.path().join("snapshots"))?;
        fs::create_dir_all(root.path().join("data"))?;
        Ok(Self { root })
    }

    #[must_use]
    pub fn root(&self) -> &Path {
        self.root.path()
    }

    #[must_use]
    pub fn input_dir(&self) -> PathBuf {
        self.root.path().join("snapshots")
    }

    #[must_use]
    pub fn data_dir(&self) -> PathBuf {
        self.root.path().join("data")
    }

    /// ## Summary
    /// Writes the snapshot document for `target`.
    ///
    /// ## Errors
    /// Returns an error if the document cannot be rendered or written.
    pub fn write_snapshot(
        &self,
        target: &PlaceTarget,
        snapshot: &serde_json::Value,
    ) -> anyhow::Result<PathBuf> {
        let path = SnapshotSource::new(self.input_dir()).path_for(target);
        fs::write(&path, serde_json::to_string_pretty(snapshot)?)?;
        Ok(path)
    }

    /// ## Summary
    /// Removes the snapshot for `target`, simulating a page that went away.
    ///
    /// ## Errors
    /// Returns an error if the file cannot be removed.
    pub fn remove_snapshot(&self, target: &PlaceTarget) -> anyhow::Result<()> {
        fs::remove_file(SnapshotSource::new(self.input_dir()).path_for(target))?;
        Ok(())
    }

    /// ## Summary
    /// Settings pointing at this workspace, layered over `extra` TOML.
    ///
    /// ## Errors
    /// Returns an error if the combined TOML does not deserialize.
    pub fn settings(&self, extra: &str) -> anyhow::Result<Settings> {
        let text = format!(
            "[storage]\ndata_dir = {:?}\ninput_dir = {:?}\n\n{extra}",
            self.data_dir().display().to_string(),
            self.input_dir().display().to_string(),
        );
        Settings::from_toml_str(&text)
    }

    #[must_use]
    pub fn store(&self) -> EventStore {
        EventStore::new(self.data_dir())
    }

    /// ## Summary
    /// Builds a runner over this workspace's snapshots, pinned at `now`.
    #[must_use]
    pub fn runner(&self, settings: &Settings, now: DateTime<FixedOffset>) -> Runner {
        Runner::new(
            std::sync::Arc::new(SnapshotSource::new(&settings.storage.input_dir)),
            EventStore::new(&settings.storage.data_dir)
                .with_retention_months(settings.schedule.retention_months),
            Clock::Fixed(now),
        )
        .with_max_parallel(settings.runner.max_parallel)
    }
}

/// ## Summary
/// Parses an RFC 3339 instant.
///
/// ## Panics
/// Panics if `text` is not a valid RFC 3339 date-time.
#[must_use]
#[expect(clippy::expect_used)]
pub fn at(text: &str) -> DateTime<FixedOffset> {
    DateTime::parse_from_rfc3339(text).expect("valid RFC 3339 instant")
}
