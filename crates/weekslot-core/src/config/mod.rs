use std::path::{Path, PathBuf};

use anyhow::Result;
use chrono_tz::Tz;
use config::builder::DefaultState;
use config::{Config, ConfigBuilder, FileFormat};
use serde::Deserialize;

use crate::constants::{DEFAULT_RETENTION_MONTHS, DEFAULT_TIMEZONE, ENV_PREFIX};
use crate::error::{CoreError, CoreResult};
use crate::types::PlaceTarget;

/// Settings file looked up in the working directory when no path is given.
pub const DEFAULT_CONFIG_FILE: &str = "weekslot.toml";

#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    pub storage: StorageConfig,
    pub schedule: ScheduleConfig,
    pub runner: RunnerConfig,
    #[serde(default)]
    pub places: Vec<PlaceTarget>,
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct StorageConfig {
    pub data_dir: PathBuf,
    pub input_dir: PathBuf,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ScheduleConfig {
    pub timezone: String,
    pub retention_months: u32,
}

impl ScheduleConfig {
    /// ## Summary
    /// Resolves the configured IANA timezone.
    ///
    /// ## Errors
    /// Returns an error if the identifier is not a known timezone.
    pub fn tz(&self) -> CoreResult<Tz> {
        self.timezone
            .parse::<Tz>()
            .map_err(|_err| CoreError::UnknownTimezone(self.timezone.clone()))
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct RunnerConfig {
    pub max_parallel: usize,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    pub level: String,
}

impl Settings {
    /// ## Summary
    /// Loads configuration from an explicit settings file, falling back to
    /// `weekslot.toml` in the working directory when `path` is `None`.
    /// Environment variables take precedence over file values.
    ///
    /// ## Errors
    /// Returns an error if the explicit file is missing, or if building the
    /// configuration or deserializing it fails.
    pub fn load_from(path: Option<&Path>) -> Result<Self> {
        let file = match path {
            Some(path) => config::File::from(path).required(true),
            None => config::File::new(DEFAULT_CONFIG_FILE, FileFormat::Toml).required(false),
        };

        Ok(with_defaults(Config::builder())?
            .add_source(file)
            .add_source(
                config::Environment::with_prefix(ENV_PREFIX)
                    .prefix_separator("__")
                    .separator("__")
                    .ignore_empty(true)
                    .try_parsing(true),
            )
            .build()?
            .try_deserialize::<Settings>()?)
    }

    /// ## Summary
    /// Parses settings from TOML text layered over the defaults.
    ///
    /// ## Errors
    /// Returns an error if the text is not valid TOML or does not deserialize.
    pub fn from_toml_str(text: &str) -> Result<Self> {
        Ok(with_defaults(Config::builder())?
            .add_source(config::File::from_str(text, FileFormat::Toml))
            .build()?
            .try_deserialize::<Settings>()?)
    }

    /// ## Summary
    /// Returns the configured place targets, normalized and deduplicated in
    /// declaration order.
    ///
    /// ## Errors
    /// Returns an error if any target is invalid.
    pub fn targets(&self) -> CoreResult<Vec<PlaceTarget>> {
        let mut targets: Vec<PlaceTarget> = Vec::with_capacity(self.places.len());
        for place in &self.places {
            let target = PlaceTarget::new(&place.place, &place.language)?;
            if !targets.contains(&target) {
                targets.push(target);
            }
        }
        Ok(targets)
    }
}

fn with_defaults(
    builder: ConfigBuilder<DefaultState>,
) -> Result<ConfigBuilder<DefaultState>, config::ConfigError> {
    builder
        .set_default("storage.data_dir", "data")?
        .set_default("storage.input_dir", "snapshots")?
        .set_default("schedule.timezone", DEFAULT_TIMEZONE)?
        .set_default("schedule.retention_months", i64::from(DEFAULT_RETENTION_MONTHS))?
        .set_default("runner.max_parallel", 1_i64)?
        .set_default("logging.level", "info")
}

/// ## Summary
/// Loads configuration from environment variables, `.env` and the settings file.
///
/// ## Errors
/// Returns an error if loading or deserializing the configuration fails.
pub fn load_config(path: Option<&Path>) -> Result<Settings> {
    dotenvy::dotenv().ok();

    tracing::debug!(path = ?path, "Loading configuration");
    Settings::load_from(path)
}
