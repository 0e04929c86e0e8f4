/// Default language used when a place target does not name one.
pub const DEFAULT_LANGUAGE: &str = "fr";

/// Wall clock used to decide what "today" is.
pub const DEFAULT_TIMEZONE: &str = "America/Montreal";

/// Persisted history older than this many months is pruned.
pub const DEFAULT_RETENTION_MONTHS: u32 = 24;

/// Extension of persisted collection files.
pub const DATA_FILE_EXTENSION: &str = "json";

/// Extension of snapshot files read by the file-backed source.
pub const SNAPSHOT_FILE_EXTENSION: &str = "json";

/// Environment variable prefix for settings overrides.
pub const ENV_PREFIX: &str = "WEEKSLOT";
