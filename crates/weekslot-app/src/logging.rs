//! Subscriber setup with a filter that can be swapped once settings are known.

use tracing_subscriber::{
    EnvFilter, Registry, fmt, layer::SubscriberExt, reload, util::SubscriberInitExt,
};

/// Handle used to replace the startup filter.
pub type FilterHandle = reload::Handle<EnvFilter, Registry>;

/// Level logged before settings are loaded.
pub const STARTUP_FILTER: &str = "debug";

/// ## Summary
/// Installs the global subscriber with a reloadable `debug` filter.
#[must_use]
pub fn init() -> FilterHandle {
    let (filter_layer, filter_handle) = reload::Layer::new(EnvFilter::new(STARTUP_FILTER));

    tracing_subscriber::registry()
        .with(filter_layer)
        .with(
            fmt::layer()
                .with_target(true)
                .with_thread_ids(true)
                .with_file(true)
                .with_line_number(true),
        )
        .init();

    filter_handle
}

/// ## Summary
/// Replaces the active filter with `level`. Returns whether it was applied;
/// an invalid level or a dropped subscriber keeps the current filter.
pub fn apply_level(handle: &FilterHandle, level: &str) -> bool {
    let Ok(filter) = EnvFilter::try_new(level) else {
        tracing::warn!(level = %level, "Invalid log level in config, keeping {STARTUP_FILTER}");
        return false;
    };

    if let Err(e) = handle.modify(|current| *current = filter) {
        tracing::warn!(error = %e, "Failed to update log filter from config");
        return false;
    }

    true
}
