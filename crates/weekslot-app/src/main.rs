use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

use weekslot_app::logging;
use weekslot_app::runner::{Clock, Runner};
use weekslot_app::snapshot::SnapshotSource;
use weekslot_core::config::load_config;
use weekslot_store::EventStore;

#[tokio::main]
async fn main() -> anyhow::Result<ExitCode> {
    let filter_handle = logging::init();

    tracing::info!("Starting weekslot reconciliation");

    let config_path = std::env::args_os().nth(1).map(PathBuf::from);
    let config = load_config(config_path.as_deref())?;

    tracing::info!(config = ?config, "Configuration loaded");

    logging::apply_level(&filter_handle, &config.logging.level);

    let targets = config.targets()?;
    if targets.is_empty() {
        tracing::warn!("No places configured, nothing to do");
        return Ok(ExitCode::SUCCESS);
    }

    let tz = config.schedule.tz()?;
    let store = EventStore::new(&config.storage.data_dir)
        .with_retention_months(config.schedule.retention_months);
    let source = SnapshotSource::new(&config.storage.input_dir);

    let runner = Runner::new(Arc::new(source), store, Clock::System(tz))
        .with_max_parallel(config.runner.max_parallel);
    let summary = runner.run(targets).await;

    if summary.is_success() {
        Ok(ExitCode::SUCCESS)
    } else {
        Ok(ExitCode::FAILURE)
    }
}
