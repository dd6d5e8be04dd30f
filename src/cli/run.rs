//! Handler for the `run` command.

use tokio::signal;
use tracing::{error, info};

use crate::app::App;
use crate::cli::RunArgs;
use crate::error::Result;

/// Execute the run command.
pub async fn execute(args: &RunArgs) -> Result<()> {
    let mut config = args.config.load()?;

    if let Some(ref level) = args.log_level {
        config.logging.level = level.clone();
    }
    if args.json_logs {
        config.logging.format = "json".to_string();
    }

    config.init_logging();
    info!(
        bridge_asset = %config.matching.bridge_asset,
        interval_secs = config.scheduler.interval_secs,
        database = config.database.path.as_deref().unwrap_or("memory"),
        "bridgewatch starting"
    );

    tokio::select! {
        result = App::run(config) => {
            if let Err(e) = result {
                error!(error = %e, "Fatal error");
                return Err(e);
            }
        }
        _ = signal::ctrl_c() => {
            info!("Shutdown signal received");
        }
    }

    info!("bridgewatch stopped");
    Ok(())
}
