use anyhow::Result;
use common::SchedulerConfig;
use std::sync::Arc;
use tokio::select;
use tokio::sync::Notify;
use tokio::time::Duration;
use tracing::{error, info};

use crate::pipeline::{self, AppContext};

/// Time between cycles; at least one minute, saturating for huge settings.
fn cycle_interval(minutes: u64) -> Duration {
    Duration::from_secs(minutes.max(1).saturating_mul(60))
}

/// Background scheduler: runs the update cycle every `interval_minutes` until
/// `shutdown` is notified. A failed cycle is logged and the next one runs on schedule.
pub async fn run_worker(
    ctx: Arc<AppContext>,
    config: SchedulerConfig,
    shutdown: Arc<Notify>,
) -> Result<()> {
    let interval = cycle_interval(config.interval_minutes);
    info!(
        interval_minutes = config.interval_minutes.max(1),
        run_on_startup = config.run_on_startup,
        "worker: scheduler started"
    );

    let mut first = true;
    loop {
        if !first || config.run_on_startup {
            select! {
                res = pipeline::run_update(&ctx) => match res {
                    Ok(outcome) => info!(articles = outcome.articles_updated, "worker: update cycle finished"),
                    Err(e) => error!(error = %format!("{:#}", e), "worker: update cycle failed"),
                },
                _ = shutdown.notified() => {
                    info!("worker: shutdown requested during update cycle");
                    break;
                }
            }
        }
        first = false;

        select! {
            _ = tokio::time::sleep(interval) => {}
            _ = shutdown.notified() => {
                info!("worker: shutdown requested, exiting loop");
                break;
            }
        }
    }

    info!("worker: stopped");
    Ok(())
}
