use std::time::Duration;

use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::{error, info};

use crate::config::MAX_SWEEP_INTERVAL_HOURS;
use crate::services::status_service::{StatusService, StatusTrigger};
use crate::status::HerdRepository;

fn sweep_period(interval_hours: u64) -> Duration {
    let hours = interval_hours.clamp(1, MAX_SWEEP_INTERVAL_HOURS);
    Duration::from_secs(hours.saturating_mul(60 * 60))
}

/// Runs a full status sweep every `interval_hours`, starting immediately.
///
/// A failed sweep is logged and retried on the next tick.
pub fn spawn_status_sweeps<R>(status: StatusService<R>, interval_hours: u64) -> JoinHandle<()>
where
    R: HerdRepository + Clone + 'static,
{
    let period = sweep_period(interval_hours);
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(period);
        // A slow sweep must not be followed by back-to-back catch-up runs.
        interval.set_missed_tick_behavior(MissedTickBehavior::Skip);
        loop {
            interval.tick().await;
            let today = chrono::Local::now().date_naive();
            info!("Running {} status sweep for {}", StatusTrigger::Scheduled.as_str(), today);
            match status.sweep(today).await {
                Ok(report) => info!(
                    "Scheduled sweep done: examined {}, updated {}, skipped {}",
                    report.examined, report.updated, report.skipped
                ),
                Err(err) => error!("Scheduled status sweep failed: {}", err),
            }
        }
    })
}
