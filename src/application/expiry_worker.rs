//! Background task that periodically removes expired mappings.

use std::sync::Arc;
use std::time::Duration;

use tokio::time::{self, MissedTickBehavior};
use tracing::{error, info};

use crate::application::services::MappingService;

/// Runs [`MappingService::sweep_expired`] every `period`, forever.
///
/// The first sweep runs immediately. Sweeps never overlap; ticks missed
/// while a sweep is running are skipped. A failed sweep is logged and retried
/// on the next tick.
///
/// Spawn with `tokio::spawn`; the task ends with the runtime.
pub async fn run_expiry_worker(service: Arc<MappingService>, period: Duration) {
    let mut interval = time::interval(period);
    interval.set_missed_tick_behavior(MissedTickBehavior::Skip);

    loop {
        interval.tick().await;
        sweep_once(&service).await;
    }
}

/// Runs one sweep and logs its outcome.
pub async fn sweep_once(service: &MappingService) -> usize {
    match service.sweep_expired().await {
        Ok(0) => 0,
        Ok(deleted) => {
            info!(deleted, "Expired mappings removed");
            deleted
        }
        Err(e) => {
            error!("Expiry sweep failed: {}", e);
            0
        }
    }
}
