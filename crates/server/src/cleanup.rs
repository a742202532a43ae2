//! Periodic removal of expired slot files.

use crate::metrics;
use cfipd_storage::SlotStore;
use std::sync::Arc;
use std::time::Duration;

/// Run one expiry sweep, logging and counting the outcome.
///
/// Returns the number of files removed. A failed listing is logged and
/// counts as zero; the next tick tries again.
pub async fn run_sweep(slot: &SlotStore, max_age: Duration) -> usize {
    match slot.sweep_expired(max_age).await {
        Ok(report) => {
            let removed = report.removed.len();
            metrics::EXPIRED_FILES_REMOVED.inc_by(removed as u64);
            metrics::record_delete_failures("sweep", report.failed.len());
            if removed > 0 || !report.failed.is_empty() {
                tracing::info!(
                    examined = report.examined,
                    removed = removed,
                    failed = report.failed.len(),
                    "Expiry sweep finished"
                );
            } else {
                tracing::debug!(examined = report.examined, "Expiry sweep found nothing to remove");
            }
            removed
        }
        Err(e) => {
            tracing::error!(error = %e, "Expiry sweep failed");
            0
        }
    }
}

/// Spawn a background task that sweeps expired files every `interval`.
pub fn spawn_cleanup_task(
    slot: Arc<SlotStore>,
    interval: Duration,
    max_age: Duration,
) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(interval);
        ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);

        loop {
            ticker.tick().await;
            run_sweep(&slot, max_age).await;
        }
    })
}
