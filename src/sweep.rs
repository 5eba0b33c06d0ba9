// src/sweep.rs

use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;

use crate::service::ComplaintService;

/// Run the escalation sweep every `every` until the handle is aborted.
pub fn spawn_escalation_sweep(service: Arc<ComplaintService>, every: Duration) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(every);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        // first tick completes immediately
        ticker.tick().await;

        loop {
            ticker.tick().await;
            match service.sweep_escalations().await {
                Ok(ids) if ids.is_empty() => tracing::debug!("escalation sweep: nothing to do"),
                Ok(ids) => tracing::info!(count = ids.len(), "escalation sweep escalated complaints"),
                Err(e) => tracing::error!(error = %e, "escalation sweep failed"),
            }
        }
    })
}
