//! Startup initialization and the scheduled resolution run.

use std::sync::Arc;

use anyhow::{Context, Result};
use tokio_cron_scheduler::{Job, JobScheduler};

use crate::state::AppState;

/// Bring the server to a serving state: adopt the persisted manifest if
/// one exists, otherwise run a first resolution. A failed first run is
/// not fatal — the service starts degraded (503) and the scheduler
/// retries on the next tick.
pub async fn initialize(state: &AppState) {
    match state.load_persisted().await {
        Ok(true) => {
            tracing::info!("adopted persisted manifest");
            return;
        }
        Ok(false) => {}
        Err(e) => {
            tracing::warn!(error = %e, "persisted manifest unusable; resolving fresh");
        }
    }

    if let Err(e) = state.refresh().await {
        tracing::warn!(error = %e, "initial resolution failed; serving 503 until the next run");
    }
}

/// Start the cron-driven refresh. The returned scheduler must be kept
/// alive for the jobs to fire.
pub async fn start_scheduler(state: Arc<AppState>, cron: &str) -> Result<JobScheduler> {
    let scheduler = JobScheduler::new().await?;

    let job = Job::new_async(cron, move |_uuid, _lock| {
        let state = state.clone();
        Box::pin(async move {
            if let Err(e) = state.refresh().await {
                // Previous manifest stays authoritative.
                tracing::warn!(error = %e, "scheduled refresh failed");
            }
        })
    })
    .with_context(|| format!("invalid refresh cron expression: {}", cron))?;

    scheduler.add(job).await?;
    scheduler.start().await?;
    Ok(scheduler)
}
