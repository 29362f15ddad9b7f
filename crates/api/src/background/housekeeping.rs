//! Periodic deletion of dead refresh sessions and old read notifications.

use std::time::Duration;

use beacon_db::repositories::{NotificationRepo, SessionRepo};
use sqlx::PgPool;
use tokio_util::sync::CancellationToken;

const INTERVAL: Duration = Duration::from_secs(30 * 60);

/// Read notifications are kept this long after being read.
pub const NOTIFICATION_RETENTION_DAYS: i64 = 90;

/// Run one pass immediately, then one every [`INTERVAL`] until `cancel`
/// fires.
pub async fn run(pool: PgPool, cancel: CancellationToken) {
    tracing::info!(interval_secs = INTERVAL.as_secs(), "Housekeeping job started");
    let mut interval = tokio::time::interval(INTERVAL);

    loop {
        tokio::select! {
            _ = cancel.cancelled() => {
                tracing::info!("Housekeeping job stopping");
                break;
            }
            _ = interval.tick() => sweep(&pool).await,
        }
    }
}

async fn sweep(pool: &PgPool) {
    match SessionRepo::purge_dead(pool).await {
        Ok(0) => {}
        Ok(deleted) => tracing::info!(deleted, "Purged dead refresh sessions"),
        Err(e) => tracing::error!(error = %e, "Refresh session purge failed"),
    }

    let cutoff = chrono::Utc::now() - chrono::Duration::days(NOTIFICATION_RETENTION_DAYS);
    match NotificationRepo::purge_read_before(pool, cutoff).await {
        Ok(0) => {}
        Ok(deleted) => tracing::info!(deleted, "Purged old read notifications"),
        Err(e) => tracing::error!(error = %e, "Notification purge failed"),
    }
}
