//! Periodic deletion of expired sessions.
//!
//! Only rows whose refresh token has expired are removed. Revoked rows that
//! are still within their lifetime stay, since replaying their token must
//! still be recognised as theft.

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use tessera_core::manager::SessionManager;
use tokio_util::sync::CancellationToken;

/// Run the session purge loop every `interval` until `cancel` is triggered.
pub async fn run(sessions: Arc<SessionManager>, interval: Duration, cancel: CancellationToken) {
    tracing::info!(interval_secs = interval.as_secs(), "Session purge job started");

    let mut ticker = tokio::time::interval(interval);

    loop {
        tokio::select! {
            _ = cancel.cancelled() => {
                tracing::info!("Session purge job stopping");
                break;
            }
            _ = ticker.tick() => {
                match sessions.purge_expired(Utc::now()).await {
                    Ok(deleted) if deleted > 0 => {
                        tracing::info!(deleted, "Session purge: removed expired sessions");
                    }
                    Ok(_) => tracing::debug!("Session purge: nothing to remove"),
                    Err(e) => tracing::error!(error = %e, "Session purge failed"),
                }
            }
        }
    }
}
