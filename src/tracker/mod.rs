pub mod repository;
pub mod single;

use std::time::Duration;
use tokio_util::sync::CancellationToken;

pub use repository::RepositoryTracker;
pub use single::SingleTracker;

/// Waits out the poll interval. Returns `false` if cancelled first.
async fn pause(cancel: &CancellationToken, interval: Duration) -> bool {
    tokio::select! {
        biased;
        _ = cancel.cancelled() => false,
        _ = tokio::time::sleep(interval) => true,
    }
}

fn log_stopped() {
    log::info!("🛑 Monitoring stopped by user.");
}
