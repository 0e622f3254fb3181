//! Expiry Sweeper
//!
//! Background task that periodically removes expired records from a store.

use std::time::Duration;
use tokio::time::{interval, Instant, MissedTickBehavior};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

use super::locking::Locking;

/// One expiry pass over a table.
///
/// Expired handles are collected under the shared lock first, then removed
/// by handle under a single exclusive acquisition. Passes that find nothing
/// never take the exclusive lock.
pub(crate) fn sweep<V, L: Locking>(cell: &L::Cell<V>) -> usize {
    let now = Instant::now();
    let expired = L::read(cell, |table| table.expired_handles(now));
    if expired.is_empty() {
        return 0;
    }
    L::write(cell, |table| table.remove_expired(&expired))
}

/// Background expiry task
pub(crate) struct Sweeper<V, L: Locking> {
    cell: L::Cell<V>,
    interval: Duration,
    shutdown: CancellationToken,
}

impl<V, L: Locking> Sweeper<V, L> {
    pub(crate) fn new(cell: L::Cell<V>, interval: Duration, shutdown: CancellationToken) -> Self {
        Self {
            cell,
            interval,
            shutdown,
        }
    }

    /// Run until the shutdown token is cancelled
    pub(crate) async fn run(self) {
        let mut ticker = interval(self.interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        // The first tick completes immediately
        ticker.tick().await;
        info!("Sweeper started, interval: {:?}", self.interval);

        loop {
            tokio::select! {
                biased;
                _ = self.shutdown.cancelled() => break,
                _ = ticker.tick() => {
                    let removed = sweep::<V, L>(&self.cell);
                    if removed > 0 {
                        debug!(removed = removed, "Swept expired records");
                    }
                }
            }
        }

        info!("Sweeper stopped");
    }
}
