//! Store Configuration

use std::time::Duration;

/// Default cadence of the background expiry sweep
pub const DEFAULT_SWEEP_INTERVAL: Duration = Duration::from_secs(1);

/// Store configuration
#[derive(Debug, Clone)]
pub struct StoreConfig {
    /// Interval between expiry sweeps
    pub sweep_interval: Duration,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            sweep_interval: DEFAULT_SWEEP_INTERVAL,
        }
    }
}

impl StoreConfig {
    /// Create a config with default values
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the sweep interval
    ///
    /// A zero interval is raised to one millisecond, since
    /// `tokio::time::interval` rejects a zero period.
    pub fn with_sweep_interval(mut self, interval: Duration) -> Self {
        self.sweep_interval = interval.max(Duration::from_millis(1));
        self
    }
}
