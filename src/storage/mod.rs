//! Storage Engine
//!
//! Handle-addressed record store with per-record TTL and background expiry.

mod config;
mod locking;
mod record;
mod store;
mod sweeper;
mod table;

pub use config::{StoreConfig, DEFAULT_SWEEP_INTERVAL};
pub use locking::{Locked, Locking, Unlocked};
pub use record::{Handle, MAX_TTL_SECS};
pub use store::{LocalStore, RecordStore, SharedStore};
pub use table::{RecordTable, SweepStats};
