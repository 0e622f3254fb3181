//! memdb - Ephemeral In-Process Data Store
//!
//! A handle-addressed record store with per-record TTL and a background
//! expiry sweep, plus a thread-safe set of unique elements. Nothing is
//! persisted; both live and die with the process.

pub mod collections;
pub mod error;
pub mod storage;

pub use collections::ConcurrentSet;
pub use error::{Result, StoreError};
pub use storage::{Handle, LocalStore, RecordStore, SharedStore, StoreConfig, SweepStats};
