//! Expiring Record Store
//!
//! Handle-addressed records with per-record TTL, swept by a background task.

use std::fmt;
use std::marker::PhantomData;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;

use super::config::StoreConfig;
use super::locking::{Locked, Locking, Unlocked};
use super::record::Handle;
use super::sweeper::{self, Sweeper};
use super::table::{RecordTable, SweepStats};
use crate::error::{Result, StoreError};

/// In-memory record store with per-record expiry.
///
/// Every insert returns a fresh [`Handle`]; records are looked up, updated and
/// removed by that handle, never by their position in storage. A background
/// task started at construction removes records whose TTL has run out. It
/// stops on [`close`](Self::close) or when the store is dropped.
///
/// Use [`SharedStore`] for a guarded store that can be shared across threads,
/// or [`LocalStore`] for the lock-free single-threaded variant.
///
/// # Example
///
/// ```rust,no_run
/// use memdb::SharedStore;
///
/// #[tokio::main]
/// async fn main() {
///     let store = SharedStore::new();
///     let handle = store.insert("x", 1);
///     assert_eq!(store.get(handle), Some("x"));
///
///     tokio::time::sleep(std::time::Duration::from_secs(2)).await;
///     assert_eq!(store.get(handle), None);
/// }
/// ```
pub struct RecordStore<V, L: Locking = Locked> {
    cell: L::Cell<V>,
    shutdown: CancellationToken,
    _locking: PhantomData<L>,
}

/// Guarded store, `Send + Sync` for `Send + Sync` values
pub type SharedStore<V> = RecordStore<V, Locked>;

/// Unsynchronized store confined to the creating thread
pub type LocalStore<V> = RecordStore<V, Unlocked>;

impl<V> RecordStore<V, Locked>
where
    V: Send + Sync + 'static,
{
    /// Create a guarded store with the default one second sweep
    ///
    /// # Panics
    ///
    /// Panics if called outside of a Tokio runtime context.
    pub fn new() -> Self {
        Self::with_config(StoreConfig::default())
    }

    /// Create a guarded store with custom configuration
    ///
    /// # Panics
    ///
    /// Panics if called outside of a Tokio runtime context. Use
    /// [`try_with_config`](Self::try_with_config) to get an error instead.
    pub fn with_config(config: StoreConfig) -> Self {
        match Self::try_with_config(config) {
            Ok(store) => store,
            Err(err) => panic!(
                "{}. Create the store from within #[tokio::main], #[tokio::test] \
                 or a task on a runtime.",
                err
            ),
        }
    }

    /// Create a guarded store with the default one second sweep
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::NoRuntime`] outside of a Tokio runtime context.
    pub fn try_new() -> Result<Self> {
        Self::try_with_config(StoreConfig::default())
    }

    /// Create a guarded store with custom configuration
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::NoRuntime`] outside of a Tokio runtime context.
    pub fn try_with_config(config: StoreConfig) -> Result<Self> {
        let runtime = tokio::runtime::Handle::try_current().map_err(|_| StoreError::NoRuntime)?;

        let store = Self::build();
        runtime.spawn(store.sweeper(&config).run());
        Ok(store)
    }
}

impl<V> RecordStore<V, Unlocked>
where
    V: 'static,
{
    /// Create an unsynchronized store with the default one second sweep
    ///
    /// # Panics
    ///
    /// Panics if called outside of a [`tokio::task::LocalSet`].
    pub fn new() -> Self {
        Self::with_config(StoreConfig::default())
    }

    /// Create an unsynchronized store with custom configuration
    ///
    /// # Panics
    ///
    /// Panics if called outside of a [`tokio::task::LocalSet`].
    pub fn with_config(config: StoreConfig) -> Self {
        let store = Self::build();
        tokio::task::spawn_local(store.sweeper(&config).run());
        store
    }
}

impl<V> Default for RecordStore<V, Locked>
where
    V: Send + Sync + 'static,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<V> Default for RecordStore<V, Unlocked>
where
    V: 'static,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<V, L: Locking> RecordStore<V, L> {
    fn build() -> Self {
        Self {
            cell: L::new_cell(RecordTable::default()),
            shutdown: CancellationToken::new(),
            _locking: PhantomData,
        }
    }

    fn sweeper(&self, config: &StoreConfig) -> Sweeper<V, L> {
        Sweeper::new(
            self.cell.clone(),
            config.sweep_interval,
            self.shutdown.child_token(),
        )
    }

    /// Insert a value that expires after `ttl_secs` seconds.
    ///
    /// A TTL of 0 expires on the next sweep.
    pub fn insert(&self, value: V, ttl_secs: u64) -> Handle {
        L::write(&self.cell, |table| table.insert(value, ttl_secs))
    }

    /// Insert several values sharing one TTL.
    ///
    /// Returns one handle per value, in input order. `values` is drained
    /// before the lock is taken, so it may read from this store.
    pub fn insert_batch<I>(&self, values: I, ttl_secs: u64) -> Vec<Handle>
    where
        I: IntoIterator<Item = V>,
    {
        let values: Vec<V> = values.into_iter().collect();
        L::write(&self.cell, |table| table.insert_batch(values, ttl_secs))
    }

    /// Get a copy of the value stored under `handle`
    pub fn get(&self, handle: Handle) -> Option<V>
    where
        V: Clone,
    {
        L::read(&self.cell, |table| {
            table.get(handle).map(|record| record.value().clone())
        })
    }

    /// Snapshot of every stored value, in insertion order
    pub fn get_all(&self) -> Vec<V>
    where
        V: Clone,
    {
        L::read(&self.cell, |table| table.values().cloned().collect())
    }

    /// Deadline of the record under `handle`
    pub fn expires_at(&self, handle: Handle) -> Option<Instant> {
        L::read(&self.cell, |table| {
            table.get(handle).map(|record| record.expires_at())
        })
    }

    /// Remove the record under `handle`, returns true if it existed
    pub fn remove(&self, handle: Handle) -> bool {
        L::write(&self.cell, |table| table.remove(handle))
    }

    /// Replace the value under `handle` and return the old one.
    ///
    /// The record keeps its original deadline.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::NotFound`](crate::StoreError::NotFound) if no
    /// record has that handle.
    pub fn update(&self, handle: Handle, value: V) -> Result<V> {
        L::write(&self.cell, |table| table.update(handle, value))
    }

    /// Handle of the first record whose value equals `value`
    pub fn has(&self, value: &V) -> Option<Handle>
    where
        V: PartialEq,
    {
        L::read(&self.cell, |table| table.find(value))
    }

    /// Number of stored records, including expired ones not yet swept
    pub fn len(&self) -> usize {
        L::read(&self.cell, RecordTable::len)
    }

    /// Check if the store is empty
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Remove every record. Handles already issued are not reused.
    pub fn flush(&self) {
        L::write(&self.cell, RecordTable::flush)
    }

    /// Run an expiry pass now, returns the number of records removed
    pub fn sweep(&self) -> usize {
        sweeper::sweep::<V, L>(&self.cell)
    }

    /// Expiry pass counters since creation
    pub fn stats(&self) -> SweepStats {
        L::read(&self.cell, RecordTable::stats)
    }

    /// Stop the background sweep after its current pass.
    ///
    /// Idempotent. The store stays usable, but expired records are only
    /// removed by explicit [`sweep`](Self::sweep) calls afterwards.
    pub fn close(&self) {
        self.shutdown.cancel();
    }

    /// Check if [`close`](Self::close) has been called
    pub fn is_closed(&self) -> bool {
        self.shutdown.is_cancelled()
    }
}

impl<V, L: Locking> Drop for RecordStore<V, L> {
    fn drop(&mut self) {
        self.shutdown.cancel();
    }
}

impl<V, L: Locking> fmt::Debug for RecordStore<V, L> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RecordStore")
            .field("len", &self.len())
            .field("closed", &self.is_closed())
            .finish()
    }
}
