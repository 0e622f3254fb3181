//! Record Table
//!
//! The unsynchronized state behind every store: records in insertion order
//! plus the handle counter and expiry pass counters.

use hashbrown::HashSet;
use std::sync::atomic::{AtomicU64, Ordering};
use tokio::time::Instant;

use super::record::{Handle, Record};
use crate::error::{Result, StoreError};

/// Snapshot of the expiry pass counters
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SweepStats {
    /// Expiry passes run, background and manual
    pub passes: u64,
    /// Records removed because their deadline passed
    pub expired: u64,
}

/// Pass counters, bumped through shared access so passes that find nothing
/// expired never need the exclusive lock.
#[derive(Debug, Default)]
struct SweepCounters {
    passes: AtomicU64,
    expired: AtomicU64,
}

/// Ordered record sequence.
///
/// Records are appended with strictly increasing handles and every removal
/// keeps relative order, so `records` is always sorted by handle.
#[derive(Debug)]
pub struct RecordTable<V> {
    records: Vec<Record<V>>,
    last_handle: u64,
    counters: SweepCounters,
}

impl<V> Default for RecordTable<V> {
    fn default() -> Self {
        Self {
            records: Vec::new(),
            last_handle: 0,
            counters: SweepCounters::default(),
        }
    }
}

impl<V> RecordTable<V> {
    fn next_handle(&mut self) -> Handle {
        self.last_handle += 1;
        Handle::new(self.last_handle)
    }

    fn position(&self, handle: Handle) -> Option<usize> {
        self.records
            .binary_search_by_key(&handle, Record::handle)
            .ok()
    }

    pub(crate) fn insert(&mut self, value: V, ttl_secs: u64) -> Handle {
        let handle = self.next_handle();
        self.records.push(Record::new(handle, value, ttl_secs));
        handle
    }

    pub(crate) fn insert_batch<I>(&mut self, values: I, ttl_secs: u64) -> Vec<Handle>
    where
        I: IntoIterator<Item = V>,
    {
        let values = values.into_iter();
        let mut handles = Vec::with_capacity(values.size_hint().0);
        for value in values {
            handles.push(self.insert(value, ttl_secs));
        }
        handles
    }

    pub(crate) fn get(&self, handle: Handle) -> Option<&Record<V>> {
        self.position(handle).map(|pos| &self.records[pos])
    }

    pub(crate) fn values(&self) -> impl Iterator<Item = &V> {
        self.records.iter().map(Record::value)
    }

    pub(crate) fn remove(&mut self, handle: Handle) -> bool {
        match self.position(handle) {
            Some(pos) => {
                self.records.remove(pos);
                true
            }
            None => false,
        }
    }

    pub(crate) fn update(&mut self, handle: Handle, value: V) -> Result<V> {
        let pos = self.position(handle).ok_or(StoreError::NotFound(handle))?;
        Ok(self.records[pos].replace(value))
    }

    pub(crate) fn find(&self, value: &V) -> Option<Handle>
    where
        V: PartialEq,
    {
        self.records
            .iter()
            .find(|record| record.value() == value)
            .map(Record::handle)
    }

    pub(crate) fn len(&self) -> usize {
        self.records.len()
    }

    pub(crate) fn flush(&mut self) {
        self.records.clear();
    }

    /// Read-only half of an expiry pass, counts the pass
    pub(crate) fn expired_handles(&self, now: Instant) -> HashSet<Handle> {
        self.counters.passes.fetch_add(1, Ordering::Relaxed);
        self.records
            .iter()
            .filter(|record| record.is_expired_at(now))
            .map(Record::handle)
            .collect()
    }

    /// Mutating half of an expiry pass: drops every record whose handle is in
    /// `expired`, matching by handle value. Returns the number removed.
    pub(crate) fn remove_expired(&mut self, expired: &HashSet<Handle>) -> usize {
        let before = self.records.len();
        self.records
            .retain(|record| !expired.contains(&record.handle()));
        let removed = before - self.records.len();
        self.counters
            .expired
            .fetch_add(removed as u64, Ordering::Relaxed);
        removed
    }

    pub(crate) fn stats(&self) -> SweepStats {
        SweepStats {
            passes: self.counters.passes.load(Ordering::Relaxed),
            expired: self.counters.expired.load(Ordering::Relaxed),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_handles_start_at_one_and_increase() {
        let mut table = RecordTable::default();
        let a = table.insert("a", 10);
        let b = table.insert("b", 10);
        assert_eq!(a.get(), 1);
        assert_eq!(b.get(), 2);
    }

    #[test]
    fn test_remove_matches_handle_not_position() {
        let mut table = RecordTable::default();
        let handles = table.insert_batch(["a", "b", "c", "d"], 10);

        // Shift positions so handle 3 no longer sits at index 2
        assert!(table.remove(handles[0]));
        assert!(table.remove(handles[2]));

        let remaining: Vec<_> = table.values().copied().collect();
        assert_eq!(remaining, vec!["b", "d"]);
        assert!(!table.remove(handles[2]));
    }

    #[test]
    fn test_flush_keeps_counter() {
        let mut table = RecordTable::default();
        table.insert(1, 10);
        table.insert(2, 10);
        table.flush();
        assert_eq!(table.len(), 0);
        assert_eq!(table.insert(3, 10).get(), 3);
    }

    #[test]
    fn test_update_missing_handle() {
        let mut table: RecordTable<u32> = RecordTable::default();
        let err = table.update(Handle::new(42), 1).unwrap_err();
        assert_eq!(err, StoreError::NotFound(Handle::new(42)));
    }

    #[test]
    fn test_adjacent_expirations_all_removed() {
        let mut table = RecordTable::default();
        table.insert("keep-1", 60);
        table.insert("gone-1", 0);
        table.insert("gone-2", 0);
        table.insert("keep-2", 60);
        table.insert("gone-3", 0);

        let expired = table.expired_handles(Instant::now());
        assert_eq!(expired.len(), 3);
        assert_eq!(table.remove_expired(&expired), 3);

        let remaining: Vec<_> = table.values().copied().collect();
        assert_eq!(remaining, vec!["keep-1", "keep-2"]);
        assert_eq!(
            table.stats(),
            SweepStats {
                passes: 1,
                expired: 3
            }
        );
    }

    #[test]
    fn test_empty_pass_is_counted() {
        let table: RecordTable<u8> = RecordTable::default();
        assert!(table.expired_handles(Instant::now()).is_empty());
        assert!(table.expired_handles(Instant::now()).is_empty());
        assert_eq!(table.stats().passes, 2);
        assert_eq!(table.stats().expired, 0);
    }
}
