//! Concurrent Set
//!
//! Unordered collection of unique elements behind a read/write lock.

use hashbrown::HashSet;
use parking_lot::RwLock;
use std::borrow::Borrow;
use std::fmt;
use std::hash::Hash;

/// Thread-safe set of unique elements.
///
/// Reads take the shared lock so they never serialize against each other;
/// mutations take the exclusive lock for the duration of one call.
pub struct ConcurrentSet<T> {
    inner: RwLock<HashSet<T>>,
}

impl<T> Default for ConcurrentSet<T> {
    fn default() -> Self {
        Self {
            inner: RwLock::new(HashSet::new()),
        }
    }
}

impl<T: Eq + Hash> ConcurrentSet<T> {
    /// Create a new empty set
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an element, returns true if it was not already a member
    pub fn add(&self, item: T) -> bool {
        self.inner.write().insert(item)
    }

    /// Add every element of `items` under one lock acquisition
    pub fn add_many<I>(&self, items: I)
    where
        I: IntoIterator<Item = T>,
    {
        self.inner.write().extend(items);
    }

    /// Remove an element, returns true if it was a member
    pub fn remove<Q>(&self, item: &Q) -> bool
    where
        T: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.inner.write().remove(item)
    }

    /// Check membership
    pub fn has<Q>(&self, item: &Q) -> bool
    where
        T: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.inner.read().contains(item)
    }

    /// Number of members
    pub fn len(&self) -> usize {
        self.inner.read().len()
    }

    /// Check if the set is empty
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Remove all members
    pub fn clear(&self) {
        self.inner.write().clear();
    }
}

impl<T: Eq + Hash + Clone> ConcurrentSet<T> {
    /// Remove and return an arbitrary member.
    ///
    /// Selection and removal happen under a single exclusive acquisition, so
    /// the returned element was a member until this call took it.
    pub fn pop(&self) -> Option<T> {
        let mut set = self.inner.write();
        let item = set.iter().next().cloned()?;
        set.remove(&item);
        Some(item)
    }

    /// Snapshot of the current members, in no particular order
    pub fn to_vec(&self) -> Vec<T> {
        self.inner.read().iter().cloned().collect()
    }
}

impl<T: Eq + Hash> FromIterator<T> for ConcurrentSet<T> {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        Self {
            inner: RwLock::new(iter.into_iter().collect()),
        }
    }
}

impl<T: fmt::Debug> fmt::Debug for ConcurrentSet<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.inner.read().iter()).finish()
    }
}

impl<T: fmt::Debug> fmt::Display for ConcurrentSet<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let set = self.inner.read();
        write!(f, "len: {} items: ", set.len())?;
        f.debug_list().entries(set.iter()).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet as StdHashSet;
    use std::sync::Arc;
    use std::thread;

    #[test]
    fn test_basic_operations() {
        let set = ConcurrentSet::new();

        assert!(set.add("a"));
        assert!(set.has("a"));
        assert!(!set.has("b"));
        assert_eq!(set.len(), 1);

        assert!(set.remove("a"));
        assert!(!set.remove("a"));
        assert!(set.is_empty());
    }

    #[test]
    fn test_add_is_idempotent() {
        let set = ConcurrentSet::new();
        assert!(set.add(42));
        for _ in 0..10 {
            assert!(!set.add(42));
        }
        assert_eq!(set.len(), 1);
        assert!(set.has(&42));
    }

    #[test]
    fn test_borrowed_lookup() {
        let set = ConcurrentSet::new();
        set.add(String::from("user:1"));
        assert!(set.has("user:1"));
        assert!(set.remove("user:1"));
    }

    #[test]
    fn test_add_many_and_clear() {
        let set = ConcurrentSet::new();
        set.add_many([3, 1, 2, 1, 3]);
        assert_eq!(set.len(), 3);

        let mut members = set.to_vec();
        members.sort();
        assert_eq!(members, vec![1, 2, 3]);

        set.clear();
        assert!(set.is_empty());
        assert!(set.to_vec().is_empty());
    }

    #[test]
    fn test_pop_exhaustion() {
        let set: ConcurrentSet<u32> = (0..50).collect();

        let mut popped = StdHashSet::new();
        while let Some(item) = set.pop() {
            assert!(!set.has(&item));
            assert!(popped.insert(item));
        }

        assert_eq!(popped.len(), 50);
        assert_eq!(set.pop(), None);
        assert!(set.is_empty());
    }

    #[test]
    fn test_concurrent_pop_returns_each_member_once() {
        let set: Arc<ConcurrentSet<u32>> = Arc::new((0..4000).collect());

        let workers: Vec<_> = (0..4)
            .map(|_| {
                let set = Arc::clone(&set);
                thread::spawn(move || {
                    let mut taken = Vec::new();
                    while let Some(item) = set.pop() {
                        taken.push(item);
                    }
                    taken
                })
            })
            .collect();

        let mut all = StdHashSet::new();
        for worker in workers {
            for item in worker.join().unwrap() {
                assert!(all.insert(item), "element popped twice");
            }
        }
        assert_eq!(all.len(), 4000);
        assert!(set.is_empty());
    }

    #[test]
    fn test_concurrent_add() {
        let set = Arc::new(ConcurrentSet::new());

        let workers: Vec<_> = (0..8)
            .map(|i| {
                let set = Arc::clone(&set);
                thread::spawn(move || {
                    for j in 0..500 {
                        set.add(j);
                        set.add(i * 1000 + j);
                    }
                })
            })
            .collect();

        for worker in workers {
            worker.join().unwrap();
        }

        // 0..500 shared by all, plus i*1000+j for i in 1..8
        assert_eq!(set.len(), 500 + 7 * 500);
    }

    #[test]
    fn test_display() {
        let set = ConcurrentSet::new();
        set.add(1);
        assert_eq!(set.to_string(), "len: 1 items: [1]");
        assert_eq!(format!("{:?}", set), "{1}");
    }
}
