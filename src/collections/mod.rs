//! Collections
//!
//! Thread-safe containers used alongside the record store.

mod concurrent_set;

pub use concurrent_set::ConcurrentSet;
