//! Records and Handles

use std::fmt;
use std::time::Duration;
use tokio::time::Instant;

/// Longest TTL honoured, ~100 years. Larger values are capped so the
/// deadline never overflows `Instant`.
pub const MAX_TTL_SECS: u64 = 100 * 365 * 24 * 60 * 60;

/// Opaque identifier of a record within one store.
///
/// Handles start at 1, grow monotonically and are never reused, even after
/// the record they named is removed or expires.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Handle(u64);

impl Handle {
    pub(crate) fn new(raw: u64) -> Self {
        Self(raw)
    }

    /// Raw numeric value
    pub fn get(self) -> u64 {
        self.0
    }
}

impl fmt::Display for Handle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Stored value with its handle and absolute deadline
#[derive(Debug, Clone)]
pub struct Record<V> {
    handle: Handle,
    expires_at: Instant,
    value: V,
}

impl<V> Record<V> {
    pub(crate) fn new(handle: Handle, value: V, ttl_secs: u64) -> Self {
        Self {
            handle,
            expires_at: deadline(Instant::now(), ttl_secs),
            value,
        }
    }

    pub fn handle(&self) -> Handle {
        self.handle
    }

    pub fn expires_at(&self) -> Instant {
        self.expires_at
    }

    pub fn value(&self) -> &V {
        &self.value
    }

    pub(crate) fn replace(&mut self, value: V) -> V {
        std::mem::replace(&mut self.value, value)
    }

    /// A record is expired once its deadline is at or before `now`
    #[inline]
    pub fn is_expired_at(&self, now: Instant) -> bool {
        now >= self.expires_at
    }
}

fn deadline(now: Instant, ttl_secs: u64) -> Instant {
    now + Duration::from_secs(ttl_secs.min(MAX_TTL_SECS))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_zero_ttl_is_expired_immediately() {
        let record = Record::new(Handle::new(1), "x", 0);
        assert!(record.is_expired_at(Instant::now()));
    }

    #[test]
    fn test_record_not_expired_before_deadline() {
        let record = Record::new(Handle::new(1), "x", 60);
        assert!(!record.is_expired_at(Instant::now()));
        assert!(record.is_expired_at(record.expires_at()));
    }

    #[test]
    fn test_huge_ttl_is_capped() {
        let now = Instant::now();
        let record = Record::new(Handle::new(1), (), u64::MAX);
        assert!(record.expires_at() <= now + Duration::from_secs(MAX_TTL_SECS + 1));
    }

    #[test]
    fn test_replace_keeps_deadline() {
        let mut record = Record::new(Handle::new(7), 1, 10);
        let deadline = record.expires_at();
        assert_eq!(record.replace(2), 1);
        assert_eq!(*record.value(), 2);
        assert_eq!(record.expires_at(), deadline);
        assert_eq!(record.handle().to_string(), "#7");
    }
}
