//! Timestamped cache entries.

use chrono::{DateTime, TimeDelta, Utc};
use std::time::Duration;

/// A cached value and the time it was computed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CacheEntry<T> {
    value: T,
    cached_at: DateTime<Utc>,
}

impl<T> CacheEntry<T> {
    /// Wraps a value computed at `cached_at`.
    #[must_use]
    pub const fn new(value: T, cached_at: DateTime<Utc>) -> Self {
        Self { value, cached_at }
    }

    /// Returns the cached value.
    #[must_use]
    pub const fn value(&self) -> &T {
        &self.value
    }

    /// Consumes the entry and returns the value.
    #[must_use]
    pub fn into_value(self) -> T {
        self.value
    }

    /// Returns when the value was computed.
    #[must_use]
    pub const fn cached_at(&self) -> DateTime<Utc> {
        self.cached_at
    }

    /// Returns whether `ttl` has fully elapsed between computation and `now`.
    ///
    /// A TTL too large to represent never expires.
    #[must_use]
    pub fn is_expired(&self, ttl: Duration, now: DateTime<Utc>) -> bool {
        TimeDelta::from_std(ttl).is_ok_and(|limit| now - self.cached_at >= limit)
    }
}
