use crate::time;

use std::sync::Arc;
use std::time::Duration;

/// The memoized value together with the moment it stops being fresh.
///
/// Entries are never mutated. A successful load replaces the whole entry and
/// `reset` drops it, so the value and its expiry always travel together.
#[derive(Debug)]
pub(crate) struct CacheEntry<V> {
  value: Arc<V>,
  /// Expiry timestamp as a duration since the cache epoch.
  expires_at: Duration,
}

impl<V> CacheEntry<V> {
  /// Creates an entry that stays fresh for `max_age`, starting now.
  pub(crate) fn new(value: Arc<V>, max_age: Duration) -> Self {
    Self {
      value,
      expires_at: time::deadline_after(max_age),
    }
  }

  #[inline]
  pub(crate) fn value(&self) -> Arc<V> {
    self.value.clone()
  }

  /// An entry is alive while its expiry lies strictly in the future. The
  /// expiry instant itself is already stale.
  #[inline]
  pub(crate) fn is_alive_at(&self, now: Duration) -> bool {
    self.expires_at > now
  }

  #[inline]
  pub(crate) fn is_alive(&self) -> bool {
    self.is_alive_at(time::now_duration())
  }

  /// The remaining time to live, or `None` once stale.
  pub(crate) fn time_to_live(&self) -> Option<Duration> {
    self
      .expires_at
      .checked_sub(time::now_duration())
      .filter(|ttl| !ttl.is_zero())
  }
}
