use std::fmt;
use std::sync::Arc;
use std::time::Duration;

/// Decides how long a freshly loaded value stays fresh.
///
/// The duration counts from the moment the load completes. A zero duration
/// makes the value stale immediately: concurrent callers still share the
/// load that produced it, but no later call is served from the cache.
pub enum MaxAge<V> {
  /// The same duration for every value.
  Fixed(Duration),
  /// A duration derived from each loaded value, e.g. from a token's
  /// `expires_in` field. Evaluated once per successful load.
  Derived(Arc<dyn Fn(&V) -> Duration + Send + Sync>),
}

impl<V> MaxAge<V> {
  /// The policy used when none is configured: every value expires at once.
  pub fn none() -> Self {
    MaxAge::Fixed(Duration::ZERO)
  }

  pub fn derived(f: impl Fn(&V) -> Duration + Send + Sync + 'static) -> Self {
    MaxAge::Derived(Arc::new(f))
  }

  /// Computes the max age for a value that was just loaded.
  pub(crate) fn for_value(&self, value: &V) -> Duration {
    match self {
      MaxAge::Fixed(duration) => *duration,
      MaxAge::Derived(f) => f(value),
    }
  }
}

impl<V> Default for MaxAge<V> {
  fn default() -> Self {
    Self::none()
  }
}

impl<V> Clone for MaxAge<V> {
  fn clone(&self) -> Self {
    match self {
      MaxAge::Fixed(duration) => MaxAge::Fixed(*duration),
      MaxAge::Derived(f) => MaxAge::Derived(f.clone()),
    }
  }
}

impl<V> From<Duration> for MaxAge<V> {
  fn from(duration: Duration) -> Self {
    MaxAge::Fixed(duration)
  }
}

impl<V> fmt::Debug for MaxAge<V> {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      MaxAge::Fixed(duration) => f.debug_tuple("Fixed").field(duration).finish(),
      MaxAge::Derived(_) => f.write_str("Derived(..)"),
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  struct Token {
    expires_in: u64,
  }

  #[test]
  fn default_is_immediately_stale() {
    let policy: MaxAge<u32> = MaxAge::default();
    assert_eq!(policy.for_value(&7), Duration::ZERO);
  }

  #[test]
  fn fixed_ignores_the_value() {
    let policy: MaxAge<Token> = Duration::from_millis(100).into();
    assert_eq!(policy.for_value(&Token { expires_in: 1 }), Duration::from_millis(100));
    assert_eq!(policy.for_value(&Token { expires_in: 9 }), Duration::from_millis(100));
  }

  #[test]
  fn derived_reads_the_value() {
    let policy = MaxAge::derived(|t: &Token| Duration::from_millis(t.expires_in));
    assert_eq!(policy.for_value(&Token { expires_in: 50 }), Duration::from_millis(50));
    assert_eq!(policy.for_value(&Token { expires_in: 2000 }), Duration::from_secs(2));
  }
}
