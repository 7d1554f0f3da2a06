use std::time::Duration;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Plain-data cache settings, for callers that keep their configuration in
/// a file or environment rather than in code.
///
/// Only a fixed max age can be expressed here. A max age derived from the
/// value needs a closure and is set on the builder directly.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct CacheConfig {
  /// How long each loaded value stays fresh, in milliseconds. Absent means
  /// values expire immediately.
  pub max_age_ms: Option<u64>,
}

impl CacheConfig {
  pub fn max_age(&self) -> Option<Duration> {
    self.max_age_ms.map(Duration::from_millis)
  }
}
