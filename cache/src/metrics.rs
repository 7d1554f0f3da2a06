use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Instant;

use crossbeam_utils::CachePadded;

/// A thread-safe, internal metrics collector for the cache.
/// All fields are atomic to allow for lock-free updates.
#[derive(Debug)]
pub struct Metrics {
  // --- Lookups ---
  pub(crate) hits: CachePadded<AtomicU64>,
  pub(crate) misses: CachePadded<AtomicU64>,
  pub(crate) joins: CachePadded<AtomicU64>,

  // --- Loads ---
  pub(crate) loads_succeeded: CachePadded<AtomicU64>,
  pub(crate) loads_failed: CachePadded<AtomicU64>,
  pub(crate) loads_abandoned: CachePadded<AtomicU64>,

  pub(crate) resets: CachePadded<AtomicU64>,

  created_at: Instant,
}

impl Default for Metrics {
  fn default() -> Self {
    Self {
      hits: CachePadded::new(AtomicU64::new(0)),
      misses: CachePadded::new(AtomicU64::new(0)),
      joins: CachePadded::new(AtomicU64::new(0)),
      loads_succeeded: CachePadded::new(AtomicU64::new(0)),
      loads_failed: CachePadded::new(AtomicU64::new(0)),
      loads_abandoned: CachePadded::new(AtomicU64::new(0)),
      resets: CachePadded::new(AtomicU64::new(0)),
      created_at: Instant::now(),
    }
  }
}

impl Metrics {
  pub(crate) fn new() -> Self {
    Self::default()
  }

  #[inline]
  pub(crate) fn record(counter: &AtomicU64) {
    counter.fetch_add(1, Ordering::Relaxed);
  }

  /// Creates a point-in-time snapshot of the current metrics.
  pub(crate) fn snapshot(&self) -> MetricsSnapshot {
    let hits = self.hits.load(Ordering::Relaxed);
    let misses = self.misses.load(Ordering::Relaxed);
    let joins = self.joins.load(Ordering::Relaxed);
    let total_lookups = hits + misses + joins;

    MetricsSnapshot {
      hits,
      misses,
      joins,
      hit_ratio: if total_lookups == 0 {
        0.0
      } else {
        hits as f64 / total_lookups as f64
      },
      loads_succeeded: self.loads_succeeded.load(Ordering::Relaxed),
      loads_failed: self.loads_failed.load(Ordering::Relaxed),
      loads_abandoned: self.loads_abandoned.load(Ordering::Relaxed),
      resets: self.resets.load(Ordering::Relaxed),
      uptime_secs: self.created_at.elapsed().as_secs(),
    }
  }
}

/// A point-in-time, public-facing snapshot of the cache's metrics.
#[derive(Clone)]
pub struct MetricsSnapshot {
  /// Fetches answered from a fresh entry.
  pub hits: u64,
  /// Fetches that started a load.
  pub misses: u64,
  /// Fetches that waited on a load another caller started.
  pub joins: u64,
  /// hits / (hits + misses + joins).
  pub hit_ratio: f64,
  /// Loads whose value was stored.
  pub loads_succeeded: u64,
  /// Loads whose producer returned an error.
  pub loads_failed: u64,
  /// Loads that ended without any result.
  pub loads_abandoned: u64,
  /// Calls to `reset`.
  pub resets: u64,
  /// The number of seconds the cache has been running.
  pub uptime_secs: u64,
}

impl fmt::Debug for MetricsSnapshot {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.debug_struct("MetricsSnapshot")
      .field("hits", &self.hits)
      .field("misses", &self.misses)
      .field("joins", &self.joins)
      .field("hit_ratio", &format!("{:.2}%", self.hit_ratio * 100.0))
      .field("loads_succeeded", &self.loads_succeeded)
      .field("loads_failed", &self.loads_failed)
      .field("loads_abandoned", &self.loads_abandoned)
      .field("resets", &self.resets)
      .field("uptime_secs", &self.uptime_secs)
      .finish()
  }
}
