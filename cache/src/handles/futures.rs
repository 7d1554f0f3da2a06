use crate::error::FetchError;
use crate::shared::{Admission, CacheShared};
use crate::{Cache, MetricsSnapshot};

use std::sync::Arc;
use std::time::Duration;

/// A thread-safe, asynchronous single-flight cache for one value.
///
/// Clones share the same entry, gate and metrics. Caches built separately
/// share nothing.
#[derive(Debug)]
pub struct AsyncCache<V, E> {
  pub(crate) shared: Arc<CacheShared<V, E>>,
}

impl<V, E> Clone for AsyncCache<V, E> {
  fn clone(&self) -> Self {
    Self {
      shared: self.shared.clone(),
    }
  }
}

impl<V, E> AsyncCache<V, E> {
  /// Converts this asynchronous `AsyncCache` into a synchronous `Cache`.
  /// This is a zero-cost conversion.
  pub fn to_sync(&self) -> Cache<V, E> {
    Cache {
      shared: self.shared.clone(),
    }
  }

  pub fn metrics(&self) -> MetricsSnapshot {
    self.shared.metrics.snapshot()
  }

  /// Returns the value if it is fresh, without loading.
  pub fn get(&self) -> Option<Arc<V>> {
    self.shared.fresh_value()
  }

  /// How long the current value stays fresh, or `None` if there is no fresh
  /// value.
  pub fn time_to_live(&self) -> Option<Duration> {
    self.shared.entry.read().as_ref().and_then(|e| e.time_to_live())
  }

  /// Whether a load is currently in flight.
  pub fn is_loading(&self) -> bool {
    self.shared.gate.is_loading()
  }

  /// Invalidates the cached value so the next fetch loads a new one.
  ///
  /// A load that is already running is not cancelled; its value will be
  /// stored when it completes.
  pub fn reset(&self) {
    self.shared.reset();
  }
}

impl<V, E> AsyncCache<V, E>
where
  V: Send + Sync + 'static,
  E: Send + Sync + 'static,
{
  /// Returns the cached value, loading a new one if it is missing or stale.
  ///
  /// A fresh value is returned without suspending. Otherwise all callers
  /// that arrive while a load is running wait on that one load and receive
  /// its outcome: the same value, or the same producer error.
  pub async fn fetch(&self) -> Result<Arc<V>, FetchError<E>> {
    // 1. Optimistic read. Never touches the gate.
    if let Some(value) = self.shared.fresh_value() {
      self.shared.on_hit();
      return Ok(value);
    }

    // 2. Stale or empty: go through the gate.
    let future = match self.shared.admit() {
      Admission::Fresh(value) => return Ok(value),
      Admission::Join(future) => future,
      Admission::Lead(future) => {
        // Spawned after the gate is released.
        CacheShared::spawn_load(Arc::clone(&self.shared), Arc::clone(&future));
        future
      }
    };

    // 3. Leader and followers all wait on the same load.
    (&*future).await
  }
}
