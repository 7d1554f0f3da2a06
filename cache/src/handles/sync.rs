use crate::error::FetchError;
use crate::shared::{Admission, CacheShared};
use crate::{AsyncCache, MetricsSnapshot};

use std::sync::Arc;
use std::time::Duration;

/// A thread-safe, blocking single-flight cache for one value.
#[derive(Debug)]
pub struct Cache<V, E> {
  pub(crate) shared: Arc<CacheShared<V, E>>,
}

impl<V, E> Clone for Cache<V, E> {
  fn clone(&self) -> Self {
    Self {
      shared: self.shared.clone(),
    }
  }
}

impl<V, E> Cache<V, E> {
  /// Converts this synchronous `Cache` into an asynchronous `AsyncCache`.
  /// This is a zero-cost conversion.
  pub fn to_async(&self) -> AsyncCache<V, E> {
    AsyncCache {
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

  pub fn time_to_live(&self) -> Option<Duration> {
    self.shared.entry.read().as_ref().and_then(|e| e.time_to_live())
  }

  pub fn is_loading(&self) -> bool {
    self.shared.gate.is_loading()
  }

  /// Invalidates the cached value. See `AsyncCache::reset`.
  pub fn reset(&self) {
    self.shared.reset();
  }
}

impl<V, E> Cache<V, E>
where
  V: Send + Sync + 'static,
  E: Send + Sync + 'static,
{
  /// Returns the cached value, blocking the current thread while a load
  /// runs.
  ///
  /// Do not call this from inside an async task on a runtime that must also
  /// drive the async loader; use `AsyncCache::fetch` there.
  pub fn fetch(&self) -> Result<Arc<V>, FetchError<E>> {
    if let Some(value) = self.shared.fresh_value() {
      self.shared.on_hit();
      return Ok(value);
    }

    let future = match self.shared.admit() {
      Admission::Fresh(value) => return Ok(value),
      Admission::Join(future) => future,
      Admission::Lead(future) => {
        CacheShared::spawn_load(Arc::clone(&self.shared), Arc::clone(&future));
        future
      }
    };

    future.wait()
  }
}
