use crate::entry::CacheEntry;
use crate::error::FetchError;
use crate::expiry::MaxAge;
use crate::gate::RefreshGate;
use crate::loader::{LoadFuture, LoadOutcome, Loader};
use crate::metrics::Metrics;
use crate::TaskSpawner;

use std::fmt;
use std::sync::Arc;
use std::thread;

use parking_lot::RwLock;

/// What a caller should do after passing through the refresh gate.
pub(crate) enum Admission<V, E> {
  /// Another caller refreshed the entry while we waited for the gate.
  Fresh(Arc<V>),
  /// A load is already in flight; wait for its outcome.
  Join(Arc<LoadFuture<V, E>>),
  /// We installed a new load and must start it.
  Lead(Arc<LoadFuture<V, E>>),
}

/// The internal, thread-safe core of the cache.
pub(crate) struct CacheShared<V, E> {
  pub(crate) entry: RwLock<Option<CacheEntry<V>>>,
  pub(crate) gate: RefreshGate<V, E>,
  pub(crate) loader: Loader<V, E>,
  pub(crate) max_age: MaxAge<V>,
  pub(crate) spawner: Option<Arc<dyn TaskSpawner>>,
  pub(crate) metrics: Metrics,
}

impl<V, E> fmt::Debug for CacheShared<V, E> {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.debug_struct("CacheShared")
      .field("max_age", &self.max_age)
      .field("has_spawner", &self.spawner.is_some())
      .field("metrics", &self.metrics.snapshot())
      .finish_non_exhaustive()
  }
}

impl<V, E> CacheShared<V, E> {
  /// Returns the cached value if it is still fresh.
  ///
  /// Only takes the entry's read lock. Never touches the gate.
  #[inline]
  pub(crate) fn fresh_value(&self) -> Option<Arc<V>> {
    self
      .entry
      .read()
      .as_ref()
      .filter(|entry| entry.is_alive())
      .map(CacheEntry::value)
  }

  pub(crate) fn on_hit(&self) {
    Metrics::record(&self.metrics.hits);
    tracing::trace!("fibre_flight: served fresh value");
  }

  /// Passes through the gate: re-checks freshness, then either joins the
  /// load in flight or installs a new one.
  pub(crate) fn admit(&self) -> Admission<V, E> {
    let mut in_flight = self.gate.enter();

    // The entry may have been refreshed while we waited for the gate.
    if let Some(value) = self.fresh_value() {
      self.on_hit();
      return Admission::Fresh(value);
    }

    if let Some(future) = in_flight.as_ref() {
      Metrics::record(&self.metrics.joins);
      tracing::trace!("fibre_flight: joining load in flight");
      return Admission::Join(future.clone());
    }

    // We are the leader. This is the only place a miss is recorded.
    Metrics::record(&self.metrics.misses);
    let future = Arc::new(LoadFuture::new());
    *in_flight = Some(future.clone());
    Admission::Lead(future)
  }

  /// Drops the entry. A load already in flight is left to finish and will
  /// populate the cache when it does.
  pub(crate) fn reset(&self) {
    self.entry.write().take();
    Metrics::record(&self.metrics.resets);
    tracing::trace!("fibre_flight: entry reset");
  }

  /// Records the producer's result and hands it to every waiter.
  fn settle(&self, future: &Arc<LoadFuture<V, E>>, result: Result<V, E>) {
    let outcome: LoadOutcome<V, E> = match result {
      Ok(value) => {
        let value = Arc::new(value);
        // Evaluated once, outside the gate, on the value just loaded.
        let max_age = self.max_age.for_value(&value);
        {
          let mut in_flight = self.gate.enter();
          *self.entry.write() = Some(CacheEntry::new(value.clone(), max_age));
          RefreshGate::release(&mut in_flight, future);
        }
        Metrics::record(&self.metrics.loads_succeeded);
        tracing::debug!(
          max_age_ms = max_age.as_millis() as u64,
          "fibre_flight: stored freshly loaded value"
        );
        Ok(value)
      }
      Err(err) => {
        // The entry is left exactly as it was.
        RefreshGate::release(&mut self.gate.enter(), future);
        Metrics::record(&self.metrics.loads_failed);
        tracing::debug!("fibre_flight: load failed, entry left untouched");
        Err(FetchError::Producer(Arc::new(err)))
      }
    };
    future.complete(outcome);
  }

  fn abandon(&self, future: &Arc<LoadFuture<V, E>>) {
    RefreshGate::release(&mut self.gate.enter(), future);
    Metrics::record(&self.metrics.loads_abandoned);
    tracing::warn!("fibre_flight: load ended without producing a result");
    future.complete(Err(FetchError::Abandoned));
  }
}

impl<V, E> CacheShared<V, E>
where
  V: Send + Sync + 'static,
  E: Send + Sync + 'static,
{
  /// Starts the producer for a load this caller leads.
  ///
  /// The producer runs detached from the caller: synchronous loaders on a
  /// dedicated thread, async loaders on the configured spawner.
  pub(crate) fn spawn_load(shared: Arc<Self>, future: Arc<LoadFuture<V, E>>) {
    tracing::debug!("fibre_flight: starting load");
    let loader = shared.loader.clone();
    let spawner = shared.spawner.clone();
    let guard = LoadGuard {
      shared,
      future,
      settled: false,
    };

    match loader {
      Loader::Sync(sync_loader) => {
        let spawned = thread::Builder::new()
          .name("fibre-flight-loader".into())
          .spawn(move || {
            let result = sync_loader();
            guard.settle(result);
          });
        // On failure the closure, and the guard inside it, is dropped,
        // which abandons the load.
        if let Err(err) = spawned {
          tracing::error!(error = %err, "fibre_flight: failed to spawn loader thread");
        }
      }
      Loader::Async(async_loader) => match spawner {
        Some(spawner) => spawner.spawn(Box::pin(async move {
          let result = async_loader().await;
          guard.settle(result);
        })),
        None => {
          tracing::error!("fibre_flight: async loader configured without a spawner");
          drop(guard);
        }
      },
    }
  }
}

/// Owns a load from the moment it is started until it is settled.
///
/// If the load task is torn down before the producer returns (a panic, or a
/// runtime shutting down), dropping the guard completes the load as
/// abandoned, so waiters are never stranded and the gate is freed.
struct LoadGuard<V, E> {
  shared: Arc<CacheShared<V, E>>,
  future: Arc<LoadFuture<V, E>>,
  settled: bool,
}

impl<V, E> LoadGuard<V, E> {
  fn settle(mut self, result: Result<V, E>) {
    self.shared.settle(&self.future, result);
    self.settled = true;
  }
}

impl<V, E> Drop for LoadGuard<V, E> {
  fn drop(&mut self) {
    if !self.settled {
      self.shared.abandon(&self.future);
    }
  }
}
