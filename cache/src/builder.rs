use crate::config::CacheConfig;
use crate::error::BuildError;
use crate::expiry::MaxAge;
use crate::gate::RefreshGate;
use crate::handles::{AsyncCache, Cache};
use crate::loader::Loader;
use crate::metrics::Metrics;
use crate::shared::CacheShared;
use crate::TaskSpawner;

use core::fmt;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use parking_lot::RwLock;

/// A builder for creating `Cache` and `AsyncCache` instances.
///
/// `V` is the cached value and `E` the error the producer may return.
pub struct CacheBuilder<V, E> {
  max_age: Option<MaxAge<V>>,
  loader: Option<Loader<V, E>>,
  spawner: Option<Arc<dyn TaskSpawner>>,
}

impl<V, E> fmt::Debug for CacheBuilder<V, E> {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.debug_struct("CacheBuilder")
      .field("max_age", &self.max_age)
      .field("has_loader", &self.loader.is_some())
      .field("has_spawner", &self.spawner.is_some())
      .finish()
  }
}

impl<V, E> CacheBuilder<V, E> {
  /// Creates a new `CacheBuilder` with default settings.
  pub fn new() -> Self {
    Self {
      max_age: None,
      loader: None,
      spawner: None,
    }
  }

  /// Creates a builder from plain configuration. A loader still has to be
  /// supplied.
  pub fn from_config(config: &CacheConfig) -> Self {
    let builder = Self::new();
    match config.max_age() {
      Some(max_age) => builder.max_age(max_age),
      None => builder,
    }
  }

  /// Keeps every loaded value fresh for `max_age`.
  ///
  /// Without a max age, values expire the moment they are stored: concurrent
  /// callers still share a single load, but every later call loads again.
  pub fn max_age(mut self, max_age: Duration) -> Self {
    self.max_age = Some(MaxAge::Fixed(max_age));
    self
  }

  /// Sets the freshness policy directly.
  pub fn max_age_policy(mut self, policy: impl Into<MaxAge<V>>) -> Self {
    self.max_age = Some(policy.into());
    self
  }

  /// Derives each value's max age from the value itself.
  ///
  /// The closure runs once per successful load.
  pub fn max_age_with(mut self, f: impl Fn(&V) -> Duration + Send + Sync + 'static) -> Self {
    self.max_age = Some(MaxAge::derived(f));
    self
  }

  /// Sets the synchronous producer.
  ///
  /// Each load runs it on a dedicated thread.
  pub fn loader(mut self, f: impl Fn() -> Result<V, E> + Send + Sync + 'static) -> Self {
    self.loader = Some(Loader::from_fn(f));
    self
  }

  /// Sets the asynchronous producer.
  ///
  /// Each load runs it as a task on the configured `TaskSpawner`. When none
  /// is set, loads go to the Tokio runtime current at fetch time, falling
  /// back to the one current at build time.
  pub fn async_loader<F, Fut>(mut self, f: F) -> Self
  where
    F: Fn() -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<V, E>> + Send + 'static,
  {
    self.loader = Some(Loader::from_async_fn(f));
    self
  }

  pub fn spawner(mut self, spawner: Arc<dyn TaskSpawner>) -> Self {
    self.spawner = Some(spawner);
    self
  }
}

impl<V, E> Default for CacheBuilder<V, E> {
  fn default() -> Self {
    Self::new()
  }
}

// --- Build Methods ---
impl<V, E> CacheBuilder<V, E>
where
  V: Send + Sync + 'static,
  E: Send + Sync + 'static,
{
  /// Builds a synchronous `Cache`.
  pub fn build(self) -> Result<Cache<V, E>, BuildError> {
    let shared = self.build_shared_core()?;
    Ok(Cache { shared })
  }

  /// Builds an asynchronous `AsyncCache`.
  pub fn build_async(self) -> Result<AsyncCache<V, E>, BuildError> {
    let shared = self.build_shared_core()?;
    Ok(AsyncCache { shared })
  }

  pub(crate) fn build_shared_core(self) -> Result<Arc<CacheShared<V, E>>, BuildError> {
    let loader = self.loader.ok_or(BuildError::LoaderRequired)?;

    let mut spawner = self.spawner;
    if matches!(loader, Loader::Async(_)) && spawner.is_none() {
      #[cfg(feature = "tokio")]
      {
        let tokio_spawner = crate::runtime::TokioSpawner::follow_current()
          .ok_or(BuildError::SpawnerRequired)?;
        spawner = Some(Arc::new(tokio_spawner));
      }
      #[cfg(not(feature = "tokio"))]
      {
        return Err(BuildError::SpawnerRequired);
      }
    }

    let max_age = self.max_age.unwrap_or_default();
    tracing::debug!(?max_age, "fibre_flight: building cache");

    Ok(Arc::new(CacheShared {
      entry: RwLock::new(None),
      gate: RefreshGate::new(),
      loader,
      max_age,
      spawner,
      metrics: Metrics::new(),
    }))
  }
}
