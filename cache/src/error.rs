use std::error::Error;
use std::fmt;
use std::sync::Arc;

use thiserror::Error;

/// Errors that can occur when building a cache.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BuildError {
  /// Neither `loader` nor `async_loader` was configured. A flight cache has
  /// nothing to serve without a producer.
  #[error("a loader or async_loader must be configured")]
  LoaderRequired,
  /// An `async_loader` was provided, but no `TaskSpawner` was configured
  /// and no Tokio runtime could be used in its place.
  #[error("an async loader requires a task spawner or a running tokio runtime")]
  SpawnerRequired,
}

/// The error returned by a fetch.
///
/// A failed load is shared by every caller that was waiting on it, so the
/// producer's error is held in an `Arc`. All of those callers observe the
/// very same error value.
pub enum FetchError<E> {
  /// The producer returned an error. It is passed through untouched.
  Producer(Arc<E>),
  /// The load task ended without producing a result, for example because
  /// the producer panicked or its runtime shut down.
  Abandoned,
}

impl<E> FetchError<E> {
  /// Returns the producer's error, if this failure came from the producer.
  pub fn producer(&self) -> Option<&E> {
    match self {
      FetchError::Producer(err) => Some(err),
      FetchError::Abandoned => None,
    }
  }

  /// Consumes the error, returning the shared producer error if there is one.
  pub fn into_producer(self) -> Option<Arc<E>> {
    match self {
      FetchError::Producer(err) => Some(err),
      FetchError::Abandoned => None,
    }
  }

  pub fn is_abandoned(&self) -> bool {
    matches!(self, FetchError::Abandoned)
  }
}

impl<E> Clone for FetchError<E> {
  fn clone(&self) -> Self {
    match self {
      FetchError::Producer(err) => FetchError::Producer(Arc::clone(err)),
      FetchError::Abandoned => FetchError::Abandoned,
    }
  }
}

impl<E: fmt::Debug> fmt::Debug for FetchError<E> {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      FetchError::Producer(err) => f.debug_tuple("Producer").field(err).finish(),
      FetchError::Abandoned => f.write_str("Abandoned"),
    }
  }
}

impl<E: fmt::Display> fmt::Display for FetchError<E> {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      // The producer's message is surfaced verbatim.
      FetchError::Producer(err) => fmt::Display::fmt(err, f),
      FetchError::Abandoned => f.write_str("the load ended before a value was produced"),
    }
  }
}

impl<E: Error + 'static> Error for FetchError<E> {
  fn source(&self) -> Option<&(dyn Error + 'static)> {
    match self {
      FetchError::Producer(err) => err.source(),
      FetchError::Abandoned => None,
    }
  }
}
