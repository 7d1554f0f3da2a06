use fibre_flight::{AsyncCache, Cache, FetchError, Loader};

use std::fmt;
use std::future::Future;
use std::sync::Arc;

/// Where a token comes from.
///
/// Every variant resolves the same way, so a static token, a bare producer
/// and a cache are interchangeable wherever a token is needed.
pub enum TokenSource<T, E> {
  /// The same token every time.
  Static(Arc<T>),
  /// A producer invoked on every resolution.
  Loader(Loader<T, E>),
  /// A cache; resolution fetches from it.
  Cache(AsyncCache<T, E>),
}

impl<T, E> TokenSource<T, E> {
  pub fn fixed(token: T) -> Self {
    TokenSource::Static(Arc::new(token))
  }

  /// A synchronous producer. It runs on the resolving task, so it should not
  /// block for long; wrap slow producers in a cache instead.
  pub fn from_fn(f: impl Fn() -> Result<T, E> + Send + Sync + 'static) -> Self {
    TokenSource::Loader(Loader::from_fn(f))
  }

  pub fn from_async_fn<F, Fut>(f: F) -> Self
  where
    F: Fn() -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<T, E>> + Send + 'static,
  {
    TokenSource::Loader(Loader::from_async_fn(f))
  }
}

impl<T, E> TokenSource<T, E>
where
  T: Send + Sync + 'static,
  E: Send + Sync + 'static,
{
  /// Resolves the source to a concrete token.
  ///
  /// A producer's error is surfaced as `FetchError::Producer`, exactly as a
  /// cache would surface it.
  pub async fn resolve(&self) -> Result<Arc<T>, FetchError<E>> {
    match self {
      TokenSource::Static(token) => Ok(token.clone()),
      TokenSource::Loader(loader) => loader
        .load()
        .await
        .map(Arc::new)
        .map_err(|err| FetchError::Producer(Arc::new(err))),
      TokenSource::Cache(cache) => cache.fetch().await,
    }
  }
}

impl<T, E> Clone for TokenSource<T, E> {
  fn clone(&self) -> Self {
    match self {
      TokenSource::Static(token) => TokenSource::Static(token.clone()),
      TokenSource::Loader(loader) => TokenSource::Loader(loader.clone()),
      TokenSource::Cache(cache) => TokenSource::Cache(cache.clone()),
    }
  }
}

impl<T, E> fmt::Debug for TokenSource<T, E> {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    // Tokens are secrets; never print one.
    let kind = match self {
      TokenSource::Static(_) => "Static",
      TokenSource::Loader(Loader::Sync(_)) => "Loader(Sync)",
      TokenSource::Loader(Loader::Async(_)) => "Loader(Async)",
      TokenSource::Cache(_) => "Cache",
    };
    f.debug_tuple("TokenSource").field(&kind).finish()
  }
}

impl<T, E> From<AsyncCache<T, E>> for TokenSource<T, E> {
  fn from(cache: AsyncCache<T, E>) -> Self {
    TokenSource::Cache(cache)
  }
}

impl<T, E> From<Cache<T, E>> for TokenSource<T, E> {
  fn from(cache: Cache<T, E>) -> Self {
    TokenSource::Cache(cache.to_async())
  }
}

impl<T, E> From<Loader<T, E>> for TokenSource<T, E> {
  fn from(loader: Loader<T, E>) -> Self {
    TokenSource::Loader(loader)
  }
}
