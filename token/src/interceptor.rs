use crate::error::InterceptError;
use crate::source::TokenSource;

use http::header::{HeaderMap, HeaderName, HeaderValue};
use http::Request;
use std::fmt;
use std::sync::Arc;

/// Turns a token into a `(name, value)` header pair.
pub type HeaderFn<T> = Arc<dyn Fn(&T) -> (String, String) + Send + Sync>;

/// The default header: `Authorization: Bearer <token>`.
pub fn bearer_header<T: fmt::Display>(token: &T) -> (String, String) {
  ("Authorization".to_string(), format!("Bearer {}", token))
}

/// Adds a token-derived header to outgoing requests.
///
/// The interceptor holds no state of its own; caching, if any, lives in the
/// token source.
pub struct TokenInterceptor<T, E> {
  source: TokenSource<T, E>,
  header: HeaderFn<T>,
}

impl<T, E> TokenInterceptor<T, E>
where
  T: fmt::Display + 'static,
{
  /// Creates an interceptor that sends `Authorization: Bearer <token>`.
  pub fn new(source: impl Into<TokenSource<T, E>>) -> Self {
    Self {
      source: source.into(),
      header: Arc::new(bearer_header::<T>),
    }
  }
}

impl<T, E> TokenInterceptor<T, E> {
  /// Creates an interceptor with a custom header function.
  pub fn with_header(
    source: impl Into<TokenSource<T, E>>,
    header: impl Fn(&T) -> (String, String) + Send + Sync + 'static,
  ) -> Self {
    Self {
      source: source.into(),
      header: Arc::new(header),
    }
  }

  /// Replaces the header function.
  pub fn header(mut self, header: impl Fn(&T) -> (String, String) + Send + Sync + 'static) -> Self {
    self.header = Arc::new(header);
    self
  }

  pub fn source(&self) -> &TokenSource<T, E> {
    &self.source
  }
}

impl<T, E> TokenInterceptor<T, E>
where
  T: Send + Sync + 'static,
  E: Send + Sync + 'static,
{
  /// Resolves the token and derives the header from it.
  pub async fn header_entry(&self) -> Result<(HeaderName, HeaderValue), InterceptError<E>> {
    let token = self.source.resolve().await?;
    let (name, value) = (self.header)(&token);

    let header_name = HeaderName::from_bytes(name.as_bytes())
      .map_err(|source| InterceptError::InvalidHeaderName {
        name: name.clone(),
        source,
      })?;
    let mut header_value =
      HeaderValue::from_str(&value).map_err(|source| InterceptError::InvalidHeaderValue {
        name,
        source,
      })?;
    header_value.set_sensitive(true);

    Ok((header_name, header_value))
  }

  /// Adds the header to `headers`. A header with the same name is replaced;
  /// all other headers are left alone.
  ///
  /// On error `headers` is not modified.
  pub async fn apply(&self, headers: &mut HeaderMap) -> Result<(), InterceptError<E>> {
    let (name, value) = self.header_entry().await?;
    tracing::trace!(header = %name, "fibre_token: decorating request");
    headers.insert(name, value);
    Ok(())
  }

  /// Decorates a request on its way out.
  pub async fn intercept<B>(&self, mut request: Request<B>) -> Result<Request<B>, InterceptError<E>> {
    self.apply(request.headers_mut()).await?;
    Ok(request)
  }
}

impl<T, E> Clone for TokenInterceptor<T, E> {
  fn clone(&self) -> Self {
    Self {
      source: self.source.clone(),
      header: self.header.clone(),
    }
  }
}

impl<T, E> fmt::Debug for TokenInterceptor<T, E> {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.debug_struct("TokenInterceptor")
      .field("source", &self.source)
      .finish_non_exhaustive()
  }
}
