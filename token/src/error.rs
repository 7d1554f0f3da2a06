use fibre_flight::FetchError;
use http::header::{InvalidHeaderName, InvalidHeaderValue};
use thiserror::Error;

/// Errors raised while decorating a request.
#[derive(Debug, Error)]
pub enum InterceptError<E> {
  /// The token could not be resolved. The source's own error is passed
  /// through as is.
  #[error(transparent)]
  Token(#[from] FetchError<E>),

  #[error("invalid header name `{name}`")]
  InvalidHeaderName {
    name: String,
    #[source]
    source: InvalidHeaderName,
  },

  /// The derived header value contains bytes HTTP does not allow.
  #[error("invalid value for header `{name}`")]
  InvalidHeaderValue {
    name: String,
    #[source]
    source: InvalidHeaderValue,
  },
}

impl<E> InterceptError<E> {
  /// The token source's error, if resolution is what failed.
  pub fn token_error(&self) -> Option<&FetchError<E>> {
    match self {
      InterceptError::Token(err) => Some(err),
      _ => None,
    }
  }
}
