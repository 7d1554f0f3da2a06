//! Decorates outgoing HTTP requests with an authorization header.
//!
//! The token comes from a [`TokenSource`]: a static value, a producer
//! function, or a `fibre_flight` cache whose loads are shared between
//! concurrent requests.
//!
//! ```no_run
//! use fibre_flight::CacheBuilder;
//! use fibre_token::TokenInterceptor;
//! use std::time::Duration;
//!
//! # async fn request_token() -> Result<String, std::io::Error> { Ok("abc".into()) }
//! # async fn run() -> Result<(), Box<dyn std::error::Error>> {
//! let tokens = CacheBuilder::new()
//!   .async_loader(request_token)
//!   .max_age(Duration::from_secs(300))
//!   .build_async()?;
//! let interceptor = TokenInterceptor::new(tokens);
//!
//! let request = http::Request::get("https://api.example.com/").body(())?;
//! let request = interceptor.intercept(request).await?;
//! assert!(request.headers().contains_key(http::header::AUTHORIZATION));
//! # Ok(())
//! # }
//! ```

pub mod error;
pub mod interceptor;
pub mod source;

pub use error::InterceptError;
pub use interceptor::{bearer_header, HeaderFn, TokenInterceptor};
pub use source::TokenSource;
