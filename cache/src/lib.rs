//! A single-flight, time-bounded memoization cache for one expensive value,
//! such as an access token.
//!
//! # Features
//! - **Fresh reads never wait**: a fresh value is returned without touching
//!   any lock other than a short read lock.
//! - **Single flight**: callers that find the value stale while a load is
//!   running share that load instead of starting their own.
//! - **Shared failures, no poisoning**: a producer error reaches every caller
//!   that waited on it, and the next call simply loads again.
//! - **Fixed or derived max age**: one duration for every value, or one
//!   computed from each value (e.g. a token's `expires_in`).
//! - **Sync & Async**: blocking and `async` handles over the same core.
//!
//! ```no_run
//! use fibre_flight::CacheBuilder;
//! use std::time::Duration;
//!
//! # async fn request_token() -> Result<String, std::io::Error> { Ok("abc".into()) }
//! # async fn run() -> Result<(), Box<dyn std::error::Error>> {
//! let tokens = CacheBuilder::new()
//!   .async_loader(request_token)
//!   .max_age(Duration::from_secs(300))
//!   .build_async()?;
//!
//! let token = tokens.fetch().await?;
//! # Ok(())
//! # }
//! ```

// Public modules that form the API
pub mod builder;
pub mod config;
pub mod error;
pub mod expiry;
pub mod handles;
pub mod loader;
pub mod metrics;
pub mod runtime;

// Internal, crate-only modules
mod entry;
mod gate;
mod shared;
mod time;

// Re-export the primary user-facing types for convenience
pub use builder::CacheBuilder;
pub use config::CacheConfig;
pub use error::{BuildError, FetchError};
pub use expiry::MaxAge;
pub use handles::{AsyncCache, Cache};
pub use loader::Loader;
pub use metrics::MetricsSnapshot;
pub use runtime::TaskSpawner;
#[cfg(feature = "tokio")]
pub use runtime::TokioSpawner;
