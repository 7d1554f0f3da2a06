use std::{future::Future, pin::Pin};

/// A trait for spawning a future onto an asynchronous runtime.
///
/// Each async load runs as its own task, detached from the caller that
/// started it.
pub trait TaskSpawner: Send + Sync + 'static {
  /// Spawns a type-erased future.
  fn spawn(&self, future: Pin<Box<dyn Future<Output = ()> + Send>>);
}

/// Spawns loads onto a Tokio runtime.
///
/// A spawner bound to a handle always uses that runtime. One created with
/// `follow_current` spawns onto whichever runtime is current at spawn time
/// and only falls back to the captured handle on threads outside any
/// runtime, so a cache outlives the runtime it was built on.
#[cfg(feature = "tokio")]
#[derive(Debug, Clone)]
pub struct TokioSpawner {
  handle: tokio::runtime::Handle,
  follow_current: bool,
}

#[cfg(feature = "tokio")]
impl TokioSpawner {
  /// Creates a spawner that uses the current Tokio runtime context.
  /// Panics if called outside of a Tokio runtime.
  pub fn new() -> Self {
    Self::with_handle(tokio::runtime::Handle::current())
  }

  /// Like `new`, but returns `None` outside of a Tokio runtime.
  pub fn try_current() -> Option<Self> {
    tokio::runtime::Handle::try_current().ok().map(Self::with_handle)
  }

  /// Creates a spawner bound to a specific runtime.
  pub fn with_handle(handle: tokio::runtime::Handle) -> Self {
    Self {
      handle,
      follow_current: false,
    }
  }

  /// Creates a spawner that prefers the runtime current at spawn time.
  /// Returns `None` outside of a Tokio runtime.
  ///
  /// This is the spawner a cache uses when none is configured.
  pub fn follow_current() -> Option<Self> {
    tokio::runtime::Handle::try_current().ok().map(|handle| Self {
      handle,
      follow_current: true,
    })
  }
}

#[cfg(feature = "tokio")]
impl TaskSpawner for TokioSpawner {
  fn spawn(&self, future: Pin<Box<dyn Future<Output = ()> + Send>>) {
    if self.follow_current {
      if let Ok(current) = tokio::runtime::Handle::try_current() {
        current.spawn(future);
        return;
      }
    }
    self.handle.spawn(future);
  }
}
