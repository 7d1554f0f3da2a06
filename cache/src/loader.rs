use crate::error::FetchError;

use futures_util::future::BoxFuture;
use parking_lot::Mutex;
use std::collections::VecDeque;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll, Waker};
use std::thread::{self, Thread};

/// A synchronous producer.
pub type SyncLoaderFn<V, E> = Arc<dyn Fn() -> Result<V, E> + Send + Sync>;

/// An asynchronous producer. The closure must return a boxed future.
pub type AsyncLoaderFn<V, E> = Arc<dyn Fn() -> BoxFuture<'static, Result<V, E>> + Send + Sync>;

/// The function that produces the cached value, either synchronously or
/// asynchronously.
///
/// This is stored in the `CacheBuilder` and `CacheShared`, and is also the
/// building block `fibre_token` uses for its token sources.
pub enum Loader<V, E> {
  Sync(SyncLoaderFn<V, E>),
  Async(AsyncLoaderFn<V, E>),
}

impl<V, E> Loader<V, E> {
  pub fn from_fn<F>(f: F) -> Self
  where
    F: Fn() -> Result<V, E> + Send + Sync + 'static,
  {
    Loader::Sync(Arc::new(f))
  }

  pub fn from_async_fn<F, Fut>(f: F) -> Self
  where
    F: Fn() -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<V, E>> + Send + 'static,
  {
    let loader_fn = move || Box::pin(f()) as BoxFuture<'static, Result<V, E>>;
    Loader::Async(Arc::new(loader_fn))
  }

  /// Runs the producer once on the current task, whatever its flavor.
  ///
  /// The cache never calls this for synchronous loaders on an async task;
  /// it moves them to their own thread instead.
  pub async fn load(&self) -> Result<V, E> {
    match self {
      Loader::Sync(f) => f(),
      Loader::Async(f) => f().await,
    }
  }
}

impl<V, E> Clone for Loader<V, E> {
  fn clone(&self) -> Self {
    match self {
      Loader::Sync(f) => Loader::Sync(f.clone()),
      Loader::Async(f) => Loader::Async(f.clone()),
    }
  }
}

/// Represents a waiter in the queue for a `LoadFuture`.
pub(crate) enum Waiter {
  Sync(Thread),
  Async(Waker),
}

impl Waiter {
  fn wake(self) {
    match self {
      Waiter::Sync(thread) => thread.unpark(),
      Waiter::Async(waker) => waker.wake(),
    }
  }
}

pub(crate) type LoadOutcome<V, E> = Result<Arc<V>, FetchError<E>>;

/// The internal state of a load.
pub(crate) enum State<V, E> {
  Loading,
  Complete(LoadOutcome<V, E>),
}

pub(crate) struct Inner<V, E> {
  state: State<V, E>,
  waiters: VecDeque<Waiter>,
}

/// The outcome of one in-flight load, shared by every caller that arrived
/// while it was running.
///
/// It can be awaited by async tasks and blocked on by sync threads
/// simultaneously. Completing it hands the same outcome, success or failure,
/// to all of them.
pub(crate) struct LoadFuture<V, E> {
  inner: Mutex<Inner<V, E>>,
}

impl<V, E> LoadFuture<V, E> {
  /// Creates a new `LoadFuture` in the `Loading` state.
  pub fn new() -> Self {
    Self {
      inner: Mutex::new(Inner {
        state: State::Loading,
        waiters: VecDeque::new(),
      }),
    }
  }

  /// Completes the load, waking all waiters. Only the first completion wins.
  pub fn complete(&self, outcome: LoadOutcome<V, E>) {
    let waiters = {
      let mut inner = self.inner.lock();
      if let State::Complete(_) = inner.state {
        return;
      }
      inner.state = State::Complete(outcome);
      std::mem::take(&mut inner.waiters)
    };
    for waiter in waiters {
      waiter.wake();
    }
  }

  /// Blocks the current thread until the load completes.
  pub fn wait(&self) -> LoadOutcome<V, E> {
    let mut inner = self.inner.lock();
    loop {
      match &inner.state {
        State::Complete(outcome) => return outcome.clone(),
        State::Loading => {
          inner.waiters.push_back(Waiter::Sync(thread::current()));
          drop(inner); // Unlock before parking.
          thread::park();
          inner = self.inner.lock();
        }
      }
    }
  }
}

impl<V, E> Future for &LoadFuture<V, E> {
  type Output = LoadOutcome<V, E>;

  fn poll(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
    let mut inner = self.inner.lock();
    match &inner.state {
      State::Complete(outcome) => Poll::Ready(outcome.clone()),
      State::Loading => {
        let already_queued = inner.waiters.iter().any(|w| match w {
          Waiter::Async(waker) => waker.will_wake(cx.waker()),
          Waiter::Sync(_) => false,
        });
        if !already_queued {
          inner.waiters.push_back(Waiter::Async(cx.waker().clone()));
        }
        Poll::Pending
      }
    }
  }
}
