#![allow(dead_code)]

use std::fmt;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use fibre_flight::{AsyncCache, CacheBuilder};
use tokio::time::{sleep, Duration};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TestError(pub String);

impl fmt::Display for TestError {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(&self.0)
  }
}

impl std::error::Error for TestError {}

/// Counts producer invocations.
#[derive(Clone, Default)]
pub struct LoadCounter(Arc<AtomicUsize>);

impl LoadCounter {
  pub fn bump(&self) -> usize {
    self.0.fetch_add(1, Ordering::SeqCst)
  }

  pub fn get(&self) -> usize {
    self.0.load(Ordering::SeqCst)
  }
}

/// Builds a cache whose producer returns `values` in order, one per load,
/// after an optional delay. Loads past the end of `values` fail.
pub fn sequence_cache(
  values: &[&'static str],
  delay: Duration,
  max_age: Option<Duration>,
) -> (AsyncCache<&'static str, TestError>, LoadCounter) {
  let counter = LoadCounter::default();
  let values: Arc<Vec<&'static str>> = Arc::new(values.to_vec());

  let builder = CacheBuilder::new().async_loader({
    let counter = counter.clone();
    move || {
      let counter = counter.clone();
      let values = values.clone();
      async move {
        let call = counter.bump();
        if !delay.is_zero() {
          sleep(delay).await;
        }
        values
          .get(call)
          .copied()
          .ok_or_else(|| TestError(format!("no value for load #{}", call + 1)))
      }
    }
  });

  let builder = match max_age {
    Some(max_age) => builder.max_age(max_age),
    None => builder,
  };

  (builder.build_async().unwrap(), counter)
}
