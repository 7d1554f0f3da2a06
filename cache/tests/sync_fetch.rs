mod common;

use common::{LoadCounter, TestError};
use fibre_flight::{Cache, CacheBuilder};
use std::sync::{Arc, Barrier};
use std::thread;
use std::time::Duration;

fn slow_sync_cache(max_age: Duration) -> (Cache<u64, TestError>, LoadCounter) {
  let loads = LoadCounter::default();
  let cache = CacheBuilder::new()
    .loader({
      let loads = loads.clone();
      move || {
        let call = loads.bump() as u64;
        thread::sleep(Duration::from_millis(50));
        Ok(call + 1)
      }
    })
    .max_age(max_age)
    .build()
    .unwrap();
  (cache, loads)
}

#[test]
fn test_sync_fetch_and_expiry() {
  let (cache, loads) = slow_sync_cache(Duration::from_millis(100));

  assert_eq!(*cache.fetch().unwrap(), 1);
  assert_eq!(*cache.fetch().unwrap(), 1);
  assert_eq!(loads.get(), 1);

  thread::sleep(Duration::from_millis(150));
  assert_eq!(*cache.fetch().unwrap(), 2);
  assert_eq!(loads.get(), 2);
}

#[test]
fn test_sync_thundering_herd_loads_once() {
  let num_threads = 8;
  let (cache, loads) = slow_sync_cache(Duration::from_secs(60));
  let barrier = Arc::new(Barrier::new(num_threads));

  let handles: Vec<_> = (0..num_threads)
    .map(|_| {
      let cache = cache.clone();
      let barrier = barrier.clone();
      thread::spawn(move || {
        barrier.wait();
        *cache.fetch().unwrap()
      })
    })
    .collect();

  for handle in handles {
    assert_eq!(handle.join().unwrap(), 1);
  }
  assert_eq!(loads.get(), 1);
}

#[test]
fn test_sync_failure_is_shared_and_recoverable() {
  let loads = LoadCounter::default();
  let cache = CacheBuilder::new()
    .loader({
      let loads = loads.clone();
      move || match loads.bump() {
        0 => Err(TestError("denied".into())),
        _ => Ok("granted"),
      }
    })
    .max_age(Duration::from_secs(60))
    .build()
    .unwrap();

  let err = cache.fetch().unwrap_err();
  assert_eq!(err.to_string(), "denied");
  assert!(cache.get().is_none());

  assert_eq!(*cache.fetch().unwrap(), "granted");
  assert_eq!(loads.get(), 2);
}

#[test]
fn test_async_fetch_with_sync_loader_needs_no_runtime() {
  let (cache, loads) = slow_sync_cache(Duration::from_secs(60));
  let cache = cache.to_async();

  let (a, b) = futures_executor::block_on(async { futures_util::join!(cache.fetch(), cache.fetch()) });
  assert_eq!(*a.unwrap(), 1);
  assert_eq!(*b.unwrap(), 1);
  assert_eq!(loads.get(), 1);
}

#[test]
fn test_handles_share_state() {
  let (cache, loads) = slow_sync_cache(Duration::from_secs(60));
  let async_cache = cache.to_async();

  assert_eq!(*cache.fetch().unwrap(), 1);
  assert_eq!(async_cache.get().as_deref(), Some(&1));

  async_cache.reset();
  assert!(cache.get().is_none());
  assert_eq!(*cache.to_async().to_sync().fetch().unwrap(), 2);
  assert_eq!(loads.get(), 2);
}
