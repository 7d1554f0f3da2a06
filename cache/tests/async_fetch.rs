mod common;

use common::{sequence_cache, LoadCounter, TestError};
use fibre_flight::CacheBuilder;
use tokio::time::{sleep, Duration};

const MAX_AGE: Duration = Duration::from_millis(100);

#[tokio::test]
async fn test_fetch_serves_value_until_max_age() {
  let (cache, loads) = sequence_cache(&["value1", "value2"], Duration::ZERO, Some(MAX_AGE));

  // t=0
  assert_eq!(*cache.fetch().await.unwrap(), "value1");

  // t=50: still fresh.
  sleep(Duration::from_millis(50)).await;
  assert_eq!(*cache.fetch().await.unwrap(), "value1");
  assert_eq!(loads.get(), 1, "Loader should not be called again");

  // t=150: stale, so a new value is loaded.
  sleep(Duration::from_millis(100)).await;
  assert_eq!(*cache.fetch().await.unwrap(), "value2");
  assert_eq!(loads.get(), 2);

  let metrics = cache.metrics();
  assert_eq!(metrics.hits, 1);
  assert_eq!(metrics.misses, 2);
  assert_eq!(metrics.loads_succeeded, 2);
}

#[derive(Debug)]
struct Token {
  access_token: &'static str,
  expires_in: u64,
}

#[tokio::test]
async fn test_fetch_derives_max_age_from_value() {
  let loads = LoadCounter::default();
  let cache = CacheBuilder::new()
    .async_loader({
      let loads = loads.clone();
      move || {
        let call = loads.bump();
        async move {
          Ok::<_, TestError>(match call {
            0 => Token {
              access_token: "token1",
              expires_in: 200,
            },
            _ => Token {
              access_token: "token2",
              expires_in: 5_000,
            },
          })
        }
      }
    })
    .max_age_with(|token: &Token| Duration::from_millis(token.expires_in))
    .build_async()
    .unwrap();

  assert_eq!(cache.fetch().await.unwrap().access_token, "token1");

  sleep(Duration::from_millis(100)).await;
  assert_eq!(cache.fetch().await.unwrap().access_token, "token1");

  sleep(Duration::from_millis(200)).await;
  assert_eq!(cache.fetch().await.unwrap().access_token, "token2");

  // token2 carries a much longer expiry than token1 did.
  sleep(Duration::from_millis(300)).await;
  assert_eq!(cache.fetch().await.unwrap().access_token, "token2");
  assert_eq!(loads.get(), 2);
}

#[tokio::test]
async fn test_derived_max_age_runs_once_per_load() {
  let loads = LoadCounter::default();
  let evaluations = LoadCounter::default();
  let cache = CacheBuilder::new()
    .async_loader({
      let loads = loads.clone();
      move || {
        let call = loads.bump();
        async move { Ok::<_, TestError>(call) }
      }
    })
    .max_age_with({
      let evaluations = evaluations.clone();
      move |_: &usize| {
        evaluations.bump();
        Duration::from_millis(100)
      }
    })
    .build_async()
    .unwrap();

  for _ in 0..10 {
    assert_eq!(*cache.fetch().await.unwrap(), 0);
  }
  assert_eq!(evaluations.get(), 1, "Cached reads must not re-derive the max age");

  sleep(Duration::from_millis(150)).await;
  assert_eq!(*cache.fetch().await.unwrap(), 1);
  assert_eq!(*cache.fetch().await.unwrap(), 1);

  assert_eq!(loads.get(), 2);
  assert_eq!(evaluations.get(), loads.get());
}

#[tokio::test]
async fn test_reset_forces_a_new_load() {
  let (cache, loads) = sequence_cache(
    &["value1", "value2"],
    Duration::ZERO,
    Some(Duration::from_secs(60)),
  );

  assert_eq!(*cache.fetch().await.unwrap(), "value1");
  assert!(cache.get().is_some());

  cache.reset();
  assert!(cache.get().is_none(), "reset must drop the value immediately");
  assert!(cache.time_to_live().is_none());

  assert_eq!(*cache.fetch().await.unwrap(), "value2");
  assert_eq!(loads.get(), 2);
  assert_eq!(cache.metrics().resets, 1);
}

#[tokio::test]
async fn test_reset_on_empty_cache_is_harmless() {
  let (cache, loads) = sequence_cache(&["value1"], Duration::ZERO, Some(MAX_AGE));
  cache.reset();
  cache.reset();
  assert_eq!(*cache.fetch().await.unwrap(), "value1");
  assert_eq!(loads.get(), 1);
}

#[tokio::test]
async fn test_without_max_age_sequential_calls_always_load() {
  let (cache, loads) = sequence_cache(&["a", "b", "c"], Duration::ZERO, None);

  assert_eq!(*cache.fetch().await.unwrap(), "a");
  assert_eq!(*cache.fetch().await.unwrap(), "b");
  assert_eq!(*cache.fetch().await.unwrap(), "c");
  assert_eq!(loads.get(), 3);
  assert!(cache.get().is_none());
}

#[tokio::test]
async fn test_zero_max_age_behaves_like_none() {
  let (cache, loads) = sequence_cache(&["a", "b"], Duration::ZERO, Some(Duration::ZERO));

  assert_eq!(*cache.fetch().await.unwrap(), "a");
  assert_eq!(*cache.fetch().await.unwrap(), "b");
  assert_eq!(loads.get(), 2);
}

#[tokio::test]
async fn test_get_never_loads() {
  let (cache, loads) = sequence_cache(&["value1"], Duration::ZERO, Some(MAX_AGE));

  assert!(cache.get().is_none());
  assert_eq!(loads.get(), 0);

  cache.fetch().await.unwrap();
  assert_eq!(cache.get().as_deref(), Some(&"value1"));

  let ttl = cache.time_to_live().unwrap();
  assert!(ttl <= MAX_AGE);

  sleep(MAX_AGE + Duration::from_millis(20)).await;
  assert!(cache.get().is_none());
  assert_eq!(loads.get(), 1);
}

#[tokio::test]
async fn test_caches_are_independent() {
  let (first, first_loads) = sequence_cache(&["first"], Duration::ZERO, Some(MAX_AGE));
  let (second, second_loads) = sequence_cache(&["second"], Duration::ZERO, Some(MAX_AGE));

  assert_eq!(*first.fetch().await.unwrap(), "first");
  assert_eq!(*second.fetch().await.unwrap(), "second");

  first.reset();
  assert!(first.get().is_none());
  assert_eq!(second.get().as_deref(), Some(&"second"));
  assert_eq!(first_loads.get(), 1);
  assert_eq!(second_loads.get(), 1);
}

#[tokio::test]
async fn test_clones_share_one_entry() {
  let (cache, loads) = sequence_cache(&["shared"], Duration::ZERO, Some(MAX_AGE));
  let clone = cache.clone();

  assert_eq!(*cache.fetch().await.unwrap(), "shared");
  assert_eq!(*clone.fetch().await.unwrap(), "shared");
  assert_eq!(loads.get(), 1);

  clone.reset();
  assert!(cache.get().is_none());
}
