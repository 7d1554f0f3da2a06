use fibre_flight::CacheBuilder;
use std::sync::{
  atomic::{AtomicUsize, Ordering},
  Arc,
};
use tokio::time::{sleep, Duration};

#[derive(Debug)]
struct AccessToken {
  value: String,
  expires_in_ms: u64,
}

// A simulated identity provider.
async fn request_token(calls: Arc<AtomicUsize>) -> Result<AccessToken, std::io::Error> {
  let n = calls.fetch_add(1, Ordering::SeqCst) + 1;
  println!("--- IdP: issuing token #{} (slow round trip)...", n);
  sleep(Duration::from_millis(300)).await;
  Ok(AccessToken {
    value: format!("token-{}", n),
    expires_in_ms: 1_000,
  })
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
  let calls = Arc::new(AtomicUsize::new(0));

  let tokens = CacheBuilder::new()
    .async_loader({
      let calls = calls.clone();
      move || request_token(calls.clone())
    })
    .max_age_with(|token: &AccessToken| Duration::from_millis(token.expires_in_ms))
    .build_async()?;

  println!("--- Single-flight Demonstration ---");
  println!("Spawning 10 tasks that all need a token at once.\n");

  let mut tasks = Vec::new();
  for i in 0..10 {
    let tokens = tokens.clone();
    tasks.push(tokio::spawn(async move {
      let token = tokens.fetch().await?;
      println!("[Task {}] got {}", i, token.value);
      Ok::<_, fibre_flight::FetchError<std::io::Error>>(())
    }));
  }
  for task in tasks {
    task.await??;
  }

  println!("\nWaiting for the token to expire...");
  sleep(Duration::from_millis(1_100)).await;
  let token = tokens.fetch().await?;
  println!("After expiry: {}", token.value);

  println!("\n--- Verification ---");
  println!("IdP calls: {} (expected 2)", calls.load(Ordering::SeqCst));
  println!("{:?}", tokens.metrics());
  Ok(())
}
