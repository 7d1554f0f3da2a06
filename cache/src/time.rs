use once_cell::sync::Lazy;
use std::time::{Duration, Instant};

// The single, static reference point for every expiry in the process.
// It is initialized lazily on its first use.
static FLIGHT_EPOCH: Lazy<Instant> = Lazy::new(Instant::now);

/// The current time as a `Duration` since the epoch.
#[inline]
pub(crate) fn now_duration() -> Duration {
  Instant::now().saturating_duration_since(*FLIGHT_EPOCH)
}

/// The timestamp `max_age` from now. Saturates rather than overflowing, so a
/// huge max age simply never expires.
#[inline]
pub(crate) fn deadline_after(max_age: Duration) -> Duration {
  now_duration().saturating_add(max_age)
}
