use crate::loader::LoadFuture;

use parking_lot::{Mutex, MutexGuard};
use std::sync::Arc;

/// The mutual-exclusion point between a stale entry and a fresh one.
///
/// Each cache owns exactly one gate. The gate's slot holds the load that is
/// currently in flight, if any. The lock is only ever held for the
/// check-and-install step before a load and the store-and-clear step after
/// it, never while the producer runs.
pub(crate) struct RefreshGate<V, E> {
  in_flight: Mutex<Option<Arc<LoadFuture<V, E>>>>,
}

impl<V, E> RefreshGate<V, E> {
  pub(crate) fn new() -> Self {
    Self {
      in_flight: Mutex::new(None),
    }
  }

  #[inline]
  pub(crate) fn enter(&self) -> MutexGuard<'_, Option<Arc<LoadFuture<V, E>>>> {
    self.in_flight.lock()
  }

  /// Clears the slot, but only if it still holds `future`.
  pub(crate) fn release(slot: &mut Option<Arc<LoadFuture<V, E>>>, future: &Arc<LoadFuture<V, E>>) {
    if slot.as_ref().is_some_and(|current| Arc::ptr_eq(current, future)) {
      *slot = None;
    }
  }

  pub(crate) fn is_loading(&self) -> bool {
    self.in_flight.lock().is_some()
  }
}
