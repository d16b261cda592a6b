//! Unrecoverable failures.
//!
//! A cord operation has no way to hand back a half-built value, so broken
//! preconditions (an index with no byte behind it, a handle that cannot seek)
//! and allocation failure end in a panic. Before panicking on allocation
//! failure the hook installed with [`set_oom_fn`] runs, which gives
//! applications a chance to log or release memory first.

use std::fmt::Display;

use parking_lot::RwLock;

/// Hook invoked right before the crate gives up on an allocation.
pub type OomFn = fn();

static OOM_FN: RwLock<Option<OomFn>> = RwLock::new(None);

/// Install (or clear) the out-of-memory hook, returning the previous one.
pub fn set_oom_fn(hook: Option<OomFn>) -> Option<OomFn> {
  std::mem::replace(&mut *OOM_FN.write(), hook)
}

/// Currently installed out-of-memory hook.
pub fn oom_fn() -> Option<OomFn> {
  *OOM_FN.read()
}

#[cold]
#[track_caller]
pub(crate) fn out_of_memory() -> ! {
  if let Some(hook) = oom_fn() {
    hook();
  }
  tracing::error!("out of memory");
  panic!("out of memory");
}

#[cold]
#[track_caller]
pub(crate) fn fatal(message: impl Display) -> ! {
  tracing::error!(%message, "fatal cord error");
  panic!("{message}");
}

/// Allocate an empty buffer able to hold exactly `capacity` bytes.
pub(crate) fn alloc_bytes(capacity: usize) -> Vec<u8> {
  let mut buf = Vec::new();
  if buf.try_reserve_exact(capacity).is_err() {
    out_of_memory();
  }
  buf
}

#[cfg(test)]
mod tests {
  use std::sync::atomic::{
    AtomicUsize,
    Ordering,
  };

  use super::*;

  static HOOK_CALLS: AtomicUsize = AtomicUsize::new(0);

  fn counting_hook() {
    HOOK_CALLS.fetch_add(1, Ordering::SeqCst);
  }

  #[test]
  fn oom_hook_runs_before_panic() {
    let previous = set_oom_fn(Some(counting_hook));
    let result = std::panic::catch_unwind(|| {
      out_of_memory();
    });
    set_oom_fn(previous);

    assert!(result.is_err());
    assert_eq!(HOOK_CALLS.load(Ordering::SeqCst), 1);
  }

  #[test]
  #[should_panic(expected = "bad index")]
  fn fatal_panics_with_message() {
    fatal("bad index 12");
  }

  #[test]
  fn alloc_bytes_reserves_exactly() {
    let buf = alloc_bytes(37);
    assert!(buf.is_empty());
    assert!(buf.capacity() >= 37);
  }
}
