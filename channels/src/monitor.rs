//! A monitor: one mutex-protected state paired with one condition variable.
//!
//! Both channel types in this crate are built on [`Monitor`]. It is a thin
//! layer over `parking_lot::Mutex` and `parking_lot::Condvar` that names the
//! classic operations (`wait`, `signal`, `broadcast`) and keeps the two
//! primitives together so a condition is never waited on with the wrong lock.
//!
//! A waiter must always re-test its predicate after [`Monitor::wait`] returns;
//! wakeups may be spurious, and another thread may have consumed the state
//! change that caused the wakeup.

use std::fmt;
use std::time::Instant;

use parking_lot::{Condvar, Mutex, MutexGuard};

/// Guard for the state held by a [`Monitor`]. Dropping it unlocks.
pub type MonitorGuard<'a, S> = MutexGuard<'a, S>;

/// Mutual exclusion over a state `S` plus a condition variable for waiting
/// on changes to that state.
pub struct Monitor<S> {
  state: Mutex<S>,
  condition: Condvar,
}

impl<S> Monitor<S> {
  /// Creates a new monitor guarding `state`.
  pub fn new(state: S) -> Self {
    Self {
      state: Mutex::new(state),
      condition: Condvar::new(),
    }
  }

  /// Locks the monitor, blocking the current thread until it is available.
  #[inline]
  pub fn lock(&self) -> MonitorGuard<'_, S> {
    self.state.lock()
  }

  /// Attempts to lock the monitor without blocking.
  #[inline]
  pub fn try_lock(&self) -> Option<MonitorGuard<'_, S>> {
    self.state.try_lock()
  }

  /// Releases the lock held by `guard`, parks until signalled, and
  /// re-acquires the lock before returning.
  #[inline]
  pub fn wait(&self, guard: &mut MonitorGuard<'_, S>) {
    self.condition.wait(guard);
  }

  /// Like [`wait`](Self::wait), but gives up at `deadline`.
  ///
  /// Returns `true` if the deadline passed without a signal.
  #[inline]
  pub fn wait_until(&self, guard: &mut MonitorGuard<'_, S>, deadline: Instant) -> bool {
    self.condition.wait_until(guard, deadline).timed_out()
  }

  /// Waits until `deadline`, or without a time limit when it is `None`.
  ///
  /// Returns `true` if the deadline passed without a signal.
  #[inline]
  pub fn wait_deadline(&self, guard: &mut MonitorGuard<'_, S>, deadline: Option<Instant>) -> bool {
    match deadline {
      Some(deadline) => self.wait_until(guard, deadline),
      None => {
        self.wait(guard);
        false
      }
    }
  }

  /// Wakes one waiting thread. Returns whether a thread was woken.
  #[inline]
  pub fn signal(&self) -> bool {
    self.condition.notify_one()
  }

  /// Wakes every waiting thread. Returns the number of threads woken.
  #[inline]
  pub fn broadcast(&self) -> usize {
    self.condition.notify_all()
  }

  /// Consumes the monitor, returning the guarded state.
  pub fn into_inner(self) -> S {
    self.state.into_inner()
  }
}

impl<S: Default> Default for Monitor<S> {
  fn default() -> Self {
    Self::new(S::default())
  }
}

impl<S: fmt::Debug> fmt::Debug for Monitor<S> {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self.try_lock() {
      Some(state) => f.debug_struct("Monitor").field("state", &*state).finish(),
      None => f
        .debug_struct("Monitor")
        .field("state", &format_args!("<locked>"))
        .finish(),
    }
  }
}
