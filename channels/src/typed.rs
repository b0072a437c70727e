//! An unbounded, blocking, multi-producer FIFO queue of typed values.
//!
//! Producers never block: [`Channel::send`] and [`Channel::send_all`] append
//! and wake one waiting consumer. Consumers take everything that is buffered
//! in one go with [`Channel::drain`], blocking while the channel is empty.
//! [`Channel::close`] wakes every blocked consumer so none is left parked
//! after shutdown.
//!
//! The channel is a single shared object; share it between threads with an
//! `Arc`.

use crate::error::{CloseError, RecvErrorTimeout};
use crate::monitor::{Monitor, MonitorGuard};

use std::fmt;
use std::time::{Duration, Instant};

struct ChannelState<T> {
  buffer: Vec<T>,
  waiting: usize,
  closing: bool,
}

/// A thread-safe, unbounded FIFO queue with a blocking bulk consumer.
pub struct Channel<T> {
  monitor: Monitor<ChannelState<T>>,
}

impl<T> fmt::Debug for Channel<T> {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    let state = self.monitor.lock();
    f.debug_struct("Channel")
      .field("len", &state.buffer.len())
      .field("waiting", &state.waiting)
      .field("closing", &state.closing)
      .finish()
  }
}

impl<T> Default for Channel<T> {
  fn default() -> Self {
    Self::new()
  }
}

impl<T> Channel<T> {
  /// Creates a new, empty channel.
  pub fn new() -> Self {
    Self {
      monitor: Monitor::new(ChannelState {
        buffer: Vec::new(),
        waiting: 0,
        closing: false,
      }),
    }
  }

  /// Appends a value and wakes one waiting consumer. Never blocks.
  pub fn send(&self, value: T) {
    let mut state = self.monitor.lock();
    state.buffer.push(value);
    self.monitor.signal();
  }

  /// Appends every value from `values` under a single lock acquisition and
  /// wakes one waiting consumer once, if anything was appended.
  pub fn send_all<I>(&self, values: I)
  where
    I: IntoIterator<Item = T>,
  {
    let mut state = self.monitor.lock();
    let before = state.buffer.len();
    state.buffer.extend(values);
    if state.buffer.len() > before {
      self.monitor.signal();
    }
  }

  /// Moves every buffered value into `out`, blocking while the channel is
  /// empty.
  ///
  /// Returns `false` only if the channel is closing and there was nothing
  /// left to move. Values still buffered at close time are delivered (and
  /// `true` returned) before that.
  pub fn drain<E>(&self, out: &mut E) -> bool
  where
    E: Extend<T>,
  {
    let mut state = self.monitor.lock();
    while state.buffer.is_empty() {
      if state.closing {
        return false;
      }
      state.waiting += 1;
      self.monitor.wait(&mut state);
      state.waiting -= 1;
    }
    Self::move_all(&mut state, out);
    true
  }

  /// Moves every buffered value into `out` without blocking. Returns the
  /// number of values moved.
  pub fn try_drain<E>(&self, out: &mut E) -> usize
  where
    E: Extend<T>,
  {
    let mut state = self.monitor.lock();
    Self::move_all(&mut state, out)
  }

  /// Like [`drain`](Self::drain), but waits at most `timeout` for a value.
  ///
  /// # Errors
  ///
  /// - `Err(RecvErrorTimeout::Closed)` if the channel is closing and empty.
  /// - `Err(RecvErrorTimeout::Timeout)` if nothing arrived in time.
  pub fn drain_timeout<E>(&self, out: &mut E, timeout: Duration) -> Result<usize, RecvErrorTimeout>
  where
    E: Extend<T>,
  {
    // Too far out to represent: wait without a limit.
    let deadline = Instant::now().checked_add(timeout);
    let mut state = self.monitor.lock();
    while state.buffer.is_empty() {
      if state.closing {
        return Err(RecvErrorTimeout::Closed);
      }
      state.waiting += 1;
      let timed_out = self.monitor.wait_deadline(&mut state, deadline);
      state.waiting -= 1;
      if timed_out && state.buffer.is_empty() {
        return Err(RecvErrorTimeout::Timeout);
      }
    }
    Ok(Self::move_all(&mut state, out))
  }

  /// Marks the channel as closing and wakes every blocked consumer.
  ///
  /// Values sent before or after the close are still delivered by `drain`.
  ///
  /// # Errors
  ///
  /// Returns `Err(CloseError)` if the channel was already closed.
  pub fn close(&self) -> Result<(), CloseError> {
    let mut state = self.monitor.lock();
    if state.closing {
      return Err(CloseError);
    }
    state.closing = true;
    tracing::debug!(
      waiting = state.waiting,
      buffered = state.buffer.len(),
      "closing typed channel"
    );
    self.monitor.broadcast();
    Ok(())
  }

  /// Returns `true` once [`close`](Self::close) has been called.
  pub fn is_closing(&self) -> bool {
    self.monitor.lock().closing
  }

  /// Returns the number of buffered values.
  pub fn len(&self) -> usize {
    self.monitor.lock().buffer.len()
  }

  /// Returns `true` if nothing is buffered.
  pub fn is_empty(&self) -> bool {
    self.len() == 0
  }

  /// Returns the number of consumers currently blocked in a drain.
  pub fn waiting(&self) -> usize {
    self.monitor.lock().waiting
  }

  fn move_all<E>(state: &mut MonitorGuard<'_, ChannelState<T>>, out: &mut E) -> usize
  where
    E: Extend<T>,
  {
    let moved = state.buffer.len();
    out.extend(state.buffer.drain(..));
    moved
  }
}
