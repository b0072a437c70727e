// src/bytes/mod.rs

//! A zero-copy channel for variable-length byte messages.
//!
//! A [`ByteChannel`] owns one fixed-size arena, allocated at construction and
//! never resized. Each accepted message is copied into the arena once, as a
//! record made of a native-endian `usize` length followed by the payload.
//! Consumers never receive a copy: [`ByteChannel::drain`] hands a callback a
//! `&[u8]` borrowed straight from the arena, one record at a time, oldest
//! first.
//!
//! ### Backpressure
//!
//! Sending never blocks. If there is no contiguous room for a record the
//! message is rejected outright and the caller decides whether to retry,
//! drop or escalate. A message whose record is larger than the whole arena
//! is rejected on every call ([`TrySendError::Oversized`]); treat that as a
//! configuration error.
//!
//! ### Callback contract
//!
//! The channel's lock is held while the callback runs. The callback must not
//! call `send` or `drain` on the same channel: the lock is not re-entrant and
//! the call deadlocks. Keep callbacks short; producers wait on the lock for
//! as long as a drain runs.

mod arena;
mod builder;

pub use arena::HEADER_SIZE;
pub use builder::{ByteChannelBuilder, DEFAULT_CAPACITY};

use self::arena::{Arena, Placement};
use crate::error::{CloseError, RecvErrorTimeout, TrySendError};
use crate::monitor::Monitor;

use std::fmt;
use std::time::{Duration, Instant};

#[derive(Debug)]
struct ByteState {
  arena: Arena,
  waiting: usize,
  closing: bool,
}

/// A thread-safe ring buffer channel of length-prefixed byte messages.
///
/// Any number of threads may send; drains may come from any thread too.
/// Share it with an `Arc`.
///
/// ```
/// use monochan::ByteChannel;
///
/// let channel = ByteChannel::new(64);
/// assert!(channel.send(b"ab"));
/// assert!(channel.send(b"cdef"));
///
/// let mut seen = Vec::new();
/// let count = channel.drain(|msg| seen.push(msg.to_vec()), false);
/// assert_eq!(count, 2);
/// assert_eq!(seen, vec![b"ab".to_vec(), b"cdef".to_vec()]);
/// ```
pub struct ByteChannel {
  monitor: Monitor<ByteState>,
  capacity: usize,
  label: Option<String>,
}

impl fmt::Debug for ByteChannel {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    let mut s = f.debug_struct("ByteChannel");
    s.field("label", &self.label).field("capacity", &self.capacity);
    // Never block: this may run inside a drain callback.
    match self.monitor.try_lock() {
      Some(state) => s
        .field("arena", &state.arena)
        .field("waiting", &state.waiting)
        .field("closing", &state.closing),
      None => s.field("state", &format_args!("<locked>")),
    };
    s.finish()
  }
}

impl ByteChannel {
  /// Creates a channel with an arena of `capacity` bytes.
  ///
  /// # Panics
  ///
  /// Panics if `capacity` is smaller than [`HEADER_SIZE`]. Use
  /// [`ByteChannelBuilder`] to get an error instead.
  pub fn new(capacity: usize) -> Self {
    assert!(
      capacity >= HEADER_SIZE,
      "ByteChannel capacity must be at least {} bytes",
      HEADER_SIZE
    );
    Self::from_parts(capacity, None)
  }

  /// Returns a builder for configuring a channel.
  pub fn builder() -> ByteChannelBuilder {
    ByteChannelBuilder::new()
  }

  pub(crate) fn from_parts(capacity: usize, label: Option<String>) -> Self {
    Self {
      monitor: Monitor::new(ByteState {
        arena: Arena::new(capacity),
        waiting: 0,
        closing: false,
      }),
      capacity,
      label,
    }
  }

  /// Copies `payload` into the arena as one record. Never blocks.
  ///
  /// Returns `false` if the message was rejected; see
  /// [`try_send`](Self::try_send) for the reason.
  #[inline]
  pub fn send(&self, payload: &[u8]) -> bool {
    self.try_send(payload).is_ok()
  }

  /// Copies `payload` into the arena as one record and wakes one waiting
  /// consumer. Never blocks and never writes a partial record.
  ///
  /// # Errors
  ///
  /// - `Err(TrySendError::Full)` if there is no contiguous room right now.
  /// - `Err(TrySendError::Oversized)` if `HEADER_SIZE + payload.len()`
  ///   exceeds the capacity. This is returned on every call for such a
  ///   message.
  pub fn try_send(&self, payload: &[u8]) -> Result<(), TrySendError> {
    let mut state = self.monitor.lock();
    match state.arena.place(payload) {
      Ok(placement) => {
        if placement == Placement::Wrap {
          tracing::trace!(
            channel = self.label(),
            len = payload.len(),
            "byte channel wrapped to the front of its arena"
          );
        }
        self.monitor.signal();
        Ok(())
      }
      Err(TrySendError::Oversized) => {
        tracing::debug!(
          channel = self.label(),
          len = payload.len(),
          capacity = state.arena.capacity(),
          "rejected message larger than byte channel capacity"
        );
        Err(TrySendError::Oversized)
      }
      Err(err) => {
        tracing::trace!(
          channel = self.label(),
          len = payload.len(),
          used = state.arena.used_bytes(),
          "byte channel full"
        );
        Err(err)
      }
    }
  }

  /// Hands every stored message to `callback`, oldest first, and returns
  /// how many were delivered.
  ///
  /// With `blocking == false` this makes exactly one pass and may return 0.
  /// With `blocking == true` it waits until at least one message has been
  /// delivered, or until the channel is closed, in which case it makes one
  /// final pass and returns its count (possibly 0).
  ///
  /// The slice passed to `callback` is only valid during that call.
  pub fn drain<F>(&self, mut callback: F, blocking: bool) -> usize
  where
    F: FnMut(&[u8]),
  {
    let mut state = self.monitor.lock();
    if !blocking {
      return state.arena.drain_pass(&mut callback);
    }

    loop {
      let count = state.arena.drain_pass(&mut callback);
      if count > 0 || state.closing {
        return count;
      }
      state.waiting += 1;
      self.monitor.wait(&mut state);
      state.waiting -= 1;
    }
  }

  /// Like a blocking [`drain`](Self::drain), but waits at most `timeout`.
  ///
  /// # Errors
  ///
  /// - `Err(RecvErrorTimeout::Closed)` if the channel is closing and its
  ///   final pass delivered nothing.
  /// - `Err(RecvErrorTimeout::Timeout)` if nothing arrived in time.
  pub fn drain_timeout<F>(&self, mut callback: F, timeout: Duration) -> Result<usize, RecvErrorTimeout>
  where
    F: FnMut(&[u8]),
  {
    // Too far out to represent: wait without a limit.
    let deadline = Instant::now().checked_add(timeout);
    let mut state = self.monitor.lock();
    loop {
      let count = state.arena.drain_pass(&mut callback);
      if count > 0 {
        return Ok(count);
      }
      if state.closing {
        return Err(RecvErrorTimeout::Closed);
      }
      state.waiting += 1;
      let timed_out = self.monitor.wait_deadline(&mut state, deadline);
      state.waiting -= 1;
      if timed_out {
        return match state.arena.drain_pass(&mut callback) {
          0 => Err(RecvErrorTimeout::Timeout),
          count => Ok(count),
        };
      }
    }
  }

  /// Marks the channel as closing and wakes every blocked consumer; each
  /// makes one final pass and returns.
  ///
  /// Sends are still accepted afterwards and can be drained.
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
      channel = self.label(),
      waiting = state.waiting,
      pending = state.arena.pending(),
      "closing byte channel"
    );
    self.monitor.broadcast();
    Ok(())
  }

  /// Returns `true` once [`close`](Self::close) has been called.
  pub fn is_closing(&self) -> bool {
    self.monitor.lock().closing
  }

  /// Returns the arena size in bytes.
  pub fn capacity(&self) -> usize {
    self.capacity
  }

  /// Returns the largest payload this channel can ever accept.
  pub fn max_payload(&self) -> usize {
    self.capacity() - HEADER_SIZE
  }

  /// Returns the number of messages waiting to be drained.
  pub fn len(&self) -> usize {
    self.monitor.lock().arena.pending()
  }

  /// Returns `true` if no messages are waiting.
  pub fn is_empty(&self) -> bool {
    self.len() == 0
  }

  /// Returns the number of arena bytes occupied by stored records, headers
  /// included.
  pub fn used_bytes(&self) -> usize {
    self.monitor.lock().arena.used_bytes()
  }

  /// Returns the number of consumers currently blocked in a drain.
  pub fn waiting(&self) -> usize {
    self.monitor.lock().waiting
  }

  /// Returns the label set through the builder, if any.
  pub fn label(&self) -> Option<&str> {
    self.label.as_deref()
  }
}
