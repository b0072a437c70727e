// src/error.rs

use core::fmt;

/// Error returned by [`ByteChannel::try_send`](crate::ByteChannel::try_send)
/// when a message could not be stored.
///
/// The payload is borrowed by `try_send`, so nothing has to be handed back:
/// a rejected message leaves the channel exactly as it was.
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum TrySendError {
  /// There is currently no contiguous room for the record. Transient: a
  /// consumer drain may make room.
  Full,
  /// The record (header plus payload) is larger than the whole arena. This
  /// message can never be accepted by this channel.
  Oversized,
}

impl TrySendError {
  /// Returns `true` if the error is transient.
  #[inline]
  pub fn is_full(&self) -> bool {
    matches!(self, TrySendError::Full)
  }

  /// Returns `true` if the message can never fit.
  #[inline]
  pub fn is_oversized(&self) -> bool {
    matches!(self, TrySendError::Oversized)
  }
}

impl std::error::Error for TrySendError {}
impl fmt::Display for TrySendError {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      TrySendError::Full => write!(f, "channel full"),
      TrySendError::Oversized => write!(f, "message larger than channel capacity"),
    }
  }
}

/// Error returned when attempting to close an already closed channel.
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub struct CloseError;
impl std::error::Error for CloseError {}
impl fmt::Display for CloseError {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "channel is already closed")
  }
}

/// Error returned by `drain_timeout` operations.
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum RecvErrorTimeout {
  /// The channel is closing and had nothing left to deliver.
  Closed,
  /// The timeout elapsed before anything could be drained.
  Timeout,
}

impl std::error::Error for RecvErrorTimeout {}
impl fmt::Display for RecvErrorTimeout {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      RecvErrorTimeout::Closed => write!(f, "channel closed"),
      RecvErrorTimeout::Timeout => write!(f, "drain operation timed out"),
    }
  }
}

/// Errors that can occur when building a byte channel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BuildError {
  /// The channel was configured with a capacity of zero.
  ZeroCapacity,
  /// The capacity cannot hold even a single record header.
  CapacityBelowHeader {
    /// The rejected capacity in bytes.
    capacity: usize,
  },
}

impl fmt::Display for BuildError {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      BuildError::ZeroCapacity => write!(f, "byte channel capacity cannot be zero"),
      BuildError::CapacityBelowHeader { capacity } => write!(
        f,
        "byte channel capacity {} is smaller than the {}-byte record header",
        capacity,
        crate::bytes::HEADER_SIZE
      ),
    }
  }
}

impl std::error::Error for BuildError {}
