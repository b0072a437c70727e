use crate::bytes::{ByteChannel, HEADER_SIZE};
use crate::error::BuildError;

use std::fmt;

/// Arena size used when the builder is not given one.
pub const DEFAULT_CAPACITY: usize = 64 * 1024;

/// A builder for configuring a [`ByteChannel`].
///
/// ```
/// use monochan::ByteChannelBuilder;
///
/// let channel = ByteChannelBuilder::new()
///   .capacity(4096)
///   .label("frames")
///   .build()
///   .unwrap();
/// assert_eq!(channel.capacity(), 4096);
/// assert_eq!(channel.label(), Some("frames"));
/// ```
#[derive(Clone)]
pub struct ByteChannelBuilder {
  capacity: usize,
  label: Option<String>,
}

impl fmt::Debug for ByteChannelBuilder {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.debug_struct("ByteChannelBuilder")
      .field("capacity", &self.capacity)
      .field("label", &self.label)
      .finish()
  }
}

impl Default for ByteChannelBuilder {
  fn default() -> Self {
    Self::new()
  }
}

impl ByteChannelBuilder {
  /// Creates a new builder with default settings.
  pub fn new() -> Self {
    Self {
      capacity: DEFAULT_CAPACITY,
      label: None,
    }
  }

  /// Sets the arena size in bytes. Every record costs its payload length
  /// plus [`HEADER_SIZE`].
  pub fn capacity(mut self, capacity: usize) -> Self {
    self.capacity = capacity;
    self
  }

  /// Sets a name that is attached to the channel's log events.
  pub fn label(mut self, label: impl Into<String>) -> Self {
    self.label = Some(label.into());
    self
  }

  /// Builds the channel, allocating its arena.
  pub fn build(self) -> Result<ByteChannel, BuildError> {
    self.validate()?;
    Ok(ByteChannel::from_parts(self.capacity, self.label))
  }

  /// Validates the builder configuration.
  pub(crate) fn validate(&self) -> Result<(), BuildError> {
    if self.capacity == 0 {
      return Err(BuildError::ZeroCapacity);
    }
    if self.capacity < HEADER_SIZE {
      return Err(BuildError::CapacityBelowHeader {
        capacity: self.capacity,
      });
    }
    Ok(())
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn defaults() {
    let channel = ByteChannelBuilder::new().build().unwrap();
    assert_eq!(channel.capacity(), DEFAULT_CAPACITY);
    assert_eq!(channel.label(), None);
  }

  #[test]
  fn zero_capacity_is_rejected() {
    let err = ByteChannelBuilder::new().capacity(0).build().unwrap_err();
    assert_eq!(err, BuildError::ZeroCapacity);
  }

  #[test]
  fn capacity_below_header_is_rejected() {
    let err = ByteChannelBuilder::new()
      .capacity(HEADER_SIZE - 1)
      .build()
      .unwrap_err();
    assert_eq!(
      err,
      BuildError::CapacityBelowHeader {
        capacity: HEADER_SIZE - 1
      }
    );
  }

  #[test]
  fn header_sized_capacity_is_allowed() {
    let channel = ByteChannelBuilder::new()
      .capacity(HEADER_SIZE)
      .build()
      .unwrap();
    assert_eq!(channel.max_payload(), 0);
    assert!(channel.send(b""));
    assert!(!channel.send(b""));
  }
}
