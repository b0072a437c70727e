//! The record store behind [`ByteChannel`](super::ByteChannel).
//!
//! An `Arena` is a fixed block of bytes holding length-prefixed records in up
//! to two regions:
//!
//! ```text
//!  0            secondary_high     low                 high        capacity
//!  |--wrapped---|.......free.......|------primary------|....free....|
//! ```
//!
//! New records go to the end of the primary region until the tail runs out
//! of room. After that, if the consumer has already freed enough space at the
//! front, writing continues in a wrapped region starting at offset 0. The
//! wrapped region is always newer than the primary one, so draining the
//! primary region first and then rotating (the wrapped region becomes the
//! primary one) preserves accept order.
//!
//! The arena does no locking of its own; the owning channel serializes every
//! call.

use std::fmt;
use std::mem;

use crate::error::TrySendError;

/// Width of the length prefix stored before every payload.
pub const HEADER_SIZE: usize = mem::size_of::<usize>();

/// Where a record ended up.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Placement {
  /// Appended to the primary region.
  Primary,
  /// Appended to an existing wrapped region.
  Wrapped,
  /// Started a new wrapped region at offset 0.
  Wrap,
  /// The arena was empty and has been rewound to offset 0.
  Rewind,
}

pub(crate) struct Arena {
  data: Box<[u8]>,
  low: usize,
  high: usize,
  secondary_high: usize,
  pending: usize,
}

impl fmt::Debug for Arena {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.debug_struct("Arena")
      .field("capacity", &self.data.len())
      .field("low", &self.low)
      .field("high", &self.high)
      .field("secondary_high", &self.secondary_high)
      .field("pending", &self.pending)
      .finish()
  }
}

impl Arena {
  pub(crate) fn new(capacity: usize) -> Self {
    Self {
      data: vec![0u8; capacity].into_boxed_slice(),
      low: 0,
      high: 0,
      secondary_high: 0,
      pending: 0,
    }
  }

  #[inline]
  pub(crate) fn capacity(&self) -> usize {
    self.data.len()
  }

  /// Number of records stored and not yet drained.
  #[inline]
  pub(crate) fn pending(&self) -> usize {
    self.pending
  }

  /// Bytes occupied by stored records, headers included.
  #[inline]
  pub(crate) fn used_bytes(&self) -> usize {
    (self.high - self.low) + self.secondary_high
  }

  /// Size of the record `payload_len` would need, if it can ever fit.
  #[inline]
  pub(crate) fn record_size(&self, payload_len: usize) -> Option<usize> {
    HEADER_SIZE
      .checked_add(payload_len)
      .filter(|&total| total <= self.capacity())
  }

  /// Stores `payload` as one record, or rejects it without touching the
  /// arena.
  pub(crate) fn place(&mut self, payload: &[u8]) -> Result<Placement, TrySendError> {
    let total = self
      .record_size(payload.len())
      .ok_or(TrySendError::Oversized)?;

    let placement = if self.secondary_high > 0 {
      if self.low - self.secondary_high < total {
        return Err(TrySendError::Full);
      }
      self.write_record(self.secondary_high, payload);
      self.secondary_high += total;
      Placement::Wrapped
    } else if self.capacity() - self.high >= total {
      self.write_record(self.high, payload);
      self.high += total;
      Placement::Primary
    } else if self.low >= total {
      self.write_record(0, payload);
      self.secondary_high = total;
      Placement::Wrap
    } else if self.low == self.high {
      // Nothing stored, but the tail is too short: start over at the front.
      self.low = 0;
      self.write_record(0, payload);
      self.high = total;
      Placement::Rewind
    } else {
      return Err(TrySendError::Full);
    };

    self.pending += 1;
    self.debug_check();
    Ok(placement)
  }

  /// Delivers every stored record to `callback`, oldest first, rotating into
  /// the wrapped region once the primary region is exhausted. Returns the
  /// number of records delivered.
  pub(crate) fn drain_pass<F>(&mut self, callback: &mut F) -> usize
  where
    F: FnMut(&[u8]),
  {
    let mut count = 0;
    loop {
      while self.low < self.high {
        let start = self.low + HEADER_SIZE;
        let len = self.read_header(self.low);
        let end = start + len;
        debug_assert!(end <= self.high, "record crosses the end of its region");
        callback(&self.data[start..end]);
        // Kept per record so a panicking callback leaves the count exact.
        self.low = end;
        self.pending -= 1;
        count += 1;
      }

      if self.secondary_high == 0 {
        break;
      }
      self.rotate();
    }

    self.debug_check();
    count
  }

  fn rotate(&mut self) {
    tracing::trace!(
      wrapped_bytes = self.secondary_high,
      "rotating into wrapped region"
    );
    self.low = 0;
    self.high = self.secondary_high;
    self.secondary_high = 0;
  }

  fn write_record(&mut self, at: usize, payload: &[u8]) {
    let body = at + HEADER_SIZE;
    self.data[at..body].copy_from_slice(&payload.len().to_ne_bytes());
    self.data[body..body + payload.len()].copy_from_slice(payload);
  }

  fn read_header(&self, at: usize) -> usize {
    let mut header = [0u8; HEADER_SIZE];
    header.copy_from_slice(&self.data[at..at + HEADER_SIZE]);
    usize::from_ne_bytes(header)
  }

  #[inline]
  fn debug_check(&self) {
    debug_assert!(self.low <= self.high && self.high <= self.capacity());
    debug_assert!(self.secondary_high <= self.low);
    debug_assert!(self.pending > 0 || (self.low == self.high && self.secondary_high == 0));
  }

  #[cfg(test)]
  pub(crate) fn offsets(&self) -> (usize, usize, usize) {
    (self.low, self.high, self.secondary_high)
  }

  /// Walks both regions header by header and checks that they hold whole
  /// records only.
  #[cfg(test)]
  pub(crate) fn assert_well_formed(&self) {
    let (low, high, secondary_high) = self.offsets();
    assert!(low <= high && high <= self.capacity());
    assert!(secondary_high <= low);

    let mut records = 0;
    for (mut cursor, end) in [(low, high), (0, secondary_high)] {
      while cursor < end {
        cursor += HEADER_SIZE + self.read_header(cursor);
        records += 1;
      }
      assert_eq!(cursor, end, "region does not end on a record boundary");
    }
    assert_eq!(records, self.pending);
  }
}
