//! Monitor-based synchronous channels for Rust.
//!
//! monochan provides two in-process primitives that share one design: a
//! single mutex-protected state plus a condition variable (a [`Monitor`]).
//!
//! - [`Channel<T>`]: an unbounded FIFO of typed values. Producers never
//!   block; a consumer takes everything buffered in one blocking `drain`.
//! - [`ByteChannel`]: a fixed-capacity, zero-copy ring buffer for
//!   variable-length byte messages. Producers never block and are told when
//!   a message does not fit; consumers read each message through a borrowed
//!   slice straight out of the arena.
//!
//! Both are plain shared objects: wrap them in an `Arc` to use them from
//! several threads. Closing either one wakes every blocked consumer.

pub mod error;
pub mod monitor;

// Channel type modules
pub mod bytes;
pub mod typed;

pub use bytes::{ByteChannel, ByteChannelBuilder, HEADER_SIZE};
pub use error::{BuildError, CloseError, RecvErrorTimeout, TrySendError};
pub use monitor::{Monitor, MonitorGuard};
pub use typed::Channel;

// Helper function to check if a type is Send + Sync.
#[allow(dead_code)]
fn assert_send_sync<T: Send + Sync>() {}

#[allow(dead_code)]
fn channels_are_send_sync() {
  assert_send_sync::<ByteChannel>();
  assert_send_sync::<Channel<String>>();
}
