mod common;
use common::*;

use monochan::{ByteChannel, TrySendError, HEADER_SIZE};
use std::sync::Arc;
use std::thread;

fn drain_all(channel: &ByteChannel, blocking: bool) -> Vec<Vec<u8>> {
  let mut out = Vec::new();
  let count = channel.drain(|msg| out.push(msg.to_vec()), blocking);
  assert_eq!(count, out.len());
  out
}

// Sequence number up front, padded to a length that varies with `i`.
fn message(i: u32) -> Vec<u8> {
  let len = (i as usize * 7) % 40 + 4;
  let mut msg = i.to_le_bytes().to_vec();
  msg.resize(len, (i % 251) as u8);
  msg
}

#[test]
fn scenario_two_messages_then_empty() {
  let channel = ByteChannel::new(64);
  assert!(channel.send(b"ab"));
  assert!(channel.send(b"cdef"));

  assert_eq!(drain_all(&channel, false), vec![b"ab".to_vec(), b"cdef".to_vec()]);
  assert_eq!(channel.drain(|_| {}, false), 0);
}

#[test]
fn scenario_wraparound() {
  // With an 8-byte header: capacity 32, A = 12 bytes (record 20),
  // B = 10 bytes (record 18).
  let channel = ByteChannel::new(4 * HEADER_SIZE);
  let a = vec![b'A'; HEADER_SIZE + 4];
  let b = vec![b'B'; HEADER_SIZE + 2];

  assert!(channel.send(&a));
  assert_eq!(drain_all(&channel, false), vec![a]);

  // The tail has 12 bytes left, the freed front has 20.
  // B's record only fits at the front. The exact offsets are checked by the
  // arena unit test `wraps_into_freed_front`.
  assert!(channel.send(&b));
  assert_eq!(channel.used_bytes(), HEADER_SIZE + b.len());
  // Wrapped writes stop at the reader: 2 bytes remain before it, which is
  // less than a header.
  assert_eq!(channel.try_send(b""), Err(TrySendError::Full));
  assert_eq!(drain_all(&channel, false), vec![b]);
  assert!(channel.is_empty());

  // The channel keeps working after the rotation.
  for round in 0..20u32 {
    let msg = vec![round as u8; (round as usize % (2 * HEADER_SIZE)) + 1];
    assert!(channel.send(&msg), "round {} rejected", round);
    assert_eq!(drain_all(&channel, false), vec![msg]);
  }
}

#[test]
fn scenario_close_unblocks_consumer() {
  let channel = Arc::new(ByteChannel::new(64));
  let consumer = {
    let channel = Arc::clone(&channel);
    thread::spawn(move || channel.drain(|_| {}, true))
  };

  wait_for_waiters(|| channel.waiting(), 1);
  channel.close().unwrap();
  assert_eq!(consumer.join().unwrap(), 0);
}

#[test]
fn fifo_across_rotations() {
  let channel = ByteChannel::new(256);
  let mut sent = Vec::new();
  let mut received = Vec::new();
  let mut rejections = 0;

  for i in 0..ITEMS_HIGH as u32 {
    let msg = message(i);
    if !channel.send(&msg) {
      rejections += 1;
      received.extend(drain_all(&channel, false));
      assert!(channel.send(&msg), "empty channel rejected message {}", i);
    }
    sent.push(msg);
  }
  received.extend(drain_all(&channel, false));

  assert!(rejections > 0, "arena never filled up");
  assert_eq!(received.len(), sent.len());
  assert_eq!(received, sent);
}

#[test]
fn fifo_with_wrapped_and_primary_data() {
  let unit = HEADER_SIZE;
  // Room for three 2H-byte records.
  let channel = ByteChannel::new(6 * unit);
  let first = vec![1u8; unit];
  channel.send(&first);
  assert_eq!(drain_all(&channel, false), vec![first]);

  // Primary now starts at 2H: two records fit at the tail, the third goes
  // to the freed front.
  let second = vec![2u8; unit];
  let third = vec![3u8; unit];
  let fourth = vec![4u8; unit];
  assert!(channel.send(&second));
  assert!(channel.send(&third));
  assert!(channel.send(&fourth));
  assert_eq!(channel.len(), 3);
  assert_eq!(channel.try_send(b""), Err(TrySendError::Full));

  assert_eq!(drain_all(&channel, false), vec![second, third, fourth]);
}

#[test]
fn capacity_ceiling_is_permanent() {
  let capacity = 8 * HEADER_SIZE;
  let channel = ByteChannel::new(capacity);
  let too_big = vec![0u8; capacity - HEADER_SIZE + 1];
  let exact = vec![0u8; capacity - HEADER_SIZE];

  for round in 0..5 {
    assert_eq!(channel.try_send(&too_big), Err(TrySendError::Oversized));
    assert!(!channel.send(&too_big));
    if round % 2 == 0 {
      channel.send(b"filler");
    } else {
      drain_all(&channel, false);
    }
  }

  drain_all(&channel, false);
  assert!(channel.send(&exact));
  assert_eq!(drain_all(&channel, false), vec![exact]);
}

#[test]
fn rejected_send_leaves_channel_untouched() {
  let channel = ByteChannel::new(4 * HEADER_SIZE);
  assert!(channel.send(&vec![9u8; 2 * HEADER_SIZE]));
  let used = channel.used_bytes();
  assert!(!channel.send(&vec![0u8; 2 * HEADER_SIZE]));
  assert_eq!(channel.used_bytes(), used);
  assert_eq!(channel.len(), 1);
  assert_eq!(drain_all(&channel, false), vec![vec![9u8; 2 * HEADER_SIZE]]);
}

#[test]
fn blocking_drain_terminates_after_send() {
  let channel = Arc::new(ByteChannel::new(1024));
  let consumer = {
    let channel = Arc::clone(&channel);
    thread::spawn(move || drain_all(&channel, true))
  };

  wait_for_waiters(|| channel.waiting(), 1);
  assert!(channel.send(b"wake up"));

  let start = std::time::Instant::now();
  let got = consumer.join().unwrap();
  assert!(start.elapsed() < LONG_TIMEOUT);
  assert_eq!(got, vec![b"wake up".to_vec()]);
}

#[test]
fn close_wakes_all_waiters() {
  const CONSUMERS: usize = 6;
  let channel = Arc::new(ByteChannel::new(1024));
  let handles: Vec<_> = (0..CONSUMERS)
    .map(|_| {
      let channel = Arc::clone(&channel);
      thread::spawn(move || channel.drain(|_| {}, true))
    })
    .collect();

  wait_for_waiters(|| channel.waiting(), CONSUMERS);
  channel.close().unwrap();

  let total: usize = handles.into_iter().map(|h| h.join().unwrap()).sum();
  assert_eq!(total, 0);
  assert_eq!(channel.waiting(), 0);
}

#[test]
fn close_final_pass_delivers_leftovers() {
  let channel = ByteChannel::new(16 * 1024);
  for i in 0..ITEMS_LOW as u32 {
    assert!(channel.send(&message(i)));
  }
  channel.close().unwrap();

  let got = drain_all(&channel, true);
  assert_eq!(got, (0..ITEMS_LOW as u32).map(message).collect::<Vec<_>>());
  assert_eq!(channel.drain(|_| {}, true), 0);
}
