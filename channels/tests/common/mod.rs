#![allow(dead_code)]

use std::time::{Duration, Instant};

pub const SHORT_TIMEOUT: Duration = Duration::from_millis(500);
pub const LONG_TIMEOUT: Duration = Duration::from_secs(3);
pub const STRESS_TIMEOUT: Duration = Duration::from_secs(15);
pub const ITEMS_LOW: usize = 50;
pub const ITEMS_MEDIUM: usize = 200;
pub const ITEMS_HIGH: usize = 1000;

/// Spins until `probe` reports at least `count` blocked consumers.
pub fn wait_for_waiters(probe: impl Fn() -> usize, count: usize) {
  let deadline = Instant::now() + LONG_TIMEOUT;
  while probe() < count {
    assert!(Instant::now() < deadline, "consumers never blocked");
    std::thread::sleep(Duration::from_millis(1));
  }
}
