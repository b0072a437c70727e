// examples/pipeline.rs
//
// Run with `RUST_LOG=monochan=trace cargo run --example pipeline` to see the
// channel's own log events.
use monochan::{ByteChannel, Channel, TrySendError};
use std::{sync::Arc, thread, time::Duration};
use tracing_subscriber::EnvFilter;

fn main() {
  tracing_subscriber::fmt()
    .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("debug")))
    .init();

  println!("--- ByteChannel: 3 producers, 1 zero-copy consumer ---");
  {
    let channel = Arc::new(
      ByteChannel::builder()
        .capacity(256)
        .label("frames")
        .build()
        .expect("valid channel configuration"),
    );

    let consumer = {
      let channel = Arc::clone(&channel);
      thread::spawn(move || {
        let mut total = 0;
        loop {
          let count = channel.drain(
            |frame| println!("[Consumer] {}", String::from_utf8_lossy(frame)),
            true,
          );
          if count == 0 {
            break;
          }
          total += count;
        }
        total
      })
    };

    let producers: Vec<_> = (0..3)
      .map(|id| {
        let channel = Arc::clone(&channel);
        thread::spawn(move || {
          for seq in 0..5 {
            let frame = format!("P{}-frame-{}", id, seq);
            // Backpressure is up to the producer: retry until there is room.
            loop {
              match channel.try_send(frame.as_bytes()) {
                Ok(()) => break,
                Err(TrySendError::Full) => thread::sleep(Duration::from_millis(1)),
                Err(TrySendError::Oversized) => {
                  eprintln!("[Producer {}] frame can never fit, dropping", id);
                  break;
                }
              }
            }
          }
        })
      })
      .collect();

    for handle in producers {
      handle.join().unwrap();
    }
    // The payload below is larger than the arena and is always rejected.
    assert!(channel.try_send(&[0u8; 512]).unwrap_err().is_oversized());
    channel.close().unwrap();
    println!("Consumer received {} frames", consumer.join().unwrap());
  }

  println!("\n--- Channel<T>: batch producer, blocking drain ---");
  {
    let channel = Arc::new(Channel::<String>::new());
    let consumer = {
      let channel = Arc::clone(&channel);
      thread::spawn(move || {
        let mut batch = Vec::new();
        while channel.drain(&mut batch) {
          println!("[Consumer] got batch of {}: {:?}", batch.len(), batch);
          batch.clear();
        }
      })
    };

    channel.send("first".to_string());
    channel.send_all((0..4).map(|i| format!("bulk-{}", i)));
    thread::sleep(Duration::from_millis(20));
    channel.close().unwrap();
    consumer.join().unwrap();
  }
}
