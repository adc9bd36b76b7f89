//! Two sessions exchanging a multi-frame message over an in-memory link

use std::thread;
use stxlink_core::{Config, MemoryLink, Parity, Session};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    println!("stxlink Loopback Example\n");

    let config = Config::default().with_parity(Parity::Even);
    let (left, right) = MemoryLink::pair();

    let lines = [
        "TEMP 21.5",
        "HUMIDITY 40",
        "PRESSURE 1013",
    ];

    // Receiver runs until a frame arrives without the continue flag
    let receiver_config = config.clone();
    let receiver = thread::spawn(move || -> stxlink_core::Result<Vec<String>> {
        let mut session = Session::new(receiver_config, right)?;
        let mut texts = Vec::new();
        loop {
            let (text, more) = session.wait_string()?;
            texts.push(text);
            if !more {
                return Ok(texts);
            }
        }
    });

    let mut sender = Session::new(config, left)?;
    for (i, line) in lines.iter().enumerate() {
        let more = i + 1 < lines.len();
        sender.send_text(line, more)?;
        println!("Sent frame {}: {:?} (more: {})", i + 1, line, more);
    }

    let received = receiver
        .join()
        .map_err(|_| "receiver thread panicked")??;

    println!("\nReceived {} frame(s):", received.len());
    for text in &received {
        println!("  {}", text);
    }

    assert_eq!(received, lines);
    println!("\n✓ Message delivered intact");

    Ok(())
}
