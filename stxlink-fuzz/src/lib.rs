//! Fuzzing entry points for stxlink-core
//!
//! To use with cargo-fuzz:
//! 1. Install cargo-fuzz: cargo install cargo-fuzz
//! 2. Run fuzzer: cargo fuzz run fuzz_verify

use stxlink_core::{frame, Config, MemoryLink, Parity, Session, Transport};

/// Configurations exercised by every entry point
fn configs() -> [Config; 3] {
    [
        Config::default(),
        Config::default().with_parity(Parity::Even),
        Config::default()
            .with_parity(Parity::Odd)
            .with_checksum(false),
    ]
}

/// Short budgets so a session gives up quickly on junk input
fn fast(config: Config) -> Config {
    config.with_max_retries(0).with_timeouts(2, 2, 5)
}

pub fn fuzz_verify(data: &[u8]) {
    for config in configs() {
        // Classification and extraction must agree and never panic
        let verdict = frame::verify(data, &config);
        assert_eq!(verdict.is_ok(), frame::check_all(data, &config));

        let mut out = vec![0u8; data.len() + 1];
        let extracted = frame::extract_text(data, &config, &mut out);
        if verdict.is_ok() {
            assert!(extracted.is_ok());
        }
    }
}

pub fn fuzz_receive(data: &[u8]) {
    for config in configs() {
        let (local, mut remote) = MemoryLink::pair();
        if remote.send(data).is_err() {
            return;
        }

        let Ok(mut session) = Session::new(fast(config), local) else {
            return;
        };
        let mut buf = vec![0u8; data.len() + 1];
        let received = session.wait_text(&mut buf);

        // Exactly one reply per attempt, and only ACK after a good frame
        let replies = remote.drain();
        assert_eq!(replies.len(), 1);
        if received.is_ok() {
            assert_eq!(
                stxlink_core::parity::remove(replies[0]),
                session.config().control.ack
            );
        }
    }
}

pub fn fuzz_send(data: &[u8]) {
    for config in configs() {
        let (local, mut remote) = MemoryLink::pair();
        if remote.send(data).is_err() {
            return;
        }

        let Ok(mut session) = Session::new(fast(config), local) else {
            return;
        };
        // Arbitrary echo bytes must end in success or a clean error
        let _ = session.send_text(b"FUZZ", false);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fuzz_verify_empty() {
        fuzz_verify(&[]);
    }

    #[test]
    fn test_fuzz_verify_random() {
        fuzz_verify(&[0x12, 0x34, 0x56, 0x78]);
        fuzz_verify(&[0xFF; 1024]);
    }

    #[test]
    fn test_fuzz_verify_valid_frame() {
        fuzz_verify(&[0x02, 0x41, 0x31, 0x03, 0x73]);
    }

    #[test]
    fn test_fuzz_receive_empty() {
        fuzz_receive(&[]);
    }

    #[test]
    fn test_fuzz_receive_valid_frame() {
        fuzz_receive(&[0x02, 0x41, 0x31, 0x03, 0x73]);
    }

    #[test]
    fn test_fuzz_receive_random() {
        fuzz_receive(&[0x02, 0x02, 0x17, 0x03, 0x03, 0x00, 0x80]);
    }

    #[test]
    fn test_fuzz_send_random() {
        fuzz_send(&[]);
        fuzz_send(&[0x15, 0x06]);
        fuzz_send(&[0x04]);
    }
}
