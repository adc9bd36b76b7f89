//! In-memory transport for loopback use

use crate::link::Transport;
use std::collections::VecDeque;
use std::io::{self, ErrorKind};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

type Queue = Arc<Mutex<VecDeque<u8>>>;

/// One end of an in-memory duplex byte pipe
///
/// Both ends never block: an empty queue reads as zero bytes. Closing either
/// end makes every later call on both ends fail with `BrokenPipe`.
#[derive(Debug, Clone)]
pub struct MemoryLink {
    inbound: Queue,
    outbound: Queue,
    closed: Arc<AtomicBool>,
}

impl MemoryLink {
    /// Create two connected ends
    pub fn pair() -> (MemoryLink, MemoryLink) {
        let a_to_b: Queue = Arc::default();
        let b_to_a: Queue = Arc::default();
        let closed = Arc::new(AtomicBool::new(false));

        let a = MemoryLink {
            inbound: Arc::clone(&b_to_a),
            outbound: Arc::clone(&a_to_b),
            closed: Arc::clone(&closed),
        };
        let b = MemoryLink {
            inbound: a_to_b,
            outbound: b_to_a,
            closed,
        };
        (a, b)
    }

    /// Mark the pipe broken for both ends
    pub fn close(&self) {
        self.closed.store(true, Ordering::SeqCst);
    }

    /// Number of bytes waiting to be read at this end
    pub fn available(&self) -> usize {
        self.inbound.lock().map(|q| q.len()).unwrap_or(0)
    }

    /// Take every byte currently waiting at this end
    pub fn drain(&self) -> Vec<u8> {
        self.inbound
            .lock()
            .map(|mut q| q.drain(..).collect())
            .unwrap_or_default()
    }

    fn check_open(&self) -> io::Result<()> {
        if self.closed.load(Ordering::SeqCst) {
            return Err(io::Error::new(ErrorKind::BrokenPipe, "memory link closed"));
        }
        Ok(())
    }
}

fn poisoned<T>(_: T) -> io::Error {
    io::Error::new(ErrorKind::Other, "memory link lock poisoned")
}

impl Transport for MemoryLink {
    fn send(&mut self, data: &[u8]) -> io::Result<usize> {
        self.check_open()?;
        let mut queue = self.outbound.lock().map_err(poisoned)?;
        queue.extend(data.iter().copied());
        Ok(data.len())
    }

    fn recv(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        self.check_open()?;
        let mut queue = self.inbound.lock().map_err(poisoned)?;
        let n = buf.len().min(queue.len());
        for (slot, byte) in buf.iter_mut().zip(queue.drain(..n)) {
            *slot = byte;
        }
        Ok(n)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pair_is_crossed() {
        let (mut a, mut b) = MemoryLink::pair();
        assert_eq!(a.send(b"ping").unwrap(), 4);
        assert_eq!(b.available(), 4);
        assert_eq!(a.available(), 0);

        let mut buf = [0u8; 3];
        assert_eq!(b.recv(&mut buf).unwrap(), 3);
        assert_eq!(&buf, b"pin");
        assert_eq!(b.drain(), b"g");
        assert_eq!(b.recv(&mut buf).unwrap(), 0);
    }

    #[test]
    fn test_close_breaks_both_ends() {
        let (mut a, mut b) = MemoryLink::pair();
        b.close();
        assert_eq!(a.send(b"x").unwrap_err().kind(), ErrorKind::BrokenPipe);
        assert_eq!(
            b.recv(&mut [0u8; 1]).unwrap_err().kind(),
            ErrorKind::BrokenPipe
        );
    }
}
