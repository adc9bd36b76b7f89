//! Frame building and parsing
//!
//! Wire layout:
//!
//! ```text
//! START  payload*  END|CONTINUE  [CHECKSUM]
//! ```
//!
//! Every byte except the checksum carries the configured parity bit. The
//! checksum is the XOR of the payload and terminator *after* parity has been
//! applied, and is written without a parity bit of its own. Peers depend on
//! this ordering, so it must not be changed to checksum-then-parity.
//!
//! Validation runs against frames exactly as they came off the wire; parity
//! is only stripped from the copy handed to the caller by [`extract_text`].

use crate::config::Config;
use crate::error::{Fault, TalkError};
use crate::parity::{self, Parity};
use bytes::{BufMut, Bytes, BytesMut};

/// Total frame size for a payload of `text_len` bytes
pub fn frame_len(text_len: usize, config: &Config) -> usize {
    text_len + config.overhead()
}

/// Build a frame carrying `text`
///
/// `more` selects the CONTINUE terminator instead of END. Fails with
/// [`TalkError::BufferTooSmall`] when the frame would exceed
/// `config.max_frame_size`.
pub fn build(text: &[u8], config: &Config, more: bool) -> Result<Bytes, TalkError> {
    let needed = frame_len(text.len(), config);
    if needed > config.max_frame_size {
        return Err(TalkError::BufferTooSmall {
            needed,
            capacity: config.max_frame_size,
        });
    }

    let terminator = if more {
        config.control.cont
    } else {
        config.control.end
    };

    let mut buf = BytesMut::with_capacity(needed);
    buf.put_u8(config.control.start);
    buf.put_slice(text);
    buf.put_u8(terminator);
    if config.checksum {
        // Slot is overwritten below, after parity.
        buf.put_u8(0);
    }

    parity::add_all(&mut buf, config.parity);

    if config.checksum {
        let lrc = checksum(&buf);
        let last = buf.len() - 1;
        buf[last] = lrc;
    }

    Ok(buf.freeze())
}

/// XOR of every byte strictly between START and the trailing checksum slot
///
/// `frame` must include the checksum slot. Frames shorter than two bytes
/// yield zero.
pub fn checksum(frame: &[u8]) -> u8 {
    if frame.len() < 2 {
        return 0;
    }
    frame[1..frame.len() - 1].iter().fold(0u8, |acc, b| acc ^ b)
}

/// Position of the terminator byte, if the frame is long enough to have one
fn terminator_index(frame: &[u8], config: &Config) -> Option<usize> {
    let min = config.overhead();
    if frame.len() < min {
        return None;
    }
    Some(if config.checksum {
        frame.len() - 2
    } else {
        frame.len() - 1
    })
}

fn wire(code: u8, mode: Parity) -> u8 {
    parity::add(code, mode)
}

/// First byte is the parity-encoded START code
pub fn has_start(frame: &[u8], config: &Config) -> bool {
    frame
        .first()
        .is_some_and(|&b| b == wire(config.control.start, config.parity))
}

/// Terminator byte is the parity-encoded END code
pub fn has_end(frame: &[u8], config: &Config) -> bool {
    terminator_index(frame, config)
        .is_some_and(|i| frame[i] == wire(config.control.end, config.parity))
}

/// Terminator byte is the parity-encoded CONTINUE code
pub fn has_continue(frame: &[u8], config: &Config) -> bool {
    terminator_index(frame, config)
        .is_some_and(|i| frame[i] == wire(config.control.cont, config.parity))
}

/// Start present and terminated by END or CONTINUE
pub fn check_integrity(frame: &[u8], config: &Config) -> bool {
    has_start(frame, config) && (has_end(frame, config) || has_continue(frame, config))
}

/// Every byte except the checksum trailer carries the configured parity
pub fn check_parity(frame: &[u8], config: &Config) -> bool {
    if frame.is_empty() {
        return true;
    }
    let body = if config.checksum {
        &frame[..frame.len() - 1]
    } else {
        frame
    };
    parity::check(body, config.parity)
}

/// Trailing checksum matches the frame contents
pub fn check_checksum(frame: &[u8], config: &Config) -> bool {
    verify_checksum(frame, config).is_ok()
}

fn verify_checksum(frame: &[u8], config: &Config) -> Result<(), Fault> {
    if !config.checksum {
        return Ok(());
    }
    let actual = frame.last().copied().unwrap_or(0);
    let expected = checksum(frame);
    if frame.len() < 2 || expected != actual {
        return Err(Fault::Checksum { expected, actual });
    }
    Ok(())
}

/// Validate integrity, parity and checksum in that order
///
/// The first property that fails classifies the frame.
pub fn verify(frame: &[u8], config: &Config) -> Result<(), Fault> {
    if !check_integrity(frame, config) {
        return Err(Fault::Framing);
    }
    if !check_parity(frame, config) {
        return Err(Fault::Parity);
    }
    verify_checksum(frame, config)
}

/// True if the frame passes every check
pub fn check_all(frame: &[u8], config: &Config) -> bool {
    verify(frame, config).is_ok()
}

/// Copy the payload of `frame` into `out`, followed by a NUL terminator
///
/// Returns the payload length. Parity is stripped from the copy only.
/// `out` must hold the payload plus the terminator.
pub fn extract_text(frame: &[u8], config: &Config, out: &mut [u8]) -> Result<usize, TalkError> {
    if !check_integrity(frame, config) {
        return Err(TalkError::BadExchange(Fault::Framing));
    }

    let text_len = frame.len() - config.overhead();
    if out.len() < text_len + 1 {
        return Err(TalkError::BufferTooSmall {
            needed: text_len + 1,
            capacity: out.len(),
        });
    }

    out[..text_len].copy_from_slice(&frame[1..1 + text_len]);
    out[text_len] = 0;

    if config.parity != Parity::None {
        parity::remove_all(&mut out[..text_len]);
    }

    Ok(text_len)
}

/// Capacity-checked accumulator for frames read off the wire
#[derive(Debug, Clone)]
pub struct FrameBuf {
    buf: BytesMut,
    capacity: usize,
}

impl FrameBuf {
    /// Create an empty buffer that refuses to grow past `capacity`
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            buf: BytesMut::with_capacity(capacity),
            capacity,
        }
    }

    /// Append one byte
    pub fn push(&mut self, byte: u8) -> Result<(), TalkError> {
        if self.buf.len() >= self.capacity {
            return Err(TalkError::BufferTooSmall {
                needed: self.buf.len() + 1,
                capacity: self.capacity,
            });
        }
        self.buf.put_u8(byte);
        Ok(())
    }

    /// Bytes collected so far
    pub fn as_slice(&self) -> &[u8] {
        &self.buf
    }

    /// Number of bytes collected
    pub fn len(&self) -> usize {
        self.buf.len()
    }

    /// True if nothing has been collected
    pub fn is_empty(&self) -> bool {
        self.buf.is_empty()
    }

    /// Maximum number of bytes the buffer accepts
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Discard collected bytes
    pub fn clear(&mut self) {
        self.buf.clear();
    }

    /// Convert into an immutable frame
    pub fn freeze(self) -> Bytes {
        self.buf.freeze()
    }
}
