//! Constants and limits for the stxlink wire format

use core::time::Duration;

/// Start of text: opens every frame
pub const STX: u8 = 0x02;

/// End of text: closes the final frame of a message
pub const ETX: u8 = 0x03;

/// End of transmission: remote aborts the exchange
pub const EOT: u8 = 0x04;

/// Enquiry: asks the remote whether it is ready
pub const ENQ: u8 = 0x05;

/// Acknowledge: frame accepted
pub const ACK: u8 = 0x06;

/// Negative acknowledge: frame rejected, resend
pub const NAK: u8 = 0x15;

/// End of transmission block: closes a frame that has a continuation
pub const ETB: u8 = 0x17;

/// Mask of the bit that carries parity on the wire
pub const PARITY_BIT: u8 = 0x80;

/// Maximum frame size (start + payload + terminator + checksum)
pub const MAX_FRAME_SIZE: usize = 1024;

/// Framing overhead without a checksum trailer: start + terminator
pub const FRAMING_OVERHEAD: usize = 2;

/// Size of the checksum trailer in bytes
pub const CHECKSUM_SIZE: usize = 1;

/// Pause between polls when the transport would block
pub const POLL_INTERVAL: Duration = Duration::from_millis(1);

/// Default budget for pushing bytes into the transport
pub const DEFAULT_SEND_TIMEOUT_MS: u32 = 500;

/// Default budget for waiting on an echo control code
pub const DEFAULT_ECHO_TIMEOUT_MS: u32 = 500;

/// Default budget for waiting on a complete frame
pub const DEFAULT_RESPONSE_TIMEOUT_MS: u32 = 3000;

/// Default number of retries after the first attempt
pub const DEFAULT_MAX_RETRIES: u32 = 3;

/// Returns the framing overhead in bytes for the given checksum setting
pub const fn overhead(checksum: bool) -> usize {
    if checksum {
        FRAMING_OVERHEAD + CHECKSUM_SIZE
    } else {
        FRAMING_OVERHEAD
    }
}

/// True for bytes the handshake layer treats as control codes.
///
/// NUL is excluded: an idle line often reads as zeros.
pub const fn is_control(code: u8) -> bool {
    code != 0 && (code < 0x20 || code == 0x7F)
}
