//! Error types for stxlink operations

use alloc::string::String;

/// Why an exchange was rejected
#[cfg_attr(feature = "std", derive(thiserror::Error))]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Fault {
    /// Start or terminator byte missing
    #[cfg_attr(feature = "std", error("frame is missing its start or terminator byte"))]
    Framing,

    /// A byte does not carry the configured parity
    #[cfg_attr(feature = "std", error("parity check failed"))]
    Parity,

    /// Trailing checksum does not match the frame contents
    #[cfg_attr(
        feature = "std",
        error("checksum mismatch: expected {expected:#04x}, got {actual:#04x}")
    )]
    Checksum {
        /// Checksum computed over the received bytes.
        expected: u8,
        /// Checksum byte found on the wire.
        actual: u8,
    },

    /// The remote echoed something other than ACK or EOT
    #[cfg_attr(feature = "std", error("unexpected echo {0:#04x}"))]
    UnexpectedEcho(u8),
}

/// Errors that can occur during stxlink operations
#[cfg_attr(feature = "std", derive(thiserror::Error))]
#[derive(Debug, Clone, PartialEq)]
pub enum TalkError {
    /// Caller supplied an unusable argument
    #[cfg_attr(feature = "std", error("Invalid argument: {0}"))]
    InvalidArgument(String),

    /// Frame or text does not fit the destination
    #[cfg_attr(
        feature = "std",
        error("Buffer too small: need {needed} bytes, capacity is {capacity}")
    )]
    BufferTooSmall {
        /// Bytes required.
        needed: usize,
        /// Bytes available.
        capacity: usize,
    },

    /// Transport reported an unrecoverable failure
    #[cfg_attr(feature = "std", error("Stream failure: {0}"))]
    StreamFailure(String),

    /// Frame or echo failed validation
    #[cfg_attr(feature = "std", error("Bad exchange: {0}"))]
    BadExchange(Fault),

    /// Remote ended the transmission
    #[cfg_attr(feature = "std", error("Terminated by remote"))]
    Terminated,

    /// Deadline elapsed
    #[cfg_attr(feature = "std", error("Timed out"))]
    Timeout,

    /// Configuration rejected by validation
    #[cfg_attr(feature = "std", error("Invalid configuration: {0}"))]
    InvalidConfig(String),
}

impl TalkError {
    /// Terminal errors abort a retry loop immediately
    pub fn is_terminal(&self) -> bool {
        matches!(self, TalkError::StreamFailure(_) | TalkError::Terminated)
    }
}

impl From<Fault> for TalkError {
    fn from(fault: Fault) -> Self {
        TalkError::BadExchange(fault)
    }
}

#[cfg(feature = "std")]
impl From<std::io::Error> for TalkError {
    fn from(err: std::io::Error) -> Self {
        TalkError::StreamFailure(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_terminal_kinds() {
        assert!(TalkError::Terminated.is_terminal());
        assert!(TalkError::StreamFailure("gone".into()).is_terminal());
        assert!(!TalkError::Timeout.is_terminal());
        assert!(!TalkError::BadExchange(Fault::Parity).is_terminal());
        assert!(!TalkError::BufferTooSmall {
            needed: 4,
            capacity: 2
        }
        .is_terminal());
    }

    #[cfg(feature = "std")]
    #[test]
    fn test_display() {
        let err = TalkError::BadExchange(Fault::Checksum {
            expected: 0x73,
            actual: 0x70,
        });
        assert_eq!(
            err.to_string(),
            "Bad exchange: checksum mismatch: expected 0x73, got 0x70"
        );
    }
}
