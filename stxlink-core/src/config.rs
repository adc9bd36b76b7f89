//! Session configuration

use crate::constants::{
    self, ACK, DEFAULT_ECHO_TIMEOUT_MS, DEFAULT_MAX_RETRIES, DEFAULT_RESPONSE_TIMEOUT_MS,
    DEFAULT_SEND_TIMEOUT_MS, ENQ, EOT, ETB, ETX, MAX_FRAME_SIZE, NAK, STX,
};
use crate::error::TalkError;
use crate::parity::Parity;
use alloc::format;
use core::time::Duration;
use serde::{Deserialize, Serialize};

/// Control characters, as values without parity
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ControlCodes {
    /// Opens a frame
    pub start: u8,
    /// Terminates the final frame of a message
    pub end: u8,
    /// Terminates a frame that is followed by more
    #[serde(rename = "continue")]
    pub cont: u8,
    /// Enquiry
    pub enquiry: u8,
    /// Positive echo
    pub ack: u8,
    /// Negative echo
    pub nak: u8,
    /// End of transmission
    pub eot: u8,
}

impl Default for ControlCodes {
    fn default() -> Self {
        Self {
            start: STX,
            end: ETX,
            cont: ETB,
            enquiry: ENQ,
            ack: ACK,
            nak: NAK,
            eot: EOT,
        }
    }
}

/// Timeout budgets in milliseconds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Timeouts {
    /// Budget for pushing a frame or control code into the transport
    pub send_ms: u32,
    /// Budget for waiting on an echo
    pub echo_ms: u32,
    /// Budget for waiting on a complete frame
    pub response_ms: u32,
}

impl Timeouts {
    /// Send budget as a duration
    pub fn send(&self) -> Duration {
        Duration::from_millis(u64::from(self.send_ms))
    }

    /// Echo budget as a duration
    pub fn echo(&self) -> Duration {
        Duration::from_millis(u64::from(self.echo_ms))
    }

    /// Response budget as a duration
    pub fn response(&self) -> Duration {
        Duration::from_millis(u64::from(self.response_ms))
    }
}

impl Default for Timeouts {
    fn default() -> Self {
        Self {
            send_ms: DEFAULT_SEND_TIMEOUT_MS,
            echo_ms: DEFAULT_ECHO_TIMEOUT_MS,
            response_ms: DEFAULT_RESPONSE_TIMEOUT_MS,
        }
    }
}

/// Immutable session configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Control characters
    pub control: ControlCodes,
    /// Parity applied to framed and control bytes
    pub parity: Parity,
    /// Append an XOR checksum trailer to every frame
    #[serde(rename = "checksum_enabled")]
    pub checksum: bool,
    /// Retries after the first attempt of a send or receive
    pub max_retries: u32,
    /// Timeout budgets
    pub timeouts: Timeouts,
    /// Upper bound on a whole frame in bytes
    pub max_frame_size: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            control: ControlCodes::default(),
            parity: Parity::None,
            checksum: true,
            max_retries: DEFAULT_MAX_RETRIES,
            timeouts: Timeouts::default(),
            max_frame_size: MAX_FRAME_SIZE,
        }
    }
}

impl Config {
    /// Set the parity policy
    pub fn with_parity(mut self, parity: Parity) -> Self {
        self.parity = parity;
        self
    }

    /// Enable or disable the checksum trailer
    pub fn with_checksum(mut self, enabled: bool) -> Self {
        self.checksum = enabled;
        self
    }

    /// Set the retry count
    pub fn with_max_retries(mut self, retries: u32) -> Self {
        self.max_retries = retries;
        self
    }

    /// Set all three timeout budgets
    pub fn with_timeouts(mut self, send_ms: u32, echo_ms: u32, response_ms: u32) -> Self {
        self.timeouts = Timeouts {
            send_ms,
            echo_ms,
            response_ms,
        };
        self
    }

    /// Total attempts a send or receive makes before giving up
    pub fn attempts(&self) -> u32 {
        self.max_retries.saturating_add(1)
    }

    /// Framing bytes around the payload
    pub fn overhead(&self) -> usize {
        constants::overhead(self.checksum)
    }

    /// Largest payload a single frame can carry
    pub fn max_text_len(&self) -> usize {
        self.max_frame_size.saturating_sub(self.overhead())
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), TalkError> {
        let c = &self.control;
        let named = [
            ("start", c.start),
            ("end", c.end),
            ("continue", c.cont),
            ("enquiry", c.enquiry),
            ("ack", c.ack),
            ("nak", c.nak),
            ("eot", c.eot),
        ];
        for (name, code) in named {
            if !constants::is_control(code) {
                return Err(TalkError::InvalidConfig(format!(
                    "{} code {:#04x} is not an ASCII control character",
                    name, code
                )));
            }
        }

        if c.start == c.end || c.start == c.cont || c.end == c.cont {
            return Err(TalkError::InvalidConfig(
                "start, end and continue codes must differ".into(),
            ));
        }

        if c.ack == c.nak || c.ack == c.eot || c.nak == c.eot {
            return Err(TalkError::InvalidConfig(
                "ack, nak and eot codes must differ".into(),
            ));
        }

        if self.max_frame_size < self.overhead() {
            return Err(TalkError::InvalidConfig(format!(
                "max_frame_size {} cannot hold the {} framing bytes",
                self.max_frame_size,
                self.overhead()
            )));
        }

        Ok(())
    }
}
