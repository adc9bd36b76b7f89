//! # stxlink Core
//!
//! Half-duplex, character-oriented text exchange over an unreliable byte
//! transport: STX/ETX framing, per-byte parity, an XOR checksum trailer and
//! the ACK/NAK/EOT echo handshake used by legacy instrument links.
//!
//! ## Modules
//!
//! - `constants`: Control codes and limits
//! - `parity`: Per-byte parity encoding and checks
//! - `config`: Session configuration
//! - `frame`: Frame building, validation and text extraction
//! - `timer`: Deadlines for polling loops
//! - `link`: Transport and observer capabilities
//! - `mem`: In-memory transport
//! - `session`: Control and text exchange with bounded retries

#![cfg_attr(not(feature = "std"), no_std)]
#![warn(missing_docs)]

extern crate alloc;

pub mod config;
pub mod constants;
pub mod error;
pub mod frame;
#[cfg(feature = "std")]
pub mod link;
#[cfg(feature = "std")]
pub mod mem;
pub mod parity;
#[cfg(feature = "std")]
pub mod session;
#[cfg(feature = "std")]
pub mod timer;

// Re-export commonly used types
pub use config::{Config, ControlCodes, Timeouts};
pub use error::{Fault, TalkError};
pub use parity::Parity;

#[cfg(feature = "std")]
pub use link::{Observer, StreamLink, Transport};
#[cfg(all(feature = "std", feature = "logging"))]
pub use link::TracingObserver;
#[cfg(feature = "std")]
pub use mem::MemoryLink;
#[cfg(feature = "std")]
pub use session::{Reception, Session};

/// Result type alias for stxlink operations
pub type Result<T> = core::result::Result<T, TalkError>;
