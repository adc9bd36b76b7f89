//! Transport and observer capabilities
//!
//! A [`Transport`] is a non-blocking byte pipe. It must return immediately:
//! `Ok(0)` (or an error of kind `WouldBlock`/`Interrupted`) means no progress
//! is possible right now, any other error is an unrecoverable stream failure.
//!
//! An [`Observer`] is told about every control code and text that crosses
//! the link. All hooks default to no-ops and must not block.

use crate::error::TalkError;
use std::io::{self, ErrorKind, Read, Write};

#[cfg(feature = "logging")]
use tracing::info;

/// Non-blocking byte transport
pub trait Transport {
    /// Push bytes out, returning how many were accepted
    fn send(&mut self, data: &[u8]) -> io::Result<usize>;

    /// Pull bytes in, returning how many were stored in `buf`
    fn recv(&mut self, buf: &mut [u8]) -> io::Result<usize>;
}

impl<T: Transport + ?Sized> Transport for &mut T {
    fn send(&mut self, data: &[u8]) -> io::Result<usize> {
        (**self).send(data)
    }

    fn recv(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        (**self).recv(buf)
    }
}

impl<T: Transport + ?Sized> Transport for Box<T> {
    fn send(&mut self, data: &[u8]) -> io::Result<usize> {
        (**self).send(data)
    }

    fn recv(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        (**self).recv(buf)
    }
}

/// Fold a transport result into "bytes moved" where zero means would-block
pub(crate) fn progress(result: io::Result<usize>) -> Result<usize, TalkError> {
    match result {
        Ok(n) => Ok(n),
        Err(e) if matches!(e.kind(), ErrorKind::WouldBlock | ErrorKind::Interrupted) => Ok(0),
        Err(e) => Err(e.into()),
    }
}

/// Event hooks fired by a session
pub trait Observer {
    /// A control code was sent
    fn on_send_control(&mut self, _code: u8) {}

    /// A control code was received
    fn on_receive_control(&mut self, _code: u8) {}

    /// A text frame was pushed out
    fn on_send_text(&mut self, _text: &[u8]) {}

    /// A text frame was received and accepted
    fn on_receive_text(&mut self, _text: &[u8]) {}
}

impl Observer for () {}

impl<O: Observer + ?Sized> Observer for &mut O {
    fn on_send_control(&mut self, code: u8) {
        (**self).on_send_control(code)
    }

    fn on_receive_control(&mut self, code: u8) {
        (**self).on_receive_control(code)
    }

    fn on_send_text(&mut self, text: &[u8]) {
        (**self).on_send_text(text)
    }

    fn on_receive_text(&mut self, text: &[u8]) {
        (**self).on_receive_text(text)
    }
}

/// Observer that reports every event through `tracing`
#[cfg(feature = "logging")]
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingObserver;

#[cfg(feature = "logging")]
impl Observer for TracingObserver {
    fn on_send_control(&mut self, code: u8) {
        info!("control sent: {:#04x}", code);
    }

    fn on_receive_control(&mut self, code: u8) {
        info!("control received: {:#04x}", code);
    }

    fn on_send_text(&mut self, text: &[u8]) {
        info!(text = %String::from_utf8_lossy(text), "text sent");
    }

    fn on_receive_text(&mut self, text: &[u8]) {
        info!(text = %String::from_utf8_lossy(text), "text received");
    }
}

/// Adapts a non-blocking std stream such as a `TcpStream`
///
/// The stream must already be in non-blocking mode. End of file on read is
/// reported as a stream failure.
#[derive(Debug)]
pub struct StreamLink<S> {
    stream: S,
}

impl<S: Read + Write> StreamLink<S> {
    /// Wrap a stream
    pub fn new(stream: S) -> Self {
        Self { stream }
    }

    /// Borrow the wrapped stream
    pub fn get_ref(&self) -> &S {
        &self.stream
    }

    /// Unwrap the stream
    pub fn into_inner(self) -> S {
        self.stream
    }
}

impl<S: Read + Write> Transport for StreamLink<S> {
    fn send(&mut self, data: &[u8]) -> io::Result<usize> {
        self.stream.write(data)
    }

    fn recv(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        match self.stream.read(buf)? {
            0 if !buf.is_empty() => Err(io::Error::new(
                ErrorKind::UnexpectedEof,
                "peer closed the stream",
            )),
            n => Ok(n),
        }
    }
}
