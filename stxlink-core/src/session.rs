//! Handshake engine
//!
//! A [`Session`] drives one side of the half-duplex exchange:
//!
//! - [`Session::send_text`] frames a text, pushes it out and waits for the
//!   echo: ACK confirms, EOT aborts, anything else triggers a resend.
//! - [`Session::wait_text`] collects a frame, validates it and always answers
//!   with ACK or NAK before returning.
//!
//! Both retry up to `max_retries` times. Stream failures and EOT are never
//! retried. Every bounded wait gets a fresh, full timeout budget.
//!
//! The transport is polled; a would-block result sleeps for
//! [`POLL_INTERVAL`] and tries again until the deadline passes.

use crate::config::Config;
use crate::constants::{self, POLL_INTERVAL};
use crate::error::{Fault, TalkError};
use crate::frame::{self, FrameBuf};
use crate::link::{progress, Observer, Transport};
use crate::parity;
use crate::timer::Deadline;
use crate::Result;
use bytes::Bytes;
use std::thread;
use std::time::Duration;

#[cfg(feature = "logging")]
use tracing::{debug, warn};

/// A text accepted by [`Session::wait_text`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Reception {
    /// Payload length written to the caller's buffer
    pub len: usize,
    /// Remote terminated the frame with CONTINUE: another frame follows
    pub more: bool,
}

/// One side of a framed text exchange over a non-blocking transport
///
/// No protocol state survives between calls. A session must not be shared
/// between threads driving the same transport.
pub struct Session<T, O = ()> {
    config: Config,
    transport: T,
    observer: O,
}

impl<T: Transport> Session<T> {
    /// Create a session without an observer
    pub fn new(config: Config, transport: T) -> Result<Self> {
        Session::with_observer(config, transport, ())
    }
}

impl<T: Transport, O: Observer> Session<T, O> {
    /// Create a session that reports events to `observer`
    pub fn with_observer(config: Config, transport: T, observer: O) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            config,
            transport,
            observer,
        })
    }

    /// Session configuration
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Borrow the transport
    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Mutably borrow the transport
    pub fn transport_mut(&mut self) -> &mut T {
        &mut self.transport
    }

    /// Mutably borrow the observer
    pub fn observer_mut(&mut self) -> &mut O {
        &mut self.observer
    }

    /// Take the session apart
    pub fn into_parts(self) -> (Config, T, O) {
        (self.config, self.transport, self.observer)
    }

    /// Send a single control code
    pub fn send_control(&mut self, code: u8) -> Result<()> {
        let byte = [parity::add(code, self.config.parity)];
        self.push(&byte)?;
        self.observer.on_send_control(code);
        Ok(())
    }

    /// Wait for a control code within the echo budget
    ///
    /// `None` accepts any control code; `Some(code)` discards everything
    /// else. Bytes that are not control codes are always discarded.
    pub fn wait_control(&mut self, target: Option<u8>) -> Result<u8> {
        self.wait_control_within(target, self.config.timeouts.echo())
    }

    /// Wait for a control code within an explicit budget
    pub fn wait_control_within(&mut self, target: Option<u8>, budget: Duration) -> Result<u8> {
        let deadline = Deadline::after(budget);
        loop {
            let code = parity::remove(self.recv_byte(&deadline)?);
            if !constants::is_control(code) || target.is_some_and(|t| t != code) {
                #[cfg(feature = "logging")]
                debug!("discarding {:#04x} while waiting for control", code);
                continue;
            }
            self.observer.on_receive_control(code);
            return Ok(code);
        }
    }

    /// Send a text frame and wait for it to be acknowledged
    ///
    /// `more` marks the frame as followed by another one.
    pub fn send_text(&mut self, text: impl AsRef<[u8]>, more: bool) -> Result<()> {
        let text = text.as_ref();
        let frame = frame::build(text, &self.config, more)?;

        #[cfg(feature = "logging")]
        debug!("sending {} byte frame (more: {})", frame.len(), more);

        self.with_retries("send", |s| s.send_and_confirm(text, &frame))
    }

    /// Receive a text frame into `buf`, answering ACK or NAK
    ///
    /// `buf` receives the payload followed by a NUL byte, so it must be at
    /// least one byte longer than the text.
    pub fn wait_text(&mut self, buf: &mut [u8]) -> Result<Reception> {
        if buf.is_empty() {
            return Err(TalkError::InvalidArgument(
                "receive buffer has zero capacity".into(),
            ));
        }
        self.with_retries("receive", |s| s.receive_once(buf))
    }

    /// Receive a text frame as a `String`
    ///
    /// Invalid UTF-8 is replaced. The flag is true when another frame
    /// follows.
    pub fn wait_string(&mut self) -> Result<(String, bool)> {
        let mut buf = vec![0u8; self.config.max_frame_size];
        let reception = self.wait_text(&mut buf)?;
        let text = String::from_utf8_lossy(&buf[..reception.len]).into_owned();
        Ok((text, reception.more))
    }

    fn with_retries<R>(
        &mut self,
        op: &str,
        mut attempt: impl FnMut(&mut Self) -> Result<R>,
    ) -> Result<R> {
        let attempts = self.config.attempts();
        let mut last = TalkError::Timeout;

        for n in 1..=attempts {
            match attempt(self) {
                Ok(value) => return Ok(value),
                Err(e) if e.is_terminal() => {
                    #[cfg(feature = "logging")]
                    warn!("{} aborted on attempt {}: {}", op, n, e);
                    return Err(e);
                }
                Err(e) => {
                    #[cfg(feature = "logging")]
                    warn!("{} attempt {}/{} failed: {}", op, n, attempts, e);
                    last = e;
                }
            }
        }

        Err(last)
    }

    fn send_and_confirm(&mut self, text: &[u8], frame: &[u8]) -> Result<()> {
        self.push(frame)?;
        self.observer.on_send_text(text);

        let echo = self.wait_control(None)?;
        if echo == self.config.control.eot {
            return Err(TalkError::Terminated);
        }
        if echo != self.config.control.ack {
            return Err(TalkError::BadExchange(Fault::UnexpectedEcho(echo)));
        }
        Ok(())
    }

    fn receive_once(&mut self, buf: &mut [u8]) -> Result<Reception> {
        let mut reply = EchoReply::new(self);
        let reception = reply.session.receive_and_extract(buf)?;
        reply.accept();
        Ok(reception)
    }

    fn receive_and_extract(&mut self, buf: &mut [u8]) -> Result<Reception> {
        let frame = self.recv_frame()?;
        frame::verify(&frame, &self.config)?;

        let more = frame::has_continue(&frame, &self.config);
        let len = frame::extract_text(&frame, &self.config, buf)?;

        #[cfg(feature = "logging")]
        debug!("received {} byte frame (more: {})", frame.len(), more);

        self.observer.on_receive_text(&buf[..len]);
        Ok(Reception { len, more })
    }

    /// Collect one raw frame: skip to START, read to the terminator, then
    /// take the checksum byte if enabled
    fn recv_frame(&mut self) -> Result<Bytes> {
        let deadline = Deadline::after(self.config.timeouts.response());
        let mode = self.config.parity;
        let start = parity::add(self.config.control.start, mode);
        let end = parity::add(self.config.control.end, mode);
        let cont = parity::add(self.config.control.cont, mode);

        let mut frame = FrameBuf::with_capacity(self.config.max_frame_size);

        loop {
            let byte = self.recv_byte(&deadline)?;
            if byte == start {
                frame.push(byte)?;
                break;
            }
        }

        loop {
            let byte = self.recv_byte(&deadline)?;
            frame.push(byte)?;
            if byte == end || byte == cont {
                break;
            }
        }

        if self.config.checksum {
            let byte = self.recv_byte(&deadline)?;
            frame.push(byte)?;
        }

        Ok(frame.freeze())
    }

    /// Push every byte of `data`, tolerating partial writes
    fn push(&mut self, data: &[u8]) -> Result<()> {
        let deadline = Deadline::after(self.config.timeouts.send());
        let mut rest = data;
        while !rest.is_empty() {
            if deadline.expired() {
                return Err(TalkError::Timeout);
            }
            let sent = progress(self.transport.send(rest))?;
            if sent > rest.len() {
                return Err(TalkError::StreamFailure(format!(
                    "transport reported {} bytes sent of {}",
                    sent,
                    rest.len()
                )));
            }
            if sent == 0 {
                thread::sleep(POLL_INTERVAL);
            } else {
                rest = &rest[sent..];
            }
        }
        Ok(())
    }

    /// Poll for one byte until `deadline`
    fn recv_byte(&mut self, deadline: &Deadline) -> Result<u8> {
        let mut byte = [0u8; 1];
        while !deadline.expired() {
            match progress(self.transport.recv(&mut byte))? {
                0 => thread::sleep(POLL_INTERVAL),
                1 => return Ok(byte[0]),
                n => {
                    return Err(TalkError::StreamFailure(format!(
                        "transport reported {} bytes received into 1",
                        n
                    )))
                }
            }
        }
        Err(TalkError::Timeout)
    }
}

/// Sends the echo for a receive attempt when dropped
///
/// Starts out as NAK; only [`EchoReply::accept`] turns it into ACK, so every
/// early return answers negatively.
struct EchoReply<'a, T: Transport, O: Observer> {
    session: &'a mut Session<T, O>,
    echo: u8,
}

impl<'a, T: Transport, O: Observer> EchoReply<'a, T, O> {
    fn new(session: &'a mut Session<T, O>) -> Self {
        let echo = session.config.control.nak;
        Self { session, echo }
    }

    fn accept(&mut self) {
        self.echo = self.session.config.control.ack;
    }
}

impl<T: Transport, O: Observer> Drop for EchoReply<'_, T, O> {
    fn drop(&mut self) {
        if let Err(_e) = self.session.send_control(self.echo) {
            #[cfg(feature = "logging")]
            warn!("failed to send echo {:#04x}: {}", self.echo, _e);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mem::MemoryLink;
    use crate::parity::Parity;

    fn fast() -> Config {
        Config::default().with_timeouts(20, 20, 40)
    }

    #[derive(Default)]
    struct Recorder {
        sent_controls: Vec<u8>,
        received_controls: Vec<u8>,
        sent_texts: Vec<Vec<u8>>,
        received_texts: Vec<Vec<u8>>,
    }

    impl Observer for Recorder {
        fn on_send_control(&mut self, code: u8) {
            self.sent_controls.push(code);
        }
        fn on_receive_control(&mut self, code: u8) {
            self.received_controls.push(code);
        }
        fn on_send_text(&mut self, text: &[u8]) {
            self.sent_texts.push(text.to_vec());
        }
        fn on_receive_text(&mut self, text: &[u8]) {
            self.received_texts.push(text.to_vec());
        }
    }

    #[test]
    fn test_new_rejects_invalid_config() {
        let (a, _b) = MemoryLink::pair();
        let mut config = fast();
        config.control.ack = b'Y';
        assert!(matches!(
            Session::new(config, a),
            Err(TalkError::InvalidConfig(_))
        ));
    }

    #[test]
    fn test_send_control_applies_parity() {
        let (a, b) = MemoryLink::pair();
        let mut session = Session::with_observer(
            fast().with_parity(Parity::Odd),
            a,
            Recorder::default(),
        )
        .unwrap();

        session.send_control(0x06).unwrap();
        // 0x06 has two bits set, odd parity adds the high bit
        assert_eq!(b.drain(), vec![0x86]);
        assert_eq!(session.observer_mut().sent_controls, vec![0x06]);
    }

    #[test]
    fn test_wait_control_filters() {
        let (a, mut b) = MemoryLink::pair();
        let mut session = Session::new(fast(), a).unwrap();

        b.send(b"xy\x15\x06").unwrap();
        assert_eq!(session.wait_control(Some(0x06)).unwrap(), 0x06);

        b.send(b"z\x04").unwrap();
        assert_eq!(session.wait_control(None).unwrap(), 0x04);
    }

    #[test]
    fn test_wait_control_strips_parity() {
        let (a, mut b) = MemoryLink::pair();
        let mut session = Session::new(fast().with_parity(Parity::Even), a).unwrap();

        b.send(&[parity::add(0x15, Parity::Even)]).unwrap();
        assert_eq!(session.wait_control(None).unwrap(), 0x15);
    }

    #[test]
    fn test_wait_control_times_out() {
        let (a, _b) = MemoryLink::pair();
        let mut session = Session::new(fast(), a).unwrap();
        assert_eq!(session.wait_control(None), Err(TalkError::Timeout));
    }

    #[test]
    fn test_send_text_acknowledged() {
        let (a, mut b) = MemoryLink::pair();
        let mut session = Session::with_observer(fast(), a, Recorder::default()).unwrap();

        b.send(&[0x06]).unwrap();
        session.send_text("A1", false).unwrap();

        assert_eq!(b.drain(), vec![0x02, b'A', b'1', 0x03, 0x73]);
        let rec = session.observer_mut();
        assert_eq!(rec.sent_texts, vec![b"A1".to_vec()]);
        assert_eq!(rec.received_controls, vec![0x06]);
    }

    #[test]
    fn test_send_text_resends_after_nak() {
        let (a, mut b) = MemoryLink::pair();
        let mut session = Session::new(fast(), a).unwrap();

        b.send(&[0x15, 0x06]).unwrap();
        session.send_text("A1", false).unwrap();

        let frame = [0x02, b'A', b'1', 0x03, 0x73];
        assert_eq!(b.drain(), [frame, frame].concat());
    }

    #[test]
    fn test_send_text_too_long() {
        let (a, b) = MemoryLink::pair();
        let mut config = fast();
        config.max_frame_size = 8;
        let mut session = Session::new(config, a).unwrap();

        assert!(matches!(
            session.send_text("123456", false),
            Err(TalkError::BufferTooSmall { needed: 9, .. })
        ));
        assert_eq!(b.available(), 0);
    }

    #[test]
    fn test_wait_text_acknowledges() {
        let (a, mut b) = MemoryLink::pair();
        let mut session = Session::with_observer(fast(), a, Recorder::default()).unwrap();

        b.send(&[0x02, b'A', b'1', 0x03, 0x73]).unwrap();
        let mut buf = [0u8; 16];
        let reception = session.wait_text(&mut buf).unwrap();

        assert_eq!(reception, Reception { len: 2, more: false });
        assert_eq!(&buf[..2], b"A1");
        assert_eq!(b.drain(), vec![0x06]);
        assert_eq!(session.observer_mut().received_texts, vec![b"A1".to_vec()]);
    }

    #[test]
    fn test_wait_text_skips_noise_before_start() {
        let (a, mut b) = MemoryLink::pair();
        let mut session = Session::new(fast(), a).unwrap();

        b.send(b"noise\x06").unwrap();
        b.send(&[0x02, b'A', b'1', 0x03, 0x73]).unwrap();
        let (text, more) = session.wait_string().unwrap();

        assert_eq!(text, "A1");
        assert!(!more);
    }

    #[test]
    fn test_wait_text_rejects_empty_buffer() {
        let (a, b) = MemoryLink::pair();
        let mut session = Session::new(fast(), a).unwrap();

        assert!(matches!(
            session.wait_text(&mut []),
            Err(TalkError::InvalidArgument(_))
        ));
        assert_eq!(b.available(), 0);
    }

    #[test]
    fn test_wait_text_small_buffer_naks_every_attempt() {
        let (a, mut b) = MemoryLink::pair();
        let mut session = Session::new(fast().with_max_retries(1), a).unwrap();

        let frame = [0x02, b'A', b'1', 0x03, 0x73];
        b.send(&[frame, frame].concat()).unwrap();
        let mut buf = [0u8; 2];

        assert_eq!(
            session.wait_text(&mut buf),
            Err(TalkError::BufferTooSmall {
                needed: 3,
                capacity: 2
            })
        );
        assert_eq!(b.drain(), vec![0x15, 0x15]);
    }
}
