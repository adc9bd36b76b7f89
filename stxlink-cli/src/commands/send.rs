use anyhow::{bail, Context, Result};
use std::net::TcpStream;
use stxlink_core::{Config, Session, StreamLink, TracingObserver};
use tracing::info;

/// Send `texts` to a listening peer as one message
///
/// Every text but the last is marked as continued.
pub fn transmit(addr: &str, texts: &[String], config: &Config) -> Result<()> {
    if texts.is_empty() {
        bail!("Nothing to send");
    }

    let stream =
        TcpStream::connect(addr).with_context(|| format!("Failed to connect to {}", addr))?;
    stream
        .set_nonblocking(true)
        .context("Failed to switch stream to non-blocking mode")?;
    let _ = stream.set_nodelay(true);

    let mut session =
        Session::with_observer(config.clone(), StreamLink::new(stream), TracingObserver)
            .context("Failed to open session")?;

    let last = texts.len() - 1;
    for (i, text) in texts.iter().enumerate() {
        session
            .send_text(text, i < last)
            .with_context(|| format!("Failed to send frame {} of {}", i + 1, texts.len()))?;
    }

    info!("Sent {} frame(s) to {}", texts.len(), addr);
    Ok(())
}

pub fn execute(addr: &str, texts: &[String], config: &Config) -> Result<()> {
    transmit(addr, texts, config)?;
    println!("Delivered {} frame(s) to {}", texts.len(), addr);
    Ok(())
}
