use anyhow::{Context, Result};
use std::net::TcpListener;
use stxlink_core::{Config, Session, StreamLink, TracingObserver};
use tracing::info;

/// Accept one peer and collect frames until one arrives without the
/// continue flag
pub fn serve(listener: &TcpListener, config: &Config) -> Result<Vec<String>> {
    let (stream, peer) = listener.accept().context("Failed to accept connection")?;
    info!("Accepted connection from {}", peer);

    stream
        .set_nonblocking(true)
        .context("Failed to switch stream to non-blocking mode")?;
    let _ = stream.set_nodelay(true);

    let mut session =
        Session::with_observer(config.clone(), StreamLink::new(stream), TracingObserver)
            .context("Failed to open session")?;

    let mut texts = Vec::new();
    loop {
        let (text, more) = session
            .wait_string()
            .with_context(|| format!("Failed to receive frame {}", texts.len() + 1))?;
        texts.push(text);
        if !more {
            break;
        }
    }

    info!("Received {} frame(s) from {}", texts.len(), peer);
    Ok(texts)
}

pub fn execute(bind: &str, config: &Config) -> Result<()> {
    let listener =
        TcpListener::bind(bind).with_context(|| format!("Failed to bind {}", bind))?;
    info!("Listening on {}", listener.local_addr()?);

    for text in serve(&listener, config)? {
        println!("{}", text);
    }

    Ok(())
}
