use anyhow::{Context, Result};
use stxlink_core::{frame, Config};
use tracing::info;

/// Build a frame and render it as lowercase hex
pub fn build_hex(text: &str, more: bool, config: &Config) -> Result<String> {
    let wire = frame::build(text.as_bytes(), config, more)
        .with_context(|| format!("Failed to build frame for {:?}", text))?;
    Ok(hex::encode(&wire))
}

pub fn execute(text: &str, more: bool, config: &Config) -> Result<()> {
    let encoded = build_hex(text, more, config)?;

    info!(
        "Built {} byte frame (parity: {:?}, checksum: {})",
        encoded.len() / 2,
        config.parity,
        config.checksum
    );

    println!("{}", encoded);
    Ok(())
}
