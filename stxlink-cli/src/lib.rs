//! Library entry for stxlink-cli used by integration tests and embedding.

pub mod commands;

// Re-export commands for convenience
pub use commands::*;

use anyhow::{Context, Result};
use std::fs;
use stxlink_core::{Config, Parity};

/// Parity override accepted on the command line
#[derive(Copy, Clone, Debug, PartialEq, Eq, clap::ValueEnum)]
pub enum ParityArg {
    /// No parity bit
    None,
    /// Odd parity
    Odd,
    /// Even parity
    Even,
}

impl From<ParityArg> for Parity {
    fn from(arg: ParityArg) -> Self {
        match arg {
            ParityArg::None => Parity::None,
            ParityArg::Odd => Parity::Odd,
            ParityArg::Even => Parity::Even,
        }
    }
}

/// Load a JSON configuration file, or defaults when no path is given,
/// then apply command-line overrides
pub fn load_config(
    path: Option<&str>,
    parity: Option<ParityArg>,
    no_checksum: bool,
) -> Result<Config> {
    let mut config = match path {
        Some(path) => {
            let content = fs::read_to_string(path)
                .with_context(|| format!("Failed to read config file: {}", path))?;
            serde_json::from_str::<Config>(&content)
                .with_context(|| format!("Failed to parse config file: {}", path))?
        }
        None => Config::default(),
    };

    if let Some(parity) = parity {
        config.parity = parity.into();
    }
    if no_checksum {
        config.checksum = false;
    }

    config.validate().context("Invalid configuration")?;
    Ok(config)
}

/// Parse a hex string, ignoring whitespace, colons and dashes between bytes
pub fn parse_hex(input: &str) -> Result<Vec<u8>> {
    let cleaned: String = input
        .chars()
        .filter(|c| !c.is_whitespace() && *c != ':' && *c != '-')
        .collect();
    hex::decode(&cleaned).with_context(|| format!("Invalid hex input: {}", input))
}
