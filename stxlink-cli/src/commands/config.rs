use anyhow::{Context, Result};
use std::fs;
use stxlink_core::Config;
use tracing::info;

/// Default configuration as pretty JSON
pub fn default_json() -> Result<String> {
    serde_json::to_string_pretty(&Config::default()).context("Failed to serialize configuration")
}

pub fn execute(output: Option<&str>) -> Result<()> {
    let json = default_json()?;

    match output {
        Some(path) => {
            fs::write(path, json.as_bytes())
                .with_context(|| format!("Failed to write config file: {}", path))?;
            info!("Wrote default configuration to {}", path);
        }
        None => println!("{}", json),
    }

    Ok(())
}
