use anyhow::{Context, Result};
use colored::*;
use serde::Serialize;
use stxlink_core::{frame, Config};
use tracing::{info, warn};

/// Outcome of checking a captured frame
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Report {
    pub size: usize,
    pub integrity: bool,
    pub parity: bool,
    pub checksum: bool,
    pub more: bool,
    /// Present only when the frame passes every check
    pub text: Option<String>,
    /// First failed check, if any
    pub fault: Option<String>,
}

impl Report {
    pub fn is_valid(&self) -> bool {
        self.fault.is_none()
    }
}

/// Run every check against `wire`
pub fn inspect(wire: &[u8], config: &Config) -> Report {
    let fault = frame::verify(wire, config).err().map(|f| f.to_string());

    let text = if fault.is_none() {
        let mut out = vec![0u8; wire.len() + 1];
        frame::extract_text(wire, config, &mut out)
            .ok()
            .map(|len| String::from_utf8_lossy(&out[..len]).into_owned())
    } else {
        None
    };

    Report {
        size: wire.len(),
        integrity: frame::check_integrity(wire, config),
        parity: frame::check_parity(wire, config),
        checksum: frame::check_checksum(wire, config),
        more: frame::has_continue(wire, config),
        text,
        fault,
    }
}

fn mark(ok: bool) -> ColoredString {
    if ok {
        "✓".green()
    } else {
        "✗".red()
    }
}

pub fn execute(hex_input: &str, json: bool, config: &Config) -> Result<()> {
    let wire = crate::parse_hex(hex_input)?;
    info!("Inspecting {} byte frame", wire.len());

    let report = inspect(&wire, config);

    if json {
        let out = serde_json::to_string_pretty(&report).context("Failed to serialize report")?;
        println!("{}", out);
        return Ok(());
    }

    println!("\n=== Frame Checks ===");
    println!("Size:       {} bytes", report.size);
    println!("Integrity:  {}", mark(report.integrity));
    println!("Parity:     {}", mark(report.parity));
    if config.checksum {
        println!("Checksum:   {}", mark(report.checksum));
    } else {
        println!("Checksum:   disabled");
    }

    println!("\n=== Summary ===");
    match (&report.text, &report.fault) {
        (Some(text), _) => {
            let kind = if report.more { "continued" } else { "final" };
            println!("{} Valid {} frame: {:?}", "✓".green(), kind, text);
        }
        (None, Some(fault)) => {
            warn!("Frame rejected: {}", fault);
            println!("{} Frame rejected: {}", "✗".red(), fault);
        }
        (None, None) => println!("{} Frame could not be decoded", "!".yellow()),
    }

    Ok(())
}
