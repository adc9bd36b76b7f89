//! Print the wire bytes of a text under each parity and checksum setting

use stxlink_core::{frame, Config, Parity};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let text = std::env::args().nth(1).unwrap_or_else(|| "A1".to_string());

    println!("stxlink Frame Dump for {:?}\n", text);

    for parity in [Parity::None, Parity::Odd, Parity::Even] {
        for checksum in [true, false] {
            let config = Config::default()
                .with_parity(parity)
                .with_checksum(checksum);

            let last = frame::build(text.as_bytes(), &config, false)?;
            let cont = frame::build(text.as_bytes(), &config, true)?;

            println!(
                "{:<6} checksum={:<5}  final: {}  continued: {}",
                format!("{:?}", parity),
                checksum,
                hex::encode(&last),
                hex::encode(&cont)
            );
        }
    }

    Ok(())
}
