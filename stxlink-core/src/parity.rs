//! Parity bit codec
//!
//! The low seven bits carry the value; the high bit is set so that the
//! population count of the whole byte is odd or even.

use crate::constants::PARITY_BIT;
use serde::{Deserialize, Serialize};

/// Parity policy applied to every framed or control byte
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Parity {
    /// Bytes are sent unchanged
    #[default]
    None,
    /// Total set bits per byte is odd
    Odd,
    /// Total set bits per byte is even
    Even,
}

/// Apply the parity bit for `mode` to a single byte
pub const fn add(byte: u8, mode: Parity) -> u8 {
    let low_odd = (byte & !PARITY_BIT).count_ones() & 1 == 1;
    match mode {
        Parity::None => byte,
        Parity::Odd => {
            if low_odd {
                byte & !PARITY_BIT
            } else {
                byte | PARITY_BIT
            }
        }
        Parity::Even => {
            if low_odd {
                byte | PARITY_BIT
            } else {
                byte & !PARITY_BIT
            }
        }
    }
}

/// Strip the parity bit unconditionally
pub const fn remove(byte: u8) -> u8 {
    byte & !PARITY_BIT
}

/// True if `byte` already satisfies `mode`
pub const fn is_valid(byte: u8, mode: Parity) -> bool {
    match mode {
        Parity::None => true,
        Parity::Odd => byte.count_ones() & 1 == 1,
        Parity::Even => byte.count_ones() & 1 == 0,
    }
}

/// Apply parity to every byte in place
pub fn add_all(bytes: &mut [u8], mode: Parity) {
    if mode == Parity::None {
        return;
    }
    for byte in bytes.iter_mut() {
        *byte = add(*byte, mode);
    }
}

/// Strip parity from every byte in place
pub fn remove_all(bytes: &mut [u8]) {
    for byte in bytes.iter_mut() {
        *byte = remove(*byte);
    }
}

/// Verify every byte satisfies `mode`
pub fn check(bytes: &[u8], mode: Parity) -> bool {
    bytes.iter().all(|&b| is_valid(b, mode))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_none_is_identity() {
        for b in 0..=255u8 {
            assert_eq!(add(b, Parity::None), b);
        }
    }

    #[test]
    fn test_known_values() {
        // 'A' = 0x41 has two bits set
        assert_eq!(add(b'A', Parity::Even), 0x41);
        assert_eq!(add(b'A', Parity::Odd), 0xC1);
        // '1' = 0x31 has three bits set
        assert_eq!(add(b'1', Parity::Even), 0xB1);
        assert_eq!(add(b'1', Parity::Odd), 0x31);
    }

    #[test]
    fn test_add_overrides_stale_high_bit() {
        assert_eq!(add(0xC1, Parity::Even), 0x41);
        assert_eq!(add(0xB1, Parity::Odd), 0x31);
    }

    #[test]
    fn test_add_then_check() {
        for mode in [Parity::None, Parity::Odd, Parity::Even] {
            for b in 0..=127u8 {
                let p = add(b, mode);
                assert!(is_valid(p, mode), "{b:#04x} under {mode:?}");
                assert_eq!(remove(p), b);
            }
        }
    }

    #[test]
    fn test_array_variants() {
        let mut data = *b"A1\x03";
        add_all(&mut data, Parity::Odd);
        assert!(check(&data, Parity::Odd));
        assert!(!check(&data, Parity::Even));
        remove_all(&mut data);
        assert_eq!(&data, b"A1\x03");
        assert!(check(&[], Parity::Even));
    }

    #[test]
    fn test_serde_names() {
        let json = serde_json::to_string(&Parity::Even).unwrap();
        assert_eq!(json, "\"even\"");
        let back: Parity = serde_json::from_str("\"odd\"").unwrap();
        assert_eq!(back, Parity::Odd);
    }
}
