// Binary-Coded Decimal (BCD) encoding/decoding
// Fixed-width, big-endian fields as used by the CAT command frames

use thiserror::Error;

#[derive(Error, Debug, PartialEq, Eq)]
pub enum BcdError {
    #[error("BCD field width must be a positive even digit count, got {0}")]
    InvalidWidth(usize),

    #[error("BCD field of {digits} digits needs {needed} bytes, have {available}")]
    FieldTooShort {
        digits: usize,
        needed: usize,
        available: usize,
    },
}

pub type Result<T> = std::result::Result<T, BcdError>;

/// Largest digit count whose full range fits in a u64
pub const MAX_DIGITS: usize = 18;

fn check_width(digits: usize) -> Result<()> {
    if digits == 0 || digits % 2 != 0 || digits > MAX_DIGITS {
        return Err(BcdError::InvalidWidth(digits));
    }
    Ok(())
}

/// Split a BCD byte into its two decimal digits (tens, ones)
/// Example: 0x12 -> (1, 2), 0x95 -> (9, 5)
///
/// Nibbles above 9 are passed through unchanged.
pub fn bcd_byte_to_digits(byte: u8) -> (u8, u8) {
    (byte >> 4, byte & 0x0F)
}

/// Join two decimal digits into a BCD byte
/// Example: (1, 2) -> 0x12
pub fn digits_to_bcd_byte(tens: u8, ones: u8) -> u8 {
    ((tens & 0x0F) << 4) | (ones & 0x0F)
}

/// Pack `value` into a big-endian BCD field of `digits` decimal digits.
///
/// The result is `digits / 2` bytes, most significant pair first:
/// `pack(14401234, 8)` gives `[0x14, 0x40, 0x12, 0x34]`.
///
/// Values of `10^digits` or more are truncated modulo `10^digits`; callers
/// that cannot accept truncation must range-check first.
pub fn pack(value: u64, digits: usize) -> Result<Vec<u8>> {
    check_width(digits)?;

    let mut result = vec![0u8; digits / 2];
    let mut remaining = value;

    for slot in result.iter_mut().rev() {
        let two_digits = (remaining % 100) as u8;
        remaining /= 100;
        *slot = digits_to_bcd_byte(two_digits / 10, two_digits % 10);
    }

    Ok(result)
}

/// Unpack a big-endian BCD field of `digits` decimal digits from the front
/// of `bytes`.
///
/// Decoding is lenient: a nibble above 9 contributes its raw value, so a
/// corrupted field still yields a number rather than an error.
pub fn unpack(bytes: &[u8], digits: usize) -> Result<u64> {
    check_width(digits)?;

    let needed = digits / 2;
    if bytes.len() < needed {
        return Err(BcdError::FieldTooShort {
            digits,
            needed,
            available: bytes.len(),
        });
    }

    Ok(bytes[..needed].iter().fold(0u64, |value, &byte| {
        let (tens, ones) = bcd_byte_to_digits(byte);
        value * 100 + u64::from(tens) * 10 + u64::from(ones)
    }))
}
