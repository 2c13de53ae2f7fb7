//! Base64 Alphabet
//!
//! The 64-symbol table shared by the VLQ codec and the plain string codec,
//! plus whole-string base64 for data-URL payloads.

use once_cell::sync::Lazy;

use crate::error::{Error, Result};

/// Symbols 0-63: A-Z, a-z, 0-9, + and /.
pub(crate) const ALPHABET: &[u8; 64] =
    b"ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz0123456789+/";

/// Inverse of `ALPHABET`; -1 marks characters outside the alphabet.
static REVERSE: Lazy<[i8; 128]> = Lazy::new(|| {
    let mut table = [-1i8; 128];
    for (value, &symbol) in ALPHABET.iter().enumerate() {
        table[symbol as usize] = value as i8;
    }
    table
});

/// Returns the symbol for a 6-bit value. Values are masked to 0-63.
pub(crate) fn symbol(value: u8) -> char {
    ALPHABET[(value & 63) as usize] as char
}

/// Returns the 6-bit value of an alphabet symbol.
pub fn value_of(symbol: char) -> Result<u8> {
    let index = symbol as usize;
    if index < 128 && REVERSE[index] >= 0 {
        Ok(REVERSE[index] as u8)
    } else {
        Err(Error::InvalidSymbol(symbol))
    }
}

/// Encodes bytes as standard base64 with `=` padding.
pub fn encode(bytes: &[u8]) -> String {
    let mut out = String::with_capacity(bytes.len().div_ceil(3) * 4);

    for chunk in bytes.chunks(3) {
        let b0 = chunk[0];
        let b1 = chunk.get(1).copied();
        let b2 = chunk.get(2).copied();

        out.push(symbol(b0 >> 2));
        out.push(symbol((b0 & 3) << 4 | b1.unwrap_or(0) >> 4));
        out.push(match b1 {
            Some(b1) => symbol((b1 & 15) << 2 | b2.unwrap_or(0) >> 6),
            None => '=',
        });
        out.push(match b2 {
            Some(b2) => symbol(b2 & 63),
            None => '=',
        });
    }

    out
}

/// Decodes standard base64. Stops at the first `=` padding character.
pub fn decode(input: &str) -> Result<Vec<u8>> {
    let mut out = Vec::with_capacity(input.len() / 4 * 3);
    let mut buffer = 0u32;
    let mut bits = 0u32;

    for ch in input.chars() {
        if ch == '=' {
            break;
        }
        buffer = buffer << 6 | u32::from(value_of(ch)?);
        bits += 6;
        if bits >= 8 {
            bits -= 8;
            out.push((buffer >> bits) as u8);
        }
    }

    Ok(out)
}
