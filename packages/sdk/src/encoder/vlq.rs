//! Signed VLQ Codec
//!
//! Variable-length quantities over the base64 alphabet. The sign lives in
//! bit 0 of the packed quantity; every symbol carries five payload bits and
//! a continuation bit that marks more symbols to come.

use smallvec::SmallVec;

use super::base64;
use crate::error::{Error, Result};

const CONTINUATION: u8 = 32;
const PAYLOAD_MASK: u8 = 31;

/// Encodes one signed value as a VLQ symbol sequence.
pub fn encode(value: i64) -> String {
    let mut out = String::new();
    encode_into(&mut out, value);
    out
}

/// Encodes one signed value, appending to `out`.
///
/// The 128-bit intermediate keeps the sign-shifted magnitude of every
/// `i64` representable, `i64::MIN` included.
pub fn encode_into(out: &mut String, value: i64) {
    let mut quantity = u128::from(value.unsigned_abs()) << 1 | u128::from(value < 0);

    loop {
        let mut digit = (quantity as u8) & PAYLOAD_MASK;
        quantity >>= 5;
        if quantity > 0 {
            digit |= CONTINUATION;
        }
        out.push(base64::symbol(digit));

        if quantity == 0 {
            break;
        }
    }
}

/// Encodes a sequence of values back to back. VLQ symbols are
/// self-delimiting, so no separator is needed.
pub fn encode_all(values: &[i64]) -> String {
    let mut out = String::new();
    for &value in values {
        encode_into(&mut out, value);
    }
    out
}

/// Decodes one value from the front of `input`.
///
/// Returns the value and the number of symbols consumed, so callers can
/// keep decoding the rest of a segment.
pub fn decode(input: &str) -> Result<(i64, usize)> {
    let mut quantity: u128 = 0;
    let mut shift = 0u32;

    for (index, ch) in input.chars().enumerate() {
        let digit = base64::value_of(ch)?;

        if shift > 123 {
            return Err(Error::MalformedVlq("sequence too long"));
        }
        quantity |= u128::from(digit & PAYLOAD_MASK) << shift;

        if digit & CONTINUATION == 0 {
            let magnitude = (quantity >> 1) as i128;
            let signed = if quantity & 1 == 1 {
                -magnitude
            } else {
                magnitude
            };
            let value = i64::try_from(signed)
                .map_err(|_| Error::MalformedVlq("value overflows the signed 64-bit range"))?;
            return Ok((value, index + 1));
        }
        shift += 5;
    }

    Err(Error::MalformedVlq(if input.is_empty() {
        "empty input"
    } else {
        "unterminated sequence"
    }))
}

/// Decodes every field of one comma-delimited mapping segment.
pub(crate) fn decode_segment(segment: &str) -> Result<SmallVec<[i64; 5]>> {
    if segment.is_empty() {
        return Err(Error::MalformedVlq("empty segment"));
    }

    let mut fields = SmallVec::new();
    let mut rest = segment;
    while !rest.is_empty() {
        let (value, consumed) = decode(rest)?;
        fields.push(value);
        rest = &rest[consumed..];
    }
    Ok(fields)
}
