//! LEB128 variable-length unsigned integers.
//!
//! Seven data bits per byte, least significant group first, high bit set on
//! every byte except the last. Only the minimal encoding of a value is
//! accepted on decode, so each value has exactly one byte representation and
//! length prefixes built from it are unambiguous.

use thiserror::Error;

/// Longest possible encoding of a `u64`.
pub const MAX_VARINT_LEN: usize = 10;

const CONTINUATION_BIT: u8 = 0x80;
const DATA_MASK: u8 = 0x7F;

/// Errors produced by the varint primitive.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum VarintError {
    /// Input ended before a terminating byte was seen.
    #[error("varint truncated")]
    Truncated,

    /// Encoding carries more than 64 significant bits.
    #[error("varint does not fit in 64 bits")]
    Overflow,

    /// Encoding has a redundant trailing zero group.
    #[error("non-canonical varint: value could be encoded in fewer bytes")]
    NonCanonical,

    /// Output buffer cannot hold the encoding.
    #[error("buffer too small: need {needed} bytes, have {available}")]
    BufferTooSmall {
        /// Bytes the encoding occupies.
        needed: usize,
        /// Bytes available in the output buffer.
        available: usize,
    },
}

/// Number of bytes `value` occupies once encoded.
#[inline]
pub const fn encoded_len(value: u64) -> usize {
    if value == 0 {
        1
    } else {
        let bits = 64 - value.leading_zeros() as usize;
        bits.div_ceil(7)
    }
}

/// Encode `value` into the front of `out`, returning the bytes written.
///
/// Nothing is written when `out` is too short.
pub fn encode(mut value: u64, out: &mut [u8]) -> Result<usize, VarintError> {
    let needed = encoded_len(value);
    if out.len() < needed {
        return Err(VarintError::BufferTooSmall {
            needed,
            available: out.len(),
        });
    }
    for slot in out.iter_mut().take(needed - 1) {
        *slot = (value as u8 & DATA_MASK) | CONTINUATION_BIT;
        value >>= 7;
    }
    out[needed - 1] = value as u8;
    Ok(needed)
}

/// Append the encoding of `value` to `buf`.
pub fn encode_to_vec(mut value: u64, buf: &mut Vec<u8>) {
    while value >= u64::from(CONTINUATION_BIT) {
        buf.push((value as u8 & DATA_MASK) | CONTINUATION_BIT);
        value >>= 7;
    }
    buf.push(value as u8);
}

/// Decode one varint from the front of `buf`.
///
/// Returns the value and the number of bytes consumed. Never reads past
/// `buf.len()`.
pub fn decode(buf: &[u8]) -> Result<(u64, usize), VarintError> {
    let mut result: u64 = 0;
    for (i, &byte) in buf.iter().take(MAX_VARINT_LEN).enumerate() {
        let payload = byte & DATA_MASK;
        if i == MAX_VARINT_LEN - 1 && (payload > 1 || byte & CONTINUATION_BIT != 0) {
            return Err(VarintError::Overflow);
        }
        result |= u64::from(payload) << (7 * i);
        if byte & CONTINUATION_BIT == 0 {
            if i > 0 && payload == 0 {
                return Err(VarintError::NonCanonical);
            }
            return Ok((result, i + 1));
        }
    }
    Err(VarintError::Truncated)
}
