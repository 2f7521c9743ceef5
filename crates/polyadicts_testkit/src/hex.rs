//! Hex text for golden files and test vectors.

use std::fmt::Write;

use thiserror::Error;

/// Errors from [`hex_decode`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum HexError {
    /// The digits do not pair up into bytes.
    #[error("hex text has an odd number of digits ({0})")]
    OddLength(usize),

    /// A character that is not a hex digit.
    #[error("invalid hex digit {digit:?} at digit {position}")]
    InvalidDigit {
        /// The offending character.
        digit: char,
        /// Index among the non-whitespace characters.
        position: usize,
    },
}

/// Lowercase hex, two digits per byte, no separators.
pub fn hex_encode(bytes: &[u8]) -> String {
    let mut out = String::with_capacity(bytes.len() * 2);
    for byte in bytes {
        let _ = write!(out, "{byte:02x}");
    }
    out
}

/// Parses hex text. Whitespace between digits is ignored.
pub fn hex_decode(text: &str) -> Result<Vec<u8>, HexError> {
    let digits: Vec<char> = text.chars().filter(|c| !c.is_whitespace()).collect();
    if digits.len() % 2 != 0 {
        return Err(HexError::OddLength(digits.len()));
    }

    let nibble = |position: usize| {
        let digit = digits[position];
        digit
            .to_digit(16)
            .map(|value| value as u8)
            .ok_or(HexError::InvalidDigit { digit, position })
    };
    (0..digits.len())
        .step_by(2)
        .map(|position| -> Result<u8, HexError> {
            Ok((nibble(position)? << 4) | nibble(position + 1)?)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn encode_is_lowercase_pairs() {
        assert_eq!(hex_encode(&[0x01, 0xab, 0xff]), "01abff");
        assert_eq!(hex_encode(&[]), "");
    }

    #[test]
    fn decode_skips_whitespace() {
        assert_eq!(hex_decode("01 AB\nff").unwrap(), vec![0x01, 0xab, 0xff]);
        assert!(hex_decode("").unwrap().is_empty());
    }

    #[test]
    fn odd_length_is_an_error() {
        assert_eq!(hex_decode("abc"), Err(HexError::OddLength(3)));
    }

    #[test]
    fn bad_digit_is_an_error() {
        assert_eq!(
            hex_decode("0g"),
            Err(HexError::InvalidDigit {
                digit: 'g',
                position: 1
            })
        );
        assert!(matches!(
            hex_decode("é1"),
            Err(HexError::InvalidDigit { position: 0, .. })
        ));
    }
}
