//! Cross-language test vectors for polyadicts.
//!
//! These vectors pin the wire format so other implementations can check
//! themselves against the same bytes.

use serde::{Deserialize, Serialize};

use crate::hex::{hex_decode, hex_encode, HexError};

/// What a vector exercises.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VectorKind {
    /// A polyad: `items_hex` are payloads.
    Polyad,
    /// A polyid: `values` are the integers.
    Polyid,
}

/// A test vector that can be shared across languages.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TestVector {
    /// Unique identifier for this vector.
    pub id: String,
    /// Human-readable description.
    pub description: String,
    /// Container kind.
    pub kind: VectorKind,
    /// Polyad payloads (hex-encoded).
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub items_hex: Vec<String>,
    /// Polyid values.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub values: Vec<u64>,
    /// Encoded buffer (hex-encoded).
    pub encoded_hex: String,
    /// Expected error kind when decoding `encoded_hex` (if this should fail).
    pub expected_error: Option<String>,
}

impl TestVector {
    fn polyad(id: &str, description: &str, items: &[&[u8]]) -> Self {
        let mut encoded = Vec::new();
        for item in items {
            polyadicts_codec::varint::encode_to_vec(item.len() as u64, &mut encoded);
        }
        for item in items {
            encoded.extend_from_slice(item);
        }
        Self {
            id: id.into(),
            description: description.into(),
            kind: VectorKind::Polyad,
            items_hex: items.iter().map(|item| hex_encode(item)).collect(),
            values: Vec::new(),
            encoded_hex: hex_encode(&encoded),
            expected_error: None,
        }
    }

    fn polyid(id: &str, description: &str, values: &[u64], encoded_hex: &str) -> Self {
        Self {
            id: id.into(),
            description: description.into(),
            kind: VectorKind::Polyid,
            items_hex: Vec::new(),
            values: values.to_vec(),
            encoded_hex: encoded_hex.into(),
            expected_error: None,
        }
    }

    fn rejected(id: &str, description: &str, kind: VectorKind, encoded_hex: &str, error: &str) -> Self {
        Self {
            id: id.into(),
            description: description.into(),
            kind,
            items_hex: Vec::new(),
            values: Vec::new(),
            encoded_hex: encoded_hex.into(),
            expected_error: Some(error.into()),
        }
    }

    /// Decoded payloads of a polyad vector.
    pub fn items(&self) -> Result<Vec<Vec<u8>>, HexError> {
        self.items_hex.iter().map(|item| hex_decode(item)).collect()
    }

    /// Decoded encoded buffer.
    pub fn encoded(&self) -> Result<Vec<u8>, HexError> {
        hex_decode(&self.encoded_hex)
    }
}

/// Polyad encoding test vectors.
pub fn polyad_vectors() -> Vec<TestVector> {
    let long = [0x5a; 128];
    vec![
        TestVector::polyad("polyad_empty", "Zero items: empty header, empty payload", &[]),
        TestVector::polyad("polyad_single_empty", "One zero-length item", &[b""]),
        TestVector::polyad(
            "polyad_concrete",
            "Items [0x41], [], [0x01, 0x02]",
            &[&[0x41], b"", &[0x01, 0x02]],
        ),
        TestVector::polyad("polyad_two_empty", "Two zero-length items", &[b"", b""]),
        TestVector::polyad(
            "polyad_two_byte_prefix",
            "A 128-byte item needs a two-byte length prefix",
            &[&long, b"z"],
        ),
        TestVector::rejected(
            "polyad_truncated_prefix",
            "Dangling continuation byte in the header",
            VectorKind::Polyad,
            "80",
            "truncated",
        ),
        TestVector::rejected(
            "polyad_overlong_claim",
            "Length prefix claims more bytes than remain",
            VectorKind::Polyad,
            "0341",
            "invalid_layout",
        ),
        TestVector::rejected(
            "polyad_non_canonical_prefix",
            "Length prefix with a redundant zero group",
            VectorKind::Polyad,
            "8000",
            "invalid_layout",
        ),
    ]
}

/// Polyid encoding test vectors.
pub fn polyid_vectors() -> Vec<TestVector> {
    vec![
        TestVector::polyid("polyid_empty", "Empty tuple", &[], ""),
        TestVector::polyid("polyid_small", "Values 1, 0, 2", &[1, 0, 2], "010002"),
        TestVector::polyid("polyid_300", "Value 300", &[300], "ac02"),
        TestVector::polyid(
            "polyid_u64_max",
            "Value u64::MAX takes ten bytes",
            &[u64::MAX],
            "ffffffffffffffffff01",
        ),
        TestVector::rejected(
            "polyid_truncated",
            "Trailing continuation byte",
            VectorKind::Polyid,
            "0580",
            "truncated",
        ),
        TestVector::rejected(
            "polyid_overflow",
            "Tenth byte carries bits beyond 64",
            VectorKind::Polyid,
            "ffffffffffffffffff02",
            "overflow",
        ),
    ]
}

/// Export all test vectors as JSON for cross-language testing.
pub fn all_vectors_json() -> String {
    let mut vectors = polyad_vectors();
    vectors.extend(polyid_vectors());
    serde_json::to_string_pretty(&vectors).expect("Failed to serialize vectors")
}

/// Classifies an error the same way `expected_error` does.
pub fn error_kind(err: &polyadicts_codec::PolyadError) -> &'static str {
    use polyadicts_codec::{PolyadError, VarintError};
    match err {
        PolyadError::Truncated => "truncated",
        PolyadError::InvalidLayout { .. } => "invalid_layout",
        PolyadError::Varint(VarintError::Overflow) => "overflow",
        PolyadError::Varint(VarintError::NonCanonical) => "non_canonical",
        PolyadError::RankMismatch { .. } => "rank_mismatch",
        PolyadError::SizeLimitExceeded { .. } => "size_limit_exceeded",
        _ => "other",
    }
}
