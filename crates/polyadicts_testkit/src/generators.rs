//! Property-based test generators using proptest.
//!
//! Provides strategies for segment lists, ownership mixes and encoded
//! buffers that maintain the polyad layout invariants.

use polyadicts_codec::{varint, Polyad, Segment};
use proptest::prelude::*;

/// How a generated payload is handed to the builder.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Ownership {
    /// Lent as a borrowed slice.
    Borrowed,
    /// Moved in as an owned `Vec`.
    Owned,
    /// Moved in as reference-counted `Bytes`.
    Shared,
}

impl Ownership {
    /// Wraps `data` in a segment with this ownership.
    pub fn segment<'a>(self, data: &'a [u8]) -> Segment<'a> {
        match self {
            Ownership::Borrowed => Segment::Borrowed(data),
            Ownership::Owned => Segment::Owned(data.to_vec()),
            Ownership::Shared => Segment::Shared(bytes::Bytes::copy_from_slice(data)),
        }
    }
}

/// Strategy for a single payload, biased towards empty and varint-boundary
/// lengths.
pub fn payload_strategy() -> impl Strategy<Value = Vec<u8>> {
    prop_oneof![
        4 => prop::collection::vec(any::<u8>(), 0..32),
        1 => Just(Vec::new()),
        1 => prop::collection::vec(any::<u8>(), 127..130),
        1 => prop::collection::vec(any::<u8>(), 16_383..16_386),
    ]
}

/// Strategy for an ordered list of payloads.
pub fn segments_strategy(max_items: usize) -> impl Strategy<Value = Vec<Vec<u8>>> {
    prop::collection::vec(payload_strategy(), 0..=max_items)
}

/// Strategy for an ownership mode.
pub fn ownership_strategy() -> impl Strategy<Value = Ownership> {
    prop_oneof![
        Just(Ownership::Borrowed),
        Just(Ownership::Owned),
        Just(Ownership::Shared),
    ]
}

/// Strategy for payloads paired with the ownership each is handed over with.
pub fn owned_segments_strategy(
    max_items: usize,
) -> impl Strategy<Value = Vec<(Vec<u8>, Ownership)>> {
    prop::collection::vec((payload_strategy(), ownership_strategy()), 0..=max_items)
}

/// Strategy for a valid encoded polyad together with its items.
pub fn encoded_polyad_strategy(max_items: usize) -> impl Strategy<Value = (Vec<Vec<u8>>, Vec<u8>)> {
    segments_strategy(max_items).prop_map(|items| {
        let encoded = encode_reference(&items);
        (items, encoded)
    })
}

/// Strategy for polyid values, biased towards varint width boundaries.
pub fn polyid_values_strategy(max_len: usize) -> impl Strategy<Value = Vec<u64>> {
    prop::collection::vec(
        prop_oneof![
            3 => any::<u64>(),
            1 => 0u64..256,
            1 => prop::sample::select(vec![0, 127, 128, 16_383, 16_384, u64::MAX]),
        ],
        0..=max_len,
    )
}

/// Straight-line reference encoder used to cross-check the builder.
pub fn encode_reference(items: &[Vec<u8>]) -> Vec<u8> {
    let mut out = Vec::new();
    for item in items {
        varint::encode_to_vec(item.len() as u64, &mut out);
    }
    for item in items {
        out.extend_from_slice(item);
    }
    out
}

/// Builds a sealed polyad with the given ownership per item.
pub fn build_polyad<'a>(items: &'a [(Vec<u8>, Ownership)]) -> Polyad<'a> {
    let mut pack = Polyad::prepare(items.len()).expect("prepare failed");
    for (index, (data, ownership)) in items.iter().enumerate() {
        pack.set(index, ownership.segment(data)).expect("set failed");
    }
    pack.finish().expect("finish failed");
    pack
}

/// Configuration for property tests.
#[derive(Debug, Clone)]
pub struct PropertyTestConfig {
    /// Number of test cases to run.
    pub cases: u32,
    /// Maximum items per generated container.
    pub max_items: usize,
}

impl Default for PropertyTestConfig {
    fn default() -> Self {
        Self {
            cases: 256,
            max_items: 16,
        }
    }
}

impl PropertyTestConfig {
    /// Converts to a proptest runner configuration.
    pub fn to_proptest_config(&self) -> ProptestConfig {
        ProptestConfig::with_cases(self.cases)
    }
}
