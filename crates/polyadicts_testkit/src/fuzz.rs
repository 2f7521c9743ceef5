//! Fuzz testing harnesses for polyadicts.
//!
//! These targets can be driven by cargo-fuzz or any other fuzzer. Each one
//! must return normally for every input; a panic is a bug.

use polyadicts_codec::{varint, Layout, Limits, Polyad, Polyid};

/// Fuzz target for polyad loading.
///
/// Every accepted buffer must satisfy the layout invariant and re-encode to
/// the same bytes.
pub fn fuzz_polyad_load(data: &[u8]) {
    let Ok(pack) = Polyad::load(data) else {
        return;
    };

    let payload: usize = pack.iter().map(<[u8]>::len).sum();
    let layout = Layout::scan(data, &Limits::default()).expect("accepted buffer must rescan");
    assert_eq!(layout.header_len() + payload, data.len());
    assert_eq!(layout.rank(), pack.rank());

    let rebuilt = Polyad::from_segments(pack.iter()).expect("re-encode failed");
    assert_eq!(
        rebuilt.whole_view().expect("rebuilt polyad is sealed"),
        data,
        "Roundtrip mismatch"
    );
}

/// Fuzz target for polyid decoding.
pub fn fuzz_polyid_load(data: &[u8]) {
    if let Ok(ids) = Polyid::load(data) {
        let rebuilt = Polyid::new(ids.values()).expect("re-encode failed");
        assert_eq!(rebuilt.as_bytes(), data, "Roundtrip mismatch");
    }
}

/// Fuzz target for the varint primitive.
pub fn fuzz_varint(data: &[u8]) {
    if let Ok((value, consumed)) = varint::decode(data) {
        assert_eq!(consumed, varint::encoded_len(value));
        let mut out = Vec::new();
        varint::encode_to_vec(value, &mut out);
        assert_eq!(out.as_slice(), &data[..consumed]);
    }
}

/// Fuzz target for region loading with offsets taken from the input.
pub fn fuzz_polyad_region(data: &[u8]) {
    if data.len() < 2 {
        return;
    }
    let offset = usize::from(data[0]);
    let len = usize::from(data[1]);
    let _ = Polyad::from_region(&data[2..], offset, len);
}

/// Fuzz target for builder operation sequences.
///
/// Bytes are interpreted as `(index, length)` pairs fed to `set`, followed by
/// `finish`.
pub fn fuzz_builder_ops(data: &[u8]) {
    let Some((&rank, ops)) = data.split_first() else {
        return;
    };
    let rank = usize::from(rank % 16);
    let mut pack = match Polyad::prepare(rank) {
        Ok(pack) => pack,
        Err(_) => return,
    };

    let mut expected = vec![Vec::new(); rank];
    for op in ops.chunks_exact(2) {
        let index = usize::from(op[0] % 20);
        let payload = vec![op[1]; usize::from(op[1] % 8)];
        let result = pack.set(index, payload.clone());
        if index < rank {
            assert!(result.is_ok());
            expected[index] = payload;
        } else {
            assert!(result.is_err());
        }
    }

    pack.finish().expect("finish failed");
    for (index, payload) in expected.iter().enumerate() {
        assert_eq!(pack.item_view(index).expect("item in range"), payload.as_slice());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fuzz_targets_handle_edge_inputs() {
        let inputs: &[&[u8]] = &[
            &[],
            &[0x00],
            &[0x80],
            &[0xff; 12],
            &[0x01, 0x00, 0x02, 0x41, 0x01, 0x02],
            &[0x80, 0x00],
            &[0x03, 0x41],
            &[0x00, 0x00, 0x00],
        ];
        for input in inputs {
            fuzz_polyad_load(input);
            fuzz_polyid_load(input);
            fuzz_varint(input);
            fuzz_polyad_region(input);
            fuzz_builder_ops(input);
        }
    }

    #[test]
    fn fuzz_targets_handle_pseudo_random_inputs() {
        let mut state: u32 = 0x1234_5678;
        for len in 0..200 {
            let input: Vec<u8> = (0..len % 40)
                .map(|_| {
                    state ^= state << 13;
                    state ^= state >> 17;
                    state ^= state << 5;
                    state as u8
                })
                .collect();
            fuzz_polyad_load(&input);
            fuzz_polyid_load(&input);
            fuzz_varint(&input);
            fuzz_polyad_region(&input);
            fuzz_builder_ops(&input);
        }
    }
}
