//! Benchmark utilities.

#![warn(missing_docs)]

use rand::Rng;

/// Generate random payload data of the specified size.
pub fn random_data(size: usize) -> Vec<u8> {
    let mut rng = rand::thread_rng();
    (0..size).map(|_| rng.gen()).collect()
}

/// Generate `count` payloads of `size` bytes each.
pub fn generate_items(count: usize, size: usize) -> Vec<Vec<u8>> {
    (0..count).map(|_| random_data(size)).collect()
}

/// Generate `count` values spread across every varint width.
pub fn generate_values(count: usize) -> Vec<u64> {
    let mut rng = rand::thread_rng();
    (0..count)
        .map(|_| {
            let bits = rng.gen_range(0u32..64);
            rng.gen::<u64>() >> bits
        })
        .collect()
}
