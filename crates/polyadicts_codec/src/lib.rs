//! # Polyadicts Codec
//!
//! Compact, length-prefixed containers for tuples of byte segments.
//!
//! A **polyad** packs `n` opaque byte segments into one buffer:
//!
//! ```text
//! varint(len_0) || ... || varint(len_n-1) || item_0 || ... || item_n-1
//! ```
//!
//! The item count is not stored; loading recovers it by scanning the header
//! until it meets the payload region. Loaded and finished containers hand out
//! zero-copy views into their single backing buffer.
//!
//! A **polyid** packs `n` unsigned integers as back-to-back varints.
//!
//! ## Usage
//!
//! ```
//! use polyadicts_codec::Polyad;
//!
//! // Build
//! let mut pack = Polyad::prepare(3).unwrap();
//! pack.set(0, &b"A"[..]).unwrap();
//! pack.set(2, vec![0x01u8, 0x02]).unwrap();
//! pack.finish().unwrap();
//! assert_eq!(pack.whole_view().unwrap(), &[0x01, 0x00, 0x02, 0x41, 0x01, 0x02]);
//!
//! // Load back
//! let bytes = pack.whole_view().unwrap().to_vec();
//! let loaded = Polyad::load(&bytes).unwrap();
//! assert_eq!(loaded.rank(), 3);
//! assert_eq!(loaded.item_view(2).unwrap(), &[0x01, 0x02]);
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]

mod config;
mod error;
pub mod layout;
mod polyad;
mod polyid;
mod segment;
mod source;
pub mod varint;

pub use config::Limits;
pub use error::{PolyadError, PolyadResult, Rejected};
pub use layout::{Layout, LayoutCursor, Span};
pub use polyad::Polyad;
pub use polyid::Polyid;
pub use segment::Segment;
pub use source::Backing;
pub use varint::VarintError;

/// Types that pack themselves into a polyad.
pub trait Encode {
    /// Pack this value into a sealed polyad.
    fn encode(&self) -> PolyadResult<Polyad<'_>>;
}

/// Types that can be read back out of a polyad.
pub trait Decode: Sized {
    /// Read this value from a loaded polyad.
    fn decode(polyad: &Polyad<'_>) -> PolyadResult<Self>;
}

impl<T: AsRef<[u8]>> Encode for [T] {
    fn encode(&self) -> PolyadResult<Polyad<'_>> {
        Polyad::from_segments(self.iter().map(AsRef::<[u8]>::as_ref))
    }
}

impl Decode for Vec<Vec<u8>> {
    fn decode(polyad: &Polyad<'_>) -> PolyadResult<Self> {
        Ok(polyad.iter().map(<[u8]>::to_vec).collect())
    }
}

impl Encode for Polyid<'_> {
    fn encode(&self) -> PolyadResult<Polyad<'_>> {
        Polyad::from_segments([self.as_bytes()])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn roundtrip_slices() {
        let items: Vec<Vec<u8>> = vec![b"alpha".to_vec(), Vec::new(), vec![0u8; 200]];
        let pack = items.encode().unwrap();
        let bytes = pack.whole_view().unwrap().to_vec();
        let loaded = Polyad::load(&bytes).unwrap();
        assert_eq!(Vec::<Vec<u8>>::decode(&loaded).unwrap(), items);
    }

    #[test]
    fn roundtrip_strings() {
        let items = ["one", "two", "three"];
        let pack = items.encode().unwrap();
        assert_eq!(pack.rank(), 3);
        assert_eq!(pack.item_view(2).unwrap(), b"three");
    }

    #[test]
    fn nested_polyid() {
        let ids = Polyid::new(&[7, 300]).unwrap();
        let pack = ids.encode().unwrap();
        let inner = Polyid::load(pack.item_view(0).unwrap()).unwrap();
        assert_eq!(inner.values(), &[7, 300]);
    }

    #[test]
    fn roundtrip_empty() {
        let items: [&[u8]; 0] = [];
        let pack = items.encode().unwrap();
        assert_eq!(pack.rank(), 0);
        assert!(pack.whole_view().unwrap().is_empty());
        assert!(Vec::<Vec<u8>>::decode(&pack).unwrap().is_empty());
    }
}
