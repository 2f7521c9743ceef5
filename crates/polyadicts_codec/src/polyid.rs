//! Polyid: an n-tuple of unsigned integers packed as back-to-back varints.
//!
//! Shares the polyad header shape, but every header entry is a value rather
//! than a payload length, so there is no payload region.

use bytes::Bytes;
use tracing::debug;

use crate::config::Limits;
use crate::error::{PolyadError, PolyadResult, Rejected};
use crate::source::Backing;
use crate::varint;

/// A tuple of `u64` values with its encoded form.
#[derive(Debug, Clone)]
pub struct Polyid<'a> {
    values: Vec<u64>,
    backing: Backing<'a>,
}

impl Polyid<'static> {
    /// Encodes `values` into a new owned buffer.
    pub fn new(values: &[u64]) -> PolyadResult<Self> {
        Self::new_with(values, &Limits::default())
    }

    /// Encodes `values` under explicit limits.
    pub fn new_with(values: &[u64], limits: &Limits) -> PolyadResult<Self> {
        if values.len() > limits.max_items {
            return Err(PolyadError::limit(values.len(), limits.max_items));
        }
        let size: usize = values.iter().map(|&v| varint::encoded_len(v)).sum();
        if size > limits.max_buffer_len {
            return Err(PolyadError::limit(size, limits.max_buffer_len));
        }

        let mut buf = Vec::new();
        buf.try_reserve_exact(size)
            .map_err(|_| PolyadError::OutOfMemory { requested: size })?;
        for &value in values {
            varint::encode_to_vec(value, &mut buf);
        }
        Ok(Self {
            values: values.to_vec(),
            backing: Backing::Shared(Bytes::from(buf)),
        })
    }

    /// Decodes a polyid that takes ownership of `buf`.
    pub fn load_owned(buf: impl Into<Bytes>) -> Result<Self, Rejected<Bytes>> {
        let buf = buf.into();
        match decode_values(&buf, None, &Limits::default()) {
            Ok((values, _)) => Ok(Self {
                values,
                backing: Backing::Shared(buf),
            }),
            Err(error) => Err(Rejected { error, buffer: buf }),
        }
    }
}

impl<'a> Polyid<'a> {
    /// Decodes every varint in `buf`.
    ///
    /// An empty buffer is the empty tuple.
    pub fn load(buf: &'a [u8]) -> PolyadResult<Self> {
        Self::load_with(buf, &Limits::default())
    }

    /// Decodes every varint in `buf` under explicit limits.
    pub fn load_with(buf: &'a [u8], limits: &Limits) -> PolyadResult<Self> {
        let (values, _) = decode_values(buf, None, limits)?;
        Ok(Self {
            values,
            backing: Backing::Borrowed(buf),
        })
    }

    /// Decodes `buf`, which must hold exactly `count` values.
    pub fn load_exact(buf: &'a [u8], count: usize) -> PolyadResult<Self> {
        let polyid = Self::load(buf)?;
        if polyid.len() != count {
            return Err(PolyadError::RankMismatch {
                expected: count,
                actual: polyid.len(),
            });
        }
        Ok(polyid)
    }

    /// Decodes `count` values from the front of `buf`.
    ///
    /// Returns the tuple and the number of bytes it occupies; trailing bytes
    /// are left for the caller.
    pub fn load_prefix(buf: &'a [u8], count: usize) -> PolyadResult<(Self, usize)> {
        let (values, consumed) = decode_values(buf, Some(count), &Limits::default())?;
        let polyid = Self {
            values,
            backing: Backing::Borrowed(&buf[..consumed]),
        };
        Ok((polyid, consumed))
    }

    /// Number of values.
    #[must_use]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Returns true for the empty tuple.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// The value at `index`, if present.
    #[must_use]
    pub fn get(&self, index: usize) -> Option<u64> {
        self.values.get(index).copied()
    }

    /// The value at `index`, bounds-checked.
    pub fn value(&self, index: usize) -> PolyadResult<u64> {
        self.get(index).ok_or(PolyadError::IndexOutOfRange {
            index,
            rank: self.len(),
        })
    }

    /// All decoded values in order.
    #[must_use]
    pub fn values(&self) -> &[u64] {
        &self.values
    }

    /// The encoded bytes.
    #[must_use]
    pub fn as_bytes(&self) -> &[u8] {
        self.backing.as_slice()
    }

    /// Consumes the tuple and returns its encoded bytes.
    #[must_use]
    pub fn into_bytes(self) -> Bytes {
        self.backing.into_bytes()
    }
}

/// Two tuples are equal when they hold the same values. The encoding is
/// canonical, so their bytes agree too.
impl PartialEq for Polyid<'_> {
    fn eq(&self, other: &Self) -> bool {
        self.values == other.values
    }
}

impl Eq for Polyid<'_> {}

fn decode_values(
    buf: &[u8],
    count: Option<usize>,
    limits: &Limits,
) -> PolyadResult<(Vec<u64>, usize)> {
    if buf.len() > limits.max_buffer_len {
        return Err(PolyadError::limit(buf.len(), limits.max_buffer_len));
    }
    if let Some(count) = count {
        if count > limits.max_items {
            return Err(PolyadError::limit(count, limits.max_items));
        }
    }

    let mut values: Vec<u64> = Vec::new();
    let mut cursor = 0;
    let more = |values: &Vec<u64>, cursor: usize| match count {
        Some(count) => values.len() < count,
        None => cursor < buf.len(),
    };
    while more(&values, cursor) {
        if values.len() >= limits.max_items {
            return Err(PolyadError::limit(values.len() + 1, limits.max_items));
        }
        let (value, consumed) = varint::decode(&buf[cursor..]).map_err(|err| {
            debug!(%err, offset = cursor, index = values.len(), "rejected polyid buffer");
            PolyadError::from(err)
        })?;
        values
            .try_reserve(1)
            .map_err(|_| PolyadError::OutOfMemory {
                requested: (values.len() + 1).saturating_mul(std::mem::size_of::<u64>()),
            })?;
        values.push(value);
        cursor += consumed;
    }
    Ok((values, cursor))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::varint::VarintError;

    #[test]
    fn encode_small_values() {
        let polyid = Polyid::new(&[1, 0, 2]).unwrap();
        assert_eq!(polyid.as_bytes(), &[0x01, 0x00, 0x02]);
        assert_eq!(polyid.values(), &[1, 0, 2]);
    }

    #[test]
    fn decode_mixed_widths() {
        let encoded = Polyid::new(&[300, 7, u64::MAX]).unwrap();
        let decoded = Polyid::load(encoded.as_bytes()).unwrap();
        assert_eq!(decoded.values(), &[300, 7, u64::MAX]);
        assert_eq!(decoded.len(), 3);
        assert_eq!(decoded.get(0), Some(300));
        assert_eq!(decoded.get(3), None);
    }

    #[test]
    fn empty_tuple() {
        let polyid = Polyid::load(&[]).unwrap();
        assert!(polyid.is_empty());
        assert!(Polyid::new(&[]).unwrap().as_bytes().is_empty());
    }

    #[test]
    fn dangling_continuation_is_truncated() {
        assert_eq!(Polyid::load(&[0x05, 0x80]), Err(PolyadError::Truncated));
    }

    #[test]
    fn non_canonical_is_rejected() {
        assert_eq!(
            Polyid::load(&[0x80, 0x00]),
            Err(PolyadError::Varint(VarintError::NonCanonical))
        );
    }

    #[test]
    fn built_and_loaded_tuples_are_equal() {
        let built = Polyid::new(&[1, 2]).unwrap();
        let buf = [0x01u8, 0x02];
        let loaded = Polyid::load(&buf).unwrap();
        assert_eq!(built, loaded);
        assert_eq!(built.as_bytes(), loaded.as_bytes());
        assert_ne!(built, Polyid::load(&[0x01]).unwrap());
    }

    #[test]
    fn value_bounds() {
        let polyid = Polyid::new(&[9]).unwrap();
        assert_eq!(polyid.value(0), Ok(9));
        assert_eq!(
            polyid.value(1),
            Err(PolyadError::IndexOutOfRange { index: 1, rank: 1 })
        );
    }

    #[test]
    fn exact_count() {
        let buf = [0x01, 0x02, 0x03];
        assert!(Polyid::load_exact(&buf, 3).is_ok());
        assert_eq!(
            Polyid::load_exact(&buf, 2),
            Err(PolyadError::RankMismatch {
                expected: 2,
                actual: 3
            })
        );
    }

    #[test]
    fn prefix_leaves_trailer() {
        let buf = [0xac, 0x02, 0x05, 0xEE, 0xEE];
        let (polyid, consumed) = Polyid::load_prefix(&buf, 2).unwrap();
        assert_eq!(polyid.values(), &[300, 5]);
        assert_eq!(consumed, 3);
        assert_eq!(polyid.as_bytes(), &buf[..3]);

        assert_eq!(
            Polyid::load_prefix(&buf[..2], 2).unwrap_err(),
            PolyadError::Truncated
        );
    }

    #[test]
    fn owned_load_returns_buffer_on_failure() {
        let ok = Polyid::load_owned(vec![0x2au8]).unwrap();
        assert_eq!(ok.values(), &[42]);
        assert_eq!(ok.into_bytes(), Bytes::from_static(&[0x2a]));

        let rejected = Polyid::load_owned(vec![0xffu8]).unwrap_err();
        assert_eq!(rejected.error, PolyadError::Truncated);
        assert_eq!(rejected.into_buffer(), Bytes::from_static(&[0xff]));
    }

    #[test]
    fn item_limit() {
        let limits = Limits::new().max_items(2);
        assert!(matches!(
            Polyid::load_with(&[1, 2, 3], &limits),
            Err(PolyadError::SizeLimitExceeded { .. })
        ));
        assert!(Polyid::new_with(&[1, 2, 3], &limits).is_err());
    }
}
