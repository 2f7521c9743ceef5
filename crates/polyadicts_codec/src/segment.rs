//! Payload segments and their ownership.

use bytes::Bytes;

/// One payload slot of a staging container.
///
/// The variant records who is responsible for the memory. Replacing or
/// dropping a segment releases owned memory exactly once and never touches
/// borrowed memory.
#[derive(Debug, Clone)]
pub enum Segment<'a> {
    /// A view into caller memory that outlives the container.
    Borrowed(&'a [u8]),
    /// A buffer the container owns exclusively.
    Owned(Vec<u8>),
    /// A reference-counted buffer; dropping the segment releases one reference.
    Shared(Bytes),
}

impl Default for Segment<'_> {
    fn default() -> Self {
        Segment::Borrowed(&[])
    }
}

impl<'a> Segment<'a> {
    /// Returns the segment bytes.
    #[must_use]
    pub fn as_slice(&self) -> &[u8] {
        match self {
            Segment::Borrowed(data) => data,
            Segment::Owned(data) => data,
            Segment::Shared(data) => data,
        }
    }

    /// Payload length in bytes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.as_slice().len()
    }

    /// Returns true for a zero-length segment.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Returns true if dropping this segment releases memory.
    #[must_use]
    pub fn is_owned(&self) -> bool {
        !matches!(self, Segment::Borrowed(_))
    }

    /// Detaches the segment from any borrow, copying borrowed bytes.
    #[must_use]
    pub fn into_static(self) -> Segment<'static> {
        match self {
            Segment::Borrowed(data) => Segment::Owned(data.to_vec()),
            Segment::Owned(data) => Segment::Owned(data),
            Segment::Shared(data) => Segment::Shared(data),
        }
    }
}

impl AsRef<[u8]> for Segment<'_> {
    fn as_ref(&self) -> &[u8] {
        self.as_slice()
    }
}

impl<'a> From<&'a [u8]> for Segment<'a> {
    fn from(data: &'a [u8]) -> Self {
        Segment::Borrowed(data)
    }
}

impl<'a, const N: usize> From<&'a [u8; N]> for Segment<'a> {
    fn from(data: &'a [u8; N]) -> Self {
        Segment::Borrowed(data)
    }
}

impl<'a> From<&'a str> for Segment<'a> {
    fn from(data: &'a str) -> Self {
        Segment::Borrowed(data.as_bytes())
    }
}

impl From<Vec<u8>> for Segment<'_> {
    fn from(data: Vec<u8>) -> Self {
        Segment::Owned(data)
    }
}

impl From<Bytes> for Segment<'_> {
    fn from(data: Bytes) -> Self {
        Segment::Shared(data)
    }
}

/// Segments compare by content, whatever their ownership.
impl PartialEq for Segment<'_> {
    fn eq(&self, other: &Self) -> bool {
        self.as_slice() == other.as_slice()
    }
}

impl Eq for Segment<'_> {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn equality_ignores_ownership() {
        let borrowed = Segment::from(&b"abc"[..]);
        assert_eq!(borrowed, Segment::from(b"abc".to_vec()));
        assert_eq!(borrowed, Segment::from(Bytes::from_static(b"abc")));
        assert_ne!(borrowed, Segment::from(&b"abd"[..]));
    }

    #[test]
    fn default_is_empty_borrowed() {
        let segment = Segment::default();
        assert!(segment.is_empty());
        assert!(!segment.is_owned());
    }

    #[test]
    fn conversions_pick_ownership() {
        let local = [1u8, 2, 3];
        assert!(!Segment::from(&local).is_owned());
        assert!(!Segment::from("abc").is_owned());
        assert!(Segment::from(vec![1u8]).is_owned());
        assert!(Segment::from(Bytes::from_static(b"xy")).is_owned());
    }

    #[test]
    fn views_agree() {
        let owned = Segment::from(vec![9u8, 8]);
        let shared = Segment::from(Bytes::from_static(&[9, 8]));
        let borrowed = Segment::from(&[9u8, 8]);
        assert_eq!(owned.as_slice(), shared.as_slice());
        assert_eq!(shared.as_ref(), borrowed.as_slice());
        assert_eq!(borrowed.len(), 2);
    }

    #[test]
    fn into_static_copies_borrowed() {
        let local = vec![5u8; 4];
        let detached = Segment::from(local.as_slice()).into_static();
        drop(local);
        assert_eq!(detached, Segment::Owned(vec![5; 4]));
    }
}
