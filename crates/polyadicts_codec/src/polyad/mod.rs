//! Polyad: an n-tuple of byte segments behind a varint length header.
//!
//! A polyad is either built (`prepare`, `set`, `finish`) or loaded from an
//! existing buffer. Both paths end in the sealed state, where the container
//! reads every item out of one backing buffer without copying.

mod builder;
mod parser;

use bytes::Bytes;

use crate::config::Limits;
use crate::error::{PolyadError, PolyadResult};
use crate::layout::Span;
use crate::segment::Segment;
use crate::source::Backing;

/// A fixed-arity tuple of byte segments.
#[derive(Debug, Clone)]
pub struct Polyad<'a> {
    state: State<'a>,
    limits: Limits,
}

#[derive(Debug, Clone)]
enum State<'a> {
    /// Slots are still being filled; each owns or borrows its own memory.
    Staging { items: Vec<Segment<'a>> },
    /// One backing buffer; items are spans into it.
    Sealed {
        backing: Backing<'a>,
        spans: Vec<Span>,
    },
}

impl<'a> Polyad<'a> {
    /// Number of items. Fixed when the container is created.
    #[must_use]
    pub fn rank(&self) -> usize {
        match &self.state {
            State::Staging { items } => items.len(),
            State::Sealed { spans, .. } => spans.len(),
        }
    }

    /// Returns true once the container is finished or loaded.
    #[must_use]
    pub fn is_sealed(&self) -> bool {
        matches!(self.state, State::Sealed { .. })
    }

    /// Limits this container was created with.
    #[must_use]
    pub fn limits(&self) -> &Limits {
        &self.limits
    }

    /// The whole encoded buffer.
    pub fn whole_view(&self) -> PolyadResult<&[u8]> {
        match &self.state {
            State::Sealed { backing, .. } => Ok(backing.as_slice()),
            State::Staging { .. } => Err(PolyadError::NotSealed),
        }
    }

    /// The payload of item `index`.
    ///
    /// While staging this is the segment currently stored in the slot.
    pub fn item_view(&self, index: usize) -> PolyadResult<&[u8]> {
        self.check_index(index)?;
        Ok(self.item_unchecked(index))
    }

    /// The payload of item `index` as a `Bytes` handle.
    ///
    /// Zero-copy when the backing is reference counted; borrowed backings
    /// are copied.
    pub fn item_bytes(&self, index: usize) -> PolyadResult<Bytes> {
        self.check_index(index)?;
        match &self.state {
            State::Sealed {
                backing: Backing::Shared(data),
                spans,
            } => Ok(data.slice(spans[index].range())),
            State::Sealed {
                backing: Backing::Borrowed(data),
                spans,
            } => Ok(Bytes::copy_from_slice(&data[spans[index].range()])),
            State::Staging { .. } => Err(PolyadError::NotSealed),
        }
    }

    /// Iterates over all item payloads in order.
    pub fn iter(&self) -> impl ExactSizeIterator<Item = &[u8]> + '_ {
        (0..self.rank()).map(move |index| self.item_unchecked(index))
    }

    /// Item locations inside the whole buffer, once sealed.
    #[must_use]
    pub fn spans(&self) -> Option<&[Span]> {
        match &self.state {
            State::Sealed { spans, .. } => Some(spans),
            State::Staging { .. } => None,
        }
    }

    /// The backing buffer, once sealed.
    #[must_use]
    pub fn backing(&self) -> Option<&Backing<'a>> {
        match &self.state {
            State::Sealed { backing, .. } => Some(backing),
            State::Staging { .. } => None,
        }
    }

    /// Consumes the container and returns its encoded buffer.
    pub fn into_bytes(self) -> PolyadResult<Bytes> {
        match self.state {
            State::Sealed { backing, .. } => Ok(backing.into_bytes()),
            State::Staging { .. } => Err(PolyadError::NotSealed),
        }
    }

    /// Detaches the container from borrowed memory, copying where needed.
    #[must_use]
    pub fn into_static(self) -> Polyad<'static> {
        let state = match self.state {
            State::Staging { items } => State::Staging {
                items: items.into_iter().map(Segment::into_static).collect(),
            },
            State::Sealed { backing, spans } => State::Sealed {
                backing: Backing::Shared(backing.into_bytes()),
                spans,
            },
        };
        Polyad {
            state,
            limits: self.limits,
        }
    }

    fn check_index(&self, index: usize) -> PolyadResult<()> {
        let rank = self.rank();
        if index < rank {
            Ok(())
        } else {
            Err(PolyadError::IndexOutOfRange { index, rank })
        }
    }

    fn item_unchecked(&self, index: usize) -> &[u8] {
        match &self.state {
            State::Staging { items } => items[index].as_slice(),
            State::Sealed { backing, spans } => &backing.as_slice()[spans[index].range()],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Polyad<'static> {
        Polyad::from_segments([&b"A"[..], &b""[..], &[0x01u8, 0x02][..]]).unwrap()
    }

    #[test]
    fn rank_and_views() {
        let pack = sample();
        assert_eq!(pack.rank(), 3);
        assert!(pack.is_sealed());
        assert_eq!(pack.whole_view().unwrap(), &[0x01, 0x00, 0x02, 0x41, 0x01, 0x02]);
        assert_eq!(pack.item_view(0).unwrap(), b"A");
        assert_eq!(pack.item_view(1).unwrap(), b"");
        assert_eq!(pack.item_view(2).unwrap(), &[0x01, 0x02]);
    }

    #[test]
    fn item_view_bounds() {
        let pack = sample();
        assert_eq!(
            pack.item_view(3),
            Err(PolyadError::IndexOutOfRange { index: 3, rank: 3 })
        );
        assert!(pack.item_bytes(3).is_err());
    }

    #[test]
    fn item_bytes_share_backing() {
        let pack = sample();
        let whole = pack.whole_view().unwrap().as_ptr();
        let item = pack.item_bytes(2).unwrap();
        assert_eq!(&item[..], &[0x01, 0x02]);
        assert_eq!(item.as_ptr(), whole.wrapping_add(4));
    }

    #[test]
    fn iter_yields_items_in_order() {
        let pack = sample();
        let items: Vec<&[u8]> = pack.iter().collect();
        assert_eq!(items, vec![&b"A"[..], &b""[..], &[0x01, 0x02][..]]);
        assert_eq!(pack.iter().len(), 3);
    }

    #[test]
    fn staging_has_no_whole_view() {
        let pack = Polyad::prepare(2).unwrap();
        assert!(!pack.is_sealed());
        assert_eq!(pack.whole_view(), Err(PolyadError::NotSealed));
        assert_eq!(pack.item_view(1).unwrap(), b"");
        assert!(pack.spans().is_none());
        assert_eq!(pack.into_bytes(), Err(PolyadError::NotSealed));
    }

    #[test]
    fn into_static_outlives_source() {
        let buf = vec![0x02, b'h', b'i'];
        let pack = Polyad::load(&buf).unwrap().into_static();
        drop(buf);
        assert_eq!(pack.item_view(0).unwrap(), b"hi");
        assert!(pack.backing().unwrap().is_shared());
    }

    #[test]
    fn sealed_polyad_is_send_and_sync() {
        fn assert_send_sync<T: Send + Sync>(_: &T) {}
        let pack = sample();
        assert_send_sync(&pack);

        let shared = std::sync::Arc::new(pack);
        let handles: Vec<_> = (0..4)
            .map(|_| {
                let pack = std::sync::Arc::clone(&shared);
                std::thread::spawn(move || pack.item_view(2).unwrap().to_vec())
            })
            .collect();
        for handle in handles {
            assert_eq!(handle.join().unwrap(), vec![0x01, 0x02]);
        }
    }
}
