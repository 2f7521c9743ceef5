//! Staged construction: `prepare`, `set`, `finish`.

use std::mem;

use bytes::Bytes;
use tracing::{debug, trace};

use super::{Polyad, State};
use crate::config::Limits;
use crate::error::{PolyadError, PolyadResult};
use crate::layout::{Layout, Span};
use crate::segment::Segment;
use crate::source::Backing;
use crate::varint;

impl<'a> Polyad<'a> {
    /// Creates a staging container with `nitem` empty slots.
    pub fn prepare(nitem: usize) -> PolyadResult<Self> {
        Self::prepare_with(nitem, &Limits::default())
    }

    /// Creates a staging container with `nitem` empty slots under `limits`.
    pub fn prepare_with(nitem: usize, limits: &Limits) -> PolyadResult<Self> {
        if nitem > limits.max_items {
            return Err(PolyadError::limit(nitem, limits.max_items));
        }
        let mut items = Vec::new();
        items
            .try_reserve_exact(nitem)
            .map_err(|_| PolyadError::OutOfMemory {
                requested: nitem.saturating_mul(mem::size_of::<Segment<'_>>()),
            })?;
        items.resize_with(nitem, Segment::default);

        Ok(Self {
            state: State::Staging { items },
            limits: *limits,
        })
    }

    /// Builds and finishes a container from an ordered sequence of segments.
    pub fn from_segments<I, S>(segments: I) -> PolyadResult<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<Segment<'a>>,
    {
        Self::from_segments_with(segments, &Limits::default())
    }

    /// Like [`Polyad::from_segments`], under explicit limits.
    pub fn from_segments_with<I, S>(segments: I, limits: &Limits) -> PolyadResult<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<Segment<'a>>,
    {
        let items: Vec<Segment<'a>> = segments.into_iter().map(Into::into).collect();
        if items.len() > limits.max_items {
            return Err(PolyadError::limit(items.len(), limits.max_items));
        }
        let mut polyad = Self {
            state: State::Staging { items },
            limits: *limits,
        };
        polyad.finish()?;
        Ok(polyad)
    }

    /// Stores `segment` in slot `index` and returns the segment it replaces.
    ///
    /// Dropping the returned segment releases it if it was owned. A bad
    /// index leaves the container unchanged.
    pub fn set(&mut self, index: usize, segment: impl Into<Segment<'a>>) -> PolyadResult<Segment<'a>> {
        match &mut self.state {
            State::Sealed { .. } => Err(PolyadError::Sealed),
            State::Staging { items } => {
                let rank = items.len();
                let slot = items
                    .get_mut(index)
                    .ok_or(PolyadError::IndexOutOfRange { index, rank })?;
                Ok(mem::replace(slot, segment.into()))
            }
        }
    }

    /// Packs all slots into one owned buffer and seals the container.
    ///
    /// On failure the container is still staging and keeps every segment,
    /// so the call can be retried or the container dropped.
    pub fn finish(&mut self) -> PolyadResult<()> {
        let items = match &mut self.state {
            State::Sealed { .. } => return Err(PolyadError::AlreadySealed),
            State::Staging { items } => items,
        };

        let layout = Layout::for_lengths(items.iter().map(Segment::len))?;
        trace!(
            rank = layout.rank(),
            header_len = layout.header_len(),
            buffer_len = layout.buffer_len(),
            "sized polyad"
        );
        if layout.buffer_len() > self.limits.max_buffer_len {
            debug!(buffer_len = layout.buffer_len(), "polyad exceeds buffer limit");
            return Err(PolyadError::limit(
                layout.buffer_len(),
                self.limits.max_buffer_len,
            ));
        }

        let mut buf = Vec::new();
        let mut spans = Vec::new();
        let reserved = buf
            .try_reserve_exact(layout.buffer_len())
            .map_err(|_| PolyadError::OutOfMemory {
                requested: layout.buffer_len(),
            })
            .and_then(|()| {
                spans
                    .try_reserve_exact(layout.rank())
                    .map_err(|_| PolyadError::OutOfMemory {
                        requested: layout.rank().saturating_mul(mem::size_of::<Span>()),
                    })
            });
        if let Err(err) = reserved {
            debug!(%err, "polyad finish failed to allocate");
            return Err(err);
        }
        buf.resize(layout.header_len(), 0);

        // Header first: the only fallible writes happen while every segment
        // is still in place.
        let mut header_cursor = 0;
        for segment in items.iter() {
            header_cursor += varint::encode(segment.len() as u64, &mut buf[header_cursor..])?;
        }
        debug_assert_eq!(header_cursor, layout.header_len());

        // Payloads: each source is released as soon as its bytes are copied.
        let mut payload_cursor = layout.header_len();
        for segment in mem::take(items) {
            buf.extend_from_slice(segment.as_slice());
            spans.push(Span {
                offset: payload_cursor,
                len: segment.len(),
            });
            payload_cursor += segment.len();
        }
        debug_assert_eq!(payload_cursor, layout.buffer_len());

        self.state = State::Sealed {
            backing: Backing::Shared(Bytes::from(buf)),
            spans,
        };
        Ok(())
    }
}
