//! Header/payload layout of a polyad buffer.
//!
//! ```text
//! | varint(len_0) ... varint(len_n-1) | item_0 ... item_n-1 |
//!  ^ header_cursor moves right          ^ payload_boundary moves left
//! ```
//!
//! The item count is not stored. It is recovered by walking two cursors
//! towards each other: every decoded header entry advances `header_cursor`
//! past itself and pulls `payload_boundary` back by the payload length it
//! announces. The buffer is well formed exactly when the cursors meet.

use std::mem;
use std::ops::Range;

use tracing::trace;

use crate::config::Limits;
use crate::error::{PolyadError, PolyadResult};
use crate::varint::{self, VarintError};

/// Location of one item's payload inside a container buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Span {
    /// Byte offset from the start of the buffer.
    pub offset: usize,
    /// Payload length in bytes.
    pub len: usize,
}

impl Span {
    /// The span as a slice range.
    #[must_use]
    pub const fn range(&self) -> Range<usize> {
        self.offset..self.offset + self.len
    }
}

/// The two scan cursors and the number of header entries consumed so far.
///
/// Invariant: `header_cursor <= payload_boundary <= buffer_len`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LayoutCursor {
    /// Length of the buffer being scanned.
    pub buffer_len: usize,
    /// End of the header entries decoded so far.
    pub header_cursor: usize,
    /// Start of the payloads accounted for so far.
    pub payload_boundary: usize,
    /// Header entries decoded so far.
    pub rank: usize,
}

impl LayoutCursor {
    /// Positions the cursors at both ends of a buffer of `buffer_len` bytes.
    #[must_use]
    pub const fn new(buffer_len: usize) -> Self {
        Self {
            buffer_len,
            header_cursor: 0,
            payload_boundary: buffer_len,
            rank: 0,
        }
    }

    /// Returns true once the cursors have met.
    #[must_use]
    pub const fn is_met(&self) -> bool {
        self.header_cursor >= self.payload_boundary
    }

    /// Decodes the next header entry and returns the payload length it names.
    ///
    /// `buf` must be the buffer the cursor was created for. The cursors are
    /// left untouched on error.
    pub fn step(&mut self, buf: &[u8]) -> PolyadResult<usize> {
        if buf.len() != self.buffer_len {
            return Err(PolyadError::invalid_layout(format!(
                "cursor scans {} bytes, buffer has {}",
                self.buffer_len,
                buf.len()
            )));
        }
        let window = buf
            .get(self.header_cursor..self.payload_boundary)
            .ok_or_else(|| {
                PolyadError::invalid_layout(format!(
                    "cursor range {}..{} is outside the buffer",
                    self.header_cursor, self.payload_boundary
                ))
            })?;
        let (len, consumed) = varint::decode(window).map_err(|err| match err {
            VarintError::Truncated => PolyadError::Truncated,
            other => PolyadError::invalid_layout(format!(
                "header entry {} at offset {}: {other}",
                self.rank, self.header_cursor
            )),
        })?;

        let header_cursor = self.header_cursor + consumed;
        let remaining = self.payload_boundary - header_cursor;
        let len = usize::try_from(len)
            .ok()
            .filter(|&len| len <= remaining)
            .ok_or_else(|| {
                PolyadError::invalid_layout(format!(
                    "item {} claims {len} payload bytes but only {remaining} remain",
                    self.rank
                ))
            })?;

        self.header_cursor = header_cursor;
        self.payload_boundary -= len;
        self.rank += 1;
        Ok(len)
    }

    /// Checks that the cursors met and turns them into a [`Layout`].
    pub fn finish(self) -> PolyadResult<Layout> {
        if self.payload_boundary > self.buffer_len {
            return Err(PolyadError::invalid_layout(format!(
                "payload starts at {} past the end of a {}-byte buffer",
                self.payload_boundary, self.buffer_len
            )));
        }
        if self.header_cursor != self.payload_boundary {
            return Err(PolyadError::invalid_layout(format!(
                "header ends at {} but payload starts at {}",
                self.header_cursor, self.payload_boundary
            )));
        }
        Ok(Layout {
            header_len: self.header_cursor,
            rank: self.rank,
            buffer_len: self.buffer_len,
        })
    }
}

/// Validated shape of a container buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Layout {
    header_len: usize,
    rank: usize,
    buffer_len: usize,
}

impl Layout {
    /// Scans `buf` and validates that header and payload account for it
    /// exactly.
    pub fn scan(buf: &[u8], limits: &Limits) -> PolyadResult<Self> {
        if buf.len() > limits.max_buffer_len {
            return Err(PolyadError::limit(buf.len(), limits.max_buffer_len));
        }

        let mut cursor = LayoutCursor::new(buf.len());
        while !cursor.is_met() {
            cursor.step(buf)?;
            if cursor.rank > limits.max_items {
                return Err(PolyadError::limit(cursor.rank, limits.max_items));
            }
        }
        let layout = cursor.finish()?;
        trace!(
            rank = layout.rank,
            header_len = layout.header_len,
            buffer_len = layout.buffer_len,
            "scanned polyad layout"
        );
        Ok(layout)
    }

    /// Computes the layout a buffer holding payloads of `lengths` would have.
    pub fn for_lengths<I>(lengths: I) -> PolyadResult<Self>
    where
        I: IntoIterator<Item = usize>,
    {
        let overflow = || PolyadError::SizeLimitExceeded {
            claimed: u64::MAX,
            max_allowed: usize::MAX as u64,
        };

        let mut layout = Layout::default();
        for len in lengths {
            layout.header_len = layout
                .header_len
                .checked_add(varint::encoded_len(len as u64))
                .ok_or_else(overflow)?;
            layout.buffer_len = layout.buffer_len.checked_add(len).ok_or_else(overflow)?;
            layout.rank += 1;
        }
        layout.buffer_len = layout
            .buffer_len
            .checked_add(layout.header_len)
            .ok_or_else(overflow)?;
        Ok(layout)
    }

    /// Second pass: locates every item's payload.
    ///
    /// `buf` must be the buffer this layout was scanned from.
    pub fn spans(&self, buf: &[u8]) -> PolyadResult<Vec<Span>> {
        if buf.len() != self.buffer_len {
            return Err(PolyadError::invalid_layout(format!(
                "layout describes {} bytes, buffer has {}",
                self.buffer_len,
                buf.len()
            )));
        }

        let mut spans = Vec::new();
        spans
            .try_reserve_exact(self.rank)
            .map_err(|_| PolyadError::OutOfMemory {
                requested: self.rank.saturating_mul(mem::size_of::<Span>()),
            })?;

        let header = &buf[..self.header_len];
        let mut header_cursor = 0;
        let mut payload_cursor = self.header_len;
        for _ in 0..self.rank {
            let (len, consumed) = varint::decode(&header[header_cursor..])?;
            let span = Span {
                offset: payload_cursor,
                len: usize::try_from(len)
                    .map_err(|_| PolyadError::invalid_layout("payload length overflows usize"))?,
            };
            header_cursor += consumed;
            payload_cursor = payload_cursor
                .checked_add(span.len)
                .filter(|&end| end <= self.buffer_len)
                .ok_or_else(|| PolyadError::invalid_layout("payload overruns buffer"))?;
            spans.push(span);
        }

        if header_cursor != self.header_len || payload_cursor != self.buffer_len {
            return Err(PolyadError::invalid_layout(
                "buffer does not match its scanned layout",
            ));
        }
        Ok(spans)
    }

    /// Length of the header region.
    #[must_use]
    pub const fn header_len(&self) -> usize {
        self.header_len
    }

    /// Combined length of all payloads.
    #[must_use]
    pub const fn payload_len(&self) -> usize {
        self.buffer_len - self.header_len
    }

    /// Number of items.
    #[must_use]
    pub const fn rank(&self) -> usize {
        self.rank
    }

    /// Length of the whole buffer.
    #[must_use]
    pub const fn buffer_len(&self) -> usize {
        self.buffer_len
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: [u8; 6] = [0x01, 0x00, 0x02, 0x41, 0x01, 0x02];

    #[test]
    fn cursors_meet_on_sample() {
        let mut cursor = LayoutCursor::new(SAMPLE.len());
        assert_eq!(cursor.step(&SAMPLE).unwrap(), 1);
        assert_eq!((cursor.header_cursor, cursor.payload_boundary), (1, 5));
        assert_eq!(cursor.step(&SAMPLE).unwrap(), 0);
        assert_eq!((cursor.header_cursor, cursor.payload_boundary), (2, 5));
        assert_eq!(cursor.step(&SAMPLE).unwrap(), 2);
        assert_eq!((cursor.header_cursor, cursor.payload_boundary), (3, 3));
        assert!(cursor.is_met());

        let layout = cursor.finish().unwrap();
        assert_eq!(layout.rank(), 3);
        assert_eq!(layout.header_len(), 3);
        assert_eq!(layout.payload_len(), 3);
    }

    #[test]
    fn spans_on_sample() {
        let layout = Layout::scan(&SAMPLE, &Limits::default()).unwrap();
        let spans = layout.spans(&SAMPLE).unwrap();
        assert_eq!(
            spans,
            vec![
                Span { offset: 3, len: 1 },
                Span { offset: 4, len: 0 },
                Span { offset: 4, len: 2 },
            ]
        );
        assert_eq!(&SAMPLE[spans[2].range()], &[0x01, 0x02]);
    }

    #[test]
    fn empty_buffer_has_rank_zero() {
        let layout = Layout::scan(&[], &Limits::default()).unwrap();
        assert_eq!(layout, Layout::default());
        assert!(layout.spans(&[]).unwrap().is_empty());
    }

    #[test]
    fn step_failure_leaves_cursor_untouched() {
        let buf = [0x05, 0x41];
        let mut cursor = LayoutCursor::new(buf.len());
        assert!(matches!(
            cursor.step(&buf),
            Err(PolyadError::InvalidLayout { .. })
        ));
        assert_eq!(cursor, LayoutCursor::new(buf.len()));
    }

    #[test]
    fn dangling_continuation_is_truncated() {
        assert_eq!(
            Layout::scan(&[0x80], &Limits::default()),
            Err(PolyadError::Truncated)
        );
    }

    #[test]
    fn non_canonical_entry_is_invalid() {
        let err = Layout::scan(&[0x80, 0x00, 0x00], &Limits::default()).unwrap_err();
        assert!(matches!(err, PolyadError::InvalidLayout { .. }));
    }

    #[test]
    fn mismatched_cursors_rejected() {
        let cursor = LayoutCursor {
            buffer_len: 5,
            header_cursor: 2,
            payload_boundary: 3,
            rank: 1,
        };
        assert!(matches!(
            cursor.finish(),
            Err(PolyadError::InvalidLayout { .. })
        ));
    }

    #[test]
    fn step_rejects_buffer_of_another_length() {
        let mut cursor = LayoutCursor::new(10);
        assert!(matches!(
            cursor.step(&[0x01, 0x00]),
            Err(PolyadError::InvalidLayout { .. })
        ));
        assert_eq!(cursor, LayoutCursor::new(10));
    }

    #[test]
    fn step_rejects_inverted_cursors() {
        let mut cursor = LayoutCursor {
            buffer_len: SAMPLE.len(),
            header_cursor: 4,
            payload_boundary: 2,
            rank: 0,
        };
        assert!(matches!(
            cursor.step(&SAMPLE),
            Err(PolyadError::InvalidLayout { .. })
        ));
    }

    #[test]
    fn finish_rejects_boundary_past_buffer() {
        let cursor = LayoutCursor {
            buffer_len: 1,
            header_cursor: 3,
            payload_boundary: 3,
            rank: 3,
        };
        assert!(matches!(
            cursor.finish(),
            Err(PolyadError::InvalidLayout { .. })
        ));
    }

    #[test]
    fn met_cursor_reports_scanned_length() {
        let mut cursor = LayoutCursor::new(SAMPLE.len());
        while !cursor.is_met() {
            cursor.step(&SAMPLE).unwrap();
        }
        let layout = cursor.finish().unwrap();
        assert_eq!(layout.buffer_len(), SAMPLE.len());
        assert_eq!(layout.payload_len(), 3);
    }

    #[test]
    fn limits_are_enforced() {
        let limits = Limits::new().max_items(2);
        assert_eq!(
            Layout::scan(&SAMPLE, &limits),
            Err(PolyadError::SizeLimitExceeded {
                claimed: 3,
                max_allowed: 2
            })
        );

        let limits = Limits::new().max_buffer_len(5);
        assert!(matches!(
            Layout::scan(&SAMPLE, &limits),
            Err(PolyadError::SizeLimitExceeded { .. })
        ));
    }

    #[test]
    fn sizing_matches_scan() {
        let sized = Layout::for_lengths([1, 0, 2]).unwrap();
        let scanned = Layout::scan(&SAMPLE, &Limits::default()).unwrap();
        assert_eq!(sized, scanned);

        let big = Layout::for_lengths([200]).unwrap();
        assert_eq!(big.header_len(), 2);
        assert_eq!(big.buffer_len(), 202);
    }

    #[test]
    fn spans_reject_foreign_buffer() {
        let layout = Layout::scan(&SAMPLE, &Limits::default()).unwrap();
        assert!(layout.spans(&SAMPLE[..5]).is_err());
    }
}
