//! Loading a polyad from an existing buffer.

use bytes::Bytes;
use tracing::debug;

use super::{Polyad, State};
use crate::config::Limits;
use crate::error::{PolyadError, PolyadResult, Rejected};
use crate::layout::{Layout, Span};
use crate::source::Backing;

fn parse(buf: &[u8], limits: &Limits) -> PolyadResult<Vec<Span>> {
    let spans = Layout::scan(buf, limits).and_then(|layout| layout.spans(buf));
    if let Err(err) = &spans {
        debug!(%err, len = buf.len(), "rejected polyad buffer");
    }
    spans
}

impl<'a> Polyad<'a> {
    /// Loads a polyad that borrows `buf` for its lifetime.
    pub fn load(buf: &'a [u8]) -> PolyadResult<Self> {
        Self::load_with(buf, &Limits::default())
    }

    /// Loads a borrowed polyad under explicit limits.
    pub fn load_with(buf: &'a [u8], limits: &Limits) -> PolyadResult<Self> {
        let spans = parse(buf, limits)?;
        Ok(Self::sealed(Backing::Borrowed(buf), spans, limits))
    }

    /// Loads a borrowed polyad whose rank is known in advance.
    ///
    /// Fails with [`PolyadError::RankMismatch`] if the buffer is a valid
    /// polyad of a different rank. With the rank pinned, no proper prefix of
    /// a valid buffer is accepted.
    pub fn load_exact(buf: &'a [u8], rank: usize) -> PolyadResult<Self> {
        let polyad = Self::load(buf)?;
        if polyad.rank() != rank {
            return Err(PolyadError::RankMismatch {
                expected: rank,
                actual: polyad.rank(),
            });
        }
        Ok(polyad)
    }

    /// Loads any backing buffer, handing it back on failure.
    pub fn load_backing(
        backing: Backing<'a>,
        limits: &Limits,
    ) -> Result<Self, Rejected<Backing<'a>>> {
        match parse(backing.as_slice(), limits) {
            Ok(spans) => Ok(Self::sealed(backing, spans, limits)),
            Err(error) => Err(Rejected {
                error,
                buffer: backing,
            }),
        }
    }

    /// Loads a polyad from a region of `backing` starting at `offset`.
    ///
    /// A `len` of zero selects everything from `offset` to the end. The
    /// container keeps the whole region alive but only reads the selection.
    pub fn from_region(
        backing: impl Into<Backing<'a>>,
        offset: usize,
        len: usize,
    ) -> Result<Self, Rejected<Backing<'a>>> {
        Self::from_region_with(backing, offset, len, &Limits::default())
    }

    /// Like [`Polyad::from_region`], under explicit limits.
    pub fn from_region_with(
        backing: impl Into<Backing<'a>>,
        offset: usize,
        len: usize,
        limits: &Limits,
    ) -> Result<Self, Rejected<Backing<'a>>> {
        let backing = backing.into();
        let available = backing.len();
        let len = if len == 0 {
            available.saturating_sub(offset)
        } else {
            len
        };
        let selected = offset
            .checked_add(len)
            .and_then(|end| backing.slice(offset..end));
        match selected {
            Some(region) => match parse(region.as_slice(), limits) {
                Ok(spans) => Ok(Self::sealed(region, spans, limits)),
                Err(error) => Err(Rejected {
                    error,
                    buffer: backing,
                }),
            },
            None => Err(Rejected {
                error: PolyadError::InvalidRegion {
                    offset,
                    len,
                    available,
                },
                buffer: backing,
            }),
        }
    }

    fn sealed(backing: Backing<'a>, spans: Vec<Span>, limits: &Limits) -> Self {
        Self {
            state: State::Sealed { backing, spans },
            limits: *limits,
        }
    }
}

impl Polyad<'static> {
    /// Loads a polyad that takes ownership of `buf`.
    ///
    /// On failure the buffer is returned inside [`Rejected`].
    pub fn load_owned(buf: impl Into<Bytes>) -> Result<Self, Rejected<Bytes>> {
        Self::load_owned_with(buf, &Limits::default())
    }

    /// Loads an owned polyad under explicit limits.
    pub fn load_owned_with(
        buf: impl Into<Bytes>,
        limits: &Limits,
    ) -> Result<Self, Rejected<Bytes>> {
        let buf = buf.into();
        match parse(&buf, limits) {
            Ok(spans) => Ok(Self::sealed(Backing::Shared(buf), spans, limits)),
            Err(error) => Err(Rejected { error, buffer: buf }),
        }
    }
}
