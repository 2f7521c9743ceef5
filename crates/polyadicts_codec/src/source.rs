//! Backing buffers handed to a container by a host.
//!
//! A container needs nothing more than a byte slice that stays valid for as
//! long as views into it exist. That is either a plain borrow, tracked by the
//! `'a` lifetime, or a reference-counted [`Bytes`] whose last drop releases
//! the memory. Host adapters with their own reference counting wrap their
//! handle with [`Backing::with_release`].

use std::ops::Range;

use bytes::Bytes;

/// Memory a loaded or finished container reads from.
#[derive(Debug, Clone)]
pub enum Backing<'a> {
    /// Caller memory borrowed for the container's lifetime.
    Borrowed(&'a [u8]),
    /// Reference-counted memory; the container holds one reference.
    Shared(Bytes),
}

impl Default for Backing<'_> {
    fn default() -> Self {
        Backing::Borrowed(&[])
    }
}

impl<'a> Backing<'a> {
    /// Wraps a host-owned region, calling `on_release` once the last view
    /// into it is dropped.
    pub fn with_release<T, F>(region: T, on_release: F) -> Backing<'static>
    where
        T: AsRef<[u8]> + Send + 'static,
        F: FnOnce() + Send + 'static,
    {
        Backing::Shared(Bytes::from_owner(ReleaseOnDrop {
            region,
            on_release: Some(on_release),
        }))
    }

    /// Returns the backing bytes.
    #[must_use]
    pub fn as_slice(&self) -> &[u8] {
        match self {
            Backing::Borrowed(data) => data,
            Backing::Shared(data) => data,
        }
    }

    /// Length in bytes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.as_slice().len()
    }

    /// Returns true when the backing holds no bytes.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Returns true if the container holds a counted reference.
    #[must_use]
    pub fn is_shared(&self) -> bool {
        matches!(self, Backing::Shared(_))
    }

    /// Narrows to `range` without copying. Returns `None` when out of bounds.
    #[must_use]
    pub fn slice(&self, range: Range<usize>) -> Option<Backing<'a>> {
        if range.start > range.end || range.end > self.len() {
            return None;
        }
        Some(match self {
            Backing::Borrowed(data) => Backing::Borrowed(&data[range]),
            Backing::Shared(data) => Backing::Shared(data.slice(range)),
        })
    }

    /// Converts into a `Bytes` handle, copying only borrowed memory.
    #[must_use]
    pub fn into_bytes(self) -> Bytes {
        match self {
            Backing::Borrowed(data) => Bytes::copy_from_slice(data),
            Backing::Shared(data) => data,
        }
    }
}

impl AsRef<[u8]> for Backing<'_> {
    fn as_ref(&self) -> &[u8] {
        self.as_slice()
    }
}

impl<'a> From<&'a [u8]> for Backing<'a> {
    fn from(data: &'a [u8]) -> Self {
        Backing::Borrowed(data)
    }
}

impl From<Bytes> for Backing<'_> {
    fn from(data: Bytes) -> Self {
        Backing::Shared(data)
    }
}

impl From<Vec<u8>> for Backing<'_> {
    fn from(data: Vec<u8>) -> Self {
        Backing::Shared(Bytes::from(data))
    }
}

struct ReleaseOnDrop<T, F: FnOnce()> {
    region: T,
    on_release: Option<F>,
}

impl<T: AsRef<[u8]>, F: FnOnce()> AsRef<[u8]> for ReleaseOnDrop<T, F> {
    fn as_ref(&self) -> &[u8] {
        self.region.as_ref()
    }
}

impl<T, F: FnOnce()> Drop for ReleaseOnDrop<T, F> {
    fn drop(&mut self) {
        if let Some(release) = self.on_release.take() {
            release();
        }
    }
}

impl PartialEq for Backing<'_> {
    fn eq(&self, other: &Self) -> bool {
        self.as_slice() == other.as_slice()
    }
}

impl Eq for Backing<'_> {}
