//! Error types for the codec crate.

use std::fmt;

use thiserror::Error;

use crate::varint::VarintError;

/// Result type for polyad and polyid operations.
pub type PolyadResult<T> = Result<T, PolyadError>;

/// Errors that can occur while building, loading or reading a container.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PolyadError {
    /// Not enough bytes to decode the next header entry.
    #[error("truncated header: ran out of bytes while decoding a length prefix")]
    Truncated,

    /// Header and payload regions do not account for the buffer exactly.
    #[error("invalid layout: {message}")]
    InvalidLayout {
        /// Description of the inconsistency.
        message: String,
    },

    /// Item index is not below the container rank.
    #[error("index {index} out of range for rank {rank}")]
    IndexOutOfRange {
        /// The requested index.
        index: usize,
        /// Number of items in the container.
        rank: usize,
    },

    /// An allocation could not be satisfied.
    #[error("out of memory: failed to reserve {requested} bytes")]
    OutOfMemory {
        /// Number of bytes requested.
        requested: usize,
    },

    /// The container is sealed and can no longer be mutated.
    #[error("container is sealed")]
    Sealed,

    /// `finish` was called on a container that is already sealed.
    #[error("container was already finished")]
    AlreadySealed,

    /// The operation needs a sealed container.
    #[error("container is still staging; call finish first")]
    NotSealed,

    /// The recovered rank differs from the one the caller expected.
    #[error("rank mismatch: expected {expected} items, found {actual}")]
    RankMismatch {
        /// Rank supplied by the caller.
        expected: usize,
        /// Rank recovered from the buffer.
        actual: usize,
    },

    /// A configured size limit was exceeded.
    #[error("size limit exceeded: {claimed} exceeds maximum of {max_allowed}")]
    SizeLimitExceeded {
        /// The size that was requested or claimed.
        claimed: u64,
        /// The configured maximum.
        max_allowed: u64,
    },

    /// Offset and length do not describe a slice of the supplied region.
    #[error("invalid region: offset {offset} length {len} in {available} bytes")]
    InvalidRegion {
        /// Requested start offset.
        offset: usize,
        /// Requested length.
        len: usize,
        /// Size of the supplied region.
        available: usize,
    },

    /// A varint could not be decoded or encoded.
    #[error("varint error: {0}")]
    Varint(VarintError),
}

impl PolyadError {
    /// Create an invalid layout error.
    pub fn invalid_layout(message: impl Into<String>) -> Self {
        Self::InvalidLayout {
            message: message.into(),
        }
    }

    pub(crate) fn limit(claimed: usize, max_allowed: usize) -> Self {
        Self::SizeLimitExceeded {
            claimed: claimed as u64,
            max_allowed: max_allowed as u64,
        }
    }
}

impl From<VarintError> for PolyadError {
    fn from(err: VarintError) -> Self {
        match err {
            VarintError::Truncated => Self::Truncated,
            other => Self::Varint(other),
        }
    }
}

/// A failed ownership-transferring load.
///
/// The buffer is handed back untouched so the caller keeps ownership.
#[derive(Debug)]
pub struct Rejected<B> {
    /// Why the buffer was rejected.
    pub error: PolyadError,
    /// The buffer the caller tried to transfer.
    pub buffer: B,
}

impl<B> Rejected<B> {
    /// Returns the rejected buffer to the caller.
    pub fn into_buffer(self) -> B {
        self.buffer
    }

    /// Splits into the error and the buffer.
    pub fn into_parts(self) -> (PolyadError, B) {
        (self.error, self.buffer)
    }
}

impl<B> fmt::Display for Rejected<B> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.error, f)
    }
}

impl<B: fmt::Debug> std::error::Error for Rejected<B> {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        Some(&self.error)
    }
}
