//! Size limits applied when building and loading containers.

/// Upper bounds checked by `prepare`, `finish` and every `load`.
///
/// Loading untrusted input allocates one span per header entry, so these
/// caps bound the work a hostile buffer can cause.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Limits {
    /// Maximum number of items (polyad) or values (polyid).
    pub max_items: usize,

    /// Maximum length of a whole container buffer in bytes.
    pub max_buffer_len: usize,
}

impl Default for Limits {
    fn default() -> Self {
        Self {
            max_items: 16 * 1024 * 1024,       // 16 Mi items
            max_buffer_len: 256 * 1024 * 1024, // 256 MB
        }
    }
}

impl Limits {
    /// Creates limits with default values.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Limits that never reject anything.
    #[must_use]
    pub const fn unbounded() -> Self {
        Self {
            max_items: usize::MAX,
            max_buffer_len: usize::MAX,
        }
    }

    /// Sets the maximum item count.
    #[must_use]
    pub const fn max_items(mut self, value: usize) -> Self {
        self.max_items = value;
        self
    }

    /// Sets the maximum buffer length.
    #[must_use]
    pub const fn max_buffer_len(mut self, value: usize) -> Self {
        self.max_buffer_len = value;
        self
    }
}
