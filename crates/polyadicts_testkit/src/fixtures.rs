//! Ownership fixtures and test set-up helpers.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Once};

use polyadicts_codec::{Backing, Segment};
use tracing_subscriber::EnvFilter;

static TRACING: Once = Once::new();

/// Installs a `tracing` subscriber for tests, once per process.
///
/// Honors `RUST_LOG`; defaults to `debug` so rejected loads show up in
/// failing test output.
pub fn init_test_tracing() {
    TRACING.call_once(|| {
        let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("debug"));
        let _ = tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_test_writer()
            .try_init();
    });
}

/// Hands out owned segments and counts how many have been released.
#[derive(Debug, Clone, Default)]
pub struct ReleaseTracker {
    issued: Arc<AtomicUsize>,
    released: Arc<AtomicUsize>,
}

impl ReleaseTracker {
    /// Creates a tracker with nothing issued.
    pub fn new() -> Self {
        Self::default()
    }

    /// A reference-counted segment holding a copy of `data`.
    ///
    /// The release counter goes up once, when the last handle is dropped.
    pub fn segment(&self, data: &[u8]) -> Segment<'static> {
        Segment::Shared(self.backing(data).into_bytes())
    }

    /// A backing buffer holding a copy of `data`, counted like [`Self::segment`].
    pub fn backing(&self, data: &[u8]) -> Backing<'static> {
        self.issued.fetch_add(1, Ordering::SeqCst);
        let released = Arc::clone(&self.released);
        Backing::with_release(data.to_vec(), move || {
            released.fetch_add(1, Ordering::SeqCst);
        })
    }

    /// Number of segments handed out.
    pub fn issued(&self) -> usize {
        self.issued.load(Ordering::SeqCst)
    }

    /// Number of segments released.
    pub fn released(&self) -> usize {
        self.released.load(Ordering::SeqCst)
    }

    /// Number of segments still alive.
    pub fn live(&self) -> usize {
        self.issued() - self.released()
    }
}

/// The three-item sample used throughout the docs: `[0x41]`, `[]`, `[0x01, 0x02]`.
pub fn sample_items() -> Vec<Vec<u8>> {
    vec![vec![0x41], Vec::new(), vec![0x01, 0x02]]
}

/// Encoded form of [`sample_items`].
pub const SAMPLE_ENCODED: [u8; 6] = [0x01, 0x00, 0x02, 0x41, 0x01, 0x02];

#[cfg(test)]
mod tests {
    use super::*;
    use polyadicts_codec::Polyad;

    #[test]
    fn tracker_counts_finish_releases() {
        init_test_tracing();
        let tracker = ReleaseTracker::new();
        let mut pack = Polyad::prepare(3).unwrap();
        for (index, item) in sample_items().iter().enumerate() {
            pack.set(index, tracker.segment(item)).unwrap();
        }
        assert_eq!(tracker.live(), 3);

        pack.finish().unwrap();
        assert_eq!(tracker.released(), 3);
        assert_eq!(pack.whole_view().unwrap(), &SAMPLE_ENCODED);
    }

    #[test]
    fn tracker_counts_superseded_segments() {
        let tracker = ReleaseTracker::new();
        let mut pack = Polyad::prepare(1).unwrap();
        for round in 0..5u8 {
            drop(pack.set(0, tracker.segment(&[round])).unwrap());
        }
        assert_eq!(tracker.issued(), 5);
        assert_eq!(tracker.released(), 4);

        drop(pack);
        assert_eq!(tracker.released(), 5);
    }

    #[test]
    fn tracker_counts_loaded_backing() {
        let tracker = ReleaseTracker::new();
        let pack = Polyad::load_backing(tracker.backing(&SAMPLE_ENCODED), &Default::default())
            .unwrap();
        assert_eq!(pack.rank(), 3);
        assert_eq!(tracker.live(), 1);
        drop(pack);
        assert_eq!(tracker.live(), 0);
    }
}
