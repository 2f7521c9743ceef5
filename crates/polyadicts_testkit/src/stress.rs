//! Stress tests for polyadicts.
//!
//! A sealed polyad is immutable, so any number of threads may read it at
//! once. These helpers hammer that path and count mismatches.

use std::fmt;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

use polyadicts_codec::Polyad;
use tracing::debug;

/// Outcome of a stress run.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StressReport {
    /// Reads that returned the expected item bytes.
    pub matched: usize,
    /// Reads that failed or returned the wrong bytes.
    pub mismatched: usize,
    /// Wall-clock time for the whole run.
    pub elapsed: Duration,
}

impl StressReport {
    /// Total reads attempted.
    pub fn reads(&self) -> usize {
        self.matched + self.mismatched
    }

    /// Returns true when every read saw the expected bytes.
    pub fn is_clean(&self) -> bool {
        self.mismatched == 0
    }

    /// Read throughput, or zero for an instantaneous run.
    pub fn reads_per_second(&self) -> f64 {
        let secs = self.elapsed.as_secs_f64();
        if secs > 0.0 {
            self.reads() as f64 / secs
        } else {
            0.0
        }
    }
}

impl fmt::Display for StressReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} reads, {} mismatched, {:.0} reads/s over {:?}",
            self.reads(),
            self.mismatched,
            self.reads_per_second(),
            self.elapsed
        )
    }
}

/// Configuration for stress tests.
#[derive(Debug, Clone)]
pub struct StressConfig {
    /// Number of operations per thread.
    pub operations: usize,
    /// Number of concurrent threads.
    pub threads: usize,
    /// Size of each item in bytes.
    pub item_size: usize,
    /// Number of items per container.
    pub item_count: usize,
}

impl Default for StressConfig {
    fn default() -> Self {
        Self {
            operations: 10_000,
            threads: 4,
            item_size: 64,
            item_count: 32,
        }
    }
}

/// Item `index` of the container built by [`stress_polyad`].
pub fn stress_item(index: usize, size: usize) -> Vec<u8> {
    vec![(index % 251) as u8; size + index % 3]
}

/// Builds the container the stress helpers read from.
pub fn stress_polyad(config: &StressConfig) -> Polyad<'static> {
    let items: Vec<Vec<u8>> = (0..config.item_count)
        .map(|index| stress_item(index, config.item_size))
        .collect();
    Polyad::from_segments(items).expect("Failed to build stress polyad")
}

/// Run a sequential load-and-read stress test over one encoded buffer.
pub fn stress_sequential_loads(config: &StressConfig) -> StressReport {
    let encoded = stress_polyad(config)
        .into_bytes()
        .expect("stress polyad is sealed");

    let start = Instant::now();
    let mut matched = 0usize;
    let mut mismatched = 0usize;

    for i in 0..config.operations {
        let index = i % config.item_count.max(1);
        let expected = stress_item(index, config.item_size);
        let matches = Polyad::load(&encoded).is_ok_and(|pack| {
            config.item_count == 0 || pack.item_view(index).ok() == Some(expected.as_slice())
        });
        if matches {
            matched += 1;
        } else {
            mismatched += 1;
        }
    }

    let report = StressReport {
        matched,
        mismatched,
        elapsed: start.elapsed(),
    };
    debug!(%report, "sequential load stress finished");
    report
}

/// Run concurrent readers against one shared sealed polyad.
pub fn stress_concurrent_reads(config: &StressConfig) -> StressReport {
    let pack = Arc::new(stress_polyad(config));
    let successful = Arc::new(AtomicUsize::new(0));
    let failed = Arc::new(AtomicUsize::new(0));

    let start = Instant::now();
    let handles: Vec<_> = (0..config.threads)
        .map(|thread_id| {
            let pack = Arc::clone(&pack);
            let successful = Arc::clone(&successful);
            let failed = Arc::clone(&failed);
            let config = config.clone();
            thread::spawn(move || {
                for i in 0..config.operations {
                    let index = (thread_id + i) % config.item_count.max(1);
                    let expected = stress_item(index, config.item_size);
                    let matches = config.item_count == 0
                        || pack.item_view(index).ok() == Some(expected.as_slice());
                    if matches {
                        successful.fetch_add(1, Ordering::Relaxed);
                    } else {
                        failed.fetch_add(1, Ordering::Relaxed);
                    }
                }
            })
        })
        .collect();

    for handle in handles {
        handle.join().expect("Reader thread panicked");
    }

    let report = StressReport {
        matched: successful.load(Ordering::Relaxed),
        mismatched: failed.load(Ordering::Relaxed),
        elapsed: start.elapsed(),
    };
    debug!(%report, threads = config.threads, "concurrent read stress finished");
    report
}

#[cfg(test)]
mod tests {
    use super::*;

    fn small() -> StressConfig {
        StressConfig {
            operations: 500,
            threads: 4,
            item_size: 16,
            item_count: 8,
        }
    }

    #[test]
    fn sequential_loads_all_succeed() {
        let report = stress_sequential_loads(&small());
        assert!(report.is_clean(), "{report}");
        assert_eq!(report.reads(), 500);
    }

    #[test]
    fn concurrent_reads_all_succeed() {
        crate::fixtures::init_test_tracing();
        let report = stress_concurrent_reads(&small());
        assert!(report.is_clean(), "{report}");
        assert_eq!(report.reads(), 2_000);
    }

    #[test]
    fn report_summarizes_counts() {
        let report = StressReport {
            matched: 9,
            mismatched: 1,
            elapsed: Duration::from_secs(2),
        };
        assert!(!report.is_clean());
        assert_eq!(report.reads(), 10);
        assert_eq!(report.reads_per_second(), 5.0);
        assert!(report.to_string().starts_with("10 reads, 1 mismatched, 5 reads/s"));

        let instant = StressReport {
            elapsed: Duration::ZERO,
            ..report
        };
        assert_eq!(instant.reads_per_second(), 0.0);
    }
}
