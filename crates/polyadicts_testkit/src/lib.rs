//! # Polyadicts Testkit
//!
//! Test utilities for the polyadicts codec.
//!
//! This crate provides:
//! - Property-based test generators using proptest
//! - Ownership fixtures that count segment releases
//! - Golden files checked against both encoder and decoder
//! - Cross-language test vectors
//! - Fuzz testing harnesses
//! - Concurrent reader stress tests
//!
//! ## Usage
//!
//! ```rust,ignore
//! use polyadicts_testkit::prelude::*;
//!
//! #[test]
//! fn owned_segments_are_released() {
//!     let tracker = ReleaseTracker::new();
//!     let mut pack = Polyad::prepare(1).unwrap();
//!     pack.set(0, tracker.segment(b"payload")).unwrap();
//!     pack.finish().unwrap();
//!     assert_eq!(tracker.released(), 1);
//! }
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]

pub mod fixtures;
pub mod fuzz;
pub mod generators;
pub mod golden;
pub mod hex;
pub mod stress;
pub mod vectors;

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::fixtures::*;
    pub use crate::fuzz::*;
    pub use crate::generators::*;
    pub use crate::stress::*;
    pub use crate::vectors::*;
    pub use polyadicts_codec::{Polyad, PolyadError, Polyid, Segment};
}

pub use fixtures::*;
pub use fuzz::*;
pub use generators::*;
pub use golden::*;
pub use hex::*;
pub use stress::*;
pub use vectors::*;
