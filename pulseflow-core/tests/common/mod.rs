//! Common test utilities for integration tests
//!
//! This module provides:
//! - A deterministic node simulation driving both interrupt paths from a
//!   manual clock
//! - A recording sink with switchable failure
//! - Pulse train scenarios

#![allow(dead_code)]

pub mod harness;
pub mod scenarios;

pub use harness::{RecordingSink, Simulation};

/// Wall-clock origin used by every simulation (2023-11-14T22:13:20Z)
pub const EPOCH_ORIGIN: u64 = 1_700_000_000_000;

/// Approximate float comparison
pub fn assert_close(actual: f32, expected: f32, tolerance: f32) {
    assert!(
        (actual - expected).abs() <= tolerance,
        "expected {expected} ± {tolerance}, got {actual}"
    );
}
