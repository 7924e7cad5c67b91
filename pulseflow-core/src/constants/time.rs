//! Time-Related Constants
//!
//! Sampling and reporting intervals for the metering node.

/// Milliseconds per second.
pub const MS_PER_SECOND: u32 = 1000;

/// Default sampling tick period (milliseconds).
///
/// 100 Hz raw sampling. With the default 32-slot ring this gives a
/// 160 ms pre-trigger and 150 ms post-trigger window around each edge.
pub const DEFAULT_TICK_PERIOD_MS: u32 = 10;

/// Default report period (milliseconds).
///
/// One metrics record every five seconds, the cadence the deployed
/// nodes publish at.
pub const DEFAULT_REPORT_PERIOD_MS: u32 = 5000;
