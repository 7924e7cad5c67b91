//! Core Traits and Abstractions for PulseFlow
//!
//! The engine touches the outside world at exactly two seams:
//!
//! - [`time`] - monotonic counter and external wall clock
//! - [`sink`] - destination for exported metrics and capture records
//!
//! Everything else (pulse counting, sampling, triggering, estimation,
//! scheduling) is concrete and lives in the crate root modules. Both traits
//! are used through generics so embedded builds pay no dynamic dispatch.

pub mod sink;
pub mod time;

pub use sink::ReportSink;
pub use time::{MonotonicClock, WallClock};
