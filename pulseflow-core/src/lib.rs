//! Core metering engine for PulseFlow
//!
//! Counts pulses from a flow sensor, captures a window of analog samples
//! centered on each pulse edge, estimates a smoothed flow rate, and reports
//! on a fixed schedule once wall-clock time is available.
//!
//! Key constraints:
//! - Two interrupt handlers (pulse edge, sampling timer) that are O(1),
//!   allocation-free and never wait
//! - One cooperative polling loop for estimation and reporting
//! - No heap, no `unsafe`; all shared state is atomics
//!
//! ```no_run
//! use pulseflow_core::config::EngineConfig;
//! use pulseflow_core::node::FlowMeter;
//! use pulseflow_core::scheduler::ReportScheduler;
//! use pulseflow_core::time::{instant, FixedWallClock};
//! # use pulseflow_core::{CaptureRecord, MetricsRecord, PublishError, ReportSink};
//! # struct Sink;
//! # impl ReportSink<32> for Sink {
//! #     fn publish_metrics(&mut self, _: &MetricsRecord) -> Result<(), PublishError> { Ok(()) }
//! #     fn publish_capture(&mut self, _: &CaptureRecord<32>) -> Result<(), PublishError> { Ok(()) }
//! # }
//! # fn read_adc() -> u16 { 0 }
//! # fn millis() -> u32 { 0 }
//!
//! static METER: FlowMeter<32> = FlowMeter::new();
//!
//! // Interrupt handlers
//! fn pulse_isr() { METER.on_edge(instant(millis())); }
//! fn sample_isr() { METER.on_tick(read_adc()); }
//!
//! // Main loop
//! let mut clock = FixedWallClock::valid_at(1_700_000_000_000);
//! let mut scheduler = ReportScheduler::starting_at(&EngineConfig::default(), instant(millis()))?;
//! loop {
//!     match scheduler.poll(instant(millis()), &METER, &mut clock, &mut Sink) {
//!         Ok(_outcome) => {}                  // Report sent
//!         Err(nb::Error::WouldBlock) => {}    // Not due yet
//!         Err(nb::Error::Other(_)) => {}      // Waiting for wall-clock time
//!     }
//! }
//! # Ok::<(), pulseflow_core::ConfigError>(())
//! ```

#![cfg_attr(not(any(feature = "std", test)), no_std)]
#![deny(unsafe_code)]
#![warn(missing_docs)]

#[macro_use]
mod macros;

pub mod buffer;
pub mod capture;
pub mod config;
pub mod constants;
pub mod edge;
pub mod errors;
pub mod estimator;
pub mod events;
pub mod node;
pub mod reconcile;
pub mod records;
pub mod scheduler;
pub mod time;
pub mod traits;
pub mod trigger;

// Public API
pub use buffer::{RingSnapshot, Sample, SampleRingBuffer};
pub use capture::{CaptureUnit, Export};
pub use config::EngineConfig;
pub use edge::{EdgeState, PulseEdgeTracker};
pub use errors::{ConfigError, PublishError, SchedulerError};
pub use estimator::{FlowEstimate, FlowRateEstimator};
pub use events::EngineEvent;
pub use node::{DefaultFlowMeter, FlowMeter};
pub use reconcile::TimeReconciler;
pub use records::{CapturePoint, CaptureRecord, MetricsRecord};
pub use scheduler::{CaptureOutcome, ReportOutcome, ReportScheduler, ReportStats};
pub use time::{Duration, EpochMillis, Instant};
pub use traits::{MonotonicClock, ReportSink, WallClock};
pub use trigger::{TickAction, TriggerPhase, TriggerState};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
