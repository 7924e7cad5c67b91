//! Report Scheduler
//!
//! ## Overview
//!
//! [`ReportScheduler::poll`] runs on the cooperative polling path. It is
//! gated twice:
//!
//! 1. **Time source.** While the wall clock is invalid the scheduler only
//!    (re)starts acquisition and returns
//!    `Err(nb::Error::Other(SchedulerError::TimeSourceInvalid))`. Counting
//!    and sampling continue in their interrupts regardless.
//! 2. **Due time.** Before `next_due` the poll returns
//!    `Err(nb::Error::WouldBlock)`.
//!
//! A due poll recomputes the flow estimate, publishes a metrics record,
//! exports a ready capture window (if any) through the
//! [`TimeReconciler`], re-arms the trigger, and advances `next_due` by
//! exactly one period.
//!
//! ## Catch-up
//!
//! `next_due` advances from its previous value, never from `now`:
//!
//! ```text
//! period = 5000, next_due = 0, poll at t = 12000
//!
//!   poll #1 → report, next_due = 5000
//!   poll #2 → report, next_due = 10000
//!   poll #3 → report, next_due = 15000
//!   poll #4 → WouldBlock
//! ```
//!
//! One report per call, so a long stall is worked off incrementally rather
//! than in a burst.
//!
//! ## Failures
//!
//! Publish failures are counted in [`ReportStats`] and returned in the
//! [`ReportOutcome`]; they never block the schedule and are never retried.
//! A capture window whose publish failed is dropped and the trigger re-armed.
//!
//! ## Usage
//!
//! ```rust
//! use pulseflow_core::config::EngineConfig;
//! use pulseflow_core::node::FlowMeter;
//! use pulseflow_core::scheduler::ReportScheduler;
//! use pulseflow_core::time::{instant, FixedWallClock};
//! use pulseflow_core::{CaptureRecord, MetricsRecord, PublishError, ReportSink};
//!
//! struct Discard;
//!
//! impl ReportSink<32> for Discard {
//!     fn publish_metrics(&mut self, _: &MetricsRecord) -> Result<(), PublishError> {
//!         Ok(())
//!     }
//!     fn publish_capture(&mut self, _: &CaptureRecord<32>) -> Result<(), PublishError> {
//!         Ok(())
//!     }
//! }
//!
//! let meter = FlowMeter::<32>::new();
//! let mut clock = FixedWallClock::valid_at(1_700_000_000_000);
//! let mut scheduler = ReportScheduler::starting_at(&EngineConfig::default(), instant(0))?;
//!
//! // First report is due one period after start
//! assert!(scheduler.poll(instant(1_000), &meter, &mut clock, &mut Discard).is_err());
//! assert!(scheduler.poll(instant(5_000), &meter, &mut clock, &mut Discard).is_ok());
//! # Ok::<(), pulseflow_core::ConfigError>(())
//! ```

use crate::capture::Export;
use crate::config::EngineConfig;
use crate::errors::{ConfigError, PublishError, SchedulerError};
use crate::estimator::{FlowEstimate, FlowRateEstimator};
use crate::node::FlowMeter;
use crate::reconcile::TimeReconciler;
use crate::records::MetricsRecord;
use crate::time::{advance, reached, Duration, EpochMillis, Instant};
use crate::traits::{ReportSink, WallClock};

/// Running totals kept by the scheduler
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ReportStats {
    /// Report passes executed
    pub reports: u32,
    /// Metrics records accepted by the sink
    pub metrics_published: u32,
    /// Metrics and capture publishes that failed
    pub publish_failures: u32,
    /// Capture windows accepted by the sink
    pub captures_exported: u32,
    /// Windows dropped because an edge re-armed the trigger mid-export
    pub captures_discarded: u32,
    /// Polls spent waiting for the time source
    pub acquisition_attempts: u32,
}

/// What happened to the capture window during a report pass
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CaptureOutcome {
    /// No window was ready
    Idle,
    /// Window reconciled and accepted by the sink
    Published,
    /// Sink rejected the window; it was dropped
    Failed(PublishError),
    /// Window invalidated by a newer edge during export
    Discarded,
}

/// Result of one report pass
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ReportOutcome {
    /// Estimate used for the metrics record
    pub estimate: FlowEstimate,
    /// Result of publishing the metrics record
    pub metrics: Result<(), PublishError>,
    /// What happened to the capture window
    pub capture: CaptureOutcome,
    /// Wall-clock time stamped on the metrics record
    pub absolute_time: EpochMillis,
}

/// Periodic reporting state machine for an `N`-slot capture
#[derive(Debug, Clone)]
pub struct ReportScheduler<const N: usize> {
    period: Duration,
    next_due: Instant,
    estimator: FlowRateEstimator,
    reconciler: TimeReconciler,
    stats: ReportStats,
}

impl<const N: usize> ReportScheduler<N> {
    /// Scheduler whose first report is due at `first_due`
    pub fn new(config: &EngineConfig, first_due: Instant) -> Result<Self, ConfigError> {
        config.validate()?;

        Ok(Self {
            period: config.report_period,
            next_due: first_due,
            estimator: FlowRateEstimator::new(config),
            reconciler: TimeReconciler::new(config.tick_period),
            stats: ReportStats::default(),
        })
    }

    /// Scheduler whose first report is due one period after `now`
    pub fn starting_at(config: &EngineConfig, now: Instant) -> Result<Self, ConfigError> {
        Self::new(config, advance(now, config.report_period))
    }

    /// Monotonic time the next report is due
    pub fn next_due(&self) -> Instant {
        self.next_due
    }

    /// Report period
    pub fn period(&self) -> Duration {
        self.period
    }

    /// Running totals
    pub fn stats(&self) -> ReportStats {
        self.stats
    }

    /// Most recent flow estimate
    pub fn estimate(&self) -> FlowEstimate {
        self.estimator.estimate()
    }

    /// Run one report pass if the time source is valid and a report is due
    pub fn poll<W, S>(
        &mut self,
        now: Instant,
        meter: &FlowMeter<N>,
        clock: &mut W,
        sink: &mut S,
    ) -> nb::Result<ReportOutcome, SchedulerError>
    where
        W: WallClock,
        S: ReportSink<N>,
    {
        if !clock.is_valid() {
            clock.begin_acquisition();
            self.stats.acquisition_attempts = self.stats.acquisition_attempts.wrapping_add(1);
            log_debug!("Time source invalid, acquisition restarted");
            return Err(nb::Error::Other(SchedulerError::TimeSourceInvalid));
        }

        if !reached(now, self.next_due) {
            return Err(nb::Error::WouldBlock);
        }

        let absolute_time = clock.now_epoch_millis();
        let edge = meter.edges().snapshot();
        let estimate = self.estimator.update(now, &edge);

        let record = MetricsRecord {
            counter: edge.count,
            time_since_last_edge: edge.since_last_edge(now).ticks(),
            last_pulse_duration: edge.last_pulse_duration.ticks(),
            filtered_flow_rate: estimate.filtered,
            absolute_time,
        };
        let metrics = sink.publish_metrics(&record);
        match metrics {
            Ok(()) => self.stats.metrics_published = self.stats.metrics_published.wrapping_add(1),
            Err(e) => {
                self.stats.publish_failures = self.stats.publish_failures.wrapping_add(1);
                log_warn!("Metrics publish failed: {}", e);
            }
        }

        let capture = self.export_capture(now, absolute_time, meter, sink);

        self.next_due = advance(self.next_due, self.period);
        self.stats.reports = self.stats.reports.wrapping_add(1);

        Ok(ReportOutcome {
            estimate,
            metrics,
            capture,
            absolute_time,
        })
    }

    fn export_capture<S: ReportSink<N>>(
        &mut self,
        now: Instant,
        epoch_now: EpochMillis,
        meter: &FlowMeter<N>,
        sink: &mut S,
    ) -> CaptureOutcome {
        let snapshot = match meter.capture().try_export() {
            Export::NotReady => return CaptureOutcome::Idle,
            Export::Torn => return self.discard(),
            Export::Ready(snapshot) => snapshot,
        };

        // Anchor on the edge that froze this window. Any later edge re-arms
        // the trigger, so a still-ready state means the anchor is current.
        let anchor = meter.edges().snapshot();
        if !meter.capture().state().is_ready() {
            return self.discard();
        }

        let edge_time = TimeReconciler::edge_time(epoch_now, anchor.since_last_edge(now));
        let record = self.reconciler.reconcile(edge_time, &snapshot);

        let outcome = match sink.publish_capture(&record) {
            Ok(()) => {
                self.stats.captures_exported = self.stats.captures_exported.wrapping_add(1);
                log_info!("Capture window exported, {} samples", record.len() as u32);
                CaptureOutcome::Published
            }
            Err(e) => {
                self.stats.publish_failures = self.stats.publish_failures.wrapping_add(1);
                log_warn!("Capture publish failed: {}", e);
                CaptureOutcome::Failed(e)
            }
        };

        if !meter.capture().complete_export() {
            log_debug!("Edge arrived during export, trigger already re-armed");
        }
        outcome
    }

    fn discard(&mut self) -> CaptureOutcome {
        self.stats.captures_discarded = self.stats.captures_discarded.wrapping_add(1);
        log_debug!("Capture window invalidated during export");
        CaptureOutcome::Discarded
    }
}
