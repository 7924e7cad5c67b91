//! Deterministic node simulation
//!
//! Time only moves through [`Simulation::advance_to`]. Sampling ticks fire
//! at every multiple of the tick period after the start; a tick due at the
//! same instant as an edge is delivered first, the way a pending timer
//! interrupt is serviced before a pulse that arrives in the same
//! millisecond. The wall clock tracks the monotonic clock exactly from
//! [`EPOCH_ORIGIN`](super::EPOCH_ORIGIN), so reconstructed timestamps can be
//! checked for equality.

use pulseflow_core::config::EngineConfig;
use pulseflow_core::node::FlowMeter;
use pulseflow_core::scheduler::{ReportOutcome, ReportScheduler};
use pulseflow_core::time::{instant, FixedWallClock, ManualClock};
use pulseflow_core::{
    CaptureRecord, MetricsRecord, MonotonicClock, PublishError, Sample, SchedulerError,
};

use super::EPOCH_ORIGIN;

/// Sink that keeps everything it is given
#[derive(Debug)]
pub struct RecordingSink<const N: usize> {
    pub metrics: Vec<MetricsRecord>,
    pub captures: Vec<CaptureRecord<N>>,
    pub fail_with: Option<PublishError>,
}

impl<const N: usize> Default for RecordingSink<N> {
    fn default() -> Self {
        Self {
            metrics: Vec::new(),
            captures: Vec::new(),
            fail_with: None,
        }
    }
}

impl<const N: usize> pulseflow_core::ReportSink<N> for RecordingSink<N> {
    fn publish_metrics(&mut self, record: &MetricsRecord) -> Result<(), PublishError> {
        if let Some(error) = self.fail_with {
            return Err(error);
        }
        self.metrics.push(*record);
        Ok(())
    }

    fn publish_capture(&mut self, record: &CaptureRecord<N>) -> Result<(), PublishError> {
        if let Some(error) = self.fail_with {
            return Err(error);
        }
        self.captures.push(record.clone());
        Ok(())
    }
}

/// One simulated node: meter, clocks, scheduler and sink
pub struct Simulation<const N: usize> {
    pub meter: FlowMeter<N>,
    pub clock: ManualClock,
    pub wall: FixedWallClock,
    pub sink: RecordingSink<N>,
    pub scheduler: ReportScheduler<N>,
    tick_period: u32,
    ticks: u32,
}

impl<const N: usize> Simulation<N> {
    /// Node started at monotonic 0 with valid wall-clock time
    pub fn new(config: EngineConfig) -> Self {
        let scheduler = ReportScheduler::starting_at(&config, instant(0))
            .expect("test configuration must be valid");

        Self {
            meter: FlowMeter::new(),
            clock: ManualClock::new(0),
            wall: FixedWallClock::valid_at(EPOCH_ORIGIN),
            sink: RecordingSink::default(),
            scheduler,
            tick_period: config.tick_period.ticks(),
            ticks: 0,
        }
    }

    /// Node whose wall clock has not synchronized yet
    pub fn without_wall_clock(config: EngineConfig) -> Self {
        let mut sim = Self::new(config);
        sim.wall = FixedWallClock::invalid();
        sim
    }

    pub fn now(&self) -> u32 {
        self.clock.now().ticks()
    }

    /// Sample value delivered by tick `k` (1-based)
    pub fn sample_of_tick(k: u32) -> Sample {
        k as Sample
    }

    /// Number of sampling ticks delivered so far
    pub fn ticks(&self) -> u32 {
        self.ticks
    }

    /// Move time forward, delivering every tick due on the way
    pub fn advance_to(&mut self, t: u32) {
        assert!(t >= self.now(), "simulation time cannot go backwards");

        loop {
            let next_tick = (self.ticks + 1) * self.tick_period;
            if next_tick > t {
                break;
            }
            self.set_time(next_tick);
            self.ticks += 1;
            self.meter.on_tick(Self::sample_of_tick(self.ticks));
        }
        self.set_time(t);
    }

    /// Pulse edge at time `t`
    pub fn edge_at(&mut self, t: u32) {
        self.advance_to(t);
        self.meter.on_edge(self.clock.now());
    }

    /// Run the reporting loop once at the current time
    pub fn poll(&mut self) -> nb::Result<ReportOutcome, SchedulerError> {
        self.scheduler
            .poll(self.clock.now(), &self.meter, &mut self.wall, &mut self.sink)
    }

    /// Advance to `t` and poll
    pub fn poll_at(&mut self, t: u32) -> nb::Result<ReportOutcome, SchedulerError> {
        self.advance_to(t);
        self.poll()
    }

    /// Wall-clock time matching monotonic `t`
    pub fn epoch_at(t: u32) -> u64 {
        EPOCH_ORIGIN + t as u64
    }

    fn set_time(&mut self, t: u32) {
        self.clock.set(t);
        self.wall.set(Self::epoch_at(t));
    }
}
