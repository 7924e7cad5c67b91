//! Metering node
//!
//! [`FlowMeter`] is the state shared between the two interrupt handlers and
//! the reporting loop. It is built entirely from atomics, so one instance
//! can sit in a `static` and be used through `&self` from every context:
//!
//! ```rust
//! use pulseflow_core::node::FlowMeter;
//! use pulseflow_core::time::instant;
//!
//! static METER: FlowMeter<32> = FlowMeter::new();
//!
//! // pulse input interrupt
//! METER.on_edge(instant(1_000));
//!
//! // sampling timer interrupt
//! METER.on_tick(512);
//!
//! assert_eq!(METER.edges().count(), 1);
//! ```

use crate::buffer::Sample;
use crate::capture::CaptureUnit;
use crate::constants::DEFAULT_CAPTURE_CAPACITY;
use crate::edge::PulseEdgeTracker;
use crate::events::EngineEvent;
use crate::time::Instant;
use crate::trigger::TickAction;

/// Meter with the default 32-slot capture window
pub type DefaultFlowMeter = FlowMeter<DEFAULT_CAPTURE_CAPACITY>;

/// Edge tracker plus trigger-synchronized capture for an `N`-slot window
#[derive(Debug)]
pub struct FlowMeter<const N: usize> {
    edges: PulseEdgeTracker,
    capture: CaptureUnit<N>,
}

impl<const N: usize> FlowMeter<N> {
    /// Meter with no edges and an armed, zeroed capture
    pub const fn new() -> Self {
        Self {
            edges: PulseEdgeTracker::new(),
            capture: CaptureUnit::new(),
        }
    }

    /// Pulse edge interrupt
    ///
    /// Records the edge, then re-arms the capture so the window is centered
    /// on it. O(1), never blocks.
    #[inline]
    pub fn on_edge(&self, now: Instant) {
        self.edges.record(now);
        self.capture.trigger();
    }

    /// Sampling timer interrupt
    #[inline]
    pub fn on_tick(&self, sample: Sample) -> TickAction {
        self.capture.on_tick(sample)
    }

    /// Dispatch one event to the matching handler
    pub fn handle(&self, event: EngineEvent) -> Option<TickAction> {
        match event {
            EngineEvent::EdgeOccurred { at } => {
                self.on_edge(at);
                None
            }
            EngineEvent::TickOccurred { sample } => Some(self.on_tick(sample)),
        }
    }

    /// Edge tracker
    pub fn edges(&self) -> &PulseEdgeTracker {
        &self.edges
    }

    /// Capture ring and trigger
    pub fn capture(&self) -> &CaptureUnit<N> {
        &self.capture
    }
}

impl<const N: usize> Default for FlowMeter<N> {
    fn default() -> Self {
        Self::new()
    }
}
