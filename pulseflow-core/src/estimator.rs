//! Flow Rate Estimation
//!
//! ## Algorithm
//!
//! The instantaneous rate is derived from edge timing alone:
//!
//! ```text
//! elapsed = now - last_edge
//!
//! elapsed > last_pulse_duration  →  rate = impulses_per_unit / elapsed  * scale
//! otherwise                      →  rate = impulses_per_unit / duration * scale
//! ```
//!
//! The first branch covers a flow that is slowing down or has stopped: no
//! edge arrived within the previously observed period, so the rate is
//! extrapolated from the time already waited and decays toward zero. The
//! second branch holds the nominal rate fixed at the most recent edge.
//!
//! A zero denominator (two edges in the same clock tick, with the poll in
//! that tick too) skips the instantaneous update and keeps the previous
//! value. Before the first edge the instantaneous rate is zero.
//!
//! The reported value is an exponential filter over the instantaneous rate:
//!
//! ```text
//! filtered = filtered * k + instantaneous * (1 - k)
//! ```
//!
//! evaluated as `instantaneous + k * (filtered - instantaneous)` with a
//! fused multiply-add and clamped to the interval between the two inputs,
//! so rounding can never push the result outside that interval.

use crate::config::EngineConfig;
use crate::edge::EdgeState;
use crate::time::Instant;

/// Instantaneous and smoothed rate
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct FlowEstimate {
    /// Rate from the latest edge timing
    pub instantaneous: f32,
    /// Exponentially smoothed rate, the reported value
    pub filtered: f32,
}

/// Edge-timing flow estimator with exponential smoothing
#[derive(Debug, Clone)]
pub struct FlowRateEstimator {
    impulses_per_unit: f32,
    rate_scale: f32,
    smoothing: f32,
    estimate: FlowEstimate,
}

impl FlowRateEstimator {
    /// Estimator with a zero starting estimate
    pub fn new(config: &EngineConfig) -> Self {
        Self {
            impulses_per_unit: config.impulses_per_unit,
            rate_scale: config.rate_scale,
            smoothing: config.smoothing,
            estimate: FlowEstimate::default(),
        }
    }

    /// Latest estimate without recomputing
    pub fn estimate(&self) -> FlowEstimate {
        self.estimate
    }

    /// Recompute from a consistent edge snapshot
    pub fn update(&mut self, now: Instant, edge: &EdgeState) -> FlowEstimate {
        if let Some(rate) = self.instantaneous(now, edge) {
            self.estimate.instantaneous = rate;
        }

        self.estimate.filtered = smooth(
            self.estimate.filtered,
            self.estimate.instantaneous,
            self.smoothing,
        );
        self.estimate
    }

    /// `None` when the chosen denominator is zero
    fn instantaneous(&self, now: Instant, edge: &EdgeState) -> Option<f32> {
        if edge.count == 0 {
            return Some(0.0);
        }

        let elapsed = edge.since_last_edge(now).ticks();
        let duration = edge.last_pulse_duration.ticks();
        let denominator = if elapsed > duration { elapsed } else { duration };

        if denominator == 0 {
            return None;
        }
        Some(self.impulses_per_unit / denominator as f32 * self.rate_scale)
    }
}

/// One exponential-filter step, bounded between `previous` and `input`
///
/// A non-finite `input` leaves the filter where it was.
pub fn smooth(previous: f32, input: f32, k: f32) -> f32 {
    if !input.is_finite() {
        return previous;
    }
    if !previous.is_finite() {
        return input;
    }

    let blended = libm::fmaf(k, previous - input, input);
    let (low, high) = if previous <= input {
        (previous, input)
    } else {
        (input, previous)
    };
    blended.clamp(low, high)
}
