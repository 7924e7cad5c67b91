//! Capture Timestamp Reconstruction
//!
//! Samples are stored without individual timestamps. At export time the
//! wall-clock time of the triggering edge is recovered once, and every slot
//! is placed relative to it using the fixed tick period:
//!
//! ```text
//! T_edge = epoch_now - (mono_now - mono_last_edge)
//! ts(i)  = T_edge - (N/2 - i) * tick_period        i in [0, N)
//! ```
//!
//! For `N = 32`, a 10 ms tick and an edge at `T_edge`, the window runs from
//! `T_edge - 160 ms` (slot 0) to `T_edge + 150 ms` (slot 31).

use crate::buffer::RingSnapshot;
use crate::records::{CapturePoint, CaptureRecord};
use crate::time::{Duration, EpochMillis};

/// Maps ring slots to reconstructed wall-clock timestamps
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimeReconciler {
    tick_period: Duration,
}

impl TimeReconciler {
    /// Reconciler for a sampler ticking every `tick_period`
    pub const fn new(tick_period: Duration) -> Self {
        Self { tick_period }
    }

    /// Wall-clock time of an edge that happened `since_edge` ago
    pub fn edge_time(epoch_now: EpochMillis, since_edge: Duration) -> EpochMillis {
        epoch_now.saturating_sub(since_edge.ticks() as u64)
    }

    /// Reconstructed timestamp of slot `i` in an `N`-slot window
    pub fn slot_time<const N: usize>(&self, edge_time: EpochMillis, i: usize) -> EpochMillis {
        let offset = (i as i64 - (N / 2) as i64) * self.tick_period.ticks() as i64;
        edge_time.saturating_add_signed(offset)
    }

    /// Attach timestamps to a frozen window, oldest sample first
    pub fn reconcile<const N: usize>(
        &self,
        edge_time: EpochMillis,
        snapshot: &RingSnapshot<N>,
    ) -> CaptureRecord<N> {
        let mut points = heapless::Vec::new();
        for (i, &value) in snapshot.samples.iter().enumerate() {
            let point = CapturePoint {
                value,
                absolute_time: self.slot_time::<N>(edge_time, i),
            };
            // Exactly N samples into an N-slot vec
            if points.push(point).is_err() {
                break;
            }
        }
        CaptureRecord { points }
    }
}
