//! Pulse Edge Tracking
//!
//! ## Overview
//!
//! [`PulseEdgeTracker`] is written from the pulse-edge interrupt, the
//! highest-priority context on the node. Each rising edge records its
//! timestamp, the gap since the previous edge, and bumps a cumulative count.
//!
//! ## Concurrency
//!
//! The tracker has a single writer (the edge handler) and readers on the
//! polling path. The three fields must be read as one consistent
//! [`EdgeState`], so they are published through a sequence counter:
//!
//! ```text
//! writer (ISR)                      reader (poll loop)
//!   seq += 1   (odd: write open)      s1 = seq        (retry if odd)
//!   write fields                      read fields
//!   seq += 1   (even: write closed)   s2 = seq        (retry if s1 != s2)
//! ```
//!
//! The writer never waits. A reader interrupted by an edge sees the
//! counter move and simply reads again; on a single core the interrupt
//! always completes before the reader resumes, so at most one retry per
//! edge is needed.
//!
//! All state is held in atomics, so a tracker can live in a `static` and be
//! shared by reference between the interrupt handler and the main loop.

use core::sync::atomic::{fence, AtomicU32, Ordering};

use crate::time::{elapsed_since, instant, Duration, Instant};

/// Consistent view of the most recent edge
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EdgeState {
    /// Monotonic time of the most recent edge
    pub last_edge: Instant,

    /// Gap between the two most recent edges (may be zero)
    pub last_pulse_duration: Duration,

    /// Number of edges seen since start, wrapping at `u32::MAX`
    pub count: u32,
}

impl EdgeState {
    /// State before any edge has been seen
    pub const INITIAL: Self = Self {
        last_edge: instant(0),
        last_pulse_duration: Duration::from_ticks(0),
        count: 0,
    };

    /// Time elapsed since the most recent edge
    ///
    /// Zero when the edge is stamped after `now`, which happens when the
    /// edge interrupt lands between reading the clock and taking the
    /// snapshot.
    pub fn since_last_edge(&self, now: Instant) -> Duration {
        elapsed_since(now, self.last_edge)
    }
}

impl Default for EdgeState {
    fn default() -> Self {
        Self::INITIAL
    }
}

/// Interrupt-safe record of pulse edges
#[derive(Debug)]
pub struct PulseEdgeTracker {
    seq: AtomicU32,
    last_edge: AtomicU32,
    last_duration: AtomicU32,
    count: AtomicU32,
}

impl PulseEdgeTracker {
    /// Tracker with no edges recorded
    ///
    /// ```rust
    /// use pulseflow_core::edge::PulseEdgeTracker;
    /// static EDGES: PulseEdgeTracker = PulseEdgeTracker::new();
    /// ```
    pub const fn new() -> Self {
        Self {
            seq: AtomicU32::new(0),
            last_edge: AtomicU32::new(0),
            last_duration: AtomicU32::new(0),
            count: AtomicU32::new(0),
        }
    }

    /// Record a rising edge observed at `now`
    ///
    /// Constant time, no allocation, cannot fail. Must only be called from
    /// one context (the edge interrupt). Returns the measured pulse
    /// duration, which is zero when two edges share a clock tick.
    #[inline]
    pub fn record(&self, now: Instant) -> Duration {
        let seq = self.seq.load(Ordering::Relaxed);
        self.seq.store(seq.wrapping_add(1), Ordering::Relaxed);
        fence(Ordering::Release);

        // Gap is taken against the previous edge before it is overwritten
        let previous = self.last_edge.load(Ordering::Relaxed);
        let duration = now.ticks().wrapping_sub(previous);

        self.last_edge.store(now.ticks(), Ordering::Relaxed);
        self.last_duration.store(duration, Ordering::Relaxed);
        let count = self.count.load(Ordering::Relaxed);
        self.count.store(count.wrapping_add(1), Ordering::Relaxed);

        self.seq.store(seq.wrapping_add(2), Ordering::Release);

        Duration::from_ticks(duration)
    }

    /// Read all fields as one consistent snapshot
    pub fn snapshot(&self) -> EdgeState {
        loop {
            let before = self.seq.load(Ordering::Acquire);
            if before & 1 == 1 {
                core::hint::spin_loop();
                continue;
            }

            let last_edge = self.last_edge.load(Ordering::Relaxed);
            let last_duration = self.last_duration.load(Ordering::Relaxed);
            let count = self.count.load(Ordering::Relaxed);

            fence(Ordering::Acquire);
            if self.seq.load(Ordering::Relaxed) == before {
                return EdgeState {
                    last_edge: instant(last_edge),
                    last_pulse_duration: Duration::from_ticks(last_duration),
                    count,
                };
            }
        }
    }

    /// Cumulative edge count (single field, no snapshot needed)
    pub fn count(&self) -> u32 {
        self.count.load(Ordering::Relaxed)
    }
}

impl Default for PulseEdgeTracker {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn starts_empty() {
        let tracker = PulseEdgeTracker::new();
        assert_eq!(tracker.snapshot(), EdgeState::INITIAL);
        assert_eq!(tracker.count(), 0);
    }

    #[test]
    fn duration_is_gap_since_previous_edge() {
        let tracker = PulseEdgeTracker::new();

        tracker.record(instant(1000));
        let duration = tracker.record(instant(1250));
        assert_eq!(duration.ticks(), 250);

        let state = tracker.snapshot();
        assert_eq!(state.last_edge.ticks(), 1250);
        assert_eq!(state.last_pulse_duration.ticks(), 250);
        assert_eq!(state.count, 2);
    }

    #[test]
    fn first_edge_measures_from_zero() {
        let tracker = PulseEdgeTracker::new();
        assert_eq!(tracker.record(instant(400)).ticks(), 400);
    }

    #[test]
    fn zero_duration_edges_are_counted() {
        let tracker = PulseEdgeTracker::new();
        tracker.record(instant(500));
        tracker.record(instant(500));

        let state = tracker.snapshot();
        assert_eq!(state.last_pulse_duration.ticks(), 0);
        assert_eq!(state.count, 2);
    }

    #[test]
    fn duration_across_counter_wrap() {
        let tracker = PulseEdgeTracker::new();
        tracker.record(instant(u32::MAX - 9));
        assert_eq!(tracker.record(instant(20)).ticks(), 30);
    }

    #[test]
    fn edge_after_now_counts_as_no_time_elapsed() {
        let tracker = PulseEdgeTracker::new();
        tracker.record(instant(9_900));
        tracker.record(instant(10_001));

        let state = tracker.snapshot();
        assert_eq!(state.since_last_edge(instant(10_000)).ticks(), 0);
        assert_eq!(state.since_last_edge(instant(10_051)).ticks(), 50);
    }

    #[test]
    fn since_last_edge_across_counter_wrap() {
        let state = EdgeState {
            last_edge: instant(u32::MAX - 4),
            last_pulse_duration: Duration::from_ticks(10),
            count: 1,
        };
        assert_eq!(state.since_last_edge(instant(5)).ticks(), 10);
    }

    #[test]
    fn concurrent_reader_sees_consistent_pairs() {
        use std::sync::atomic::AtomicBool;
        use std::sync::Arc;

        // Edges every 7ms: a torn read would show a duration != 7
        let tracker = Arc::new(PulseEdgeTracker::new());
        tracker.record(instant(0));
        let done = Arc::new(AtomicBool::new(false));

        let writer = {
            let tracker = Arc::clone(&tracker);
            let done = Arc::clone(&done);
            std::thread::spawn(move || {
                for i in 1..50_000u32 {
                    tracker.record(instant(i * 7));
                }
                done.store(true, Ordering::Release);
            })
        };

        while !done.load(Ordering::Acquire) {
            let state = tracker.snapshot();
            if state.count > 1 {
                assert_eq!(state.last_pulse_duration.ticks(), 7);
                assert_eq!(state.last_edge.ticks(), (state.count - 1) * 7);
            }
        }
        writer.join().unwrap();
    }

    proptest! {
        #[test]
        fn count_matches_number_of_edges(gaps in proptest::collection::vec(0u32..500, 0..200)) {
            let tracker = PulseEdgeTracker::new();
            let mut now = 0u32;
            for gap in &gaps {
                now = now.wrapping_add(*gap);
                tracker.record(instant(now));
            }
            prop_assert_eq!(tracker.snapshot().count as usize, gaps.len());
        }

        #[test]
        fn last_duration_matches_last_gap(
            start in any::<u32>(),
            gaps in proptest::collection::vec(0u32..10_000, 2..50),
        ) {
            let tracker = PulseEdgeTracker::new();
            let mut now = start;
            tracker.record(instant(now));
            for gap in &gaps {
                now = now.wrapping_add(*gap);
                tracker.record(instant(now));
            }
            let state = tracker.snapshot();
            prop_assert_eq!(state.last_pulse_duration.ticks(), *gaps.last().unwrap());
            prop_assert_eq!(state.last_edge.ticks(), now);
        }
    }
}
