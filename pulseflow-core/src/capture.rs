//! Trigger-Synchronized Capture
//!
//! [`CaptureUnit`] couples the sample ring with its trigger controller.
//! The sampling interrupt calls [`CaptureUnit::on_tick`], the edge interrupt
//! calls [`CaptureUnit::trigger`], and the polling consumer exports ready
//! windows with [`CaptureUnit::try_export`] followed by
//! [`CaptureUnit::complete_export`].
//!
//! ## Export Consistency
//!
//! Sampling is suspended while a window is `CaptureReady`, so in the common
//! case the ring is frozen for the whole export. If an edge arrives during
//! export, ticks resume and may overwrite the oldest cells. The export
//! therefore notes the ring's write count before checking the phase and
//! rejects the copy if anything was written since: the caller gets
//! [`Export::Torn`] and the window is dropped. The newer edge has already
//! started the next capture.

use crate::buffer::{RingSnapshot, Sample, SampleRingBuffer};
use crate::trigger::{TickAction, TriggerCell, TriggerState};

/// Result of an export attempt
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Export<const N: usize> {
    /// No complete window is waiting
    NotReady,
    /// Frozen window, oldest first; slot `N/2` is the last sample taken
    /// at or before the triggering edge
    Ready(RingSnapshot<N>),
    /// Sampling resumed during the copy; the window was dropped
    Torn,
}

/// Sample ring plus trigger controller
#[derive(Debug)]
pub struct CaptureUnit<const N: usize> {
    ring: SampleRingBuffer<N>,
    trigger: TriggerCell,
}

impl<const N: usize> CaptureUnit<N> {
    /// Post-trigger window length, `N/2`
    pub const HALF: u16 = (N / 2) as u16;

    /// Empty ring with the trigger armed
    pub const fn new() -> Self {
        Self {
            ring: SampleRingBuffer::new(),
            trigger: TriggerCell::new(Self::HALF),
        }
    }

    /// Sampling interrupt entry point
    #[inline]
    pub fn on_tick(&self, sample: Sample) -> TickAction {
        let action = self.trigger.tick();
        if action == TickAction::Store {
            self.ring.push(sample);
        }
        action
    }

    /// Edge interrupt entry point: (re)start the post-trigger countdown
    #[inline]
    pub fn trigger(&self) {
        self.trigger.trigger();
    }

    /// Current trigger state
    pub fn state(&self) -> TriggerState {
        self.trigger.load()
    }

    /// Underlying sample ring
    pub fn ring(&self) -> &SampleRingBuffer<N> {
        &self.ring
    }

    /// Copy the frozen window if one is ready
    ///
    /// Does not re-arm; call [`Self::complete_export`] once the window has
    /// been handed off.
    pub fn try_export(&self) -> Export<N> {
        let writes = self.ring.writes();
        if !self.trigger.load().is_ready() {
            return Export::NotReady;
        }

        match self.ring.snapshot() {
            Some(snapshot) if self.ring.writes() == writes => Export::Ready(snapshot),
            _ => Export::Torn,
        }
    }

    /// Re-arm after an export; a no-op if an edge already re-armed
    pub fn complete_export(&self) -> bool {
        self.trigger.complete_export()
    }
}

impl<const N: usize> Default for CaptureUnit<N> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::trigger::TriggerPhase;

    fn fill(unit: &CaptureUnit<8>, from: u16, count: u16) {
        for v in from..from + count {
            unit.on_tick(v);
        }
    }

    #[test]
    fn rolling_until_edge() {
        let unit = CaptureUnit::<8>::new();
        fill(&unit, 0, 20);
        assert_eq!(unit.state().phase, TriggerPhase::Armed);
        assert_eq!(unit.try_export(), Export::NotReady);
    }

    #[test]
    fn edge_aligns_at_half() {
        let unit = CaptureUnit::<8>::new();
        fill(&unit, 0, 10); // last pre-edge sample is 9
        unit.trigger();
        fill(&unit, 100, 4); // 100..=102 stored, 103 completes the window

        let Export::Ready(snapshot) = unit.try_export() else {
            panic!("window should be ready");
        };
        assert_eq!(snapshot.samples, [5, 6, 7, 8, 9, 100, 101, 102]);
        assert_eq!(snapshot.samples[CaptureUnit::<8>::HALF as usize], 9);
    }

    #[test]
    fn frozen_while_ready() {
        let unit = CaptureUnit::<8>::new();
        unit.trigger();
        fill(&unit, 0, 4);
        let writes = unit.ring().writes();

        fill(&unit, 50, 10);
        assert_eq!(unit.ring().writes(), writes);
        assert!(unit.state().is_ready());
    }

    #[test]
    fn complete_export_rearms() {
        let unit = CaptureUnit::<8>::new();
        unit.trigger();
        fill(&unit, 0, 4);

        assert!(matches!(unit.try_export(), Export::Ready(_)));
        assert!(unit.complete_export());
        assert_eq!(unit.state(), TriggerState::armed(4));
        assert_eq!(unit.try_export(), Export::NotReady);
    }

    #[test]
    fn write_during_copy_tears_export() {
        let unit = CaptureUnit::<8>::new();
        unit.trigger();
        fill(&unit, 0, 4);
        assert!(unit.state().is_ready());

        assert_eq!(unit.ring.with_write_open(|| unit.try_export()), Export::Torn);

        // Nothing was re-armed; the completed write is visible to the next copy
        assert!(unit.state().is_ready());
        assert!(matches!(unit.try_export(), Export::Ready(_)));
    }

    #[test]
    fn edge_during_export_wins() {
        let unit = CaptureUnit::<8>::new();
        unit.trigger();
        fill(&unit, 0, 4);
        assert!(unit.state().is_ready());

        unit.trigger();
        unit.on_tick(7);
        assert_eq!(unit.try_export(), Export::NotReady);
        assert!(!unit.complete_export());
        assert_eq!(unit.state().phase, TriggerPhase::Capturing);
    }
}
