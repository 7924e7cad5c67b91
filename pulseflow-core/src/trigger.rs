//! Trigger Controller
//!
//! ## Overview
//!
//! Decides whether the ring buffer is rolling (pre-trigger), counting down
//! a post-trigger window, or frozen waiting for export. This is the classic
//! oscilloscope pre/post-trigger pattern keyed off pulse edges.
//!
//! ## State Machine
//!
//! ```text
//!             Edge (any state)
//!     ┌──────────────────────────────┐
//!     ▼                              │
//!  ┌───────┐  Tick (pending)   ┌───────────┐  Tick, remaining → 0  ┌──────────────┐
//!  │ Armed │ ────────────────▶ │ Capturing │ ────────────────────▶ │ CaptureReady │
//!  └───────┘                   └───────────┘                       └──────────────┘
//!     ▲                                                                   │
//!     └─────────────────────────── Exported ──────────────────────────────┘
//! ```
//!
//! - An edge in any state re-arms with `remaining = N/2` and a pending
//!   trigger, discarding any capture in flight.
//! - Every tick after the edge decrements `remaining`. The tick that brings
//!   it to zero enters `CaptureReady` and is not stored, so the frozen
//!   window holds `N/2 + 1` samples taken up to the edge and `N/2 - 1`
//!   after it. Slot `N/2` is the last sample at or before the edge.
//! - While `CaptureReady`, ticks are suppressed and the window stays frozen.
//!
//! [`TriggerState`] transitions are pure functions, testable without any
//! interrupt. [`TriggerCell`] applies them to a packed `AtomicU32` shared by
//! the edge interrupt, the sampling interrupt and the polling consumer.

use core::sync::atomic::{AtomicU32, Ordering};

/// Trigger phase
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum TriggerPhase {
    /// Ring rolls continuously; a pending edge starts the countdown
    Armed = 0,
    /// Post-trigger countdown in progress
    Capturing = 1,
    /// Window complete and frozen until exported
    CaptureReady = 2,
}

/// Input to the trigger state machine
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TriggerEvent {
    /// A pulse edge was detected
    Edge,
    /// The sampling timer fired
    Tick,
    /// The consumer finished exporting a ready window
    Exported,
}

/// What the sampling interrupt should do with the sample it just read
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickAction {
    /// Write the sample into the ring
    Store,
    /// Drop the sample; the window is frozen
    Suppress,
}

/// Complete trigger state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TriggerState {
    /// Capture phase
    pub phase: TriggerPhase,

    /// Post-trigger ticks left before the window completes
    pub post_trigger_remaining: u16,

    /// An edge re-armed the controller and the countdown starts next tick
    pub pending: bool,
}

impl TriggerState {
    /// Idle state: rolling, no trigger pending
    pub const fn armed(half: u16) -> Self {
        Self {
            phase: TriggerPhase::Armed,
            post_trigger_remaining: half,
            pending: false,
        }
    }

    /// State right after an edge, regardless of what came before
    pub const fn triggered(half: u16) -> Self {
        Self {
            phase: TriggerPhase::Armed,
            post_trigger_remaining: half,
            pending: true,
        }
    }

    /// Window complete, sampling suspended
    pub const fn ready() -> Self {
        Self {
            phase: TriggerPhase::CaptureReady,
            post_trigger_remaining: 0,
            pending: false,
        }
    }

    /// True while a complete window awaits export
    pub fn is_ready(&self) -> bool {
        self.phase == TriggerPhase::CaptureReady
    }

    /// Apply one event; `half` is `N/2` for an `N`-slot ring
    pub fn on(self, event: TriggerEvent, half: u16) -> Self {
        match event {
            TriggerEvent::Edge => Self::triggered(half),
            TriggerEvent::Tick => self.on_tick().0,
            TriggerEvent::Exported => self.on_exported(half),
        }
    }

    /// Apply a sampling tick and report what to do with the sample
    pub fn on_tick(self) -> (Self, TickAction) {
        match self.phase {
            TriggerPhase::Armed if !self.pending => (self, TickAction::Store),
            TriggerPhase::Armed | TriggerPhase::Capturing => {
                let remaining = self.post_trigger_remaining.saturating_sub(1);
                if remaining == 0 {
                    (Self::ready(), TickAction::Suppress)
                } else {
                    let next = Self {
                        phase: TriggerPhase::Capturing,
                        post_trigger_remaining: remaining,
                        pending: false,
                    };
                    (next, TickAction::Store)
                }
            }
            TriggerPhase::CaptureReady => (self, TickAction::Suppress),
        }
    }

    /// Re-arm after export; only a ready window can be exported
    pub fn on_exported(self, half: u16) -> Self {
        if self.is_ready() {
            Self::armed(half)
        } else {
            self
        }
    }

    /// Pack into one word: phase in bits 0-1, pending in bit 2,
    /// countdown in bits 16-31
    const fn pack(self) -> u32 {
        (self.phase as u32) | ((self.pending as u32) << 2) | ((self.post_trigger_remaining as u32) << 16)
    }

    const fn unpack(word: u32) -> Self {
        let phase = match word & 0b11 {
            0 => TriggerPhase::Armed,
            1 => TriggerPhase::Capturing,
            _ => TriggerPhase::CaptureReady,
        };
        Self {
            phase,
            post_trigger_remaining: (word >> 16) as u16,
            pending: word & 0b100 != 0,
        }
    }
}

/// Trigger state shared across interrupt contexts
///
/// - the edge interrupt stores unconditionally and never retries
/// - the sampling interrupt retries its compare-and-swap only if an edge
///   preempted it between load and swap
/// - the consumer's re-arm succeeds only while the state is still
///   `CaptureReady`, so an edge that arrived during export wins
#[derive(Debug)]
pub struct TriggerCell {
    word: AtomicU32,
    half: u16,
}

impl TriggerCell {
    /// Armed cell for a ring of `2 * half` slots
    pub const fn new(half: u16) -> Self {
        Self {
            word: AtomicU32::new(TriggerState::armed(half).pack()),
            half,
        }
    }

    /// Current state
    pub fn load(&self) -> TriggerState {
        TriggerState::unpack(self.word.load(Ordering::Acquire))
    }

    /// Edge interrupt: re-arm with a full post-trigger countdown
    #[inline]
    pub fn trigger(&self) {
        self.word
            .store(TriggerState::triggered(self.half).pack(), Ordering::Release);
    }

    /// Sampling interrupt: advance the countdown
    #[inline]
    pub fn tick(&self) -> TickAction {
        let mut current = self.word.load(Ordering::Acquire);
        loop {
            let (next, action) = TriggerState::unpack(current).on_tick();
            let packed = next.pack();
            if packed == current {
                return action;
            }
            match self.word.compare_exchange_weak(
                current,
                packed,
                Ordering::AcqRel,
                Ordering::Acquire,
            ) {
                Ok(_) => return action,
                Err(actual) => current = actual,
            }
        }
    }

    /// Consumer: re-arm after exporting a ready window
    ///
    /// Returns `false` if an edge already re-armed the controller.
    pub fn complete_export(&self) -> bool {
        let ready = TriggerState::ready().pack();
        let armed = TriggerState::armed(self.half).pack();
        self.word
            .compare_exchange(ready, armed, Ordering::AcqRel, Ordering::Acquire)
            .is_ok()
    }
}
