//! Interrupt Events
//!
//! ## Overview
//!
//! The node has two interrupt sources. Each handler reduces to emitting one
//! small event into the metering state machine:
//!
//! ```text
//! pulse input ─▶ EdgeOccurred { at } ──┐
//!                                      ├─▶ FlowMeter::handle ─▶ edge tracker
//! sample timer ─▶ TickOccurred { sample } ┘                     trigger + ring
//! ```
//!
//! On hardware the handlers call [`FlowMeter::on_edge`] and
//! [`FlowMeter::on_tick`] directly. Simulations and tests construct events
//! instead and feed them through [`FlowMeter::handle`], which dispatches to
//! the same code.
//!
//! Events are `Copy` and a few bytes wide so a host harness can queue or
//! replay them freely.
//!
//! [`FlowMeter::on_edge`]: crate::node::FlowMeter::on_edge
//! [`FlowMeter::on_tick`]: crate::node::FlowMeter::on_tick
//! [`FlowMeter::handle`]: crate::node::FlowMeter::handle

use crate::buffer::Sample;
use crate::time::Instant;

/// Something an interrupt observed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EngineEvent {
    /// Rising edge on the pulse input, stamped with the monotonic clock
    EdgeOccurred {
        /// Monotonic time of the edge
        at: Instant,
    },

    /// Sampling timer fired; `sample` is the analog reading taken in it
    TickOccurred {
        /// Raw analog reading
        sample: Sample,
    },
}

impl EngineEvent {
    /// Edge observed at `at`
    pub const fn edge(at: Instant) -> Self {
        Self::EdgeOccurred { at }
    }

    /// Sampling tick carrying `sample`
    pub const fn tick(sample: Sample) -> Self {
        Self::TickOccurred { sample }
    }

    /// True for [`EngineEvent::EdgeOccurred`]
    pub fn is_edge(&self) -> bool {
        matches!(self, Self::EdgeOccurred { .. })
    }
}

#[cfg(feature = "defmt")]
impl defmt::Format for EngineEvent {
    fn format(&self, f: defmt::Formatter) {
        match self {
            Self::EdgeOccurred { at } => defmt::write!(f, "EdgeOccurred({=u32}ms)", at.ticks()),
            Self::TickOccurred { sample } => defmt::write!(f, "TickOccurred({=u16})", sample),
        }
    }
}
