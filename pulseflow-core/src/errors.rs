//! Error Types for the Metering Engine
//!
//! ## Design Philosophy
//!
//! Nothing in the engine core is fatal. The error taxonomy is small and
//! mirrors how each condition is handled:
//!
//! - **Configuration** (`ConfigError`): rejected once, before the node starts.
//! - **Transient I/O** (`PublishError`): the sink could not deliver a record.
//!   Recorded by the scheduler, never retried, never blocks the schedule.
//! - **Precondition not met** (`SchedulerError::TimeSourceInvalid`): gates
//!   only the reporting path; counting and sampling continue unaffected.
//!
//! Arithmetic edge cases (a zero-length pulse used as a divisor) are guarded
//! where they occur and never surface as errors.
//!
//! All errors are `Copy` and carry only inline data or `&'static str`, so
//! they can be returned from the polling loop without allocation.
//!
//! ## Error Handling Strategy
//!
//! ```rust
//! use pulseflow_core::SchedulerError;
//!
//! fn on_poll(result: nb::Result<(), SchedulerError>) {
//!     match result {
//!         Ok(()) => {
//!             // A report was emitted this pass
//!         }
//!         Err(nb::Error::WouldBlock) => {
//!             // Not due yet, poll again later
//!         }
//!         Err(nb::Error::Other(SchedulerError::TimeSourceInvalid)) => {
//!             // Waiting for wall-clock time; acquisition was retried
//!         }
//!     }
//! }
//! ```

use thiserror_no_std::Error;

/// Rejected engine configuration
#[derive(Error, Debug, Clone, Copy, PartialEq)]
pub enum ConfigError {
    /// A period that drives the engine must be non-zero
    #[error("{name} period must be greater than zero")]
    ZeroPeriod {
        /// Which period was zero
        name: &'static str,
    },

    /// Smoothing coefficient must lie strictly between 0 and 1
    #[error("Smoothing coefficient {value} outside (0, 1)")]
    SmoothingOutOfRange {
        /// The rejected coefficient
        value: f32,
    },

    /// Calibration constants must be finite and positive
    #[error("{name} must be finite and positive, got {value}")]
    InvalidCalibration {
        /// Which constant was rejected
        name: &'static str,
        /// The rejected value
        value: f32,
    },
}

/// A record could not be delivered by the sink
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum PublishError {
    /// Sink has no session with its broker
    #[error("Sink not connected")]
    NotConnected,

    /// Record could not be encoded into the sink's wire format
    #[error("Encoding failed: {reason}")]
    Encoding {
        /// Short description from the encoder
        reason: &'static str,
    },

    /// Transport refused or dropped the message
    #[error("Transport rejected message: {reason}")]
    Rejected {
        /// Short description from the transport
        reason: &'static str,
    },
}

/// Why the scheduler did not run a report pass
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum SchedulerError {
    /// Wall-clock time is not available; acquisition was (re)started
    #[error("Time source invalid, acquisition in progress")]
    TimeSourceInvalid,
}

#[cfg(feature = "defmt")]
impl defmt::Format for ConfigError {
    fn format(&self, fmt: defmt::Formatter) {
        match self {
            Self::ZeroPeriod { name } => defmt::write!(fmt, "{} period is zero", name),
            Self::SmoothingOutOfRange { value } => {
                defmt::write!(fmt, "Smoothing {} outside (0, 1)", value)
            }
            Self::InvalidCalibration { name, value } => {
                defmt::write!(fmt, "{} invalid: {}", name, value)
            }
        }
    }
}

#[cfg(feature = "defmt")]
impl defmt::Format for PublishError {
    fn format(&self, fmt: defmt::Formatter) {
        match self {
            Self::NotConnected => defmt::write!(fmt, "Sink not connected"),
            Self::Encoding { reason } => defmt::write!(fmt, "Encoding: {}", reason),
            Self::Rejected { reason } => defmt::write!(fmt, "Rejected: {}", reason),
        }
    }
}

#[cfg(feature = "defmt")]
impl defmt::Format for SchedulerError {
    fn format(&self, fmt: defmt::Formatter) {
        match self {
            Self::TimeSourceInvalid => defmt::write!(fmt, "Time source invalid"),
        }
    }
}
