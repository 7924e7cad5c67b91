//! Constants for PulseFlow Core
//!
//! Centralized defaults for the deploy-time configuration surface. Every
//! value here can be overridden through [`crate::config::EngineConfig`]
//! (or, for the capture capacity, the `N` const generic).
//!
//! ## Organization
//!
//! - **Time**: sampling tick and report periods
//! - **Capture**: ring-buffer capacity and window geometry
//! - **Flow**: calibration and smoothing defaults

/// Time-related constants for sampling and reporting.
pub mod time;

/// Ring-buffer capacity and capture window geometry.
pub mod capture;

/// Flow calibration and smoothing defaults.
pub mod flow;

pub use time::{DEFAULT_REPORT_PERIOD_MS, DEFAULT_TICK_PERIOD_MS, MS_PER_SECOND};

pub use capture::{DEFAULT_CAPTURE_CAPACITY, MAX_CAPTURE_CAPACITY};

pub use flow::{DEFAULT_IMPULSES_PER_UNIT, DEFAULT_RATE_SCALE, DEFAULT_SMOOTHING};
