//! Exported record schemas
//!
//! Two records leave the node:
//!
//! - [`MetricsRecord`], once per report period
//! - [`CaptureRecord`], whenever a trigger window completed since the last
//!   report
//!
//! With the `serde` feature both serialize with camelCase field names;
//! a capture record serializes as a bare sequence of points, oldest first.

use heapless::Vec;

use crate::buffer::Sample;
use crate::time::EpochMillis;

/// Derived flow metrics at one report instant
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "camelCase"))]
pub struct MetricsRecord {
    /// Cumulative edge count
    pub counter: u32,

    /// Milliseconds since the most recent edge
    pub time_since_last_edge: u32,

    /// Milliseconds between the two most recent edges
    pub last_pulse_duration: u32,

    /// Exponentially smoothed flow rate
    pub filtered_flow_rate: f32,

    /// Wall-clock time of the report
    pub absolute_time: EpochMillis,
}

/// One reconstructed sample of a capture window
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "camelCase"))]
pub struct CapturePoint {
    /// Raw sample
    pub value: Sample,
    /// Reconstructed epoch time of the sample
    pub absolute_time: EpochMillis,
}

/// A complete capture window, oldest sample first
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
#[cfg_attr(feature = "serde", serde(transparent))]
pub struct CaptureRecord<const N: usize> {
    /// Points oldest first
    pub points: Vec<CapturePoint, N>,
}

impl<const N: usize> CaptureRecord<N> {
    /// Number of points
    pub fn len(&self) -> usize {
        self.points.len()
    }

    /// True when no points were reconciled
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Points oldest first
    pub fn iter(&self) -> impl Iterator<Item = &CapturePoint> {
        self.points.iter()
    }
}
