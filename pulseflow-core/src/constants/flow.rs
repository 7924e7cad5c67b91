//! Flow Calibration Defaults

use super::time::MS_PER_SECOND;

/// Default impulses-per-unit calibration factor.
///
/// With a rate scale of 1000 this reports raw pulses per second.
/// Replace with the sensor's datasheet value (e.g. 450 pulses/litre for
/// common hall-effect sensors) and pick a matching scale.
pub const DEFAULT_IMPULSES_PER_UNIT: f32 = 1.0;

/// Default rate scale applied to `impulses / milliseconds`.
pub const DEFAULT_RATE_SCALE: f32 = MS_PER_SECOND as f32;

/// Default smoothing (retention) coefficient `k`.
///
/// Each update keeps 90% of the previous filtered rate.
pub const DEFAULT_SMOOTHING: f32 = 0.9;
