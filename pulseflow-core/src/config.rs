//! Deploy-time configuration
//!
//! The ring-buffer capacity is a const generic on the types that hold
//! samples; everything else lives here and is checked once with
//! [`EngineConfig::validate`] before the node starts.

use crate::constants::{
    DEFAULT_IMPULSES_PER_UNIT, DEFAULT_RATE_SCALE, DEFAULT_REPORT_PERIOD_MS,
    DEFAULT_SMOOTHING, DEFAULT_TICK_PERIOD_MS,
};
use crate::errors::ConfigError;
use crate::time::{millis, Duration};

/// Engine configuration
///
/// ```rust
/// use pulseflow_core::config::EngineConfig;
/// use pulseflow_core::time::millis;
///
/// let config = EngineConfig::default()
///     .with_tick_period(millis(5))
///     .with_calibration(450.0, 60_000.0)
///     .with_smoothing(0.8);
///
/// assert!(config.validate().is_ok());
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EngineConfig {
    /// Period of the sampling timer interrupt
    pub tick_period: Duration,

    /// Period between metrics reports
    pub report_period: Duration,

    /// Impulses-per-unit calibration of the flow sensor
    pub impulses_per_unit: f32,

    /// Scale applied to `impulses_per_unit / milliseconds`
    pub rate_scale: f32,

    /// Retention coefficient `k` of the exponential filter, in (0, 1)
    pub smoothing: f32,
}

impl EngineConfig {
    /// Defaults from [`crate::constants`]
    pub const DEFAULT: Self = Self {
        tick_period: millis(DEFAULT_TICK_PERIOD_MS),
        report_period: millis(DEFAULT_REPORT_PERIOD_MS),
        impulses_per_unit: DEFAULT_IMPULSES_PER_UNIT,
        rate_scale: DEFAULT_RATE_SCALE,
        smoothing: DEFAULT_SMOOTHING,
    };

    /// Set the sampling tick period
    pub fn with_tick_period(mut self, period: Duration) -> Self {
        self.tick_period = period;
        self
    }

    /// Set the report period
    pub fn with_report_period(mut self, period: Duration) -> Self {
        self.report_period = period;
        self
    }

    /// Set calibration factor and rate scale together
    pub fn with_calibration(mut self, impulses_per_unit: f32, rate_scale: f32) -> Self {
        self.impulses_per_unit = impulses_per_unit;
        self.rate_scale = rate_scale;
        self
    }

    /// Set the filter retention coefficient `k`
    pub fn with_smoothing(mut self, k: f32) -> Self {
        self.smoothing = k;
        self
    }

    /// Check every field, returning the first violation
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.tick_period.ticks() == 0 {
            return Err(ConfigError::ZeroPeriod { name: "tick" });
        }
        if self.report_period.ticks() == 0 {
            return Err(ConfigError::ZeroPeriod { name: "report" });
        }

        // Negated comparison so NaN is rejected too
        if !(self.smoothing > 0.0 && self.smoothing < 1.0) {
            return Err(ConfigError::SmoothingOutOfRange {
                value: self.smoothing,
            });
        }

        check_positive("impulses_per_unit", self.impulses_per_unit)?;
        check_positive("rate_scale", self.rate_scale)?;

        // Largest rate the estimator can produce is a 1 ms pulse
        check_positive(
            "impulses_per_unit * rate_scale",
            self.impulses_per_unit * self.rate_scale,
        )?;

        Ok(())
    }
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self::DEFAULT
    }
}

fn check_positive(name: &'static str, value: f32) -> Result<(), ConfigError> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(ConfigError::InvalidCalibration { name, value })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        assert_eq!(EngineConfig::default().validate(), Ok(()));
    }

    #[test]
    fn zero_periods_rejected() {
        let config = EngineConfig::default().with_tick_period(millis(0));
        assert_eq!(
            config.validate(),
            Err(ConfigError::ZeroPeriod { name: "tick" })
        );

        let config = EngineConfig::default().with_report_period(millis(0));
        assert_eq!(
            config.validate(),
            Err(ConfigError::ZeroPeriod { name: "report" })
        );
    }

    #[test]
    fn smoothing_bounds() {
        for k in [0.0, 1.0, -0.5, 1.5, f32::NAN] {
            let result = EngineConfig::default().with_smoothing(k).validate();
            assert!(
                matches!(result, Err(ConfigError::SmoothingOutOfRange { .. })),
                "k = {k} accepted"
            );
        }
        assert!(EngineConfig::default().with_smoothing(0.01).validate().is_ok());
    }

    #[test]
    fn calibration_must_be_positive() {
        let config = EngineConfig::default().with_calibration(0.0, 1000.0);
        assert!(matches!(
            config.validate(),
            Err(ConfigError::InvalidCalibration { name: "impulses_per_unit", .. })
        ));

        let config = EngineConfig::default().with_calibration(1.0, f32::INFINITY);
        assert!(matches!(
            config.validate(),
            Err(ConfigError::InvalidCalibration { name: "rate_scale", .. })
        ));
    }

    #[test]
    fn calibration_product_must_not_overflow() {
        let config = EngineConfig::default().with_calibration(1e30, 1e30);
        assert!(matches!(
            config.validate(),
            Err(ConfigError::InvalidCalibration {
                name: "impulses_per_unit * rate_scale",
                ..
            })
        ));

        let config = EngineConfig::default().with_calibration(1e19, 1e19);
        assert_eq!(config.validate(), Ok(()));
    }
}
