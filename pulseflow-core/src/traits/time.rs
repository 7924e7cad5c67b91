//! Clock Abstractions for the Metering Node
//!
//! The engine needs two clocks with very different contracts:
//!
//! - [`MonotonicClock`]: a free-running millisecond counter used for every
//!   interval measurement (pulse durations, report scheduling). It never
//!   jumps, but it wraps at its implementation-defined width.
//! - [`WallClock`]: the external time source that stamps exported records
//!   with absolute epoch time. It may be unavailable (not yet synchronized),
//!   in which case reporting is gated while counting and sampling continue.
//!
//! ## Example Implementation
//!
//! ```rust
//! use pulseflow_core::traits::MonotonicClock;
//! use pulseflow_core::time::{instant, Instant};
//!
//! struct SysTickClock {
//!     // ... handle to the SysTick millisecond counter
//! }
//!
//! impl MonotonicClock for SysTickClock {
//!     fn now(&self) -> Instant {
//!         // Read the hardware counter
//!         instant(0) // placeholder
//!     }
//! }
//! ```
//!
//! ## Platform Notes
//!
//! ### Bare Metal (no_std)
//! - Back `MonotonicClock` with a SysTick or timer-peripheral counter
//! - Back `WallClock` with SNTP or a battery-backed RTC
//!
//! ### Linux/Unix
//! - `StdMonotonicClock` and `SystemWallClock` in [`crate::time`]

use crate::time::{EpochMillis, Instant};

/// Free-running monotonic millisecond clock
///
/// Implementations must be cheap enough to call from the pulse interrupt.
pub trait MonotonicClock {
    /// Current value of the millisecond counter
    fn now(&self) -> Instant;
}

/// External wall-clock time source
///
/// ## Contract
///
/// - `is_valid()` reports whether `now_epoch_millis()` can be trusted
/// - `begin_acquisition()` starts (or retries) synchronization; it must not
///   block the caller for longer than the implementation's own timeout
/// - `now_epoch_millis()` is only meaningful while `is_valid()` is true
pub trait WallClock {
    /// Whether the clock currently holds trustworthy time
    fn is_valid(&self) -> bool;

    /// Start or retry time acquisition
    fn begin_acquisition(&mut self);

    /// Current absolute time in milliseconds since the Unix epoch
    fn now_epoch_millis(&self) -> EpochMillis;
}

impl<T: MonotonicClock + ?Sized> MonotonicClock for &T {
    fn now(&self) -> Instant {
        (**self).now()
    }
}
