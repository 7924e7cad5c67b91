//! Time management for the metering node
//!
//! Two unrelated clocks are involved:
//! - a monotonic millisecond counter (interval measurement, scheduling)
//! - an external wall clock (epoch timestamps on exported records)
//!
//! The monotonic counter is 32 bits wide and wraps after ~49.7 days, like
//! the `millis()` counter of most microcontrollers. Every interval in this
//! crate is computed with wrapping subtraction so a wrap between two
//! readings is harmless. Ordering comparisons are valid as long as the two
//! instants are less than half the counter range (~24.8 days) apart.

use core::cell::Cell;

use crate::traits::{MonotonicClock, WallClock};

/// Monotonic instant, 1 kHz tick
pub type Instant = fugit::TimerInstantU32<1000>;

/// Millisecond duration on the monotonic clock
pub type Duration = fugit::MillisDurationU32;

/// Absolute wall-clock time in milliseconds since the Unix epoch
pub type EpochMillis = u64;

/// Build an instant from a raw millisecond counter value
pub const fn instant(ms: u32) -> Instant {
    Instant::from_ticks(ms)
}

/// Build a millisecond duration
pub const fn millis(ms: u32) -> Duration {
    Duration::from_ticks(ms)
}

/// Time elapsed from `earlier` to `now`, tolerant of counter wraparound
#[inline]
pub fn elapsed(now: Instant, earlier: Instant) -> Duration {
    Duration::from_ticks(now.ticks().wrapping_sub(earlier.ticks()))
}

/// Time elapsed from `earlier` to `now`, zero if `earlier` is ahead of `now`
///
/// A reader that samples `now` and is then preempted by a writer can see a
/// timestamp taken after its own `now`; that counts as no time elapsed
/// rather than as a full counter wrap.
#[inline]
pub fn elapsed_since(now: Instant, earlier: Instant) -> Duration {
    if reached(now, earlier) {
        elapsed(now, earlier)
    } else {
        Duration::from_ticks(0)
    }
}

/// Advance an instant by a duration, wrapping with the counter
#[inline]
pub fn advance(at: Instant, by: Duration) -> Instant {
    Instant::from_ticks(at.ticks().wrapping_add(by.ticks()))
}

/// True once `now` is at or past `deadline`
///
/// Wrap-aware: the difference is interpreted as signed, so a deadline that
/// lies just beyond a counter wrap is still "in the future".
#[inline]
pub fn reached(now: Instant, deadline: Instant) -> bool {
    (now.ticks().wrapping_sub(deadline.ticks()) as i32) >= 0
}

/// Settable monotonic clock for simulations and tests
///
/// Interior mutability lets a test hold `&ManualClock` in the code under
/// test and still move time forward from the outside.
#[derive(Debug, Default)]
pub struct ManualClock {
    now: Cell<u32>,
}

impl ManualClock {
    /// Clock reading `start_ms`
    pub const fn new(start_ms: u32) -> Self {
        Self { now: Cell::new(start_ms) }
    }

    /// Jump to `ms`
    pub fn set(&self, ms: u32) {
        self.now.set(ms);
    }

    /// Move forward by `ms`, wrapping
    pub fn advance(&self, ms: u32) {
        self.now.set(self.now.get().wrapping_add(ms));
    }
}

impl MonotonicClock for ManualClock {
    fn now(&self) -> Instant {
        instant(self.now.get())
    }
}

/// Wall clock with a controllable validity flag
///
/// Stands in for an NTP-backed source: `begin_acquisition` is only counted,
/// validity changes when the test says so.
#[derive(Debug, Clone, Default)]
pub struct FixedWallClock {
    valid: bool,
    epoch_ms: EpochMillis,
    acquisitions: u32,
}

impl FixedWallClock {
    /// A clock that already holds valid time
    pub fn valid_at(epoch_ms: EpochMillis) -> Self {
        Self {
            valid: true,
            epoch_ms,
            acquisitions: 0,
        }
    }

    /// A clock that has not synchronized yet
    pub fn invalid() -> Self {
        Self::default()
    }

    /// Mark the time source valid or invalid
    pub fn set_valid(&mut self, valid: bool) {
        self.valid = valid;
    }

    /// Set the reported epoch time
    pub fn set(&mut self, epoch_ms: EpochMillis) {
        self.epoch_ms = epoch_ms;
    }

    /// Move the epoch time forward by `ms`
    pub fn advance(&mut self, ms: u64) {
        self.epoch_ms += ms;
    }

    /// Number of `begin_acquisition` calls seen so far
    pub fn acquisitions(&self) -> u32 {
        self.acquisitions
    }
}

impl WallClock for FixedWallClock {
    fn is_valid(&self) -> bool {
        self.valid
    }

    fn begin_acquisition(&mut self) {
        self.acquisitions += 1;
    }

    fn now_epoch_millis(&self) -> EpochMillis {
        self.epoch_ms
    }
}

/// Wall clock backed by the host's system time (requires std)
#[cfg(feature = "std")]
#[derive(Debug, Clone, Default)]
pub struct SystemWallClock;

#[cfg(feature = "std")]
impl WallClock for SystemWallClock {
    fn is_valid(&self) -> bool {
        // Anything before 2020-01-01 means the host clock was never set
        self.now_epoch_millis() >= 1_577_836_800_000
    }

    fn begin_acquisition(&mut self) {
        // Host time is synchronized by the operating system
    }

    fn now_epoch_millis(&self) -> EpochMillis {
        use std::time::{SystemTime, UNIX_EPOCH};

        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap_or_default()
            .as_millis() as EpochMillis
    }
}

/// Monotonic clock backed by `std::time::Instant`, truncated to 32 bits
#[cfg(feature = "std")]
#[derive(Debug, Clone)]
pub struct StdMonotonicClock {
    origin: std::time::Instant,
}

#[cfg(feature = "std")]
impl StdMonotonicClock {
    /// Clock whose zero is the moment of creation
    pub fn new() -> Self {
        Self {
            origin: std::time::Instant::now(),
        }
    }
}

#[cfg(feature = "std")]
impl Default for StdMonotonicClock {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(feature = "std")]
impl MonotonicClock for StdMonotonicClock {
    fn now(&self) -> Instant {
        instant(self.origin.elapsed().as_millis() as u32)
    }
}
