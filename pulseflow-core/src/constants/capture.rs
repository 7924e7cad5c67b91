//! Capture Window Geometry
//!
//! The ring buffer holds `N` raw samples. Half of them precede the
//! triggering edge, half follow it, so `N/2 * tick period` should
//! approximate the interesting span around a pulse.

/// Default ring-buffer capacity (samples).
///
/// 32 samples × 2 bytes = 64 bytes of sample storage.
pub const DEFAULT_CAPTURE_CAPACITY: usize = 32;

/// Largest supported capacity.
///
/// The post-trigger countdown is packed into 16 bits of the trigger
/// word, which bounds `N/2` to 32768.
pub const MAX_CAPTURE_CAPACITY: usize = 1 << 16;

/// Smallest supported capacity (one pre- and one post-trigger slot).
pub const MIN_CAPTURE_CAPACITY: usize = 2;
