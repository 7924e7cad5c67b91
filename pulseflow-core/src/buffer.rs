//! Fixed-Capacity Sample Ring Buffer
//!
//! ## Overview
//!
//! [`SampleRingBuffer`] stores the last `N` raw samples written by the
//! sampling-timer interrupt. It never allocates: storage is an array of
//! atomics sized by a const generic, so the buffer can live in a `static`.
//!
//! ## Capacity Invariant
//!
//! `N` must be a power of two between 2 and 65536. This is checked when
//! the type is instantiated, so a bad capacity is a compile error rather
//! than a runtime fault:
//!
//! ```compile_fail
//! use pulseflow_core::buffer::SampleRingBuffer;
//! let ring = SampleRingBuffer::<24>::new();
//! ```
//!
//! With a power-of-two capacity the wrap is a mask, see [`wrap_index`].
//!
//! ## Memory Layout
//!
//! ```text
//! SampleRingBuffer<8>, cursor = 3 (next write)
//! ┌────┬────┬────┬────┬────┬────┬────┬────┐
//! │ s5 │ s6 │ s7 │ s0 │ s1 │ s2 │ s3 │ s4 │  ← physical slots
//! └────┴────┴────┴────┴────┴────┴────┴────┘
//!                  ↑
//!                cursor: oldest sample, overwritten next
//!
//! logical i  →  physical (cursor + i) & (N - 1)
//! ```
//!
//! ## Concurrency
//!
//! One writer (the sampling interrupt), any number of readers. Each write
//! bumps a sequence counter around the slot and cursor update. A reader
//! copies the window starting at a cursor value read once, then compares
//! the counter: if any write landed during the copy the snapshot is
//! rejected instead of returning a window that mixes old and new samples.
//! Cells beyond the frozen cursor may be overwritten while a slow reader
//! copies; that case is detected, never silently exported.

use core::sync::atomic::{fence, AtomicU16, AtomicU32, AtomicUsize, Ordering};

use crate::constants::capture::{MAX_CAPTURE_CAPACITY, MIN_CAPTURE_CAPACITY};

/// One raw sample as read from the sensor front end (e.g. an ADC count)
pub type Sample = u16;

/// Map a (possibly out-of-range) index onto a slot of an `N`-slot ring
///
/// `N` must be a power of two.
#[inline(always)]
pub const fn wrap_index<const N: usize>(index: usize) -> usize {
    index & (N - 1)
}

/// Interrupt-safe ring of raw samples
pub struct SampleRingBuffer<const N: usize> {
    slots: [AtomicU16; N],

    /// Next slot to write, always `< N`
    cursor: AtomicUsize,

    /// Even when idle, odd while a write is in progress
    seq: AtomicU32,
}

/// Frozen copy of the ring, oldest sample first
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RingSnapshot<const N: usize> {
    /// Samples in write order; `samples[0]` is the oldest
    pub samples: [Sample; N],

    /// Cursor value the copy was taken at
    pub cursor: usize,
}

impl<const N: usize> SampleRingBuffer<N> {
    const CAPACITY_OK: () = assert!(
        N.is_power_of_two() && N >= MIN_CAPTURE_CAPACITY && N <= MAX_CAPTURE_CAPACITY,
        "ring capacity must be a power of two in [2, 65536]"
    );

    /// Slots in the ring
    pub const CAPACITY: usize = N;

    /// Zero-filled ring with the cursor at slot 0
    pub const fn new() -> Self {
        let () = Self::CAPACITY_OK;

        Self {
            slots: [const { AtomicU16::new(0) }; N],
            cursor: AtomicUsize::new(0),
            seq: AtomicU32::new(0),
        }
    }

    /// Store a sample at the cursor and advance it
    ///
    /// Constant time. Must only be called from one context (the sampling
    /// interrupt).
    #[inline]
    pub fn push(&self, sample: Sample) {
        let seq = self.seq.load(Ordering::Relaxed);
        self.seq.store(seq.wrapping_add(1), Ordering::Relaxed);
        fence(Ordering::Release);

        let cursor = self.cursor.load(Ordering::Relaxed);
        self.slots[cursor].store(sample, Ordering::Relaxed);
        self.cursor
            .store(wrap_index::<N>(cursor + 1), Ordering::Relaxed);

        self.seq.store(seq.wrapping_add(2), Ordering::Release);
    }

    /// Current write cursor (the oldest slot)
    pub fn cursor(&self) -> usize {
        self.cursor.load(Ordering::Acquire)
    }

    /// Total samples written, wrapping at `u32::MAX / 2`
    pub fn writes(&self) -> u32 {
        self.seq.load(Ordering::Acquire) / 2
    }

    /// Sample at logical offset `i` from a given cursor value
    ///
    /// `i = 0` is the oldest sample relative to `cursor`.
    pub fn get(&self, cursor: usize, i: usize) -> Sample {
        self.slots[wrap_index::<N>(cursor + i)].load(Ordering::Relaxed)
    }

    /// Copy the whole ring, oldest first
    ///
    /// Returns `None` if a write was in progress or landed during the copy.
    pub fn snapshot(&self) -> Option<RingSnapshot<N>> {
        let before = self.seq.load(Ordering::Acquire);
        if before & 1 == 1 {
            return None;
        }

        // Cursor is read once and held for the whole copy
        let cursor = self.cursor.load(Ordering::Relaxed);
        let mut samples = [0; N];
        for (i, out) in samples.iter_mut().enumerate() {
            *out = self.get(cursor, i);
        }

        fence(Ordering::Acquire);
        if self.seq.load(Ordering::Relaxed) != before {
            return None;
        }

        Some(RingSnapshot { samples, cursor })
    }

    /// Run `f` as if the sampler were preempted halfway through a push
    #[cfg(test)]
    pub(crate) fn with_write_open<R>(&self, f: impl FnOnce() -> R) -> R {
        let seq = self.seq.load(Ordering::Relaxed);
        self.seq.store(seq.wrapping_add(1), Ordering::Release);
        let result = f();
        self.seq.store(seq.wrapping_add(2), Ordering::Release);
        result
    }
}

impl<const N: usize> Default for SampleRingBuffer<N> {
    fn default() -> Self {
        Self::new()
    }
}

impl<const N: usize> core::fmt::Debug for SampleRingBuffer<N> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("SampleRingBuffer")
            .field("capacity", &N)
            .field("cursor", &self.cursor())
            .field("writes", &self.writes())
            .finish()
    }
}
