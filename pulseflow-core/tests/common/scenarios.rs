//! Pulse train scenarios
//!
//! Edge times for a few flow profiles a meter sees in the field.

/// Edges every `period` ms from `start` (inclusive) to `end` (exclusive)
pub fn steady(start: u32, end: u32, period: u32) -> Vec<u32> {
    (start..end).step_by(period as usize).collect()
}

/// Flow that speeds up: gaps shrink linearly from `from` to `to` ms
pub fn ramp_up(start: u32, pulses: u32, from: u32, to: u32) -> Vec<u32> {
    let mut edges = Vec::with_capacity(pulses as usize);
    let mut t = start;
    for i in 0..pulses {
        edges.push(t);
        let gap = from - (from - to) * i / pulses.max(1);
        t += gap.max(1);
    }
    edges
}

/// Contact bounce: each edge followed by `extra` edges in the same millisecond
pub fn bouncing(start: u32, end: u32, period: u32, extra: usize) -> Vec<u32> {
    steady(start, end, period)
        .into_iter()
        .flat_map(|t| core::iter::repeat(t).take(extra + 1))
        .collect()
}
