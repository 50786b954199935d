//! # Monotonic Clock
//!
//! Microsecond timestamps measured from process start. Edge events and all
//! timing rules (staleness, brake-tap dwell, blink phase) use this single
//! time base, so decoded samples and control-loop ticks are comparable.

use std::sync::OnceLock;
use std::time::Instant;

static EPOCH: OnceLock<Instant> = OnceLock::new();

/// Returns microseconds elapsed since the first call in this process.
///
/// Monotonic and never goes backwards. The first call defines the epoch,
/// so callers should not compare timestamps across processes.
#[must_use]
pub fn monotonic_micros() -> u64 {
    let epoch = EPOCH.get_or_init(Instant::now);
    epoch.elapsed().as_micros() as u64
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_monotonic_never_decreases() {
        let a = monotonic_micros();
        let b = monotonic_micros();
        assert!(b >= a);
    }

    #[test]
    fn test_starts_near_zero() {
        // The epoch is set on first use, so early readings are small.
        let t = monotonic_micros();
        assert!(t < 60_000_000, "clock epoch should be process start");
    }
}
