//! # Signal Health Monitor
//!
//! Decides, once per control-loop tick, whether the decoded samples should
//! be trusted.
//!
//! Per channel, a sample is *valid* when its width is in band (non-zero)
//! and *fresh* when its age is inside the staleness window. A saturating
//! per-channel counter tracks consecutive bad ticks; the counter is what
//! gives the link verdict hysteresis, so a single missed edge never cuts
//! the outputs but a sustained streak does.
//!
//! ## Link States
//!
//! - [`LinkState::Good`] - every channel valid, fresh, and below the
//!   bad-streak threshold; actuation runs normally.
//! - [`LinkState::Stale`] - fresh samples are missing but the streak is
//!   still below the threshold; outputs hold their last safe value.
//! - [`LinkState::Lost`] - a streak reached the threshold, or a channel has
//!   never been fresh; outputs drop to their fail-safe state. Clears by
//!   itself once valid, fresh samples resume.

use serde::Serialize;

use crate::config::HealthConfig;
use crate::decoder::PulseSample;

/// Per-channel health snapshot, recomputed every tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ChannelHealth {
    /// Width was in the accepted band on the last tick.
    pub valid: bool,
    /// Sample age was inside the staleness window on the last tick.
    pub fresh: bool,
    /// Consecutive ticks failing `valid && fresh`, saturating at 255.
    pub consecutive_bad: u8,
    /// The channel has produced at least one fresh sample since boot.
    pub ever_fresh: bool,
}

/// Overall link verdict across all channels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum LinkState {
    /// All channels valid and fresh; act on the decoded values.
    Good,
    /// Signal degraded; hold the last safe outputs.
    Stale,
    /// Signal gone; force fail-safe outputs.
    Lost,
}

/// Aggregates per-channel validity into a link verdict with hysteresis.
///
/// # Examples
///
/// ```
/// use ppm_rover::config::HealthConfig;
/// use ppm_rover::decoder::PulseSample;
/// use ppm_rover::health::{LinkState, SignalHealthMonitor};
///
/// let mut monitor: SignalHealthMonitor<1> = SignalHealthMonitor::new(HealthConfig::default());
///
/// // Nothing decoded yet: the link was never fresh.
/// assert_eq!(monitor.update(&[PulseSample::default()], 0), LinkState::Lost);
///
/// let sample = PulseSample { width_us: 1500, captured_at_us: 1_000 };
/// assert_eq!(monitor.update(&[sample], 5_000), LinkState::Good);
/// ```
#[derive(Debug)]
pub struct SignalHealthMonitor<const N: usize> {
    config: HealthConfig,
    channels: [ChannelHealth; N],
    link: LinkState,
}

impl<const N: usize> SignalHealthMonitor<N> {
    /// Creates a monitor with every channel in the "bad" state.
    #[must_use]
    pub fn new(config: HealthConfig) -> Self {
        Self {
            config,
            channels: [ChannelHealth::default(); N],
            link: LinkState::Lost,
        }
    }

    /// Returns the verdict computed by the last [`update`](Self::update).
    #[must_use]
    pub fn link_state(&self) -> LinkState {
        self.link
    }

    /// Returns the health of one channel as of the last update.
    #[must_use]
    pub fn channel(&self, index: usize) -> ChannelHealth {
        self.channels[index]
    }

    /// Re-evaluates every channel against the given snapshot.
    ///
    /// # Arguments
    ///
    /// * `samples` - Snapshot copied from the channel bank this tick
    /// * `now_us` - Monotonic timestamp of the tick
    ///
    /// # Returns
    ///
    /// The new link verdict. Also retrievable via [`link_state`](Self::link_state).
    pub fn update(&mut self, samples: &[PulseSample; N], now_us: u64) -> LinkState {
        let stale_window_us = self.config.stale_window_ms * 1_000;

        for (health, sample) in self.channels.iter_mut().zip(samples.iter()) {
            health.valid = sample.is_valid();
            // A zero capture timestamp means no sample has ever landed.
            health.fresh = sample.captured_at_us != 0
                && now_us.saturating_sub(sample.captured_at_us) <= stale_window_us;
            health.ever_fresh |= health.fresh;

            if health.valid && health.fresh {
                health.consecutive_bad = 0;
            } else {
                health.consecutive_bad = health.consecutive_bad.saturating_add(1);
            }
        }

        let threshold = self.config.bad_sample_threshold;
        let link_ok = self
            .channels
            .iter()
            .all(|h| h.valid && h.fresh && h.consecutive_bad < threshold);
        let lost = self
            .channels
            .iter()
            .any(|h| h.consecutive_bad >= threshold || !h.ever_fresh);

        self.link = if link_ok {
            LinkState::Good
        } else if lost {
            LinkState::Lost
        } else {
            LinkState::Stale
        };
        self.link
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const GOOD: PulseSample = PulseSample {
        width_us: 1500,
        captured_at_us: 1_000,
    };

    fn monitor1() -> SignalHealthMonitor<1> {
        SignalHealthMonitor::new(HealthConfig::default())
    }

    // ==================== Channel Health Tests ====================

    #[test]
    fn test_initial_state_is_lost() {
        let monitor = monitor1();
        assert_eq!(monitor.link_state(), LinkState::Lost);
    }

    #[test]
    fn test_never_fresh_stays_lost() {
        let mut monitor = monitor1();
        for tick in 0..20u64 {
            let state = monitor.update(&[PulseSample::default()], tick * 20_000);
            assert_eq!(state, LinkState::Lost);
        }
    }

    #[test]
    fn test_good_sample_is_good() {
        let mut monitor = monitor1();
        assert_eq!(monitor.update(&[GOOD], 2_000), LinkState::Good);
        let health = monitor.channel(0);
        assert!(health.valid);
        assert!(health.fresh);
        assert_eq!(health.consecutive_bad, 0);
    }

    #[test]
    fn test_stale_sample_is_not_fresh() {
        let mut monitor = monitor1();
        monitor.update(&[GOOD], 2_000);
        // Default window is 500 ms; jump 600 ms past the capture.
        monitor.update(&[GOOD], 601_000);
        assert!(!monitor.channel(0).fresh);
        assert!(monitor.channel(0).valid);
    }

    #[test]
    fn test_invalid_width_is_not_valid() {
        let mut monitor = monitor1();
        let rejected = PulseSample {
            width_us: 0,
            captured_at_us: 1_000,
        };
        monitor.update(&[rejected], 2_000);
        assert!(!monitor.channel(0).valid);
        assert!(monitor.channel(0).fresh);
    }

    // ==================== Bad Streak Tests ====================

    #[test]
    fn test_nine_bad_then_one_good_resets_counter() {
        let mut monitor = monitor1();
        monitor.update(&[GOOD], 2_000);

        for tick in 0..9u64 {
            monitor.update(&[GOOD], 601_000 + tick * 20_000);
        }
        assert_eq!(monitor.channel(0).consecutive_bad, 9);
        assert_eq!(monitor.link_state(), LinkState::Stale);

        let recovered = PulseSample {
            width_us: 1500,
            captured_at_us: 800_000,
        };
        assert_eq!(monitor.update(&[recovered], 810_000), LinkState::Good);
        assert_eq!(monitor.channel(0).consecutive_bad, 0);
    }

    #[test]
    fn test_ten_bad_ticks_forces_lost() {
        let mut monitor = monitor1();
        monitor.update(&[GOOD], 2_000);

        let mut state = LinkState::Good;
        for tick in 0..10u64 {
            state = monitor.update(&[GOOD], 601_000 + tick * 20_000);
        }
        assert_eq!(monitor.channel(0).consecutive_bad, 10);
        assert_eq!(state, LinkState::Lost);
    }

    #[test]
    fn test_single_glitch_does_not_drop_link() {
        let mut monitor = monitor1();
        monitor.update(&[GOOD], 2_000);

        // One rejected sample: degraded but nowhere near lost.
        let glitch = PulseSample {
            width_us: 0,
            captured_at_us: 20_000,
        };
        assert_eq!(monitor.update(&[glitch], 22_000), LinkState::Stale);

        let next = PulseSample {
            width_us: 1480,
            captured_at_us: 40_000,
        };
        assert_eq!(monitor.update(&[next], 42_000), LinkState::Good);
    }

    #[test]
    fn test_counter_saturates() {
        let mut monitor = monitor1();
        for tick in 0..300u64 {
            monitor.update(&[PulseSample::default()], tick * 20_000);
        }
        assert_eq!(monitor.channel(0).consecutive_bad, 255);
    }

    // ==================== Multi-Channel Tests ====================

    #[test]
    fn test_one_bad_channel_degrades_link() {
        let mut monitor: SignalHealthMonitor<2> =
            SignalHealthMonitor::new(HealthConfig::default());
        assert_eq!(monitor.update(&[GOOD, GOOD], 2_000), LinkState::Good);

        let dead = PulseSample {
            width_us: 0,
            captured_at_us: 20_000,
        };
        assert_eq!(monitor.update(&[GOOD, dead], 22_000), LinkState::Stale);
    }

    #[test]
    fn test_lost_recovers_once_samples_resume() {
        let mut monitor = monitor1();
        monitor.update(&[GOOD], 2_000);
        for tick in 0..15u64 {
            monitor.update(&[GOOD], 601_000 + tick * 20_000);
        }
        assert_eq!(monitor.link_state(), LinkState::Lost);

        let recovered = PulseSample {
            width_us: 1600,
            captured_at_us: 1_000_000,
        };
        assert_eq!(monitor.update(&[recovered], 1_005_000), LinkState::Good);
    }
}
