//! # Pulse Width Decoder
//!
//! Maintains the most recent validated pulse width for one RC channel.
//!
//! ## Decode Rules
//!
//! - A rising edge records the pulse start, discarding any measurement in
//!   progress.
//! - A falling edge with no recorded start is ignored; there is no valid
//!   measurement yet.
//! - Otherwise the width is `falling - rising`, passed through the
//!   configured validation policy before it becomes the channel's sample.
//!
//! ## Validation Policies
//!
//! | Policy | Outside nominal band | Outside tolerance band |
//! |--------|----------------------|------------------------|
//! | `HardReject` | width = 0 | width = 0 |
//! | `SoftClamp` | clamped to nearest bound | width = 0 |
//!
//! A width of 0 always means "no signal". The decoder is a pure function of
//! its edge history: replaying the same edges from the same initial state
//! produces the same samples.

use serde::Deserialize;

use super::edge::{EdgeEvent, EdgeLevel};
use crate::config::DecoderConfig;

/// Out-of-range pulse handling.
///
/// `SoftClamp` tolerates receivers that sit marginally outside the nominal
/// 1000-2000 us band and pulls those readings to the nearest bound;
/// `HardReject` zeroes anything outside the nominal band. Either way a
/// reading outside the wider tolerance band is rejected to 0.
#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "kebab-case")]
pub enum ValidationPolicy {
    /// Zero any width outside the nominal band.
    HardReject,
    /// Clamp marginal widths to the nominal band, reject beyond tolerance.
    #[default]
    SoftClamp,
}

/// The latest decoded reading for one channel.
///
/// `width_us` is 0 ("no signal") or lies within the nominal pulse band.
/// `captured_at_us` is the monotonic timestamp of the falling edge (or
/// polled read) that produced it; the health monitor compares it against
/// the staleness window.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PulseSample {
    /// Validated pulse width in microseconds, 0 when no valid reading.
    pub width_us: u32,
    /// Monotonic capture timestamp in microseconds.
    pub captured_at_us: u64,
}

impl PulseSample {
    /// Returns true if the sample holds an in-band width.
    #[must_use]
    pub fn is_valid(&self) -> bool {
        self.width_us != 0
    }
}

/// Decodes one channel's edge stream into pulse samples.
///
/// # Examples
///
/// ```
/// use ppm_rover::config::DecoderConfig;
/// use ppm_rover::decoder::{ChannelDecoder, EdgeEvent, EdgeLevel};
///
/// let mut decoder = ChannelDecoder::new(DecoderConfig::default());
/// decoder.on_edge(EdgeLevel::Rising, 10_000);
/// decoder.on_edge(EdgeLevel::Falling, 11_500);
///
/// assert_eq!(decoder.sample().width_us, 1500);
/// assert_eq!(decoder.sample().captured_at_us, 11_500);
/// ```
#[derive(Debug, Clone)]
pub struct ChannelDecoder {
    config: DecoderConfig,
    /// Timestamp of the last rising edge, if a pulse is in progress.
    pulse_start_us: Option<u64>,
    sample: PulseSample,
}

impl ChannelDecoder {
    /// Creates a decoder with no reading yet.
    #[must_use]
    pub fn new(config: DecoderConfig) -> Self {
        Self {
            config,
            pulse_start_us: None,
            sample: PulseSample::default(),
        }
    }

    /// Returns the most recent sample.
    #[must_use]
    pub fn sample(&self) -> PulseSample {
        self.sample
    }

    /// Processes one edge for this channel.
    ///
    /// # Arguments
    ///
    /// * `level` - Pin level after the edge
    /// * `timestamp_us` - Monotonic timestamp of the edge
    pub fn on_edge(&mut self, level: EdgeLevel, timestamp_us: u64) {
        match level {
            EdgeLevel::Rising => {
                // A new pulse starts; any measurement in progress is stale.
                self.pulse_start_us = Some(timestamp_us);
            }
            EdgeLevel::Falling => {
                let Some(start_us) = self.pulse_start_us else {
                    // No rising edge was ever seen; nothing to measure.
                    return;
                };
                let width_us = timestamp_us.saturating_sub(start_us) as u32;
                self.sample = PulseSample {
                    width_us: self.validate(width_us),
                    captured_at_us: timestamp_us,
                };
                self.pulse_start_us = None;
            }
        }
    }

    /// Processes an edge event, asserting it belongs to this channel's stream.
    pub fn on_event(&mut self, event: &EdgeEvent) {
        self.on_edge(event.level, event.timestamp_us);
    }

    /// Records a width obtained from a blocking pulse-width read.
    ///
    /// Polled reads return 0 on timeout; those are ignored so the previous
    /// sample survives a missed frame. Non-zero readings pass through the
    /// same validation as edge-decoded widths.
    ///
    /// # Arguments
    ///
    /// * `width_us` - Measured high time, 0 on timeout
    /// * `now_us` - Monotonic timestamp of the read
    pub fn record_polled_width(&mut self, width_us: u32, now_us: u64) {
        if width_us == 0 {
            return;
        }
        self.sample = PulseSample {
            width_us: self.validate(width_us),
            captured_at_us: now_us,
        };
    }

    /// Applies the configured validation policy to a raw width.
    fn validate(&self, width_us: u32) -> u32 {
        let min = self.config.pulse_min_us;
        let max = self.config.pulse_max_us;
        match self.config.validation {
            ValidationPolicy::HardReject => {
                if width_us < min || width_us > max {
                    0
                } else {
                    width_us
                }
            }
            ValidationPolicy::SoftClamp => {
                let tolerance = self.config.tolerance_us;
                if width_us < min.saturating_sub(tolerance) || width_us > max + tolerance {
                    0
                } else {
                    width_us.clamp(min, max)
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn decoder_with(policy: ValidationPolicy) -> ChannelDecoder {
        let config = DecoderConfig {
            validation: policy,
            ..DecoderConfig::default()
        };
        ChannelDecoder::new(config)
    }

    fn decode_one(decoder: &mut ChannelDecoder, start_us: u64, width_us: u64) -> PulseSample {
        decoder.on_edge(EdgeLevel::Rising, start_us);
        decoder.on_edge(EdgeLevel::Falling, start_us + width_us);
        decoder.sample()
    }

    // ==================== Basic Decode Tests ====================

    #[test]
    fn test_initial_sample_is_empty() {
        let decoder = decoder_with(ValidationPolicy::SoftClamp);
        assert_eq!(decoder.sample(), PulseSample::default());
        assert!(!decoder.sample().is_valid());
    }

    #[test]
    fn test_nominal_widths_round_trip() {
        // Every in-band width decodes to itself under either policy.
        for policy in [ValidationPolicy::HardReject, ValidationPolicy::SoftClamp] {
            let mut decoder = decoder_with(policy);
            for width in [1000u64, 1250, 1500, 1750, 2000] {
                let sample = decode_one(&mut decoder, 10_000, width);
                assert_eq!(sample.width_us as u64, width);
                assert!(sample.is_valid());
            }
        }
    }

    #[test]
    fn test_captured_at_is_falling_edge() {
        let mut decoder = decoder_with(ValidationPolicy::SoftClamp);
        let sample = decode_one(&mut decoder, 50_000, 1600);
        assert_eq!(sample.captured_at_us, 51_600);
    }

    #[test]
    fn test_falling_without_rising_is_ignored() {
        let mut decoder = decoder_with(ValidationPolicy::SoftClamp);
        decoder.on_edge(EdgeLevel::Falling, 5_000);
        assert_eq!(decoder.sample(), PulseSample::default());
    }

    #[test]
    fn test_rising_discards_in_progress_measurement() {
        let mut decoder = decoder_with(ValidationPolicy::SoftClamp);
        decoder.on_edge(EdgeLevel::Rising, 1_000);
        // A second rising edge restarts the measurement.
        decoder.on_edge(EdgeLevel::Rising, 10_000);
        decoder.on_edge(EdgeLevel::Falling, 11_500);
        assert_eq!(decoder.sample().width_us, 1500);
    }

    #[test]
    fn test_second_falling_edge_is_ignored() {
        let mut decoder = decoder_with(ValidationPolicy::SoftClamp);
        decode_one(&mut decoder, 1_000, 1500);
        decoder.on_edge(EdgeLevel::Falling, 20_000);
        // Sample unchanged; the pulse start was consumed.
        assert_eq!(decoder.sample().width_us, 1500);
        assert_eq!(decoder.sample().captured_at_us, 2_500);
    }

    #[test]
    fn test_on_event_matches_on_edge() {
        let mut a = decoder_with(ValidationPolicy::SoftClamp);
        let mut b = decoder_with(ValidationPolicy::SoftClamp);

        a.on_edge(EdgeLevel::Rising, 1_000);
        a.on_edge(EdgeLevel::Falling, 2_400);
        b.on_event(&EdgeEvent::new(0, 1_000, EdgeLevel::Rising));
        b.on_event(&EdgeEvent::new(0, 2_400, EdgeLevel::Falling));

        assert_eq!(a.sample(), b.sample());
    }

    #[test]
    fn test_decode_is_idempotent_over_edge_history() {
        let edges = [
            (EdgeLevel::Rising, 1_000u64),
            (EdgeLevel::Falling, 2_600),
            (EdgeLevel::Rising, 21_000),
            (EdgeLevel::Falling, 22_200),
            (EdgeLevel::Rising, 41_000),
            (EdgeLevel::Falling, 41_500),
        ];

        let run = || {
            let mut decoder = decoder_with(ValidationPolicy::SoftClamp);
            let mut samples = Vec::new();
            for (level, ts) in edges {
                decoder.on_edge(level, ts);
                samples.push(decoder.sample());
            }
            samples
        };

        assert_eq!(run(), run());
    }

    // ==================== Validation Policy Tests ====================

    #[test]
    fn test_hard_reject_zeroes_out_of_band() {
        let mut decoder = decoder_with(ValidationPolicy::HardReject);
        let sample = decode_one(&mut decoder, 1_000, 990);
        assert_eq!(sample.width_us, 0);

        let sample = decode_one(&mut decoder, 10_000, 2010);
        assert_eq!(sample.width_us, 0);
    }

    #[test]
    fn test_hard_reject_keeps_band_edges() {
        let mut decoder = decoder_with(ValidationPolicy::HardReject);
        assert_eq!(decode_one(&mut decoder, 1_000, 1000).width_us, 1000);
        assert_eq!(decode_one(&mut decoder, 10_000, 2000).width_us, 2000);
    }

    #[test]
    fn test_soft_clamp_pulls_marginal_widths_in() {
        let mut decoder = decoder_with(ValidationPolicy::SoftClamp);
        assert_eq!(decode_one(&mut decoder, 1_000, 950).width_us, 1000);
        assert_eq!(decode_one(&mut decoder, 10_000, 2080).width_us, 2000);
    }

    #[test]
    fn test_soft_clamp_rejects_beyond_tolerance() {
        let mut decoder = decoder_with(ValidationPolicy::SoftClamp);
        assert_eq!(decode_one(&mut decoder, 1_000, 899).width_us, 0);
        assert_eq!(decode_one(&mut decoder, 10_000, 2101).width_us, 0);
    }

    #[test]
    fn test_far_out_of_band_rejected_under_both_policies() {
        for policy in [ValidationPolicy::HardReject, ValidationPolicy::SoftClamp] {
            let mut decoder = decoder_with(policy);
            assert_eq!(decode_one(&mut decoder, 1_000, 500).width_us, 0);
            assert_eq!(decode_one(&mut decoder, 10_000, 3000).width_us, 0);
        }
    }

    #[test]
    fn test_default_policy_is_soft_clamp() {
        assert_eq!(ValidationPolicy::default(), ValidationPolicy::SoftClamp);
    }

    // ==================== Polled Input Tests ====================

    #[test]
    fn test_polled_width_is_validated() {
        let mut decoder = decoder_with(ValidationPolicy::SoftClamp);
        decoder.record_polled_width(1700, 30_000);
        assert_eq!(decoder.sample().width_us, 1700);
        assert_eq!(decoder.sample().captured_at_us, 30_000);

        decoder.record_polled_width(2050, 40_000);
        assert_eq!(decoder.sample().width_us, 2000);
    }

    #[test]
    fn test_polled_timeout_keeps_previous_sample() {
        let mut decoder = decoder_with(ValidationPolicy::SoftClamp);
        decoder.record_polled_width(1500, 30_000);
        decoder.record_polled_width(0, 60_000);
        assert_eq!(decoder.sample().width_us, 1500);
        assert_eq!(decoder.sample().captured_at_us, 30_000);
    }
}
