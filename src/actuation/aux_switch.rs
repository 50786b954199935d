//! # Auxiliary Switch Classifier
//!
//! Stateless classifier for a transmitter switch channel (hazard lights in
//! the reference wiring). The 500 us gap between the low and high
//! thresholds is the only debounce the two discrete switch positions need.

use crate::config::AuxConfig;

/// Duty used when the aux output is lit.
const AUX_ON_DUTY: u8 = 255;

/// Switch position decoded from the pulse width.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuxPosition {
    /// Width below the low threshold.
    Low,
    /// Width between the thresholds (includes "no signal on a 2-pos switch").
    Mid,
    /// Width above the high threshold.
    High,
}

/// Classifies an aux channel and derives its light output.
///
/// # Examples
///
/// ```
/// use ppm_rover::actuation::{AuxPosition, AuxSwitch};
/// use ppm_rover::config::AuxConfig;
///
/// let switch = AuxSwitch::new(AuxConfig::default());
/// assert_eq!(switch.classify(1900), AuxPosition::High);
/// assert_eq!(switch.classify(1500), AuxPosition::Mid);
/// ```
#[derive(Debug, Clone, Copy)]
pub struct AuxSwitch {
    config: AuxConfig,
}

impl AuxSwitch {
    /// Creates a classifier for the given thresholds.
    #[must_use]
    pub fn new(config: AuxConfig) -> Self {
        Self { config }
    }

    /// Maps a pulse width to a switch position.
    #[must_use]
    pub fn classify(&self, width_us: u32) -> AuxPosition {
        if width_us > self.config.high_threshold_us {
            AuxPosition::High
        } else if width_us < self.config.low_threshold_us {
            AuxPosition::Low
        } else {
            AuxPosition::Mid
        }
    }

    /// Returns the light duty for the current width and blink phase.
    ///
    /// High blinks; low is off on a 2-position switch and blinks on the
    /// 3-position variant (a momentary position distinct from "off"); mid
    /// is always off.
    #[must_use]
    pub fn output_duty(&self, width_us: u32, blink: bool) -> u8 {
        let lit = match self.classify(width_us) {
            AuxPosition::High => blink,
            AuxPosition::Low => self.config.three_position && blink,
            AuxPosition::Mid => false,
        };
        if lit {
            AUX_ON_DUTY
        } else {
            0
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn switch(three_position: bool) -> AuxSwitch {
        AuxSwitch::new(AuxConfig {
            three_position,
            ..AuxConfig::default()
        })
    }

    #[test]
    fn test_classify_positions() {
        let s = switch(false);
        assert_eq!(s.classify(1100), AuxPosition::Low);
        assert_eq!(s.classify(1249), AuxPosition::Low);
        assert_eq!(s.classify(1250), AuxPosition::Mid);
        assert_eq!(s.classify(1750), AuxPosition::Mid);
        assert_eq!(s.classify(1751), AuxPosition::High);
        assert_eq!(s.classify(1950), AuxPosition::High);
    }

    #[test]
    fn test_high_position_blinks() {
        let s = switch(false);
        assert_eq!(s.output_duty(1900, true), 255);
        assert_eq!(s.output_duty(1900, false), 0);
    }

    #[test]
    fn test_low_position_off_on_two_position_switch() {
        let s = switch(false);
        assert_eq!(s.output_duty(1100, true), 0);
        assert_eq!(s.output_duty(1100, false), 0);
    }

    #[test]
    fn test_low_position_blinks_on_three_position_switch() {
        let s = switch(true);
        assert_eq!(s.output_duty(1100, true), 255);
        assert_eq!(s.output_duty(1100, false), 0);
    }

    #[test]
    fn test_mid_position_always_off() {
        for three_position in [false, true] {
            let s = switch(three_position);
            assert_eq!(s.output_duty(1500, true), 0);
            assert_eq!(s.output_duty(1500, false), 0);
        }
    }
}
