//! # Differential Drive Mixer
//!
//! Combines the steering and throttle channels into per-side motor
//! commands for a skid-steer chassis.
//!
//! ## Pipeline
//!
//! 1. Each width maps to a signed percentage: the dead-band around center
//!    gives 0%, everything outside scales linearly (shifted by the
//!    dead-band offset so the response is continuous at the band edge) and
//!    clamps to +/-100%.
//! 2. Throttle and steering mix into left/right percentages; the steering
//!    sign flips in reverse so the stick keeps its sense when backing up.
//! 3. The proximity interlock zeroes any command toward an active sensor.
//! 4. Percentages convert to `(forward, reverse)` duty pairs.

use serde::Serialize;

use crate::config::MixerConfig;

/// Duty pair for one motor; at most one side is ever non-zero.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct MotorCommand {
    /// Forward PWM duty (0-255).
    pub forward: u8,
    /// Reverse PWM duty (0-255).
    pub reverse: u8,
}

impl MotorCommand {
    /// Both sides idle.
    pub const STOP: Self = Self {
        forward: 0,
        reverse: 0,
    };

    /// Returns true when neither direction is driven.
    #[must_use]
    pub fn is_stopped(&self) -> bool {
        self.forward == 0 && self.reverse == 0
    }
}

/// Proximity sensor inputs for the motion interlock.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ProximityState {
    /// A forward-facing sensor sees an obstacle.
    pub front: bool,
    /// A rear-facing sensor sees an obstacle.
    pub rear: bool,
}

/// Mixes steering and throttle widths into two motor commands.
///
/// # Examples
///
/// ```
/// use ppm_rover::actuation::{DifferentialMixer, ProximityState};
/// use ppm_rover::config::MixerConfig;
///
/// let mixer = DifferentialMixer::new(MixerConfig::default());
///
/// // Full throttle, centered steering: both motors full forward.
/// let [left, right] = mixer.compute(2000, 1500, ProximityState::default());
/// assert_eq!(left.forward, 200);
/// assert_eq!(right.forward, 200);
/// assert_eq!(left.reverse, 0);
/// ```
#[derive(Debug, Clone, Copy)]
pub struct DifferentialMixer {
    config: MixerConfig,
}

impl DifferentialMixer {
    /// Creates a mixer with the given scaling configuration.
    #[must_use]
    pub fn new(config: MixerConfig) -> Self {
        Self { config }
    }

    /// Maps a pulse width to a signed percentage in [-100, 100].
    ///
    /// Widths inside the dead-band (and the 0 "no signal" width) map to 0.
    #[must_use]
    pub fn percent_from_width(&self, width_us: u32) -> i32 {
        if width_us == 0 {
            return 0;
        }

        let center = ((self.config.deadband_low_us + self.config.deadband_high_us) / 2) as i32;
        let offset = self.config.deadband_offset_us as i32;
        let divisor = self.config.scale_divisor as i32;
        let width = width_us as i32;

        if width > self.config.deadband_high_us as i32 {
            (((width - offset) - center) / divisor).min(100)
        } else if width < self.config.deadband_low_us as i32 {
            (((width + offset) - center) / divisor).max(-100)
        } else {
            0
        }
    }

    /// Mixes throttle and steering percentages into per-side percentages.
    ///
    /// In reverse the steering term flips sign so that pushing the stick
    /// left still turns the chassis left.
    #[must_use]
    pub fn mix(&self, throttle_percent: i32, steering_percent: i32) -> (i32, i32) {
        let (left, right) = if throttle_percent >= 0 {
            (
                throttle_percent + steering_percent,
                throttle_percent - steering_percent,
            )
        } else {
            (
                throttle_percent - steering_percent,
                throttle_percent + steering_percent,
            )
        };
        (left.clamp(-100, 100), right.clamp(-100, 100))
    }

    /// Zeroes commands that would move toward an active proximity sensor.
    ///
    /// Applied after mixing, before duty conversion; both sides stop
    /// together so a blocked chassis never pivots into the obstacle.
    #[must_use]
    pub fn apply_interlock(
        &self,
        (left, right): (i32, i32),
        proximity: ProximityState,
    ) -> (i32, i32) {
        let mut left = left;
        let mut right = right;

        if proximity.front && (left > 0 || right > 0) {
            left = 0;
            right = 0;
        }
        if proximity.rear && (left < 0 || right < 0) {
            left = 0;
            right = 0;
        }

        (left, right)
    }

    /// Converts a signed percentage into a duty pair.
    #[must_use]
    pub fn to_command(&self, percent: i32) -> MotorCommand {
        let duty_max = self.config.duty_max as i32;
        if percent > 0 {
            MotorCommand {
                forward: (percent * 2).min(duty_max) as u8,
                reverse: 0,
            }
        } else if percent < 0 {
            MotorCommand {
                forward: 0,
                reverse: (-percent * 2).min(duty_max) as u8,
            }
        } else {
            MotorCommand::STOP
        }
    }

    /// Runs the full pipeline: scale, mix, interlock, convert.
    ///
    /// # Arguments
    ///
    /// * `throttle_width_us` - Decoded throttle channel width
    /// * `steering_width_us` - Decoded steering channel width
    /// * `proximity` - Current proximity sensor state
    ///
    /// # Returns
    ///
    /// `[left, right]` motor commands.
    #[must_use]
    pub fn compute(
        &self,
        throttle_width_us: u32,
        steering_width_us: u32,
        proximity: ProximityState,
    ) -> [MotorCommand; 2] {
        let throttle = self.percent_from_width(throttle_width_us);
        let steering = self.percent_from_width(steering_width_us);
        let mixed = self.mix(throttle, steering);
        let (left, right) = self.apply_interlock(mixed, proximity);
        [self.to_command(left), self.to_command(right)]
    }
}
