//! # Throttle / Brake-Light State Machine
//!
//! Classifies the throttle channel into `Accel` / `Neutral` / `Brake` and
//! derives a single light output that doubles as tail (position) light and
//! brake light.
//!
//! ## Light Rules
//!
//! - Entering `Accel`: light off.
//! - Entering `Neutral` from anywhere: light on.
//! - Entering `Brake`: on when arriving from `Accel`, or from `Neutral`
//!   within the tap window ("tapped the brake almost immediately");
//!   otherwise off.
//! - Holding `Brake` past the tap window demotes the light to the dim
//!   position level.
//! - Holding `Accel`: a width drop beyond the decel offset means the driver
//!   is easing off, which lights the brake; anything else turns it off.
//!
//! Until the stick leaves neutral for the first time, the output follows
//! the startup blink pattern instead: the transmitter may simply be off,
//! and a solid brake light would be indistinguishable from real input.

use crate::config::ThrottleConfig;

/// Throttle stick classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ThrottleState {
    /// Width at or above the acceleration threshold.
    Accel,
    /// Width inside the dead-band around center.
    Neutral,
    /// Width at or below the brake threshold.
    Brake,
}

/// Brake-light state machine for one throttle channel.
///
/// Owns all state that persists across ticks; [`tick`](Self::tick) is the
/// only mutator, so scenarios replay deterministically in tests.
///
/// # Examples
///
/// ```
/// use ppm_rover::actuation::{ThrottleLightMachine, ThrottleState};
/// use ppm_rover::config::ThrottleConfig;
///
/// let mut machine = ThrottleLightMachine::new(ThrottleConfig::default());
///
/// // First movement: neutral -> accel turns the light off (position level).
/// machine.tick(1600, 0, false);
/// assert_eq!(machine.state(), ThrottleState::Accel);
/// assert!(!machine.brake_light_on());
/// ```
#[derive(Debug)]
pub struct ThrottleLightMachine {
    config: ThrottleConfig,
    state: ThrottleState,
    state_entered_at_us: u64,
    last_width_us: u32,
    last_width_at_us: u64,
    brake_light: bool,
    has_moved: bool,
}

impl ThrottleLightMachine {
    /// Creates a machine in neutral with the brake light on and the
    /// startup gate closed.
    #[must_use]
    pub fn new(config: ThrottleConfig) -> Self {
        Self {
            config,
            state: ThrottleState::Neutral,
            state_entered_at_us: 0,
            last_width_us: 0,
            last_width_at_us: 0,
            brake_light: true,
            has_moved: false,
        }
    }

    /// Current classification.
    #[must_use]
    pub fn state(&self) -> ThrottleState {
        self.state
    }

    /// Whether the last tick decided the brake light should be lit.
    #[must_use]
    pub fn brake_light_on(&self) -> bool {
        self.brake_light
    }

    /// Whether the stick has left neutral since boot.
    #[must_use]
    pub fn has_moved(&self) -> bool {
        self.has_moved
    }

    /// Timestamp of the last pulse-width change.
    #[must_use]
    pub fn last_width_at_us(&self) -> u64 {
        self.last_width_at_us
    }

    /// Classifies a pulse width against the configured dead-band.
    #[must_use]
    pub fn classify(&self, width_us: u32) -> ThrottleState {
        if width_us <= self.config.brake_threshold_us {
            ThrottleState::Brake
        } else if width_us >= self.config.accel_threshold_us {
            ThrottleState::Accel
        } else {
            ThrottleState::Neutral
        }
    }

    /// Advances the machine one tick and returns the light duty.
    ///
    /// Only call with a valid, fresh width; the caller owns the no-signal
    /// fallback (error blink), which must never be a static off.
    ///
    /// # Arguments
    ///
    /// * `width_us` - Latest decoded throttle width
    /// * `now_us` - Monotonic timestamp of the tick
    /// * `startup_blink` - Startup pattern level for this tick
    ///
    /// # Returns
    ///
    /// PWM duty for the combined brake/position light.
    pub fn tick(&mut self, width_us: u32, now_us: u64, startup_blink: bool) -> u8 {
        let new_state = self.classify(width_us);

        if new_state != ThrottleState::Neutral && !self.has_moved {
            self.has_moved = true;
        }

        if !self.has_moved {
            // Waiting for first stick input; blink instead of commanding
            // brake state.
            return if startup_blink { self.config.brake_duty } else { 0 };
        }

        if new_state != self.state {
            self.brake_light = match new_state {
                ThrottleState::Accel => false,
                ThrottleState::Neutral => true,
                ThrottleState::Brake => {
                    let neutral_tap = self.state == ThrottleState::Neutral
                        && now_us.saturating_sub(self.state_entered_at_us)
                            < self.config.brake_tap_window_ms * 1_000;
                    neutral_tap || self.state == ThrottleState::Accel
                }
            };
        } else if new_state == ThrottleState::Brake
            && now_us.saturating_sub(self.state_entered_at_us)
                >= self.config.brake_tap_window_ms * 1_000
        {
            // Sustained braking; demote to position light.
            self.brake_light = false;
        }

        // Easing off while accelerating reads as engine braking.
        if width_us != self.last_width_us
            && new_state == ThrottleState::Accel
            && self.state == ThrottleState::Accel
        {
            self.brake_light =
                width_us < self.last_width_us.saturating_sub(self.config.decel_offset_us);
        }

        // Rules observed the previous state; commit the new one after.
        if new_state != self.state {
            self.state = new_state;
            self.state_entered_at_us = now_us;
        }
        if width_us != self.last_width_us {
            self.last_width_us = width_us;
            self.last_width_at_us = now_us;
        }

        if self.brake_light {
            self.config.brake_duty
        } else {
            self.config.position_duty
        }
    }
}
