//! # Control Loop
//!
//! Per-tick orchestration: copy a snapshot from the channel bank, update
//! the health monitor, run the actuation machines, and produce one set of
//! output duties.
//!
//! The tick is pure with respect to time (the caller passes the
//! timestamp), so every failure scenario replays deterministically in
//! tests without hardware or sleeps.
//!
//! ## Failure Behaviour
//!
//! - A light channel that is not valid+fresh shows the error blink pattern
//!   instead of its normal output; the brake light inverts the pattern so
//!   the two failures are tellable apart at a glance. Neither is ever a
//!   static off.
//! - Motors follow the overall link verdict: mix on `Good`, hold the last
//!   commands on `Stale`, stop on `Lost`.

use crate::actuation::{
    AuxSwitch, BlinkPattern, DifferentialMixer, MotorCommand, ProximityState,
    ThrottleLightMachine,
};
use crate::config::Config;
use crate::decoder::PulseSample;
use crate::error::Result;
use crate::health::{LinkState, SignalHealthMonitor};
use crate::output::{write_motor, OutputChannel, OutputSink};

/// Number of RC channels the rover decodes.
pub const CHANNEL_COUNT: usize = 3;

/// Channel indices for semantic access.
pub mod channels {
    /// Throttle - brake light and drive speed
    pub const THROTTLE: usize = 0;
    /// Steering - drive direction
    pub const STEERING: usize = 1;
    /// Aux switch - hazard lights
    pub const AUX: usize = 2;
}

/// Everything one tick decided.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TickOutputs {
    /// Link verdict this tick.
    pub link: LinkState,
    /// Brake / position light duty.
    pub brake_duty: u8,
    /// Hazard light duty.
    pub hazard_duty: u8,
    /// Left and right motor commands.
    pub motors: [MotorCommand; 2],
}

impl TickOutputs {
    /// Writes all duties to an output sink.
    ///
    /// # Errors
    ///
    /// Propagates the first sink failure.
    pub fn apply(&self, sink: &mut dyn OutputSink) -> Result<()> {
        sink.set_duty(OutputChannel::BrakeLight, self.brake_duty)?;
        sink.set_duty(OutputChannel::HazardLight, self.hazard_duty)?;
        write_motor(
            sink,
            OutputChannel::Motor1Forward,
            OutputChannel::Motor1Reverse,
            self.motors[0],
        )?;
        write_motor(
            sink,
            OutputChannel::Motor2Forward,
            OutputChannel::Motor2Reverse,
            self.motors[1],
        )
    }
}

/// Ties decoder snapshots, health, and actuation together.
///
/// # Examples
///
/// ```
/// use ppm_rover::config::Config;
/// use ppm_rover::control::{ControlLoop, CHANNEL_COUNT};
/// use ppm_rover::decoder::PulseSample;
/// use ppm_rover::actuation::ProximityState;
/// use ppm_rover::health::LinkState;
///
/// let mut control = ControlLoop::new(&Config::default());
/// let samples = [PulseSample::default(); CHANNEL_COUNT];
///
/// let outputs = control.tick(&samples, ProximityState::default(), 0);
/// assert_eq!(outputs.link, LinkState::Lost);
/// assert!(outputs.motors.iter().all(|m| m.is_stopped()));
/// ```
#[derive(Debug)]
pub struct ControlLoop {
    monitor: SignalHealthMonitor<CHANNEL_COUNT>,
    throttle: ThrottleLightMachine,
    aux: AuxSwitch,
    mixer: DifferentialMixer,
    blink_pattern: BlinkPattern,
    error_pattern: BlinkPattern,
    /// Held while the link is stale.
    last_motors: [MotorCommand; 2],
    /// Full-brightness duty for the inverted brake error blink.
    brake_full_duty: u8,
}

impl ControlLoop {
    /// Builds the loop from a validated configuration.
    #[must_use]
    pub fn new(config: &Config) -> Self {
        Self {
            monitor: SignalHealthMonitor::new(config.health),
            throttle: ThrottleLightMachine::new(config.throttle),
            aux: AuxSwitch::new(config.aux),
            mixer: DifferentialMixer::new(config.mixer),
            blink_pattern: BlinkPattern::startup(),
            error_pattern: BlinkPattern::error(),
            last_motors: [MotorCommand::STOP; 2],
            brake_full_duty: config.throttle.brake_duty,
        }
    }

    /// Current link verdict.
    #[must_use]
    pub fn link_state(&self) -> LinkState {
        self.monitor.link_state()
    }

    /// Runs one control tick over a detached snapshot.
    ///
    /// # Arguments
    ///
    /// * `samples` - Snapshot copied from the channel bank
    /// * `proximity` - Current proximity sensor state
    /// * `now_us` - Monotonic timestamp of the tick
    pub fn tick(
        &mut self,
        samples: &[PulseSample; CHANNEL_COUNT],
        proximity: ProximityState,
        now_us: u64,
    ) -> TickOutputs {
        let link = self.monitor.update(samples, now_us);
        let blink = self.blink_pattern.level_at(now_us);
        let error_blink = self.error_pattern.level_at(now_us);

        let throttle_health = self.monitor.channel(channels::THROTTLE);
        let brake_duty = if throttle_health.valid && throttle_health.fresh {
            self.throttle
                .tick(samples[channels::THROTTLE].width_us, now_us, blink)
        } else if error_blink {
            // Inverted pattern: mostly-on, so loss of the throttle channel
            // reads differently from the hazard error blink.
            0
        } else {
            self.brake_full_duty
        };

        let aux_health = self.monitor.channel(channels::AUX);
        let hazard_duty = if aux_health.valid && aux_health.fresh {
            self.aux.output_duty(samples[channels::AUX].width_us, blink)
        } else if error_blink {
            u8::MAX
        } else {
            0
        };

        let motors = match link {
            LinkState::Good => {
                let motors = self.mixer.compute(
                    samples[channels::THROTTLE].width_us,
                    samples[channels::STEERING].width_us,
                    proximity,
                );
                self.last_motors = motors;
                motors
            }
            LinkState::Stale => self.last_motors,
            LinkState::Lost => {
                self.last_motors = [MotorCommand::STOP; 2];
                self.last_motors
            }
        };

        TickOutputs {
            link,
            brake_duty,
            hazard_duty,
            motors,
        }
    }
}
