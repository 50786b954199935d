//! # Output Sink Module
//!
//! Trait abstraction over the actuator outputs (PWM/digital pins) so the
//! control loop can run against real hardware bindings, a logging sink on
//! the host, or a recording mock in tests.

use tracing::debug;

use crate::actuation::MotorCommand;
use crate::error::Result;

/// The actuator channels the control loop drives.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputChannel {
    /// Combined brake / position light.
    BrakeLight,
    /// Hazard light driven by the aux switch.
    HazardLight,
    /// Left motor forward pin.
    Motor1Forward,
    /// Left motor reverse pin.
    Motor1Reverse,
    /// Right motor forward pin.
    Motor2Forward,
    /// Right motor reverse pin.
    Motor2Reverse,
}

/// Trait for actuator output operations
pub trait OutputSink: Send {
    /// Write a PWM duty (0-255) to one channel
    fn set_duty(&mut self, channel: OutputChannel, duty: u8) -> Result<()>;
}

/// Convenience: write both pins of a motor from one command.
pub fn write_motor(
    sink: &mut dyn OutputSink,
    forward: OutputChannel,
    reverse: OutputChannel,
    command: MotorCommand,
) -> Result<()> {
    sink.set_duty(forward, command.forward)?;
    sink.set_duty(reverse, command.reverse)
}

/// Sink that logs duty writes through `tracing`.
///
/// Stands in for the GPIO/PWM platform binding when running on a
/// development host; only changed values are logged to keep the stream
/// readable at control-loop rate.
#[derive(Debug, Default)]
pub struct LogSink {
    last: [Option<u8>; 6],
}

impl LogSink {
    /// Creates a sink with no recorded values.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn slot(channel: OutputChannel) -> usize {
        match channel {
            OutputChannel::BrakeLight => 0,
            OutputChannel::HazardLight => 1,
            OutputChannel::Motor1Forward => 2,
            OutputChannel::Motor1Reverse => 3,
            OutputChannel::Motor2Forward => 4,
            OutputChannel::Motor2Reverse => 5,
        }
    }
}

impl OutputSink for LogSink {
    fn set_duty(&mut self, channel: OutputChannel, duty: u8) -> Result<()> {
        let slot = Self::slot(channel);
        if self.last[slot] != Some(duty) {
            debug!("output {:?} -> {}", channel, duty);
            self.last[slot] = Some(duty);
        }
        Ok(())
    }
}


#[cfg(test)]
mod tests {
    use super::mocks::MockSink;
    use super::*;

    #[test]
    fn test_log_sink_accepts_all_channels() {
        let mut sink = LogSink::new();
        for channel in [
            OutputChannel::BrakeLight,
            OutputChannel::HazardLight,
            OutputChannel::Motor1Forward,
            OutputChannel::Motor1Reverse,
            OutputChannel::Motor2Forward,
            OutputChannel::Motor2Reverse,
        ] {
            assert!(sink.set_duty(channel, 128).is_ok());
        }
    }

    #[test]
    fn test_write_motor_writes_both_pins() {
        let mut sink = MockSink::new();
        let command = MotorCommand {
            forward: 180,
            reverse: 0,
        };
        write_motor(
            &mut sink,
            OutputChannel::Motor1Forward,
            OutputChannel::Motor1Reverse,
            command,
        )
        .unwrap();

        assert_eq!(sink.last_duty(OutputChannel::Motor1Forward), Some(180));
        assert_eq!(sink.last_duty(OutputChannel::Motor1Reverse), Some(0));
    }

    #[test]
    fn test_mock_sink_error_injection() {
        let mut sink = MockSink::new();
        sink.set_fail_next();
        assert!(sink.set_duty(OutputChannel::BrakeLight, 255).is_err());
        // Subsequent writes succeed again.
        assert!(sink.set_duty(OutputChannel::BrakeLight, 255).is_ok());
    }
}
