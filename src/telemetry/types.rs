//! Telemetry record types.

use chrono::Utc;
use serde::Serialize;

use crate::actuation::MotorCommand;
use crate::control::{TickOutputs, CHANNEL_COUNT};
use crate::decoder::PulseSample;
use crate::health::LinkState;

/// One control tick's worth of observable state, serialized as a JSON line.
#[derive(Debug, Clone, Serialize)]
pub struct StatusRecord {
    /// UTC wall-clock timestamp, RFC 3339.
    pub timestamp: String,
    /// Link state at the end of the tick.
    pub link: LinkState,
    /// Decoded pulse width per channel in microseconds (0 = rejected/none).
    pub channel_widths_us: [u32; CHANNEL_COUNT],
    /// Brake light duty (0-255).
    pub brake_duty: u8,
    /// Hazard light duty (0-255).
    pub hazard_duty: u8,
    /// Motor commands, left then right.
    pub motors: [MotorCommand; 2],
}

impl StatusRecord {
    /// Builds a record from a tick's inputs and outputs, stamped now.
    #[must_use]
    pub fn capture(samples: &[PulseSample; CHANNEL_COUNT], outputs: &TickOutputs) -> Self {
        Self {
            timestamp: Utc::now().to_rfc3339(),
            link: outputs.link,
            channel_widths_us: std::array::from_fn(|i| samples[i].width_us),
            brake_duty: outputs.brake_duty,
            hazard_duty: outputs.hazard_duty,
            motors: outputs.motors,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // ==================== Status Record Tests ====================

    fn sample(width_us: u32) -> PulseSample {
        PulseSample {
            width_us,
            captured_at_us: 1_000,
        }
    }

    #[test]
    fn test_capture_copies_tick_outputs() {
        let outputs = TickOutputs {
            link: LinkState::Good,
            brake_duty: 31,
            hazard_duty: 0,
            motors: [MotorCommand::STOP, MotorCommand::STOP],
        };
        let samples = [sample(1500), sample(1600), sample(1250)];

        let record = StatusRecord::capture(&samples, &outputs);
        assert_eq!(record.link, LinkState::Good);
        assert_eq!(record.channel_widths_us, [1500, 1600, 1250]);
        assert_eq!(record.brake_duty, 31);
    }

    #[test]
    fn test_record_serializes_to_json() {
        let outputs = TickOutputs {
            link: LinkState::Lost,
            brake_duty: 255,
            hazard_duty: 255,
            motors: [MotorCommand::STOP, MotorCommand::STOP],
        };
        let samples = [sample(0), sample(0), sample(0)];

        let record = StatusRecord::capture(&samples, &outputs);
        let json = serde_json::to_string(&record).unwrap();
        assert!(json.contains("\"link\":\"lost\""));
        assert!(json.contains("\"brake_duty\":255"));
    }
}
