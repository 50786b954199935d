//! # Edge Events
//!
//! Input events produced by the platform's edge capture (pin-change
//! interrupt or GPIO event FIFO). Each event carries the channel it belongs
//! to, the monotonic timestamp at which the edge occurred, and the new pin
//! level. Events are consumed exactly once by the decoder and never stored.

/// Signal level after an edge.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EdgeLevel {
    /// Pin transitioned low-to-high; marks the start of a pulse.
    Rising,
    /// Pin transitioned high-to-low; closes the pulse in progress.
    Falling,
}

/// A single timestamped edge on one RC channel.
///
/// # Examples
///
/// ```
/// use ppm_rover::decoder::{EdgeEvent, EdgeLevel};
///
/// let event = EdgeEvent::new(0, 1_000, EdgeLevel::Rising);
/// assert_eq!(event.channel, 0);
/// assert_eq!(event.level, EdgeLevel::Rising);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EdgeEvent {
    /// Channel index (0-based).
    pub channel: usize,
    /// Monotonic timestamp in microseconds.
    pub timestamp_us: u64,
    /// Pin level after the edge.
    pub level: EdgeLevel,
}

impl EdgeEvent {
    /// Creates a new edge event.
    #[must_use]
    pub fn new(channel: usize, timestamp_us: u64, level: EdgeLevel) -> Self {
        Self {
            channel,
            timestamp_us,
            level,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_edge_event_fields() {
        let event = EdgeEvent::new(2, 12_345, EdgeLevel::Falling);
        assert_eq!(event.channel, 2);
        assert_eq!(event.timestamp_us, 12_345);
        assert_eq!(event.level, EdgeLevel::Falling);
    }

    #[test]
    fn test_edge_levels_distinct() {
        assert_ne!(EdgeLevel::Rising, EdgeLevel::Falling);
    }
}
