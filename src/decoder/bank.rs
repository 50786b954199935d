//! # Shared Channel Bank
//!
//! Holds the live decoder state for all channels, shared between the edge
//! producers (interrupt handlers or a capture task) and the control loop.
//!
//! The pulse-timing fields form a multi-field aggregate, so a reader that
//! walked the live state while a writer updated it could observe a torn
//! snapshot. The discipline here mirrors masking interrupts around the copy:
//! writers take the lock for a single short edge update on their own channel
//! only, and the control loop takes it once per tick to copy the whole bank
//! into a local snapshot. Processing only ever sees the copy.

use std::sync::{Mutex, PoisonError};

use super::edge::EdgeEvent;
use super::pulse::{ChannelDecoder, PulseSample};
use crate::config::DecoderConfig;

/// Decoder state for `N` channels behind a single short-held lock.
///
/// # Examples
///
/// ```
/// use ppm_rover::config::DecoderConfig;
/// use ppm_rover::decoder::{ChannelBank, EdgeEvent, EdgeLevel};
///
/// let bank: ChannelBank<2> = ChannelBank::new(DecoderConfig::default());
/// bank.handle_edge(EdgeEvent::new(0, 1_000, EdgeLevel::Rising));
/// bank.handle_edge(EdgeEvent::new(0, 2_500, EdgeLevel::Falling));
///
/// let snapshot = bank.snapshot();
/// assert_eq!(snapshot[0].width_us, 1500);
/// assert_eq!(snapshot[1].width_us, 0);
/// ```
#[derive(Debug)]
pub struct ChannelBank<const N: usize> {
    decoders: Mutex<[ChannelDecoder; N]>,
}

impl<const N: usize> ChannelBank<N> {
    /// Creates a bank of `N` decoders sharing one validation configuration.
    #[must_use]
    pub fn new(config: DecoderConfig) -> Self {
        Self {
            decoders: Mutex::new(std::array::from_fn(|_| ChannelDecoder::new(config))),
        }
    }

    /// Number of channels in the bank.
    #[must_use]
    pub fn channel_count(&self) -> usize {
        N
    }

    /// Applies one edge event to its channel.
    ///
    /// Events for channels outside the bank are dropped; the producer for a
    /// channel never reads state written by another producer.
    pub fn handle_edge(&self, event: EdgeEvent) {
        if event.channel >= N {
            return;
        }
        let mut decoders = self.lock();
        decoders[event.channel].on_event(&event);
    }

    /// Records a polled pulse-width reading for one channel.
    ///
    /// # Arguments
    ///
    /// * `channel` - Channel index (0-based)
    /// * `width_us` - Measured high time, 0 on timeout
    /// * `now_us` - Monotonic timestamp of the read
    pub fn record_polled_width(&self, channel: usize, width_us: u32, now_us: u64) {
        if channel >= N {
            return;
        }
        let mut decoders = self.lock();
        decoders[channel].record_polled_width(width_us, now_us);
    }

    /// Copies the current sample of every channel in one critical section.
    ///
    /// The returned array is detached from the live state; callers process
    /// it freely while edges keep arriving.
    #[must_use]
    pub fn snapshot(&self) -> [PulseSample; N] {
        let decoders = self.lock();
        std::array::from_fn(|i| decoders[i].sample())
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, [ChannelDecoder; N]> {
        // A panic while holding this lock leaves plain sample data behind,
        // which is still safe to read.
        self.decoders.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
