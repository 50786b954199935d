//! Simulated receiver task.
//!
//! Emits one rising/falling edge pair per channel every frame, with fixed
//! pulse widths, so the decode path behaves exactly as it would with real
//! hardware producing the same signal.

use std::sync::Arc;

use tokio::task::JoinHandle;
use tokio::time::{sleep, Duration};
use tracing::debug;

use crate::clock::monotonic_micros;
use crate::decoder::{ChannelBank, EdgeEvent, EdgeLevel};

/// Spawns a background task that feeds synthetic edge pairs into `bank`.
///
/// Each frame, every channel receives a rising edge stamped with the current
/// monotonic time and a falling edge `widths_us[channel]` later, then the
/// task sleeps for `frame_interval`. The task runs until aborted.
///
/// # Arguments
///
/// * `bank` - Shared channel bank the edges are injected into
/// * `widths_us` - Pulse width to synthesize per channel, in microseconds
/// * `frame_interval` - Time between frames (20 ms matches a typical receiver)
///
/// # Returns
///
/// Join handle for the spawned task; abort it to stop the stream.
pub fn spawn_simulated_receiver<const N: usize>(
    bank: Arc<ChannelBank<N>>,
    widths_us: [u32; N],
    frame_interval: Duration,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        debug!(
            "Simulated receiver started ({} channels, {:?} frames)",
            N, frame_interval
        );

        loop {
            let frame_start = monotonic_micros();

            for (channel, width) in widths_us.iter().enumerate() {
                bank.handle_edge(EdgeEvent::new(channel, frame_start, EdgeLevel::Rising));
                bank.handle_edge(EdgeEvent::new(
                    channel,
                    frame_start + u64::from(*width),
                    EdgeLevel::Falling,
                ));
            }

            sleep(frame_interval).await;
        }
    })
}
