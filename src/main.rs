//! # PPM Rover
//!
//! Decode PPM radio-control channels and drive lights and motors from them.
//!
//! This application runs the full receive-to-actuate pipeline: edge events
//! are decoded into validated pulse widths, link health is tracked per
//! channel, and each control tick maps the latest widths onto brake light,
//! hazard light, and differential motor outputs.

use std::sync::Arc;

use anyhow::Result;
use tokio::time::{interval, Duration};
use tracing::{debug, info};
use tracing_subscriber;

use ppm_rover::actuation::ProximityState;
use ppm_rover::clock::monotonic_micros;
use ppm_rover::config::Config;
use ppm_rover::control::{channels, ControlLoop, CHANNEL_COUNT};
use ppm_rover::decoder::ChannelBank;
use ppm_rover::input::spawn_simulated_receiver;
use ppm_rover::output::LogSink;
use ppm_rover::telemetry::{StatusRecord, TelemetryLogger};

/// Pulse width the simulated receiver emits for every channel (neutral).
const SIM_NEUTRAL_WIDTH_US: u32 = 1500;

/// Frame interval of the simulated receiver (20ms, typical RC frame rate)
const SIM_FRAME_MS: u64 = 20;

/// Main entry point for the PPM Rover application
///
/// Initializes the application and runs the control loop that samples the
/// channel bank and updates outputs at the configured tick rate.
///
/// # Control Flow
///
/// 1. **Initialization**
///    - Set up logging with tracing subscriber
///    - Load configuration from the path given as the first CLI argument,
///      or fall back to built-in defaults
///    - Spawn the edge source feeding the shared channel bank
///
/// 2. **Main Loop**
///    - Each tick: snapshot the channel bank, run the control loop, apply
///      the resulting duties to the output sink
///    - Append a telemetry record at the configured interval (if enabled)
///    - Log status periodically
///    - Handle Ctrl+C for graceful shutdown
///
/// 3. **Graceful Shutdown**
///    - Stop the edge source
///    - Log total tick count
///    - Clean exit
///
/// # Current Behavior
///
/// Edge events come from a simulated receiver holding every channel at
/// neutral (1500µs). On a target platform this task is replaced with a
/// real edge-capture source writing into the same channel bank.
///
/// # Errors
///
/// Returns error if:
/// - The configuration file cannot be read or fails validation
/// - The telemetry log directory cannot be created
///
/// # Examples
///
/// Run the application:
/// ```bash
/// cargo run --release -- config.toml
/// ```
///
/// Expected output:
/// ```text
/// INFO ppm_rover: PPM Rover v0.1.0 starting...
/// INFO ppm_rover: Starting control loop at 20ms ticks
/// INFO ppm_rover: Tick 250: link=Good widths=[1500, 1500, 1500]
/// ```
#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .init();

    info!("PPM Rover v{} starting...", env!("CARGO_PKG_VERSION"));

    let config = match std::env::args().nth(1) {
        Some(path) => {
            info!("Loading configuration from {}", path);
            Config::load(&path)?
        }
        None => {
            info!("No configuration file given, using defaults");
            Config::default()
        }
    };

    let bank: Arc<ChannelBank<CHANNEL_COUNT>> = Arc::new(ChannelBank::new(config.decoder));

    // Simulated edge source holding every channel at neutral.
    // On real hardware this is replaced with a pin-change edge capture task.
    let receiver = spawn_simulated_receiver(
        Arc::clone(&bank),
        [SIM_NEUTRAL_WIDTH_US; CHANNEL_COUNT],
        Duration::from_millis(SIM_FRAME_MS),
    );

    let mut control = ControlLoop::new(&config);
    let mut sink = LogSink::new();

    let mut telemetry = if config.telemetry.enabled {
        Some(TelemetryLogger::new(config.telemetry.clone())?)
    } else {
        None
    };
    let telemetry_every_ticks =
        (config.telemetry.log_interval_ms / config.control.tick_interval_ms).max(1);

    let mut tick_interval = interval(Duration::from_millis(config.control.tick_interval_ms));

    info!(
        "Starting control loop at {}ms ticks",
        config.control.tick_interval_ms
    );
    info!("Press Ctrl+C to exit");

    let mut tick_count: u64 = 0;

    // Main control loop
    loop {
        tokio::select! {
            _ = tick_interval.tick() => {
                let now_us = monotonic_micros();
                let samples = bank.snapshot();
                let outputs = control.tick(&samples, ProximityState::default(), now_us);

                if let Err(e) = outputs.apply(&mut sink) {
                    debug!("Failed to apply outputs: {}", e);
                    continue;
                }

                tick_count += 1;

                if let Some(logger) = telemetry.as_mut() {
                    if tick_count % telemetry_every_ticks == 0 {
                        if let Err(e) = logger.log(&StatusRecord::capture(&samples, &outputs)) {
                            debug!("Telemetry write failed: {}", e);
                        }
                    }
                }

                // Periodic status log
                if tick_count % config.control.status_log_ticks == 0 {
                    info!(
                        "Tick {}: link={:?} widths=[{}, {}, {}]",
                        tick_count,
                        outputs.link,
                        samples[channels::THROTTLE].width_us,
                        samples[channels::STEERING].width_us,
                        samples[channels::AUX].width_us,
                    );
                }
            }

            // Handle Ctrl+C for graceful shutdown
            _ = tokio::signal::ctrl_c() => {
                info!("Received Ctrl+C, shutting down...");
                receiver.abort();
                info!("Total ticks run: {}", tick_count);
                break;
            }
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sim_neutral_width_is_centered() {
        let config = Config::default();
        assert!(SIM_NEUTRAL_WIDTH_US > config.throttle.brake_threshold_us);
        assert!(SIM_NEUTRAL_WIDTH_US < config.throttle.accel_threshold_us);
    }

    #[test]
    fn test_telemetry_interval_ticks() {
        let config = Config::default();
        let every = (config.telemetry.log_interval_ms / config.control.tick_interval_ms).max(1);
        // 100ms telemetry cadence at 20ms ticks
        assert_eq!(every, 5);
    }

    #[test]
    fn test_default_tick_rate() {
        let config = Config::default();
        assert_eq!(config.control.tick_interval_ms, 20);
    }
}
