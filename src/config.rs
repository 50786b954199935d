//! # Configuration Module
//!
//! Handles loading and validating configuration from TOML files.
//!
//! Every threshold the decode/actuate logic uses lives here rather than
//! inline in the components: pulse validity bounds, staleness window,
//! bad-sample threshold, throttle dead-band, brake-tap dwell, aux switch
//! thresholds, mixer scaling and the output duty ceiling.

use serde::Deserialize;
use serde::de::Error;
use std::fs;
use std::path::Path;

use crate::decoder::ValidationPolicy;
use crate::error::Result;

/// Main configuration structure
#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    #[serde(default)]
    pub decoder: DecoderConfig,

    #[serde(default)]
    pub health: HealthConfig,

    #[serde(default)]
    pub throttle: ThrottleConfig,

    #[serde(default)]
    pub aux: AuxConfig,

    #[serde(default)]
    pub mixer: MixerConfig,

    #[serde(default)]
    pub control: ControlConfig,

    #[serde(default)]
    pub telemetry: TelemetryConfig,
}

/// Pulse decoder configuration
#[derive(Debug, Deserialize, Clone, Copy)]
pub struct DecoderConfig {
    /// Lower bound of the nominal pulse band in microseconds.
    #[serde(default = "default_pulse_min_us")]
    pub pulse_min_us: u32,

    /// Upper bound of the nominal pulse band in microseconds.
    #[serde(default = "default_pulse_max_us")]
    pub pulse_max_us: u32,

    /// Accepted margin outside the nominal band before a pulse is rejected.
    #[serde(default = "default_tolerance_us")]
    pub tolerance_us: u32,

    /// Out-of-range handling: `"soft-clamp"` or `"hard-reject"`.
    #[serde(default)]
    pub validation: ValidationPolicy,
}

/// Signal health monitor configuration
#[derive(Debug, Deserialize, Clone, Copy)]
pub struct HealthConfig {
    /// Maximum sample age before a channel counts as stale.
    #[serde(default = "default_stale_window_ms")]
    pub stale_window_ms: u64,

    /// Consecutive bad ticks before the link is declared lost.
    #[serde(default = "default_bad_sample_threshold")]
    pub bad_sample_threshold: u8,
}

/// Throttle / brake-light state machine configuration
#[derive(Debug, Deserialize, Clone, Copy)]
pub struct ThrottleConfig {
    /// Widths at or below this classify as braking.
    #[serde(default = "default_brake_threshold_us")]
    pub brake_threshold_us: u32,

    /// Widths at or above this classify as accelerating.
    #[serde(default = "default_accel_threshold_us")]
    pub accel_threshold_us: u32,

    /// Neutral dwell below which a brake input counts as a quick tap.
    #[serde(default = "default_brake_tap_window_ms")]
    pub brake_tap_window_ms: u64,

    /// Width drop while accelerating that lights the brake.
    #[serde(default = "default_decel_offset_us")]
    pub decel_offset_us: u32,

    /// PWM duty for the full brake light.
    #[serde(default = "default_brake_duty")]
    pub brake_duty: u8,

    /// PWM duty for the dim position light.
    #[serde(default = "default_position_duty")]
    pub position_duty: u8,
}

/// Auxiliary switch channel configuration
#[derive(Debug, Deserialize, Clone, Copy)]
pub struct AuxConfig {
    /// Widths below this are the switch's low position.
    #[serde(default = "default_aux_low_threshold_us")]
    pub low_threshold_us: u32,

    /// Widths above this are the switch's high position.
    #[serde(default = "default_aux_high_threshold_us")]
    pub high_threshold_us: u32,

    /// Treat the low position as a third (blinking) position.
    #[serde(default)]
    pub three_position: bool,
}

/// Differential drive mixer configuration
#[derive(Debug, Deserialize, Clone, Copy)]
pub struct MixerConfig {
    /// Lower edge of the neutral dead-band in microseconds.
    #[serde(default = "default_deadband_low_us")]
    pub deadband_low_us: u32,

    /// Upper edge of the neutral dead-band in microseconds.
    #[serde(default = "default_deadband_high_us")]
    pub deadband_high_us: u32,

    /// Shift applied toward center before scaling, matching the dead-band.
    #[serde(default = "default_deadband_offset_us")]
    pub deadband_offset_us: u32,

    /// Divisor mapping centered microseconds to percent.
    #[serde(default = "default_scale_divisor")]
    pub scale_divisor: u32,

    /// Ceiling for motor PWM duty.
    #[serde(default = "default_duty_max")]
    pub duty_max: u8,
}

/// Control loop configuration
#[derive(Debug, Deserialize, Clone, Copy)]
pub struct ControlConfig {
    /// Control loop period in milliseconds.
    #[serde(default = "default_tick_interval_ms")]
    pub tick_interval_ms: u64,

    /// Number of ticks between status log messages.
    #[serde(default = "default_status_log_ticks")]
    pub status_log_ticks: u64,
}

/// Telemetry configuration
#[derive(Debug, Deserialize, Clone)]
pub struct TelemetryConfig {
    #[serde(default = "default_telemetry_enabled")]
    pub enabled: bool,

    #[serde(default = "default_log_dir")]
    pub log_dir: String,

    #[serde(default = "default_max_records_per_file")]
    pub max_records_per_file: usize,

    #[serde(default = "default_max_files_to_keep")]
    pub max_files_to_keep: usize,

    #[serde(default = "default_log_interval_ms")]
    pub log_interval_ms: u64,
}

// Default value functions
fn default_pulse_min_us() -> u32 { 1000 }
fn default_pulse_max_us() -> u32 { 2000 }
fn default_tolerance_us() -> u32 { 100 }

fn default_stale_window_ms() -> u64 { 500 }
fn default_bad_sample_threshold() -> u8 { 10 }

fn default_brake_threshold_us() -> u32 { 1450 }
fn default_accel_threshold_us() -> u32 { 1550 }
fn default_brake_tap_window_ms() -> u64 { 50 }
fn default_decel_offset_us() -> u32 { 20 }
fn default_brake_duty() -> u8 { 255 }
fn default_position_duty() -> u8 { 31 }

fn default_aux_low_threshold_us() -> u32 { 1250 }
fn default_aux_high_threshold_us() -> u32 { 1750 }

fn default_deadband_low_us() -> u32 { 1400 }
fn default_deadband_high_us() -> u32 { 1600 }
fn default_deadband_offset_us() -> u32 { 100 }
fn default_scale_divisor() -> u32 { 3 }
fn default_duty_max() -> u8 { 255 }

fn default_tick_interval_ms() -> u64 { 20 }
fn default_status_log_ticks() -> u64 { 250 }

fn default_telemetry_enabled() -> bool { false }
fn default_log_dir() -> String { "./logs".to_string() }
fn default_max_records_per_file() -> usize { 10000 }
fn default_max_files_to_keep() -> usize { 10 }
fn default_log_interval_ms() -> u64 { 100 }

impl Default for DecoderConfig {
    fn default() -> Self {
        Self {
            pulse_min_us: default_pulse_min_us(),
            pulse_max_us: default_pulse_max_us(),
            tolerance_us: default_tolerance_us(),
            validation: ValidationPolicy::default(),
        }
    }
}

impl Default for HealthConfig {
    fn default() -> Self {
        Self {
            stale_window_ms: default_stale_window_ms(),
            bad_sample_threshold: default_bad_sample_threshold(),
        }
    }
}

impl Default for ThrottleConfig {
    fn default() -> Self {
        Self {
            brake_threshold_us: default_brake_threshold_us(),
            accel_threshold_us: default_accel_threshold_us(),
            brake_tap_window_ms: default_brake_tap_window_ms(),
            decel_offset_us: default_decel_offset_us(),
            brake_duty: default_brake_duty(),
            position_duty: default_position_duty(),
        }
    }
}

impl Default for AuxConfig {
    fn default() -> Self {
        Self {
            low_threshold_us: default_aux_low_threshold_us(),
            high_threshold_us: default_aux_high_threshold_us(),
            three_position: false,
        }
    }
}

impl Default for MixerConfig {
    fn default() -> Self {
        Self {
            deadband_low_us: default_deadband_low_us(),
            deadband_high_us: default_deadband_high_us(),
            deadband_offset_us: default_deadband_offset_us(),
            scale_divisor: default_scale_divisor(),
            duty_max: default_duty_max(),
        }
    }
}

impl Default for ControlConfig {
    fn default() -> Self {
        Self {
            tick_interval_ms: default_tick_interval_ms(),
            status_log_ticks: default_status_log_ticks(),
        }
    }
}

impl Default for TelemetryConfig {
    fn default() -> Self {
        Self {
            enabled: default_telemetry_enabled(),
            log_dir: default_log_dir(),
            max_records_per_file: default_max_records_per_file(),
            max_files_to_keep: default_max_files_to_keep(),
            log_interval_ms: default_log_interval_ms(),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            decoder: DecoderConfig::default(),
            health: HealthConfig::default(),
            throttle: ThrottleConfig::default(),
            aux: AuxConfig::default(),
            mixer: MixerConfig::default(),
            control: ControlConfig::default(),
            telemetry: TelemetryConfig::default(),
        }
    }
}

impl Config {
    /// Load configuration from a TOML file
    ///
    /// # Arguments
    ///
    /// * `path` - Path to the configuration file
    ///
    /// # Returns
    ///
    /// * `Result<Config>` - Loaded and validated configuration
    ///
    /// # Errors
    ///
    /// Returns error if:
    /// - File cannot be read
    /// - TOML parsing fails
    /// - Validation fails
    ///
    /// # Examples
    ///
    /// ```no_run
    /// use ppm_rover::config::Config;
    ///
    /// let config = Config::load("config/default.toml")?;
    /// # Ok::<(), Box<dyn std::error::Error>>(())
    /// ```
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let contents = fs::read_to_string(path)?;
        let config: Config = toml::from_str(&contents)?;
        config.validate()?;
        Ok(config)
    }

    /// Validate configuration values
    ///
    /// # Returns
    ///
    /// * `Result<()>` - Ok if valid, Err if invalid
    ///
    /// # Errors
    ///
    /// Returns error if any configuration value is out of valid range
    pub fn validate(&self) -> Result<()> {
        // Validate pulse band
        if self.decoder.pulse_min_us < 900 || self.decoder.pulse_min_us > 1500 {
            return Err(crate::error::PpmRoverError::Config(
                toml::de::Error::custom("pulse_min_us must be between 900 and 1500")
            ));
        }

        if self.decoder.pulse_max_us < 1500 || self.decoder.pulse_max_us > 2100 {
            return Err(crate::error::PpmRoverError::Config(
                toml::de::Error::custom("pulse_max_us must be between 1500 and 2100")
            ));
        }

        if self.decoder.pulse_min_us >= self.decoder.pulse_max_us {
            return Err(crate::error::PpmRoverError::Config(
                toml::de::Error::custom("pulse_min_us must be less than pulse_max_us")
            ));
        }

        if self.decoder.tolerance_us > 200 {
            return Err(crate::error::PpmRoverError::Config(
                toml::de::Error::custom("tolerance_us must be at most 200")
            ));
        }

        // Validate health monitor timing
        if self.health.stale_window_ms == 0 || self.health.stale_window_ms > 10000 {
            return Err(crate::error::PpmRoverError::Config(
                toml::de::Error::custom("stale_window_ms must be between 1 and 10000")
            ));
        }

        if self.health.bad_sample_threshold == 0 {
            return Err(crate::error::PpmRoverError::Config(
                toml::de::Error::custom("bad_sample_threshold must be greater than 0")
            ));
        }

        // Validate throttle thresholds
        if self.throttle.brake_threshold_us >= self.throttle.accel_threshold_us {
            return Err(crate::error::PpmRoverError::Config(
                toml::de::Error::custom("brake_threshold_us must be less than accel_threshold_us")
            ));
        }

        if self.throttle.brake_threshold_us <= self.decoder.pulse_min_us
            || self.throttle.accel_threshold_us >= self.decoder.pulse_max_us {
            return Err(crate::error::PpmRoverError::Config(
                toml::de::Error::custom("throttle dead-band must lie inside the pulse band")
            ));
        }

        if self.throttle.brake_tap_window_ms == 0 || self.throttle.brake_tap_window_ms > 1000 {
            return Err(crate::error::PpmRoverError::Config(
                toml::de::Error::custom("brake_tap_window_ms must be between 1 and 1000")
            ));
        }

        if self.throttle.decel_offset_us == 0 || self.throttle.decel_offset_us > 200 {
            return Err(crate::error::PpmRoverError::Config(
                toml::de::Error::custom("decel_offset_us must be between 1 and 200")
            ));
        }

        if self.throttle.position_duty >= self.throttle.brake_duty {
            return Err(crate::error::PpmRoverError::Config(
                toml::de::Error::custom("position_duty must be less than brake_duty")
            ));
        }

        // Validate aux switch thresholds
        if self.aux.low_threshold_us >= self.aux.high_threshold_us {
            return Err(crate::error::PpmRoverError::Config(
                toml::de::Error::custom("aux low_threshold_us must be less than high_threshold_us")
            ));
        }

        if self.aux.low_threshold_us <= self.decoder.pulse_min_us
            || self.aux.high_threshold_us >= self.decoder.pulse_max_us {
            return Err(crate::error::PpmRoverError::Config(
                toml::de::Error::custom("aux thresholds must lie inside the pulse band")
            ));
        }

        // Validate mixer dead-band and scaling
        if self.mixer.deadband_low_us >= self.mixer.deadband_high_us {
            return Err(crate::error::PpmRoverError::Config(
                toml::de::Error::custom("deadband_low_us must be less than deadband_high_us")
            ));
        }

        if self.mixer.deadband_offset_us > 200 {
            return Err(crate::error::PpmRoverError::Config(
                toml::de::Error::custom("deadband_offset_us must be at most 200")
            ));
        }

        if self.mixer.scale_divisor == 0 {
            return Err(crate::error::PpmRoverError::Config(
                toml::de::Error::custom("scale_divisor must be greater than 0")
            ));
        }

        if self.mixer.duty_max == 0 {
            return Err(crate::error::PpmRoverError::Config(
                toml::de::Error::custom("duty_max must be greater than 0")
            ));
        }

        // Validate control loop timing
        if self.control.tick_interval_ms == 0 || self.control.tick_interval_ms > 1000 {
            return Err(crate::error::PpmRoverError::Config(
                toml::de::Error::custom("tick_interval_ms must be between 1 and 1000")
            ));
        }

        if self.control.status_log_ticks == 0 {
            return Err(crate::error::PpmRoverError::Config(
                toml::de::Error::custom("status_log_ticks must be greater than 0")
            ));
        }

        // Validate telemetry configuration
        if self.telemetry.enabled && self.telemetry.log_dir.is_empty() {
            return Err(crate::error::PpmRoverError::Config(
                toml::de::Error::custom("telemetry log_dir cannot be empty when enabled")
            ));
        }

        if self.telemetry.max_records_per_file == 0 {
            return Err(crate::error::PpmRoverError::Config(
                toml::de::Error::custom("max_records_per_file must be greater than 0")
            ));
        }

        if self.telemetry.max_files_to_keep == 0 {
            return Err(crate::error::PpmRoverError::Config(
                toml::de::Error::custom("max_files_to_keep must be greater than 0")
            ));
        }

        if self.telemetry.log_interval_ms == 0 || self.telemetry.log_interval_ms > 60000 {
            return Err(crate::error::PpmRoverError::Config(
                toml::de::Error::custom("log_interval_ms must be between 1 and 60000")
            ));
        }

        Ok(())
    }
}
