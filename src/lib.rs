//! # PPM Rover Library
//!
//! Decode PPM radio-control channels and drive lights and motors.
//!
//! This library provides the core functionality for turning the edge stream
//! of an RC receiver into validated pulse-width samples, a link-health
//! verdict with hysteresis, and actuation outputs (brake/hazard lights,
//! differential-drive motor commands).

pub mod config;
pub mod error;
pub mod clock;
pub mod decoder;
pub mod health;
pub mod actuation;
pub mod output;
pub mod control;
pub mod input;
pub mod telemetry;
