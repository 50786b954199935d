//! # Actuation State Machines
//!
//! Pure functions of (pulse width, previous state, elapsed time) producing
//! light and motor outputs.
//!
//! This module handles:
//! - Throttle to brake-light hysteresis (tap detection, decel detection,
//!   startup gate)
//! - 2-position / 3-position auxiliary switch classification
//! - Steering + throttle differential mixing with proximity interlock
//! - Shared blink pattern generation for startup and error signalling

pub mod blink;
pub mod throttle;
pub mod aux_switch;
pub mod mixer;

pub use blink::BlinkPattern;
pub use throttle::{ThrottleLightMachine, ThrottleState};
pub use aux_switch::{AuxPosition, AuxSwitch};
pub use mixer::{DifferentialMixer, MotorCommand, ProximityState};
