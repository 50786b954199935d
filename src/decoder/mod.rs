//! # Channel Decoder Module
//!
//! Converts per-channel edge streams from the RC receiver into validated
//! pulse-width samples.
//!
//! This module handles:
//! - Edge event timestamps (rising records pulse start, falling closes it)
//! - Pulse width validation (hard reject or soft clamp against the nominal band)
//! - Polled pulse-width readings as an alternative input path
//! - A shared channel bank with copy-then-process snapshot semantics

pub mod edge;
pub mod pulse;
pub mod bank;

pub use edge::{EdgeEvent, EdgeLevel};
pub use pulse::{ChannelDecoder, PulseSample, ValidationPolicy};
pub use bank::ChannelBank;
