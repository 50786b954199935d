//! # Input Module
//!
//! Edge-stream producers feeding the shared channel bank.
//!
//! Real edge capture (pin-change interrupts or a GPIO event FIFO) is a
//! platform binding outside this crate; what ships here is a simulated
//! receiver that generates well-formed PPM frames, useful for running the
//! binary on a development host and for exercising the full decode path.

pub mod sim;

pub use sim::spawn_simulated_receiver;
