//! # Telemetry Module
//!
//! Optional JSONL status logging for post-run analysis.
//!
//! Every record captures one control tick: link state, decoded channel
//! widths, light duties, and motor commands. Records append to a file under
//! the configured log directory; files rotate after a configurable record
//! count and the oldest files are pruned to bound disk usage.

pub mod logger;
pub mod types;

pub use logger::TelemetryLogger;
pub use types::StatusRecord;
