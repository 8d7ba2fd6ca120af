//! Pure domain logic for the airwatch telemetry monitor.
//!
//! Nothing in this crate performs I/O. Readings are parsed and windowed,
//! aggregates are evaluated against per-channel thresholds, and the channel
//! state machines return the side effects the caller should perform as plain
//! [`effects::Effect`] values.

pub mod actuator;
pub mod alert;
pub mod channels;
pub mod device;
pub mod effects;
pub mod error;
pub mod reading;
pub mod sample_window;
pub mod settings;
pub mod thresholds;
pub mod types;
