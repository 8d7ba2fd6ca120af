//! Telemetry ingestion and alert dispatch.
//!
//! - [`Monitor`]: per-device sample windows and channel state machines,
//!   fed one raw message at a time.
//! - [`collaborators`]: the trait seams the monitor reads settings from
//!   and performs side effects through, with Postgres, event bus, SMTP and
//!   MQTT implementations.
//! - [`mqtt`]: the broker connection loop with fixed-interval reconnect.
//! - [`sweeper`]: periodic actuator auto-clear.

pub mod collaborators;
pub mod config;
pub mod device;
pub mod dispatch;
pub mod error;
pub mod monitor;
pub mod mqtt;
pub mod reconnect;
pub mod sweeper;

pub use collaborators::Collaborators;
pub use config::MonitorConfig;
pub use error::MonitorError;
pub use monitor::Monitor;
