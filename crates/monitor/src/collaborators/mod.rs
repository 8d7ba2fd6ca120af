//! Collaborator seams.
//!
//! The monitor never talks to Postgres, SMTP, the event bus or the broker
//! directly. It goes through these traits, held as `Arc<dyn ..>` in
//! [`Collaborators`], so tests can swap in in-memory fakes.

use std::sync::Arc;

use airwatch_core::actuator::ActuatorCommand;
use airwatch_core::alert::AlertRecord;
use airwatch_core::channels::ChannelKind;
use airwatch_core::sample_window::Aggregate;
use airwatch_core::settings::AlertSettings;
use airwatch_core::types::DeviceId;
use airwatch_events::AlertEvent;
use async_trait::async_trait;

use crate::error::MonitorError;

pub mod bus;
pub mod postgres;

pub use bus::BusEmitter;
pub use postgres::PgStore;

/// A subscription topic and the device it belongs to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeviceTopic {
    pub topic: String,
    pub device_id: DeviceId,
}

#[async_trait]
pub trait DeviceRegistry: Send + Sync {
    async fn list_device_topics(&self) -> Result<Vec<DeviceTopic>, MonitorError>;

    /// Whether `device_id` currently drives the actuator.
    async fn is_selected_device(&self, device_id: &str) -> Result<bool, MonitorError>;
}

#[async_trait]
pub trait SettingsSource: Send + Sync {
    /// Current settings, `None` if the store has none.
    async fn threshold_config(&self) -> Result<Option<AlertSettings>, MonitorError>;
}

#[async_trait]
pub trait AlertStore: Send + Sync {
    async fn append_alert_record(
        &self,
        device_id: &str,
        channel: ChannelKind,
        record: &AlertRecord,
    ) -> Result<(), MonitorError>;
}

#[async_trait]
pub trait SampleStore: Send + Sync {
    async fn append_aggregate_sample(&self, aggregate: &Aggregate) -> Result<(), MonitorError>;
}

/// In-app alert push.
#[async_trait]
pub trait AlertEmitter: Send + Sync {
    async fn emit_alert(&self, event: AlertEvent) -> Result<(), MonitorError>;
}

#[async_trait]
pub trait Mailer: Send + Sync {
    async fn send_email(&self, recipient: &str, subject: &str, body: &str)
        -> Result<(), MonitorError>;
}

#[async_trait]
pub trait ActuatorLink: Send + Sync {
    async fn send_actuator_command(
        &self,
        device_id: &str,
        command: ActuatorCommand,
    ) -> Result<(), MonitorError>;
}

/// Everything the monitor reads from and writes to.
#[derive(Clone)]
pub struct Collaborators {
    pub registry: Arc<dyn DeviceRegistry>,
    pub settings: Arc<dyn SettingsSource>,
    pub alerts: Arc<dyn AlertStore>,
    pub samples: Arc<dyn SampleStore>,
    pub emitter: Arc<dyn AlertEmitter>,
    /// `None` when SMTP is not configured.
    pub mailer: Option<Arc<dyn Mailer>>,
    pub actuator: Arc<dyn ActuatorLink>,
}
