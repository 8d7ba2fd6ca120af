//! Alert channel kinds and their fixed messages.

use std::fmt;

use serde::Serialize;

use crate::sample_window::Aggregate;

/// In-app message for the temperature channel.
pub const TEMPERATURE_ALERT_MESSAGE: &str = "Temperature exceeded set value.";

/// In-app message for the humidity channel.
pub const HUMIDITY_ALERT_MESSAGE: &str = "Humidity exceeded set value.";

/// Subject line of VOC warning emails.
pub const VOC_EMAIL_SUBJECT: &str = "VOC Warning";

/// One independently debounced alert channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ChannelKind {
    /// In-app alert plus alert record.
    VocSocket,
    /// Email plus `email--` prefixed alert record.
    VocEmail,
    Temperature,
    Humidity,
    /// Remote actuator, only for the selected device.
    ActuatorAlarm,
}

impl ChannelKind {
    /// Evaluation order within one batch.
    pub const ALL: [ChannelKind; 5] = [
        ChannelKind::VocSocket,
        ChannelKind::VocEmail,
        ChannelKind::Temperature,
        ChannelKind::Humidity,
        ChannelKind::ActuatorAlarm,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            ChannelKind::VocSocket => "voc_socket",
            ChannelKind::VocEmail => "voc_email",
            ChannelKind::Temperature => "temperature",
            ChannelKind::Humidity => "humidity",
            ChannelKind::ActuatorAlarm => "actuator_alarm",
        }
    }

    /// The aggregate value this channel is evaluated against.
    pub fn metric_value(self, aggregate: &Aggregate) -> f64 {
        match self {
            ChannelKind::VocSocket | ChannelKind::VocEmail | ChannelKind::ActuatorAlarm => {
                aggregate.voc as f64
            }
            ChannelKind::Temperature => aggregate.temperature,
            ChannelKind::Humidity => aggregate.humidity,
        }
    }
}

impl fmt::Display for ChannelKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
