//! Alert settings as read from the settings store before each batch.

use std::time::Duration;

use crate::actuator::ActuatorConfig;
use crate::channels::ChannelKind;
use crate::thresholds::ThresholdConfig;

/// Message used for VOC alerts when the store provides none.
pub const DEFAULT_NOTIFICATION_MESSAGE: &str = "Poor air quality, open a window.";

/// Per-channel threshold settings plus the texts the channels send.
///
/// The default has every channel disabled; it is what evaluation falls back
/// to when the settings row cannot be read.
#[derive(Debug, Clone, PartialEq)]
pub struct AlertSettings {
    pub voc_socket: ThresholdConfig,
    pub voc_email: ThresholdConfig,
    pub temperature: ThresholdConfig,
    pub humidity: ThresholdConfig,
    pub actuator: ActuatorConfig,
    pub notification_message: String,
    pub email_recipient: Option<String>,
}

impl AlertSettings {
    /// Threshold settings for `kind`.
    pub fn config_for(&self, kind: ChannelKind) -> &ThresholdConfig {
        match kind {
            ChannelKind::VocSocket => &self.voc_socket,
            ChannelKind::VocEmail => &self.voc_email,
            ChannelKind::Temperature => &self.temperature,
            ChannelKind::Humidity => &self.humidity,
            ChannelKind::ActuatorAlarm => &self.actuator.alarm,
        }
    }

    /// The values the settings store is seeded with.
    pub fn seeded() -> Self {
        let voc_socket = ThresholdConfig::enabled(200.0, Duration::from_secs(300));
        Self {
            voc_socket,
            voc_email: ThresholdConfig::enabled(300.0, Duration::from_secs(7200)),
            temperature: ThresholdConfig {
                enabled: false,
                threshold: 0.0,
                cooldown: Duration::from_secs(300),
            },
            humidity: ThresholdConfig {
                enabled: false,
                threshold: 50.0,
                cooldown: Duration::from_secs(300),
            },
            actuator: ActuatorConfig {
                alarm: voc_socket,
                auto_clear_after: Duration::from_secs(5),
            },
            notification_message: DEFAULT_NOTIFICATION_MESSAGE.to_string(),
            email_recipient: None,
        }
    }
}

impl Default for AlertSettings {
    fn default() -> Self {
        Self {
            voc_socket: ThresholdConfig::DISABLED,
            voc_email: ThresholdConfig::DISABLED,
            temperature: ThresholdConfig::DISABLED,
            humidity: ThresholdConfig::DISABLED,
            actuator: ActuatorConfig::default(),
            notification_message: DEFAULT_NOTIFICATION_MESSAGE.to_string(),
            email_recipient: None,
        }
    }
}
