//! Alert settings row and its conversion into evaluation settings.

use std::time::Duration;

use serde::Serialize;
use sqlx::FromRow;
use airwatch_core::actuator::ActuatorConfig;
use airwatch_core::settings::AlertSettings;
use airwatch_core::thresholds::ThresholdConfig;
use airwatch_core::types::{DbId, Timestamp};

/// The single row of the `user_settings` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct UserSettings {
    pub id: DbId,
    pub notifications: bool,
    pub notification_threshold: f64,
    /// Seconds.
    pub cooldown: i64,
    pub notification_message: String,
    pub email_notifications_on: bool,
    pub email_notification_threshold: f64,
    pub email_cooldown: i64,
    pub email_address: Option<String>,
    pub esp_alarm_enabled: bool,
    /// Seconds the actuator stays on after a fire.
    pub alarm_time: i64,
    pub temp_notifications_enabled: bool,
    pub temp_threshold: f64,
    pub temp_cooldown: i64,
    pub humi_notifications_enabled: bool,
    pub humi_threshold: f64,
    pub humi_cooldown: i64,
    pub selected_device: Option<String>,
    pub updated_at: Timestamp,
}

impl UserSettings {
    /// Map the row onto per-channel evaluation settings.
    ///
    /// The actuator shares the socket channel's threshold and cooldown and
    /// is gated by `esp_alarm_enabled`. Blank email addresses count as unset.
    pub fn to_alert_settings(&self) -> AlertSettings {
        let voc_socket = channel(self.notifications, self.notification_threshold, self.cooldown);
        AlertSettings {
            voc_socket,
            voc_email: channel(
                self.email_notifications_on,
                self.email_notification_threshold,
                self.email_cooldown,
            ),
            temperature: channel(
                self.temp_notifications_enabled,
                self.temp_threshold,
                self.temp_cooldown,
            ),
            humidity: channel(
                self.humi_notifications_enabled,
                self.humi_threshold,
                self.humi_cooldown,
            ),
            actuator: ActuatorConfig {
                alarm: ThresholdConfig {
                    enabled: self.esp_alarm_enabled,
                    ..voc_socket
                },
                auto_clear_after: seconds(self.alarm_time),
            },
            notification_message: self.notification_message.clone(),
            email_recipient: self
                .email_address
                .as_deref()
                .map(str::trim)
                .filter(|addr| !addr.is_empty())
                .map(str::to_string),
        }
    }
}

fn channel(enabled: bool, threshold: f64, cooldown_secs: i64) -> ThresholdConfig {
    ThresholdConfig {
        enabled,
        threshold,
        cooldown: seconds(cooldown_secs),
    }
}

/// Negative durations in the table are treated as zero.
fn seconds(secs: i64) -> Duration {
    Duration::from_secs(secs.max(0) as u64)
}
