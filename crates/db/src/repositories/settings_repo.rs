//! Repository for the single-row `user_settings` table.

use sqlx::PgPool;

use crate::models::settings::UserSettings;

const COLUMNS: &str = "id, notifications, notification_threshold, cooldown, \
    notification_message, email_notifications_on, email_notification_threshold, \
    email_cooldown, email_address, esp_alarm_enabled, alarm_time, \
    temp_notifications_enabled, temp_threshold, temp_cooldown, \
    humi_notifications_enabled, humi_threshold, humi_cooldown, \
    selected_device, updated_at";

pub struct SettingsRepo;

impl SettingsRepo {
    /// Fetch the settings row, `None` if it has not been seeded.
    pub async fn get(pool: &PgPool) -> Result<Option<UserSettings>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM user_settings WHERE id = 1");
        sqlx::query_as::<_, UserSettings>(&query)
            .fetch_optional(pool)
            .await
    }

    /// Name of the device that drives the actuator, if any.
    pub async fn selected_device(pool: &PgPool) -> Result<Option<String>, sqlx::Error> {
        let selected: Option<Option<String>> =
            sqlx::query_scalar("SELECT selected_device FROM user_settings WHERE id = 1")
                .fetch_optional(pool)
                .await?;
        Ok(selected.flatten())
    }
}
