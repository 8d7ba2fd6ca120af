use std::str::FromStr;
use std::time::Duration;

use airwatch_core::sample_window::DEFAULT_WINDOW_SIZE;
use rumqttc::MqttOptions;

use crate::error::MonitorError;
use crate::reconnect::ReconnectConfig;

/// Monitor configuration loaded from environment variables.
///
/// Alert thresholds are not part of this: they are read from the settings
/// store before every batch.
#[derive(Debug, Clone)]
pub struct MonitorConfig {
    pub mqtt_host: String,
    pub mqtt_port: u16,
    pub mqtt_client_id: String,
    pub mqtt_keep_alive: Duration,
    /// Fixed delay between reconnect attempts.
    pub reconnect_interval: Duration,
    /// Readings per aggregate. Never zero.
    pub window_size: usize,
    /// Topic the actuator listens on for `on` / `off`.
    pub actuator_topic: String,
    /// Period of the actuator auto-clear sweep.
    pub auto_clear_tick: Duration,
}

impl Default for MonitorConfig {
    fn default() -> Self {
        Self {
            mqtt_host: "127.0.0.1".into(),
            mqtt_port: 1883,
            mqtt_client_id: "airwatch-hub".into(),
            mqtt_keep_alive: Duration::from_secs(60),
            reconnect_interval: Duration::from_secs(15),
            window_size: DEFAULT_WINDOW_SIZE,
            actuator_topic: "alert/testing".into(),
            auto_clear_tick: Duration::from_millis(1000),
        }
    }
}

impl MonitorConfig {
    /// Load configuration from environment variables with defaults.
    ///
    /// | Env Var                | Default         |
    /// |------------------------|-----------------|
    /// | `MQTT_HOST`            | `127.0.0.1`     |
    /// | `MQTT_PORT`            | `1883`          |
    /// | `MQTT_CLIENT_ID`       | `airwatch-hub`  |
    /// | `MQTT_KEEP_ALIVE_SECS` | `60`            |
    /// | `MQTT_RECONNECT_SECS`  | `15`            |
    /// | `SAMPLE_WINDOW_SIZE`   | `5`             |
    /// | `ACTUATOR_TOPIC`       | `alert/testing` |
    /// | `AUTO_CLEAR_TICK_MS`   | `1000`          |
    ///
    /// A `SAMPLE_WINDOW_SIZE` of `0` is raised to `1`.
    pub fn from_env() -> Result<Self, MonitorError> {
        let defaults = Self::default();
        Ok(Self {
            mqtt_host: env_or("MQTT_HOST", defaults.mqtt_host),
            mqtt_port: parse_env("MQTT_PORT", defaults.mqtt_port)?,
            mqtt_client_id: env_or("MQTT_CLIENT_ID", defaults.mqtt_client_id),
            mqtt_keep_alive: Duration::from_secs(parse_env(
                "MQTT_KEEP_ALIVE_SECS",
                defaults.mqtt_keep_alive.as_secs(),
            )?),
            reconnect_interval: Duration::from_secs(parse_env(
                "MQTT_RECONNECT_SECS",
                defaults.reconnect_interval.as_secs(),
            )?),
            window_size: parse_env("SAMPLE_WINDOW_SIZE", defaults.window_size)?.max(1),
            actuator_topic: env_or("ACTUATOR_TOPIC", defaults.actuator_topic),
            auto_clear_tick: Duration::from_millis(parse_env(
                "AUTO_CLEAR_TICK_MS",
                defaults.auto_clear_tick.as_millis() as u64,
            )?),
        })
    }

    pub fn mqtt_options(&self) -> MqttOptions {
        let mut options = MqttOptions::new(&self.mqtt_client_id, &self.mqtt_host, self.mqtt_port);
        options.set_keep_alive(self.mqtt_keep_alive);
        options.set_clean_session(true);
        options
    }

    pub fn reconnect(&self) -> ReconnectConfig {
        ReconnectConfig::fixed(self.reconnect_interval)
    }
}

fn env_or(key: &str, default: String) -> String {
    std::env::var(key).unwrap_or(default)
}

fn parse_env<T: FromStr>(key: &str, default: T) -> Result<T, MonitorError> {
    match std::env::var(key) {
        Ok(raw) => raw
            .trim()
            .parse()
            .map_err(|_| MonitorError::Config(format!("{key} must be a number, got {raw:?}"))),
        Err(_) => Ok(default),
    }
}
