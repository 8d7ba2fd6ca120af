//! Postgres-backed registry, settings and history stores.

use airwatch_core::alert::AlertRecord;
use airwatch_core::channels::ChannelKind;
use airwatch_core::sample_window::Aggregate;
use airwatch_core::settings::AlertSettings;
use airwatch_db::repositories::{AlertRecordRepo, DeviceRepo, SampleRepo, SettingsRepo};
use airwatch_db::DbPool;
use async_trait::async_trait;

use super::{AlertStore, DeviceRegistry, DeviceTopic, SampleStore, SettingsSource};
use crate::error::MonitorError;

/// Implements every storage-facing collaborator over one pool.
///
/// Device names double as their MQTT topics.
#[derive(Clone)]
pub struct PgStore {
    pool: DbPool,
}

impl PgStore {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl DeviceRegistry for PgStore {
    async fn list_device_topics(&self) -> Result<Vec<DeviceTopic>, MonitorError> {
        let names = DeviceRepo::list_topics(&self.pool).await?;
        Ok(names
            .into_iter()
            .map(|name| DeviceTopic {
                topic: name.clone(),
                device_id: name,
            })
            .collect())
    }

    async fn is_selected_device(&self, device_id: &str) -> Result<bool, MonitorError> {
        let selected = SettingsRepo::selected_device(&self.pool).await?;
        Ok(selected.as_deref() == Some(device_id))
    }
}

#[async_trait]
impl SettingsSource for PgStore {
    async fn threshold_config(&self) -> Result<Option<AlertSettings>, MonitorError> {
        let row = SettingsRepo::get(&self.pool).await?;
        Ok(row.map(|row| row.to_alert_settings()))
    }
}

#[async_trait]
impl AlertStore for PgStore {
    async fn append_alert_record(
        &self,
        device_id: &str,
        channel: ChannelKind,
        record: &AlertRecord,
    ) -> Result<(), MonitorError> {
        AlertRecordRepo::insert(&self.pool, device_id, channel, record).await?;
        Ok(())
    }
}

#[async_trait]
impl SampleStore for PgStore {
    async fn append_aggregate_sample(&self, aggregate: &Aggregate) -> Result<(), MonitorError> {
        SampleRepo::insert(&self.pool, aggregate).await?;
        Ok(())
    }
}
