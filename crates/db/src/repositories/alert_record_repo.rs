//! Repository for the append-only `alert_records` table.

use sqlx::PgPool;
use airwatch_core::alert::AlertRecord;
use airwatch_core::channels::ChannelKind;
use airwatch_core::types::DbId;

use crate::models::alert_record::AlertRecordRow;

/// Column list for `alert_records` queries.
const COLUMNS: &str = "id, device_name, channel, timestamp, message, metric_value, created_at";

pub struct AlertRecordRepo;

impl AlertRecordRepo {
    /// Append a record, returning the generated ID.
    pub async fn insert(
        pool: &PgPool,
        device_name: &str,
        channel: ChannelKind,
        record: &AlertRecord,
    ) -> Result<DbId, sqlx::Error> {
        sqlx::query_scalar(
            "INSERT INTO alert_records (device_name, channel, timestamp, message, metric_value) \
             VALUES ($1, $2, $3, $4, $5) \
             RETURNING id",
        )
        .bind(device_name)
        .bind(channel.as_str())
        .bind(&record.timestamp)
        .bind(&record.message)
        .bind(record.metric_value)
        .fetch_one(pool)
        .await
    }

    /// Most recent records for a device, newest first.
    pub async fn list_recent(
        pool: &PgPool,
        device_name: &str,
        limit: i64,
    ) -> Result<Vec<AlertRecordRow>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM alert_records \
             WHERE device_name = $1 \
             ORDER BY created_at DESC, id DESC \
             LIMIT $2"
        );
        sqlx::query_as::<_, AlertRecordRow>(&query)
            .bind(device_name)
            .bind(limit)
            .fetch_all(pool)
            .await
    }
}
