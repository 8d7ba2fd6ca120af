//! Repository for the `sensor_samples` table.

use sqlx::PgPool;
use airwatch_core::sample_window::Aggregate;
use airwatch_core::types::{DbId, Timestamp};

use crate::models::sample::{SensorSample, VocRange};

/// Column list for `sensor_samples` queries.
const COLUMNS: &str = "id, device_name, temperature, humidity, voc, sample_count, \
    window_start, window_end, created_at";

pub struct SampleRepo;

impl SampleRepo {
    /// Store one flushed aggregate, returning the generated ID.
    pub async fn insert(pool: &PgPool, aggregate: &Aggregate) -> Result<DbId, sqlx::Error> {
        sqlx::query_scalar(
            "INSERT INTO sensor_samples \
                (device_name, temperature, humidity, voc, sample_count, window_start, window_end) \
             VALUES ($1, $2, $3, $4, $5, $6, $7) \
             RETURNING id",
        )
        .bind(&aggregate.device_id)
        .bind(aggregate.temperature)
        .bind(aggregate.humidity)
        .bind(aggregate.voc)
        .bind(i32::try_from(aggregate.sample_count).unwrap_or(i32::MAX))
        .bind(aggregate.window_start)
        .bind(aggregate.window_end)
        .fetch_one(pool)
        .await
    }

    /// The most recent aggregate for a device.
    pub async fn latest(
        pool: &PgPool,
        device_name: &str,
    ) -> Result<Option<SensorSample>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM sensor_samples \
             WHERE device_name = $1 \
             ORDER BY window_end DESC, id DESC \
             LIMIT 1"
        );
        sqlx::query_as::<_, SensorSample>(&query)
            .bind(device_name)
            .fetch_optional(pool)
            .await
    }

    /// Mean aggregated VOC since `since`, `None` when there are no samples.
    pub async fn average_voc_since(
        pool: &PgPool,
        device_name: &str,
        since: Timestamp,
    ) -> Result<Option<f64>, sqlx::Error> {
        sqlx::query_scalar(
            "SELECT AVG(voc)::DOUBLE PRECISION FROM sensor_samples \
             WHERE device_name = $1 AND window_end >= $2",
        )
        .bind(device_name)
        .bind(since)
        .fetch_one(pool)
        .await
    }

    /// Lowest and highest aggregated VOC since `since`.
    pub async fn min_max_voc_since(
        pool: &PgPool,
        device_name: &str,
        since: Timestamp,
    ) -> Result<Option<VocRange>, sqlx::Error> {
        let range: (Option<i64>, Option<i64>) = sqlx::query_as(
            "SELECT MIN(voc), MAX(voc) FROM sensor_samples \
             WHERE device_name = $1 AND window_end >= $2",
        )
        .bind(device_name)
        .bind(since)
        .fetch_one(pool)
        .await?;
        Ok(match range {
            (Some(min_voc), Some(max_voc)) => Some(VocRange { min_voc, max_voc }),
            _ => None,
        })
    }
}
