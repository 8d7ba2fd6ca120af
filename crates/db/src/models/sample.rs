//! Aggregated sensor sample models.

use serde::Serialize;
use sqlx::FromRow;
use airwatch_core::types::{DbId, Timestamp};

/// A row from the `sensor_samples` table: one flushed window.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct SensorSample {
    pub id: DbId,
    pub device_name: String,
    pub temperature: f64,
    pub humidity: f64,
    pub voc: i64,
    pub sample_count: i32,
    pub window_start: Timestamp,
    pub window_end: Timestamp,
    pub created_at: Timestamp,
}

/// Lowest and highest aggregated VOC over a period.
#[derive(Debug, Clone, Copy, PartialEq, Eq, FromRow, Serialize)]
pub struct VocRange {
    pub min_voc: i64,
    pub max_voc: i64,
}
