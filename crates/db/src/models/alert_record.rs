//! Alert record entity model.

use serde::Serialize;
use sqlx::FromRow;
use airwatch_core::types::{DbId, Timestamp};

/// A row from the `alert_records` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct AlertRecordRow {
    pub id: DbId,
    pub device_name: String,
    pub channel: String,
    /// Timestamp label; `email--` prefixed for email fires.
    pub timestamp: String,
    pub message: String,
    pub metric_value: f64,
    pub created_at: Timestamp,
}
