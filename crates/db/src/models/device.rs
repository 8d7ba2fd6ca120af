//! Device entity model.

use serde::Serialize;
use sqlx::FromRow;
use airwatch_core::types::{DbId, Timestamp};

/// A row from the `devices` table. `name` doubles as the MQTT topic.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Device {
    pub id: DbId,
    pub name: String,
    pub created_at: Timestamp,
}
