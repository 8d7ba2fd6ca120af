//! Repository for the `devices` table.

use sqlx::PgPool;

use crate::models::device::Device;

/// Column list for `devices` queries.
const COLUMNS: &str = "id, name, created_at";

/// Read access to registered devices. Registration happens outside the
/// service.
pub struct DeviceRepo;

impl DeviceRepo {
    /// All registered devices, oldest first.
    pub async fn list(pool: &PgPool) -> Result<Vec<Device>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM devices ORDER BY id");
        sqlx::query_as::<_, Device>(&query).fetch_all(pool).await
    }

    /// Topic names of all registered devices.
    pub async fn list_topics(pool: &PgPool) -> Result<Vec<String>, sqlx::Error> {
        sqlx::query_scalar("SELECT name FROM devices ORDER BY id")
            .fetch_all(pool)
            .await
    }

    /// Look up a device by its name.
    pub async fn find_by_name(pool: &PgPool, name: &str) -> Result<Option<Device>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM devices WHERE name = $1");
        sqlx::query_as::<_, Device>(&query)
            .bind(name)
            .fetch_optional(pool)
            .await
    }
}
