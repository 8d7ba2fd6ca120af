/// All database primary keys are PostgreSQL BIGSERIAL.
pub type DbId = i64;

/// Devices are identified by their registered name, which doubles as the
/// storage key for their samples.
pub type DeviceId = String;

/// All timestamps are UTC.
pub type Timestamp = chrono::DateTime<chrono::Utc>;
