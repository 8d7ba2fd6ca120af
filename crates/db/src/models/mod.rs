//! Row structs for the persisted tables.
//!
//! Each submodule contains a `FromRow` + `Serialize` entity struct matching
//! the database row, plus any conversions into domain types.

pub mod alert_record;
pub mod device;
pub mod sample;
pub mod settings;
