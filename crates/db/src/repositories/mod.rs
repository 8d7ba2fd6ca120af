//! Repository layer.
//!
//! Each repository is a zero-sized struct providing async methods that
//! accept `&PgPool` as the first argument.

pub mod alert_record_repo;
pub mod device_repo;
pub mod sample_repo;
pub mod settings_repo;

pub use alert_record_repo::AlertRecordRepo;
pub use device_repo::DeviceRepo;
pub use sample_repo::SampleRepo;
pub use settings_repo::SettingsRepo;
