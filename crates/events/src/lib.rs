//! Airwatch alert fan-out.
//!
//! - [`EventBus`]: in-process publish/subscribe hub for in-app
//!   [`AlertEvent`]s, backed by `tokio::sync::broadcast`.
//! - [`delivery`]: outbound email delivery over SMTP.

pub mod bus;
pub mod delivery;

pub use bus::{AlertEvent, EventBus};
pub use delivery::email::{EmailConfig, EmailDelivery, EmailError};
