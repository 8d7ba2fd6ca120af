//! Alert push over WebSocket.
//!
//! Clients connect to `/ws/alerts`; every [`AlertEvent`](airwatch_events::AlertEvent)
//! published on the event bus is forwarded to all of them as a JSON text
//! frame.

mod alerts;
mod handler;
mod heartbeat;
pub mod manager;

pub use alerts::forward_alerts;
pub use handler::ws_handler;
pub use heartbeat::start_heartbeat;
pub use manager::WsManager;
