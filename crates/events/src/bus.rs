//! In-process alert bus backed by a `tokio::sync::broadcast` channel.
//!
//! [`EventBus`] is shared via `Arc<EventBus>` between the monitor, which
//! publishes, and the WebSocket layer, which forwards every event to
//! connected clients.

use chrono::{DateTime, Utc};
use serde::Serialize;
use tokio::sync::broadcast;
use airwatch_core::channels::ChannelKind;
use airwatch_core::types::DeviceId;

// ---------------------------------------------------------------------------
// AlertEvent
// ---------------------------------------------------------------------------

/// Value of [`AlertEvent::event_type`] for threshold alerts.
pub const ALERT_EVENT_TYPE: &str = "alert";

/// An in-app alert pushed to connected clients.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AlertEvent {
    /// Always [`ALERT_EVENT_TYPE`]; lets clients share one socket for
    /// several message kinds.
    pub event_type: &'static str,
    pub device_id: DeviceId,
    pub channel: ChannelKind,
    pub message: String,
    pub metric_value: f64,
    pub timestamp: DateTime<Utc>,
}

impl AlertEvent {
    pub fn new(
        device_id: impl Into<DeviceId>,
        channel: ChannelKind,
        message: impl Into<String>,
        metric_value: f64,
        timestamp: DateTime<Utc>,
    ) -> Self {
        Self {
            event_type: ALERT_EVENT_TYPE,
            device_id: device_id.into(),
            channel,
            message: message.into(),
            metric_value,
            timestamp,
        }
    }
}

// ---------------------------------------------------------------------------
// EventBus
// ---------------------------------------------------------------------------

/// Default buffer capacity for the broadcast channel.
const DEFAULT_CAPACITY: usize = 256;

/// In-process fan-out alert bus.
///
/// ```rust
/// use airwatch_core::channels::ChannelKind;
/// use airwatch_events::bus::{AlertEvent, EventBus};
///
/// let bus = EventBus::default();
/// let mut rx = bus.subscribe();
///
/// bus.publish(AlertEvent::new("attic", ChannelKind::VocSocket, "Open a window.", 320.0, chrono::Utc::now()));
/// ```
pub struct EventBus {
    sender: broadcast::Sender<AlertEvent>,
}

impl EventBus {
    /// Create a bus with a specific channel capacity.
    ///
    /// When the buffer is full, the oldest un-consumed alerts are dropped
    /// and slow receivers observe `RecvError::Lagged`.
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self { sender }
    }

    /// Publish an alert to all current subscribers.
    ///
    /// Returns the number of subscribers that received it. With no
    /// connected clients the alert is dropped and `0` is returned.
    pub fn publish(&self, event: AlertEvent) -> usize {
        self.sender.send(event).unwrap_or(0)
    }

    pub fn subscribe(&self) -> broadcast::Receiver<AlertEvent> {
        self.sender.subscribe()
    }

    pub fn subscriber_count(&self) -> usize {
        self.sender.receiver_count()
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new(DEFAULT_CAPACITY)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn alert(device: &str) -> AlertEvent {
        AlertEvent::new(device, ChannelKind::Temperature, "Temperature exceeded set value.", 31.5, Utc::now())
    }

    #[tokio::test]
    async fn publish_and_receive_single_subscriber() {
        let bus = EventBus::default();
        let mut rx = bus.subscribe();

        assert_eq!(bus.publish(alert("attic")), 1);

        let received = rx.recv().await.expect("should receive the alert");
        assert_eq!(received.event_type, ALERT_EVENT_TYPE);
        assert_eq!(received.device_id, "attic");
        assert_eq!(received.channel, ChannelKind::Temperature);
        assert_eq!(received.metric_value, 31.5);
    }

    #[tokio::test]
    async fn multiple_subscribers_receive_same_alert() {
        let bus = EventBus::default();
        let mut rx1 = bus.subscribe();
        let mut rx2 = bus.subscribe();

        bus.publish(alert("cellar"));

        let e1 = rx1.recv().await.expect("subscriber 1 should receive");
        let e2 = rx2.recv().await.expect("subscriber 2 should receive");
        assert_eq!(e1, e2);
    }

    #[test]
    fn publish_with_no_subscribers_is_dropped() {
        let bus = EventBus::default();
        assert_eq!(bus.subscriber_count(), 0);
        assert_eq!(bus.publish(alert("attic")), 0);
    }

    #[test]
    fn serializes_with_snake_case_channel() {
        let json = serde_json::to_value(alert("attic")).expect("serializable");
        assert_eq!(json["event_type"], "alert");
        assert_eq!(json["channel"], "temperature");
        assert_eq!(json["device_id"], "attic");
        assert_eq!(json["message"], "Temperature exceeded set value.");
    }
}
