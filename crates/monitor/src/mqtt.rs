//! MQTT transport: the ingest loop and the actuator link.

use std::sync::Arc;

use airwatch_core::actuator::ActuatorCommand;
use async_trait::async_trait;
use chrono::Utc;
use rumqttc::{AsyncClient, Event, EventLoop, Packet, QoS, SubscribeFilter};
use tokio_util::sync::CancellationToken;

use crate::collaborators::ActuatorLink;
use crate::config::MonitorConfig;
use crate::error::MonitorError;
use crate::monitor::Monitor;
use crate::reconnect::{next_delay, ReconnectConfig};

/// Capacity of the client request channel.
const REQUEST_CAPACITY: usize = 64;

/// Create the client and its (not yet connected) event loop.
pub fn connect(config: &MonitorConfig) -> (AsyncClient, EventLoop) {
    AsyncClient::new(config.mqtt_options(), REQUEST_CAPACITY)
}

// ---------------------------------------------------------------------------
// Ingest loop
// ---------------------------------------------------------------------------

/// Drive the event loop until `cancel` fires.
///
/// Every publish is handed to the monitor on its own task so slow side
/// effects never hold up the loop. Every `ConnAck` reloads the device list
/// and re-subscribes. Connection errors are retried forever, waiting the
/// reconnect delay between attempts.
pub async fn run_ingest(
    monitor: Arc<Monitor>,
    client: AsyncClient,
    mut eventloop: EventLoop,
    reconnect: ReconnectConfig,
    cancel: CancellationToken,
) {
    let mut delay = reconnect.initial_delay;

    loop {
        tokio::select! {
            _ = cancel.cancelled() => {
                tracing::info!("MQTT ingest cancelled");
                break;
            }
            event = eventloop.poll() => match event {
                Ok(Event::Incoming(Packet::Publish(publish))) => {
                    let monitor = Arc::clone(&monitor);
                    tokio::spawn(async move {
                        // Outcome is already logged by the monitor.
                        let _ = monitor
                            .handle_message(&publish.topic, &publish.payload, Utc::now())
                            .await;
                    });
                }
                Ok(Event::Incoming(Packet::ConnAck(_))) => {
                    tracing::info!("MQTT connected");
                    delay = reconnect.initial_delay;
                    resubscribe(&monitor, &client).await;
                }
                Ok(Event::Incoming(Packet::Disconnect)) => {
                    tracing::warn!("MQTT broker sent disconnect");
                }
                Ok(_) => {}
                Err(e) => {
                    tracing::error!(
                        error = %e,
                        retry_in_secs = delay.as_secs(),
                        "MQTT connection error",
                    );
                    tokio::select! {
                        _ = cancel.cancelled() => break,
                        _ = tokio::time::sleep(delay) => {}
                    }
                    delay = next_delay(delay, &reconnect);
                }
            }
        }
    }

    if let Err(e) = client.try_disconnect() {
        tracing::debug!(error = %e, "MQTT disconnect request not sent");
    }
}

/// Topics to subscribe to after a (re)connect.
///
/// Reloads the device list; if the registry cannot be read, the previously
/// loaded topics are used instead.
pub async fn subscription_topics(monitor: &Monitor) -> Vec<String> {
    match monitor.load_devices().await {
        Ok(topics) => topics,
        Err(e) => {
            tracing::error!(error = %e, "Failed to load devices, keeping previous topics");
            monitor.topics().await
        }
    }
}

/// Subscribe to every device topic.
async fn resubscribe(monitor: &Monitor, client: &AsyncClient) {
    let topics = subscription_topics(monitor).await;

    if topics.is_empty() {
        tracing::warn!("No devices registered, nothing to subscribe to");
        return;
    }

    let count = topics.len();
    let filters = topics
        .into_iter()
        .map(|topic| SubscribeFilter::new(topic, QoS::AtMostOnce));

    // The event loop is not being polled while we are here, so never await
    // on the request channel.
    match client.try_subscribe_many(filters) {
        Ok(()) => tracing::info!(count, "Subscribed to device topics"),
        Err(e) => tracing::error!(error = %e, "Failed to subscribe to device topics"),
    }
}

// ---------------------------------------------------------------------------
// Actuator link
// ---------------------------------------------------------------------------

/// Publishes actuator commands to a fixed topic.
pub struct MqttActuator {
    client: AsyncClient,
    topic: String,
}

impl MqttActuator {
    pub fn new(client: AsyncClient, topic: impl Into<String>) -> Self {
        Self {
            client,
            topic: topic.into(),
        }
    }
}

#[async_trait]
impl ActuatorLink for MqttActuator {
    async fn send_actuator_command(
        &self,
        device_id: &str,
        command: ActuatorCommand,
    ) -> Result<(), MonitorError> {
        self.client
            .publish(&self.topic, QoS::AtMostOnce, false, command.as_payload())
            .await?;
        tracing::debug!(
            device = %device_id,
            topic = %self.topic,
            command = command.as_payload(),
            "Actuator command published",
        );
        Ok(())
    }
}
