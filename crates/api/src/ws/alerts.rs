use std::sync::Arc;

use airwatch_events::AlertEvent;
use axum::extract::ws::Message;
use tokio::sync::broadcast;

use crate::ws::manager::WsManager;

/// Forward every alert from the event bus to all connected clients.
///
/// Exits when the bus is dropped.
pub async fn forward_alerts(
    ws_manager: Arc<WsManager>,
    mut receiver: broadcast::Receiver<AlertEvent>,
) {
    loop {
        match receiver.recv().await {
            Ok(event) => {
                let text = match serde_json::to_string(&event) {
                    Ok(text) => text,
                    Err(e) => {
                        tracing::error!(error = %e, "Failed to serialize alert");
                        continue;
                    }
                };
                let delivered = ws_manager.broadcast(Message::Text(text.into())).await;
                tracing::debug!(device = %event.device_id, delivered, "Alert forwarded");
            }
            Err(broadcast::error::RecvError::Lagged(n)) => {
                tracing::warn!(skipped = n, "Alert forwarder lagged");
            }
            Err(broadcast::error::RecvError::Closed) => {
                tracing::info!("Event bus closed, alert forwarder shutting down");
                break;
            }
        }
    }
}
