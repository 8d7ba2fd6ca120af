//! In-app alerts over the event bus, and SMTP email.

use std::sync::Arc;

use airwatch_events::{AlertEvent, EmailDelivery, EventBus};
use async_trait::async_trait;

use super::{AlertEmitter, Mailer};
use crate::error::MonitorError;

/// Publishes alerts on the shared [`EventBus`].
pub struct BusEmitter {
    bus: Arc<EventBus>,
}

impl BusEmitter {
    pub fn new(bus: Arc<EventBus>) -> Self {
        Self { bus }
    }
}

#[async_trait]
impl AlertEmitter for BusEmitter {
    async fn emit_alert(&self, event: AlertEvent) -> Result<(), MonitorError> {
        let receivers = self.bus.publish(event);
        if receivers == 0 {
            tracing::debug!("No alert subscribers connected");
        }
        Ok(())
    }
}

#[async_trait]
impl Mailer for EmailDelivery {
    async fn send_email(
        &self,
        recipient: &str,
        subject: &str,
        body: &str,
    ) -> Result<(), MonitorError> {
        self.send(recipient, subject, body).await?;
        Ok(())
    }
}
