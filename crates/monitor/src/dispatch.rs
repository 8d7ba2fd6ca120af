//! Performs the effects returned by a device evaluation.
//!
//! Each effect is attempted on its own: a failure is logged with the channel
//! that requested it and the remaining effects still run.

use airwatch_core::effects::Effect;
use airwatch_core::sample_window::Aggregate;
use airwatch_core::types::Timestamp;
use airwatch_events::AlertEvent;

use crate::collaborators::Collaborators;
use crate::error::MonitorError;

/// Outcome of dispatching one batch of effects.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct DispatchReport {
    pub succeeded: usize,
    pub failed: usize,
}

/// Store a flushed aggregate. Failures are logged, never returned.
pub async fn persist_sample(collaborators: &Collaborators, aggregate: &Aggregate) -> bool {
    match collaborators.samples.append_aggregate_sample(aggregate).await {
        Ok(()) => true,
        Err(e) => {
            tracing::error!(
                device = %aggregate.device_id,
                error = %e,
                "Failed to persist aggregate sample",
            );
            false
        }
    }
}

/// Perform every effect in order, isolating failures.
pub async fn dispatch_effects(
    collaborators: &Collaborators,
    device_id: &str,
    effects: Vec<Effect>,
    now: Timestamp,
) -> DispatchReport {
    let mut report = DispatchReport::default();

    for effect in effects {
        let channel = effect.channel();
        let name = effect.name();
        match perform(collaborators, device_id, effect, now).await {
            Ok(()) => report.succeeded += 1,
            Err(e) => {
                report.failed += 1;
                tracing::error!(
                    device = %device_id,
                    channel = channel.as_str(),
                    effect = name,
                    error = %e,
                    "Alert side effect failed",
                );
            }
        }
    }

    report
}

async fn perform(
    collaborators: &Collaborators,
    device_id: &str,
    effect: Effect,
    now: Timestamp,
) -> Result<(), MonitorError> {
    match effect {
        Effect::EmitAlert {
            channel,
            message,
            metric_value,
        } => {
            tracing::info!(
                device = %device_id,
                channel = channel.as_str(),
                metric_value,
                "Alert fired",
            );
            collaborators
                .emitter
                .emit_alert(AlertEvent::new(device_id, channel, message, metric_value, now))
                .await
        }
        Effect::SendEmail {
            recipient,
            subject,
            body,
            ..
        } => {
            let recipient = recipient.ok_or(MonitorError::MissingRecipient)?;
            let mailer = collaborators
                .mailer
                .as_ref()
                .ok_or(MonitorError::MailerUnavailable)?;
            tracing::info!(device = %device_id, to = %recipient, "Sending VOC warning email");
            mailer.send_email(&recipient, &subject, &body).await
        }
        Effect::PersistAlert { channel, record } => {
            collaborators
                .alerts
                .append_alert_record(device_id, channel, &record)
                .await
        }
        Effect::Actuate { command } => {
            tracing::info!(device = %device_id, command = command.as_payload(), "Actuator command");
            collaborators
                .actuator
                .send_actuator_command(device_id, command)
                .await
        }
    }
}
