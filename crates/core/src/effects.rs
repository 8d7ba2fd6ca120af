//! Side effects requested by the channel state machines.

use crate::actuator::ActuatorCommand;
use crate::alert::AlertRecord;
use crate::channels::ChannelKind;

/// One side effect to perform after a batch has been evaluated.
///
/// Effects are independent: a failure performing one must not prevent the
/// others from being attempted.
#[derive(Debug, Clone, PartialEq)]
pub enum Effect {
    /// Push an in-app alert.
    EmitAlert {
        channel: ChannelKind,
        message: String,
        metric_value: f64,
    },
    /// Send an email. `recipient` is `None` when no address is configured.
    SendEmail {
        channel: ChannelKind,
        recipient: Option<String>,
        subject: String,
        body: String,
    },
    /// Append an alert record to the store.
    PersistAlert {
        channel: ChannelKind,
        record: AlertRecord,
    },
    /// Switch the remote actuator.
    Actuate { command: ActuatorCommand },
}

impl Effect {
    /// The channel that requested this effect.
    pub fn channel(&self) -> ChannelKind {
        match self {
            Effect::EmitAlert { channel, .. }
            | Effect::SendEmail { channel, .. }
            | Effect::PersistAlert { channel, .. } => *channel,
            Effect::Actuate { .. } => ChannelKind::ActuatorAlarm,
        }
    }

    /// Short name used in logs.
    pub fn name(&self) -> &'static str {
        match self {
            Effect::EmitAlert { .. } => "emit_alert",
            Effect::SendEmail { .. } => "send_email",
            Effect::PersistAlert { .. } => "persist_alert",
            Effect::Actuate { .. } => "actuate",
        }
    }
}
