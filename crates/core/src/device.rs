//! Per-device channel state machines.
//!
//! [`DeviceChannels`] holds one [`ChannelState`] per channel kind for a
//! single device, created lazily on first evaluation, and turns each batch
//! aggregate into the list of [`Effect`]s the caller should perform.

use std::collections::HashMap;
use std::sync::LazyLock;

use regex::Regex;

use crate::actuator::ActuatorState;
use crate::alert::{voc_email_body, AlertRecord};
use crate::channels::{
    ChannelKind, HUMIDITY_ALERT_MESSAGE, TEMPERATURE_ALERT_MESSAGE, VOC_EMAIL_SUBJECT,
};
use crate::effects::Effect;
use crate::error::CoreError;
use crate::sample_window::Aggregate;
use crate::settings::AlertSettings;
use crate::thresholds::{self, ChannelState};
use crate::types::{DeviceId, Timestamp};

/// Device names are used as storage keys, so they are restricted to
/// lowercase identifiers.
const DEVICE_NAME_PATTERN: &str = r"^[a-z_][a-z0-9_]*$";

static DEVICE_NAME_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(DEVICE_NAME_PATTERN).expect("valid regex"));

/// Validate a device name before it is registered.
pub fn validate_device_name(name: &str) -> Result<(), CoreError> {
    if DEVICE_NAME_RE.is_match(name) {
        Ok(())
    } else {
        Err(CoreError::Validation(format!(
            "device name {name:?} must match {DEVICE_NAME_PATTERN}"
        )))
    }
}

#[derive(Debug, Clone)]
pub struct DeviceChannels {
    device_id: DeviceId,
    states: HashMap<ChannelKind, ChannelState>,
}

impl DeviceChannels {
    pub fn new(device_id: impl Into<DeviceId>) -> Self {
        Self {
            device_id: device_id.into(),
            states: HashMap::new(),
        }
    }

    pub fn device_id(&self) -> &str {
        &self.device_id
    }

    /// Current state of `kind`; the initial state if never evaluated.
    pub fn state(&self, kind: ChannelKind) -> ChannelState {
        self.states.get(&kind).copied().unwrap_or_default()
    }

    /// Evaluate every channel against one aggregate.
    ///
    /// `actuator` is the shared actuator state, passed only while this
    /// device is the selected one. Other devices leave the actuator and
    /// their own alarm channel alone.
    pub fn evaluate(
        &mut self,
        aggregate: &Aggregate,
        settings: &AlertSettings,
        actuator: Option<&mut ActuatorState>,
        now: Timestamp,
    ) -> Vec<Effect> {
        let mut effects = Vec::new();

        for kind in [
            ChannelKind::VocSocket,
            ChannelKind::VocEmail,
            ChannelKind::Temperature,
            ChannelKind::Humidity,
        ] {
            let value = kind.metric_value(aggregate);
            if self.fire(kind, value, settings, now) {
                push_fire_effects(&mut effects, kind, value, settings, now);
            }
        }

        if let Some(actuator) = actuator {
            let kind = ChannelKind::ActuatorAlarm;
            let fired = self.fire(kind, kind.metric_value(aggregate), settings, now);
            let command =
                actuator.observe(&self.device_id, fired, settings.actuator.auto_clear_after, now);
            effects.extend(command.map(|command| Effect::Actuate { command }));
        }

        effects
    }

    /// Reset every channel to its initial state.
    pub fn reset(&mut self) {
        self.states.clear();
    }

    fn fire(
        &mut self,
        kind: ChannelKind,
        value: f64,
        settings: &AlertSettings,
        now: Timestamp,
    ) -> bool {
        let state = self.states.entry(kind).or_default();
        let decision = thresholds::evaluate(value, settings.config_for(kind), state, now);
        *state = decision.state;
        decision.fire
    }
}

fn push_fire_effects(
    effects: &mut Vec<Effect>,
    kind: ChannelKind,
    value: f64,
    settings: &AlertSettings,
    now: Timestamp,
) {
    match kind {
        ChannelKind::VocSocket => {
            effects.push(Effect::EmitAlert {
                channel: kind,
                message: settings.notification_message.clone(),
                metric_value: value,
            });
            effects.push(Effect::PersistAlert {
                channel: kind,
                record: AlertRecord::new(now, settings.notification_message.clone(), value),
            });
        }
        ChannelKind::VocEmail => {
            effects.push(Effect::SendEmail {
                channel: kind,
                recipient: settings.email_recipient.clone(),
                subject: VOC_EMAIL_SUBJECT.to_string(),
                body: voc_email_body(now, value, &settings.notification_message),
            });
            effects.push(Effect::PersistAlert {
                channel: kind,
                record: AlertRecord::email(now, settings.notification_message.clone(), value),
            });
        }
        ChannelKind::Temperature => effects.push(Effect::EmitAlert {
            channel: kind,
            message: TEMPERATURE_ALERT_MESSAGE.to_string(),
            metric_value: value,
        }),
        ChannelKind::Humidity => effects.push(Effect::EmitAlert {
            channel: kind,
            message: HUMIDITY_ALERT_MESSAGE.to_string(),
            metric_value: value,
        }),
        ChannelKind::ActuatorAlarm => {}
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
