//! Actuator alarm state.
//!
//! There is one physical actuator, listening on a single topic, no matter how
//! many devices report. Each device keeps its own alarm [`ChannelState`] for
//! debouncing, but the commanded state lives in one [`ActuatorState`] shared
//! by all of them: commands are edge-triggered against it, and an `on` is
//! cleared once `auto_clear_after` has passed since the last fire, whether
//! or not a new aggregate arrives.

use std::time::Duration;

use serde::Serialize;

use crate::thresholds::{elapsed_beyond, ThresholdConfig};
use crate::types::{DeviceId, Timestamp};

/// Payload sent to the actuator topic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ActuatorCommand {
    On,
    Off,
}

impl ActuatorCommand {
    pub fn as_payload(self) -> &'static str {
        match self {
            ActuatorCommand::On => "on",
            ActuatorCommand::Off => "off",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct ActuatorConfig {
    pub alarm: ThresholdConfig,
    pub auto_clear_after: Duration,
}

/// Commanded state of the shared actuator.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ActuatorState {
    last_commanded: Option<ActuatorCommand>,
    /// Device whose fire produced the most recent `on`.
    owner: Option<DeviceId>,
    last_fired_at: Option<Timestamp>,
    /// Auto-clear period captured at the most recent fire.
    auto_clear_after: Duration,
}

impl ActuatorState {
    pub fn last_commanded(&self) -> Option<ActuatorCommand> {
        self.last_commanded
    }

    pub fn owner(&self) -> Option<&str> {
        self.owner.as_deref()
    }

    /// Record one alarm evaluation by `device_id`.
    ///
    /// A fire takes ownership of the actuator and restarts the auto-clear
    /// period; it only yields `On` if the actuator is not already on.
    /// Without a fire this is the auto-clear check.
    pub fn observe(
        &mut self,
        device_id: &str,
        fired: bool,
        auto_clear_after: Duration,
        now: Timestamp,
    ) -> Option<ActuatorCommand> {
        if !fired {
            return self.tick(now);
        }
        self.owner = Some(device_id.to_string());
        self.last_fired_at = Some(now);
        self.auto_clear_after = auto_clear_after;
        self.command(ActuatorCommand::On)
    }

    /// Time-based auto-clear, independent of the evaluator's disarm logic.
    pub fn tick(&mut self, now: Timestamp) -> Option<ActuatorCommand> {
        if self.last_commanded != Some(ActuatorCommand::On) {
            return None;
        }
        if elapsed_beyond(self.last_fired_at, self.auto_clear_after, now) {
            return self.command(ActuatorCommand::Off);
        }
        None
    }

    fn command(&mut self, desired: ActuatorCommand) -> Option<ActuatorCommand> {
        if self.last_commanded == Some(desired) {
            return None;
        }
        self.last_commanded = Some(desired);
        Some(desired)
    }
}
