//! Mutable state for a single device.

use airwatch_core::actuator::ActuatorState;
use airwatch_core::device::DeviceChannels;
use airwatch_core::effects::Effect;
use airwatch_core::error::CoreError;
use airwatch_core::sample_window::{Aggregate, SampleWindow};
use airwatch_core::settings::AlertSettings;
use airwatch_core::types::{DeviceId, Timestamp};

/// One device's sample window and channel states.
///
/// The monitor keeps each behind its own mutex; nothing here is shared
/// between devices.
#[derive(Debug)]
pub struct DeviceMonitor {
    window: SampleWindow,
    channels: DeviceChannels,
}

impl DeviceMonitor {
    pub fn new(device_id: impl Into<DeviceId>, window_size: usize) -> Result<Self, CoreError> {
        let device_id = device_id.into();
        Ok(Self {
            window: SampleWindow::new(device_id.clone(), window_size)?,
            channels: DeviceChannels::new(device_id),
        })
    }

    pub fn device_id(&self) -> &str {
        self.window.device_id()
    }

    pub fn window(&self) -> &SampleWindow {
        &self.window
    }

    pub fn channels(&self) -> &DeviceChannels {
        &self.channels
    }

    /// Parse and append one raw payload. A malformed payload leaves the
    /// window untouched.
    pub fn ingest(&mut self, payload: &str, now: Timestamp) -> Result<Option<Aggregate>, CoreError> {
        self.window.push_raw(payload, now)
    }

    pub fn evaluate(
        &mut self,
        aggregate: &Aggregate,
        settings: &AlertSettings,
        actuator: Option<&mut ActuatorState>,
        now: Timestamp,
    ) -> Vec<Effect> {
        self.channels.evaluate(aggregate, settings, actuator, now)
    }
}
