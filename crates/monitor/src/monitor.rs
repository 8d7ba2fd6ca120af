//! Per-device ingestion and evaluation.

use std::collections::HashMap;
use std::sync::Arc;

use airwatch_core::actuator::ActuatorState;
use airwatch_core::device::validate_device_name;
use airwatch_core::effects::Effect;
use airwatch_core::error::CoreError;
use airwatch_core::sample_window::Aggregate;
use airwatch_core::settings::AlertSettings;
use airwatch_core::types::{DeviceId, Timestamp};
use tokio::sync::{Mutex, RwLock};

use crate::collaborators::{Collaborators, DeviceTopic};
use crate::device::DeviceMonitor;
use crate::dispatch::{dispatch_effects, persist_sample};
use crate::error::MonitorError;

type DeviceHandle = Arc<Mutex<DeviceMonitor>>;

// ---------------------------------------------------------------------------
// Monitor
// ---------------------------------------------------------------------------

/// Routes raw messages to per-device state and performs the resulting
/// effects.
///
/// Each device sits behind its own [`Mutex`], so two messages for the same
/// device are processed one at a time while different devices never wait on
/// each other. The topic map itself is only write-locked when devices are
/// added or removed.
///
/// All devices share one physical actuator, so its commanded state is held
/// once here rather than per device. Lock order is device, then actuator.
pub struct Monitor {
    collaborators: Collaborators,
    window_size: usize,
    devices: RwLock<HashMap<String, DeviceHandle>>,
    actuator: Mutex<ActuatorState>,
}

impl Monitor {
    pub fn new(collaborators: Collaborators, window_size: usize) -> Self {
        Self {
            collaborators,
            window_size: window_size.max(1),
            devices: RwLock::new(HashMap::new()),
            actuator: Mutex::new(ActuatorState::default()),
        }
    }

    /// Replace the topic map with the registry's device list.
    ///
    /// Devices that are still registered keep their window and channel
    /// states; devices that disappeared are dropped. Returns the topics to
    /// subscribe to.
    pub async fn load_devices(&self) -> Result<Vec<String>, MonitorError> {
        let listed = self.collaborators.registry.list_device_topics().await?;

        let mut devices = self.devices.write().await;
        let mut next = HashMap::with_capacity(listed.len());
        for DeviceTopic { topic, device_id } in listed {
            let handle = match devices.get(&topic) {
                Some(existing) => Arc::clone(existing),
                None => Arc::new(Mutex::new(DeviceMonitor::new(device_id, self.window_size)?)),
            };
            next.insert(topic, handle);
        }

        for dropped in devices.keys().filter(|topic| !next.contains_key(*topic)) {
            tracing::info!(topic = %dropped, "Device no longer registered, dropping state");
        }
        *devices = next;

        let mut topics: Vec<String> = devices.keys().cloned().collect();
        topics.sort();
        tracing::info!(count = topics.len(), "Loaded devices");
        Ok(topics)
    }

    /// Start tracking a device. Re-adding a known topic keeps its state.
    pub async fn add_device(
        &self,
        topic: impl Into<String>,
        device_id: impl Into<DeviceId>,
    ) -> Result<(), MonitorError> {
        let device_id = device_id.into();
        validate_device_name(&device_id)?;

        let mut devices = self.devices.write().await;
        let topic = topic.into();
        if !devices.contains_key(&topic) {
            let handle = Arc::new(Mutex::new(DeviceMonitor::new(device_id, self.window_size)?));
            tracing::info!(topic = %topic, "Device added");
            devices.insert(topic, handle);
        }
        Ok(())
    }

    /// Stop tracking a device, dropping its window and channel states.
    pub async fn remove_device(&self, topic: &str) -> bool {
        let removed = self.devices.write().await.remove(topic).is_some();
        if removed {
            tracing::info!(topic, "Device removed");
        }
        removed
    }

    /// Currently tracked topics, sorted.
    pub async fn topics(&self) -> Vec<String> {
        let mut topics: Vec<String> = self.devices.read().await.keys().cloned().collect();
        topics.sort();
        topics
    }

    /// Shared handle to one device's state.
    pub async fn device(&self, topic: &str) -> Option<Arc<Mutex<DeviceMonitor>>> {
        self.devices.read().await.get(topic).cloned()
    }

    /// Process one inbound message.
    ///
    /// Unknown topics and malformed payloads are logged and returned as
    /// errors without touching any state. When the message completes a
    /// window, the aggregate is evaluated against freshly read settings and
    /// the resulting effects are performed after the device lock has been
    /// released. Effect failures are logged and never returned.
    pub async fn handle_message(
        &self,
        topic: &str,
        payload: &[u8],
        now: Timestamp,
    ) -> Result<Option<Aggregate>, CoreError> {
        let Some(handle) = self.device(topic).await else {
            tracing::warn!(topic, "Message on unknown topic, dropping");
            return Err(CoreError::UnknownDevice(topic.to_string()));
        };

        let payload = match std::str::from_utf8(payload) {
            Ok(text) => text,
            Err(e) => {
                let err = CoreError::MalformedPayload {
                    payload: String::from_utf8_lossy(payload).into_owned(),
                    reason: e.to_string(),
                };
                tracing::warn!(topic, error = %err, "Dropping payload");
                return Err(err);
            }
        };

        let mut device = handle.lock().await;
        let aggregate = match device.ingest(payload, now) {
            Ok(Some(aggregate)) => aggregate,
            Ok(None) => {
                tracing::debug!(topic, buffered = device.window().len(), "Reading buffered");
                return Ok(None);
            }
            Err(e) => {
                tracing::warn!(topic, error = %e, "Dropping payload");
                return Err(e);
            }
        };

        let device_id = device.device_id().to_string();
        let settings = self.read_settings().await;
        let is_selected = self.read_selection(&device_id).await;
        let effects = if is_selected {
            let mut actuator = self.actuator.lock().await;
            device.evaluate(&aggregate, &settings, Some(&mut *actuator), now)
        } else {
            device.evaluate(&aggregate, &settings, None, now)
        };
        drop(device);

        tracing::debug!(
            device = %device_id,
            voc = aggregate.voc,
            temperature = aggregate.temperature,
            humidity = aggregate.humidity,
            effects = effects.len(),
            "Window flushed",
        );

        persist_sample(&self.collaborators, &aggregate).await;
        dispatch_effects(&self.collaborators, &device_id, effects, now).await;

        Ok(Some(aggregate))
    }

    /// Current commanded state of the shared actuator.
    pub async fn actuator(&self) -> ActuatorState {
        self.actuator.lock().await.clone()
    }

    /// Run the actuator auto-clear check.
    ///
    /// Returns the number of `off` commands issued (zero or one). The
    /// command is attributed to the device that owns the current `on`.
    pub async fn sweep(&self, now: Timestamp) -> usize {
        let (owner, command) = {
            let mut actuator = self.actuator.lock().await;
            let command = actuator.tick(now);
            (actuator.owner().unwrap_or_default().to_string(), command)
        };
        let Some(command) = command else {
            return 0;
        };
        let effects = vec![Effect::Actuate { command }];
        dispatch_effects(&self.collaborators, &owner, effects, now).await;
        1
    }

    async fn read_settings(&self) -> AlertSettings {
        match self.collaborators.settings.threshold_config().await {
            Ok(Some(settings)) => settings,
            Ok(None) => {
                tracing::warn!("No alert settings stored, all channels disabled");
                AlertSettings::default()
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to read alert settings, all channels disabled");
                AlertSettings::default()
            }
        }
    }

    async fn read_selection(&self, device_id: &str) -> bool {
        match self
            .collaborators
            .registry
            .is_selected_device(device_id)
            .await
        {
            Ok(selected) => selected,
            Err(e) => {
                tracing::error!(device = %device_id, error = %e, "Failed to read selected device");
                false
            }
        }
    }
}
