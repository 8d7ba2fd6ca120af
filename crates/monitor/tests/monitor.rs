//! End-to-end monitor behavior against in-memory collaborators.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use airwatch_core::actuator::{ActuatorCommand, ActuatorConfig};
use airwatch_core::alert::AlertRecord;
use airwatch_core::channels::{ChannelKind, TEMPERATURE_ALERT_MESSAGE, VOC_EMAIL_SUBJECT};
use airwatch_core::error::CoreError;
use airwatch_core::sample_window::Aggregate;
use airwatch_core::settings::AlertSettings;
use airwatch_core::thresholds::{ChannelState, ThresholdConfig};
use airwatch_core::types::Timestamp;
use airwatch_events::AlertEvent;
use airwatch_monitor::collaborators::{
    ActuatorLink, AlertEmitter, AlertStore, DeviceRegistry, DeviceTopic, Mailer, SampleStore,
    SettingsSource,
};
use airwatch_monitor::mqtt::subscription_topics;
use airwatch_monitor::sweeper::run_auto_clear;
use airwatch_monitor::{Collaborators, Monitor, MonitorError};
use assert_matches::assert_matches;
use async_trait::async_trait;
use chrono::{TimeZone, Utc};
use tokio_util::sync::CancellationToken;

// ---------------------------------------------------------------------------
// Fakes
// ---------------------------------------------------------------------------

#[derive(Default)]
struct Fake {
    devices: Mutex<Vec<DeviceTopic>>,
    selected: Mutex<Option<String>>,
    fail_registry: AtomicBool,
    settings: Mutex<Option<AlertSettings>>,
    fail_settings: AtomicBool,
    fail_alert_store: AtomicBool,
    fail_mailer: AtomicBool,
    records: Mutex<Vec<(String, ChannelKind, AlertRecord)>>,
    samples: Mutex<Vec<Aggregate>>,
    alerts: Mutex<Vec<AlertEvent>>,
    emails: Mutex<Vec<(String, String, String)>>,
    commands: Mutex<Vec<(String, ActuatorCommand)>>,
}

impl Fake {
    fn with_devices(names: &[&str]) -> Arc<Self> {
        let fake = Self::default();
        *fake.devices.lock().unwrap() = names
            .iter()
            .map(|name| DeviceTopic {
                topic: name.to_string(),
                device_id: name.to_string(),
            })
            .collect();
        *fake.settings.lock().unwrap() = Some(test_settings());
        Arc::new(fake)
    }

    fn select(&self, name: Option<&str>) {
        *self.selected.lock().unwrap() = name.map(str::to_string);
    }

    fn records(&self) -> Vec<(String, ChannelKind, AlertRecord)> {
        self.records.lock().unwrap().clone()
    }

    fn alerts(&self) -> Vec<AlertEvent> {
        self.alerts.lock().unwrap().clone()
    }

    fn emails(&self) -> Vec<(String, String, String)> {
        self.emails.lock().unwrap().clone()
    }

    fn commands(&self) -> Vec<(String, ActuatorCommand)> {
        self.commands.lock().unwrap().clone()
    }

    fn samples(&self) -> Vec<Aggregate> {
        self.samples.lock().unwrap().clone()
    }
}

fn unavailable(what: &str) -> MonitorError {
    MonitorError::Unavailable(format!("{what} is down"))
}

#[async_trait]
impl DeviceRegistry for Fake {
    async fn list_device_topics(&self) -> Result<Vec<DeviceTopic>, MonitorError> {
        if self.fail_registry.load(Ordering::SeqCst) {
            return Err(unavailable("device registry"));
        }
        Ok(self.devices.lock().unwrap().clone())
    }

    async fn is_selected_device(&self, device_id: &str) -> Result<bool, MonitorError> {
        Ok(self.selected.lock().unwrap().as_deref() == Some(device_id))
    }
}

#[async_trait]
impl SettingsSource for Fake {
    async fn threshold_config(&self) -> Result<Option<AlertSettings>, MonitorError> {
        if self.fail_settings.load(Ordering::SeqCst) {
            return Err(unavailable("settings store"));
        }
        Ok(self.settings.lock().unwrap().clone())
    }
}

#[async_trait]
impl AlertStore for Fake {
    async fn append_alert_record(
        &self,
        device_id: &str,
        channel: ChannelKind,
        record: &AlertRecord,
    ) -> Result<(), MonitorError> {
        if self.fail_alert_store.load(Ordering::SeqCst) {
            return Err(unavailable("alert store"));
        }
        self.records
            .lock()
            .unwrap()
            .push((device_id.to_string(), channel, record.clone()));
        Ok(())
    }
}

#[async_trait]
impl SampleStore for Fake {
    async fn append_aggregate_sample(&self, aggregate: &Aggregate) -> Result<(), MonitorError> {
        self.samples.lock().unwrap().push(aggregate.clone());
        Ok(())
    }
}

#[async_trait]
impl AlertEmitter for Fake {
    async fn emit_alert(&self, event: AlertEvent) -> Result<(), MonitorError> {
        self.alerts.lock().unwrap().push(event);
        Ok(())
    }
}

#[async_trait]
impl Mailer for Fake {
    async fn send_email(
        &self,
        recipient: &str,
        subject: &str,
        body: &str,
    ) -> Result<(), MonitorError> {
        if self.fail_mailer.load(Ordering::SeqCst) {
            return Err(unavailable("smtp relay"));
        }
        self.emails
            .lock()
            .unwrap()
            .push((recipient.to_string(), subject.to_string(), body.to_string()));
        Ok(())
    }
}

#[async_trait]
impl ActuatorLink for Fake {
    async fn send_actuator_command(
        &self,
        device_id: &str,
        command: ActuatorCommand,
    ) -> Result<(), MonitorError> {
        self.commands
            .lock()
            .unwrap()
            .push((device_id.to_string(), command));
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn test_settings() -> AlertSettings {
    AlertSettings {
        voc_socket: ThresholdConfig::enabled(300.0, Duration::from_secs(300)),
        voc_email: ThresholdConfig::enabled(200.0, Duration::from_secs(7200)),
        temperature: ThresholdConfig::enabled(30.0, Duration::from_secs(300)),
        humidity: ThresholdConfig::enabled(70.0, Duration::from_secs(300)),
        actuator: ActuatorConfig {
            alarm: ThresholdConfig::enabled(300.0, Duration::from_secs(300)),
            auto_clear_after: Duration::from_secs(5),
        },
        notification_message: "Open a window.".to_string(),
        email_recipient: Some("ops@example.com".to_string()),
    }
}

fn collaborators(fake: &Arc<Fake>, with_mailer: bool) -> Collaborators {
    Collaborators {
        registry: fake.clone(),
        settings: fake.clone(),
        alerts: fake.clone(),
        samples: fake.clone(),
        emitter: fake.clone(),
        mailer: with_mailer.then(|| fake.clone() as Arc<dyn Mailer>),
        actuator: fake.clone(),
    }
}

async fn monitor_for(fake: &Arc<Fake>) -> Monitor {
    let monitor = Monitor::new(collaborators(fake, true), 5);
    monitor.load_devices().await.unwrap();
    monitor
}

fn at(secs: i64) -> Timestamp {
    Utc.timestamp_opt(1_700_000_000 + secs, 0).unwrap()
}

/// Send a full window of identical readings; returns the last outcome.
async fn send_window(
    monitor: &Monitor,
    topic: &str,
    temperature: f64,
    humidity: f64,
    voc: i64,
    now: Timestamp,
) -> Option<Aggregate> {
    let payload = format!("{temperature},{humidity},{voc}");
    let mut last = None;
    for _ in 0..5 {
        last = monitor
            .handle_message(topic, payload.as_bytes(), now)
            .await
            .unwrap();
    }
    last
}

async fn window_len(monitor: &Monitor, topic: &str) -> usize {
    let device = monitor.device(topic).await.unwrap();
    let len = device.lock().await.window().len();
    len
}

// ---------------------------------------------------------------------------
// Sample buffering
// ---------------------------------------------------------------------------

#[tokio::test]
async fn nth_message_flushes_exactly_one_aggregate() {
    let fake = Fake::with_devices(&["attic"]);
    let monitor = monitor_for(&fake).await;

    for (i, voc) in [100, 101, 102, 103].into_iter().enumerate() {
        let payload = format!("21.0,40.0,{voc}");
        let outcome = monitor.handle_message("attic", payload.as_bytes(), at(0)).await;
        assert_matches!(outcome, Ok(None));
        assert_eq!(window_len(&monitor, "attic").await, i + 1);
    }

    let aggregate = monitor
        .handle_message("attic", b"22.5,41.0,105", at(1))
        .await
        .unwrap()
        .expect("fifth reading flushes");

    assert_eq!(aggregate.voc, 102);
    assert_eq!(aggregate.temperature, 22.5);
    assert_eq!(aggregate.humidity, 41.0);
    assert_eq!(window_len(&monitor, "attic").await, 0);
    assert_eq!(fake.samples(), vec![aggregate]);
}

#[tokio::test]
async fn malformed_payload_leaves_window_untouched() {
    let fake = Fake::with_devices(&["attic"]);
    let monitor = monitor_for(&fake).await;

    monitor.handle_message("attic", b"21,40,100", at(0)).await.unwrap();
    monitor.handle_message("attic", b"21,40,110", at(0)).await.unwrap();
    let before = {
        let device = monitor.device("attic").await.unwrap();
        let readings = device.lock().await.window().readings().to_vec();
        readings
    };

    let outcome = monitor.handle_message("attic", b"12,34", at(1)).await;
    assert_matches!(outcome, Err(CoreError::MalformedPayload { .. }));

    let outcome = monitor.handle_message("attic", &[0xff, 0xfe, 0x2c], at(1)).await;
    assert_matches!(outcome, Err(CoreError::MalformedPayload { .. }));

    let device = monitor.device("attic").await.unwrap();
    assert_eq!(device.lock().await.window().readings(), before.as_slice());
}

#[tokio::test]
async fn unknown_topic_is_dropped() {
    let fake = Fake::with_devices(&["attic"]);
    let monitor = monitor_for(&fake).await;

    let outcome = monitor.handle_message("cellar", b"21,40,900", at(0)).await;
    assert_matches!(outcome, Err(CoreError::UnknownDevice(topic)) if topic == "cellar");
    assert!(fake.samples().is_empty());
}

#[tokio::test]
async fn devices_flush_independently() {
    let fake = Fake::with_devices(&["attic", "cellar"]);
    let monitor = monitor_for(&fake).await;

    for _ in 0..3 {
        monitor.handle_message("attic", b"21,40,100", at(0)).await.unwrap();
    }
    for _ in 0..4 {
        monitor.handle_message("cellar", b"18,55,120", at(0)).await.unwrap();
    }
    assert_eq!(window_len(&monitor, "attic").await, 3);
    assert_eq!(window_len(&monitor, "cellar").await, 4);

    let flushed = monitor.handle_message("cellar", b"18,55,120", at(0)).await.unwrap();
    assert_eq!(flushed.map(|a| a.device_id), Some("cellar".to_string()));
    assert_eq!(window_len(&monitor, "attic").await, 3);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_messages_serialize_per_device() {
    let fake = Fake::with_devices(&["attic", "cellar"]);
    let monitor = Arc::new(monitor_for(&fake).await);

    let mut tasks = Vec::new();
    for i in 0..20 {
        let monitor = Arc::clone(&monitor);
        let topic = if i % 2 == 0 { "attic" } else { "cellar" };
        tasks.push(tokio::spawn(async move {
            monitor
                .handle_message(topic, b"21,40,100", at(0))
                .await
                .unwrap()
        }));
    }

    let mut flushed = 0;
    for task in tasks {
        if task.await.unwrap().is_some() {
            flushed += 1;
        }
    }

    assert_eq!(flushed, 4);
    assert_eq!(fake.samples().len(), 4);
    assert_eq!(window_len(&monitor, "attic").await, 0);
    assert_eq!(window_len(&monitor, "cellar").await, 0);
}

// ---------------------------------------------------------------------------
// Channels
// ---------------------------------------------------------------------------

#[tokio::test]
async fn email_only_breach_sends_mail_and_prefixed_record() {
    let fake = Fake::with_devices(&["attic"]);
    let monitor = monitor_for(&fake).await;

    send_window(&monitor, "attic", 21.0, 40.0, 250, at(0)).await;

    assert!(fake.alerts().is_empty());
    let emails = fake.emails();
    assert_eq!(emails.len(), 1);
    assert_eq!(emails[0].0, "ops@example.com");
    assert_eq!(emails[0].1, VOC_EMAIL_SUBJECT);
    assert!(emails[0].2.contains("Current VOC level: 250"));

    let records = fake.records();
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].1, ChannelKind::VocEmail);
    assert!(records[0].2.is_email());
}

#[tokio::test]
async fn socket_alert_is_debounced_until_disarmed() {
    let fake = Fake::with_devices(&["attic"]);
    let monitor = monitor_for(&fake).await;

    send_window(&monitor, "attic", 21.0, 40.0, 350, at(0)).await;
    send_window(&monitor, "attic", 21.0, 40.0, 360, at(100)).await;
    send_window(&monitor, "attic", 21.0, 40.0, 150, at(200)).await;
    send_window(&monitor, "attic", 21.0, 40.0, 350, at(201)).await;

    let socket: Vec<_> = fake
        .alerts()
        .into_iter()
        .filter(|a| a.channel == ChannelKind::VocSocket)
        .collect();
    assert_eq!(socket.len(), 2);
    assert_eq!(socket[0].timestamp, at(0));
    assert_eq!(socket[1].timestamp, at(201));
    assert!(socket.iter().all(|a| a.message == "Open a window." && a.device_id == "attic"));
}

#[tokio::test]
async fn temperature_alert_uses_fixed_message() {
    let fake = Fake::with_devices(&["attic"]);
    let monitor = monitor_for(&fake).await;

    send_window(&monitor, "attic", 31.5, 40.0, 100, at(0)).await;

    let alerts = fake.alerts();
    assert_eq!(alerts.len(), 1);
    assert_eq!(alerts[0].channel, ChannelKind::Temperature);
    assert_eq!(alerts[0].message, TEMPERATURE_ALERT_MESSAGE);
    assert!(fake.records().is_empty());
}

#[tokio::test]
async fn failures_are_isolated_per_channel() {
    let fake = Fake::with_devices(&["attic"]);
    fake.fail_alert_store.store(true, Ordering::SeqCst);
    fake.fail_mailer.store(true, Ordering::SeqCst);
    let monitor = monitor_for(&fake).await;

    let aggregate = send_window(&monitor, "attic", 35.0, 80.0, 400, at(0)).await;
    assert!(aggregate.is_some());

    let channels: Vec<_> = fake.alerts().iter().map(|a| a.channel).collect();
    assert_eq!(
        channels,
        vec![
            ChannelKind::VocSocket,
            ChannelKind::Temperature,
            ChannelKind::Humidity
        ]
    );
    assert!(fake.records().is_empty());
    assert!(fake.emails().is_empty());

    // Later messages are still processed.
    fake.fail_alert_store.store(false, Ordering::SeqCst);
    assert_matches!(
        monitor.handle_message("attic", b"21,40,100", at(1)).await,
        Ok(None)
    );
}

#[tokio::test]
async fn missing_recipient_still_records_email_fire() {
    let fake = Fake::with_devices(&["attic"]);
    *fake.settings.lock().unwrap() = Some(AlertSettings {
        email_recipient: None,
        ..test_settings()
    });
    let monitor = monitor_for(&fake).await;

    send_window(&monitor, "attic", 21.0, 40.0, 250, at(0)).await;

    assert!(fake.emails().is_empty());
    assert_eq!(fake.records().len(), 1);
}

#[tokio::test]
async fn unconfigured_mailer_still_records_email_fire() {
    let fake = Fake::with_devices(&["attic"]);
    let monitor = Monitor::new(collaborators(&fake, false), 5);
    monitor.load_devices().await.unwrap();

    send_window(&monitor, "attic", 21.0, 40.0, 250, at(0)).await;

    assert!(fake.emails().is_empty());
    assert_eq!(fake.records().len(), 1);
}

#[tokio::test]
async fn missing_or_unreadable_settings_disable_every_channel() {
    let fake = Fake::with_devices(&["attic"]);
    fake.select(Some("attic"));
    *fake.settings.lock().unwrap() = None;
    let monitor = monitor_for(&fake).await;

    send_window(&monitor, "attic", 99.0, 99.0, 9_999, at(0)).await;

    fake.fail_settings.store(true, Ordering::SeqCst);
    send_window(&monitor, "attic", 99.0, 99.0, 9_999, at(10)).await;

    assert!(fake.alerts().is_empty());
    assert!(fake.emails().is_empty());
    assert!(fake.records().is_empty());
    assert!(fake.commands().is_empty());
    assert_eq!(fake.samples().len(), 2);
}

#[tokio::test]
async fn settings_are_read_fresh_for_every_batch() {
    let fake = Fake::with_devices(&["attic"]);
    let monitor = monitor_for(&fake).await;

    send_window(&monitor, "attic", 21.0, 40.0, 150, at(0)).await;
    assert!(fake.emails().is_empty());

    *fake.settings.lock().unwrap() = Some(AlertSettings {
        voc_email: ThresholdConfig::enabled(100.0, Duration::from_secs(7200)),
        ..test_settings()
    });
    send_window(&monitor, "attic", 21.0, 40.0, 150, at(10)).await;
    assert_eq!(fake.emails().len(), 1);
}

// ---------------------------------------------------------------------------
// Actuator
// ---------------------------------------------------------------------------

#[tokio::test]
async fn actuator_follows_selected_device() {
    let fake = Fake::with_devices(&["attic", "cellar"]);
    fake.select(Some("attic"));
    let monitor = monitor_for(&fake).await;

    send_window(&monitor, "attic", 21.0, 40.0, 400, at(0)).await;
    send_window(&monitor, "cellar", 21.0, 40.0, 400, at(0)).await;
    assert_eq!(
        fake.commands(),
        vec![("attic".to_string(), ActuatorCommand::On)]
    );

    fake.select(Some("cellar"));
    send_window(&monitor, "attic", 21.0, 40.0, 100, at(1)).await;
    send_window(&monitor, "attic", 21.0, 40.0, 400, at(2)).await;
    send_window(&monitor, "cellar", 21.0, 40.0, 100, at(3)).await;
    send_window(&monitor, "cellar", 21.0, 40.0, 400, at(4)).await;

    // Already on: the new owner takes over without a second `on`.
    assert_eq!(
        fake.commands(),
        vec![("attic".to_string(), ActuatorCommand::On)]
    );
    assert_eq!(monitor.actuator().await.owner(), Some("cellar"));
}

#[tokio::test]
async fn selection_handover_sends_one_on_and_one_off() {
    let fake = Fake::with_devices(&["attic", "cellar"]);
    fake.select(Some("attic"));
    let monitor = monitor_for(&fake).await;

    send_window(&monitor, "attic", 21.0, 40.0, 400, at(0)).await;
    fake.select(Some("cellar"));
    send_window(&monitor, "cellar", 21.0, 40.0, 400, at(3)).await;

    let mut cleared_at = Vec::new();
    for t in 4..=10 {
        if monitor.sweep(at(t)).await > 0 {
            cleared_at.push(t);
        }
    }

    // The `off` follows the newest fire (t=3), not the handed-over one.
    assert_eq!(cleared_at, vec![9]);
    assert_eq!(
        fake.commands(),
        vec![
            ("attic".to_string(), ActuatorCommand::On),
            ("cellar".to_string(), ActuatorCommand::Off),
        ]
    );
}

#[tokio::test]
async fn sweep_turns_actuator_off_once() {
    let fake = Fake::with_devices(&["attic"]);
    fake.select(Some("attic"));
    let monitor = monitor_for(&fake).await;

    send_window(&monitor, "attic", 21.0, 40.0, 400, at(0)).await;

    assert_eq!(monitor.sweep(at(3)).await, 0);
    assert_eq!(monitor.sweep(at(6)).await, 1);
    assert_eq!(monitor.sweep(at(7)).await, 0);

    assert_eq!(
        fake.commands(),
        vec![
            ("attic".to_string(), ActuatorCommand::On),
            ("attic".to_string(), ActuatorCommand::Off),
        ]
    );
}

#[tokio::test]
async fn auto_clear_loop_stops_on_cancel() {
    let fake = Fake::with_devices(&["attic"]);
    let monitor = Arc::new(monitor_for(&fake).await);
    let cancel = CancellationToken::new();

    let handle = tokio::spawn(run_auto_clear(
        Arc::clone(&monitor),
        Duration::from_millis(10),
        cancel.clone(),
    ));
    tokio::time::sleep(Duration::from_millis(30)).await;
    cancel.cancel();

    tokio::time::timeout(Duration::from_secs(1), handle)
        .await
        .expect("loop exits after cancel")
        .unwrap();
    assert!(fake.commands().is_empty());
}

// ---------------------------------------------------------------------------
// Device lifecycle
// ---------------------------------------------------------------------------

#[tokio::test]
async fn reload_keeps_state_for_registered_devices() {
    let fake = Fake::with_devices(&["attic", "cellar"]);
    let monitor = monitor_for(&fake).await;
    monitor.handle_message("attic", b"21,40,100", at(0)).await.unwrap();

    fake.devices.lock().unwrap().retain(|d| d.topic == "attic");
    let topics = monitor.load_devices().await.unwrap();

    assert_eq!(topics, vec!["attic".to_string()]);
    assert_eq!(window_len(&monitor, "attic").await, 1);
    assert!(monitor.device("cellar").await.is_none());
}

#[tokio::test]
async fn removing_a_device_drops_its_state() {
    let fake = Fake::with_devices(&["attic"]);
    fake.select(Some("attic"));
    let monitor = monitor_for(&fake).await;

    send_window(&monitor, "attic", 21.0, 40.0, 400, at(0)).await;
    monitor.handle_message("attic", b"21,40,100", at(1)).await.unwrap();

    assert!(monitor.remove_device("attic").await);
    assert!(!monitor.remove_device("attic").await);
    assert_matches!(
        monitor.handle_message("attic", b"21,40,100", at(2)).await,
        Err(CoreError::UnknownDevice(_))
    );

    monitor.add_device("attic", "attic").await.unwrap();
    let device = monitor.device("attic").await.unwrap();
    let device = device.lock().await;
    assert!(device.window().is_empty());
    assert_eq!(
        device.channels().state(ChannelKind::ActuatorAlarm),
        ChannelState::default()
    );
}

#[tokio::test]
async fn reconnect_topics_follow_registry() {
    let fake = Fake::with_devices(&["cellar", "attic"]);
    let monitor = Monitor::new(collaborators(&fake, true), 5);

    assert_eq!(
        subscription_topics(&monitor).await,
        vec!["attic".to_string(), "cellar".to_string()]
    );

    fake.devices.lock().unwrap().retain(|d| d.topic == "attic");
    assert_eq!(subscription_topics(&monitor).await, vec!["attic".to_string()]);
}

#[tokio::test]
async fn reconnect_keeps_previous_topics_when_registry_is_down() {
    let fake = Fake::with_devices(&["attic", "cellar"]);
    let monitor = monitor_for(&fake).await;
    monitor.handle_message("attic", b"21,40,100", at(0)).await.unwrap();

    fake.fail_registry.store(true, Ordering::SeqCst);
    fake.devices.lock().unwrap().clear();

    assert_eq!(
        subscription_topics(&monitor).await,
        vec!["attic".to_string(), "cellar".to_string()]
    );
    assert_eq!(window_len(&monitor, "attic").await, 1);
}

#[tokio::test]
async fn add_device_validates_name() {
    let fake = Fake::with_devices(&[]);
    let monitor = monitor_for(&fake).await;

    assert_matches!(
        monitor.add_device("Living Room", "Living Room").await,
        Err(MonitorError::Core(CoreError::Validation(_)))
    );
    assert!(monitor.topics().await.is_empty());
}
