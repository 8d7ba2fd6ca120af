//! Periodic actuator auto-clear.

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use tokio_util::sync::CancellationToken;

use crate::monitor::Monitor;

/// Call [`Monitor::sweep`] every `period` until `cancel` fires.
///
/// This is what turns the actuator off when a device stops reporting
/// after an alarm.
pub async fn run_auto_clear(monitor: Arc<Monitor>, period: Duration, cancel: CancellationToken) {
    let mut interval = tokio::time::interval(period);
    interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);

    loop {
        tokio::select! {
            _ = cancel.cancelled() => {
                tracing::info!("Actuator auto-clear cancelled");
                break;
            }
            _ = interval.tick() => {
                let cleared = monitor.sweep(Utc::now()).await;
                if cleared > 0 {
                    tracing::info!(cleared, "Actuator auto-cleared");
                }
            }
        }
    }
}
