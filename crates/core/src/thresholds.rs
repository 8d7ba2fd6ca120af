//! Threshold evaluation for a single alert channel.
//!
//! Pure logic: the caller supplies the metric value, the channel's
//! configuration, its previous state and the current time, and receives a
//! fire/no-fire decision together with the next state. Every channel kind
//! uses this same function.

use std::time::Duration;

use crate::types::Timestamp;

/// Threshold settings for one channel.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ThresholdConfig {
    pub enabled: bool,
    /// The channel breaches when the value is strictly greater than this.
    pub threshold: f64,
    /// Minimum time between repeated fires while the channel stays armed.
    pub cooldown: Duration,
}

impl ThresholdConfig {
    /// A disabled channel. Never fires.
    pub const DISABLED: Self = Self {
        enabled: false,
        threshold: 0.0,
        cooldown: Duration::ZERO,
    };

    /// An enabled channel with the given threshold and cooldown.
    pub fn enabled(threshold: f64, cooldown: Duration) -> Self {
        Self {
            enabled: true,
            threshold,
            cooldown,
        }
    }
}

impl Default for ThresholdConfig {
    fn default() -> Self {
        Self::DISABLED
    }
}

/// Debounce state for one (device, channel) pair.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ChannelState {
    /// Set on fire, cleared by any sample at or below the threshold.
    pub armed: bool,
    pub last_fired_at: Option<Timestamp>,
}

/// Result of evaluating one value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Decision {
    pub fire: bool,
    pub state: ChannelState,
}

/// Evaluate `value` against `config`.
///
/// A breach fires when the channel is disarmed or the cooldown has elapsed
/// since the last fire. A value at or below the threshold (or a disabled
/// channel) disarms immediately while keeping `last_fired_at`, so the next
/// breach fires even inside the cooldown window.
pub fn evaluate(
    value: f64,
    config: &ThresholdConfig,
    state: &ChannelState,
    now: Timestamp,
) -> Decision {
    if !(config.enabled && value > config.threshold) {
        return Decision {
            fire: false,
            state: ChannelState {
                armed: false,
                last_fired_at: state.last_fired_at,
            },
        };
    }

    if !state.armed || cooldown_elapsed(state.last_fired_at, config.cooldown, now) {
        return Decision {
            fire: true,
            state: ChannelState {
                armed: true,
                last_fired_at: Some(now),
            },
        };
    }

    Decision {
        fire: false,
        state: *state,
    }
}

/// Whether strictly more than `period` has passed since `since`.
///
/// An absent `since` counts as elapsed. A period too large to represent
/// never elapses.
pub fn elapsed_beyond(since: Option<Timestamp>, period: Duration, now: Timestamp) -> bool {
    let Some(since) = since else {
        return true;
    };
    match chrono::Duration::from_std(period) {
        Ok(period) => now.signed_duration_since(since) > period,
        Err(_) => false,
    }
}

fn cooldown_elapsed(last_fired_at: Option<Timestamp>, cooldown: Duration, now: Timestamp) -> bool {
    elapsed_beyond(last_fired_at, cooldown, now)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
