//! Per-device fixed-capacity sample window.
//!
//! A [`SampleWindow`] accumulates raw [`Reading`]s and, once it holds exactly
//! `capacity` of them, flushes an [`Aggregate`] and starts over empty. Each
//! device owns its own window, so flush cadences never interfere.

use serde::Serialize;

use crate::error::CoreError;
use crate::reading::Reading;
use crate::types::{DeviceId, Timestamp};

/// Readings per aggregate when no size is configured.
pub const DEFAULT_WINDOW_SIZE: usize = 5;

/// The smoothed result of one full window.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Aggregate {
    pub device_id: DeviceId,
    /// Temperature of the most recent reading in the window.
    pub temperature: f64,
    /// Humidity of the most recent reading in the window.
    pub humidity: f64,
    /// Arithmetic mean of the window's VOC values, truncated toward zero.
    pub voc: i64,
    pub sample_count: usize,
    pub window_start: Timestamp,
    pub window_end: Timestamp,
}

#[derive(Debug, Clone)]
pub struct SampleWindow {
    device_id: DeviceId,
    capacity: usize,
    readings: Vec<Reading>,
}

impl SampleWindow {
    /// Create an empty window. A capacity of zero is rejected.
    pub fn new(device_id: impl Into<DeviceId>, capacity: usize) -> Result<Self, CoreError> {
        if capacity == 0 {
            return Err(CoreError::Validation(
                "sample window capacity must be at least 1".to_string(),
            ));
        }
        Ok(Self {
            device_id: device_id.into(),
            capacity,
            readings: Vec::with_capacity(capacity),
        })
    }

    pub fn device_id(&self) -> &str {
        &self.device_id
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn len(&self) -> usize {
        self.readings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.readings.is_empty()
    }

    pub fn readings(&self) -> &[Reading] {
        &self.readings
    }

    /// Append a reading; returns the aggregate when the window fills.
    ///
    /// The window is empty again after an aggregate is returned.
    pub fn push(&mut self, reading: Reading) -> Option<Aggregate> {
        self.readings.push(reading);
        if self.readings.len() < self.capacity {
            return None;
        }

        let batch = std::mem::replace(&mut self.readings, Vec::with_capacity(self.capacity));
        Some(self.aggregate(&batch))
    }

    /// Parse `payload` and append it.
    ///
    /// A malformed payload is rejected before the window is touched.
    pub fn push_raw(
        &mut self,
        payload: &str,
        received_at: Timestamp,
    ) -> Result<Option<Aggregate>, CoreError> {
        let reading = Reading::parse(payload, received_at)?;
        Ok(self.push(reading))
    }

    /// Drop any partially collected readings.
    pub fn clear(&mut self) {
        self.readings.clear();
    }

    fn aggregate(&self, batch: &[Reading]) -> Aggregate {
        // `push` only flushes a full window, and capacity is at least 1.
        let first = &batch[0];
        let last = &batch[batch.len() - 1];
        // Widened so large readings cannot overflow; the mean of i64
        // values always fits back into an i64.
        let voc_sum: i128 = batch.iter().map(|r| i128::from(r.voc)).sum();

        Aggregate {
            device_id: self.device_id.clone(),
            temperature: last.temperature,
            humidity: last.humidity,
            voc: (voc_sum / batch.len() as i128) as i64,
            sample_count: batch.len(),
            window_start: first.received_at,
            window_end: last.received_at,
        }
    }
}
