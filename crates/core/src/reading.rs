//! Raw sensor readings and the inbound wire format.
//!
//! Devices publish UTF-8 text of the form `"<temperature>,<humidity>,<voc>"`.
//! There is no escaping; fields past the third are ignored.

use serde::Serialize;

use crate::error::CoreError;
use crate::types::Timestamp;

/// Separator between the fields of an inbound payload.
pub const FIELD_SEPARATOR: char = ',';

/// Number of leading fields every payload must carry.
const REQUIRED_FIELDS: usize = 3;

/// A single reading as received from a device. Never persisted on its own.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Reading {
    pub temperature: f64,
    pub humidity: f64,
    pub voc: i64,
    pub received_at: Timestamp,
}

impl Reading {
    /// Parse an inbound payload.
    ///
    /// Returns [`CoreError::MalformedPayload`] when fewer than three fields
    /// are present or a field is not a finite number.
    pub fn parse(payload: &str, received_at: Timestamp) -> Result<Self, CoreError> {
        let fields: Vec<&str> = payload.split(FIELD_SEPARATOR).map(str::trim).collect();

        if fields.len() < REQUIRED_FIELDS {
            return Err(malformed(
                payload,
                format!("expected {REQUIRED_FIELDS} fields, got {}", fields.len()),
            ));
        }

        let temperature = parse_float(payload, fields[0], "temperature")?;
        let humidity = parse_float(payload, fields[1], "humidity")?;
        let voc = fields[2]
            .parse::<i64>()
            .map_err(|e| malformed(payload, format!("voc {:?}: {e}", fields[2])))?;

        Ok(Self {
            temperature,
            humidity,
            voc,
            received_at,
        })
    }
}

fn parse_float(payload: &str, field: &str, name: &str) -> Result<f64, CoreError> {
    let value = field
        .parse::<f64>()
        .map_err(|e| malformed(payload, format!("{name} {field:?}: {e}")))?;
    if !value.is_finite() {
        return Err(malformed(payload, format!("{name} is not finite")));
    }
    Ok(value)
}

fn malformed(payload: &str, reason: String) -> CoreError {
    CoreError::MalformedPayload {
        payload: payload.to_string(),
        reason,
    }
}
