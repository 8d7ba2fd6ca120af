//! Alert records produced on confirmed fires.

use serde::Serialize;

use crate::types::Timestamp;

/// Prefix marking records created by the email channel.
pub const EMAIL_RECORD_PREFIX: &str = "email--";

/// Format of the timestamp label stored with each record and used in emails.
pub const TIMESTAMP_LABEL_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// An append-only alert log entry. Persisting it is the caller's job.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AlertRecord {
    /// Timestamp label, prefixed with [`EMAIL_RECORD_PREFIX`] for email fires.
    pub timestamp: String,
    pub message: String,
    pub metric_value: f64,
}

impl AlertRecord {
    /// Record for an in-app VOC alert.
    pub fn new(now: Timestamp, message: impl Into<String>, metric_value: f64) -> Self {
        Self {
            timestamp: timestamp_label(now),
            message: message.into(),
            metric_value,
        }
    }

    /// Record for a VOC warning email.
    pub fn email(now: Timestamp, message: impl Into<String>, metric_value: f64) -> Self {
        Self {
            timestamp: format!("{EMAIL_RECORD_PREFIX}{}", timestamp_label(now)),
            message: message.into(),
            metric_value,
        }
    }

    pub fn is_email(&self) -> bool {
        self.timestamp.starts_with(EMAIL_RECORD_PREFIX)
    }
}

pub fn timestamp_label(now: Timestamp) -> String {
    now.format(TIMESTAMP_LABEL_FORMAT).to_string()
}

/// Body of the VOC warning email.
pub fn voc_email_body(now: Timestamp, voc: f64, message: &str) -> String {
    format!(
        "{} \n Current VOC level: {voc}, set threshold exceeded. \n {message}",
        timestamp_label(now)
    )
}
