#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum CoreError {
    #[error("Malformed payload {payload:?}: {reason}")]
    MalformedPayload { payload: String, reason: String },

    #[error("Unknown device: {0}")]
    UnknownDevice(String),

    #[error("Validation failed: {0}")]
    Validation(String),
}
