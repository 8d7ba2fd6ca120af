use airwatch_core::error::CoreError;
use airwatch_events::EmailError;

/// Errors raised by the monitor and its collaborators.
///
/// Inside a batch these never propagate past the effect that caused them;
/// they are logged with the channel name and dropped.
#[derive(Debug, thiserror::Error)]
pub enum MonitorError {
    #[error(transparent)]
    Core(#[from] CoreError),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Email error: {0}")]
    Email(#[from] EmailError),

    #[error("MQTT client error: {0}")]
    Mqtt(#[from] rumqttc::ClientError),

    /// The email channel fired but no recipient address is configured.
    #[error("No email recipient configured")]
    MissingRecipient,

    /// The email channel fired but SMTP delivery is not configured.
    #[error("Email delivery is not configured")]
    MailerUnavailable,

    #[error("Invalid configuration: {0}")]
    Config(String),

    /// A collaborator failed for a reason not covered above.
    #[error("{0}")]
    Unavailable(String),
}
