//! Receipt delivery over SMTP.
//!
//! Single attempt, fail-visible: the notifier never retries on its own, the
//! caller decides what to do with a failed delivery. Relay credentials are
//! injected by the caller; there are no defaults anywhere in this crate.

use std::time::Duration;

use lettre::message::header::ContentType;
use lettre::message::Mailbox;
use lettre::transport::smtp::authentication::Credentials;
use lettre::{Message, SmtpTransport, Transport};

#[derive(Debug, thiserror::Error)]
pub enum DeliveryError {
    #[error("destination is not a valid email address: {0}")]
    InvalidAddress(String),

    #[error("delivery failed: {0}")]
    DeliveryFailed(String),
}

/// Connection settings for the mail relay. Username and password come from
/// configuration; startup fails before this struct is ever built if they are
/// missing.
#[derive(Debug, Clone)]
pub struct SmtpSettings {
    pub host: String,
    pub port: u16,
    pub username: String,
    pub password: String,
    pub from: String,
    pub timeout_seconds: u64,
}

/// Anything that can deliver a rendered receipt. The SMTP [`Notifier`] is
/// the production implementation; tests substitute their own so delivery
/// outcomes can be controlled without a relay.
pub trait Mailer: Send + Sync {
    fn send(&self, destination: &str, subject: &str, body: &str) -> Result<(), DeliveryError>;
}

pub struct Notifier {
    transport: SmtpTransport,
    from: Mailbox,
}

impl Notifier {
    pub fn new(settings: &SmtpSettings) -> Result<Self, DeliveryError> {
        let from: Mailbox = settings
            .from
            .parse()
            .map_err(|_| DeliveryError::InvalidAddress(settings.from.clone()))?;

        let transport = SmtpTransport::starttls_relay(&settings.host)
            .map_err(|e| DeliveryError::DeliveryFailed(e.to_string()))?
            .port(settings.port)
            .credentials(Credentials::new(
                settings.username.clone(),
                settings.password.clone(),
            ))
            .timeout(Some(Duration::from_secs(settings.timeout_seconds)))
            .build();

        Ok(Self { transport, from })
    }

    /// Send one plain-text message. The destination is validated before any
    /// connection is opened; relay failures (auth, network, timeout) surface
    /// as `DeliveryFailed` after a single attempt.
    pub fn send(&self, destination: &str, subject: &str, body: &str) -> Result<(), DeliveryError> {
        let to: Mailbox = destination
            .parse()
            .map_err(|_| DeliveryError::InvalidAddress(destination.to_string()))?;

        let message = Message::builder()
            .from(self.from.clone())
            .to(to)
            .subject(subject)
            .header(ContentType::TEXT_PLAIN)
            .body(body.to_string())
            .map_err(|e| DeliveryError::DeliveryFailed(e.to_string()))?;

        self.transport
            .send(&message)
            .map(|_| ())
            .map_err(|e| {
                tracing::warn!(destination, error = %e, "receipt delivery failed");
                DeliveryError::DeliveryFailed(e.to_string())
            })
    }
}

impl Mailer for Notifier {
    fn send(&self, destination: &str, subject: &str, body: &str) -> Result<(), DeliveryError> {
        Notifier::send(self, destination, subject, body)
    }
}

/// Check that a destination looks like an email address without building a
/// notifier. Used by handlers to fail fast before rendering anything.
pub fn validate_address(destination: &str) -> Result<(), DeliveryError> {
    destination
        .parse::<Mailbox>()
        .map(|_| ())
        .map_err(|_| DeliveryError::InvalidAddress(destination.to_string()))
}
