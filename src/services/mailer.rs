use async_trait::async_trait;
use tracing::info;

use crate::errors::ServiceError;

/// Message handed to a [`Mailer`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutgoingMail {
    pub to: String,
    pub subject: String,
    pub body: String,
}

/// Outbound email transport.
#[async_trait]
pub trait Mailer: Send + Sync {
    async fn send(&self, mail: OutgoingMail) -> Result<(), ServiceError>;
}

/// Writes each message to the structured log instead of delivering it.
#[derive(Debug, Clone, Default)]
pub struct LogMailer;

#[async_trait]
impl Mailer for LogMailer {
    async fn send(&self, mail: OutgoingMail) -> Result<(), ServiceError> {
        info!(to = %mail.to, subject = %mail.subject, body_len = mail.body.len(), "Outgoing mail");
        Ok(())
    }
}
