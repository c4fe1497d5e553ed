//! Outgoing email.
//!
//! `Mailer` is the narrow seam the reset flow dispatches through. The
//! SMTP implementation sits on lettre's async transport; when SMTP is
//! not configured the log mailer stands in so development environments
//! never need a mail server.

use async_trait::async_trait;
use lettre::{
    message::header::ContentType, transport::smtp::authentication::Credentials,
    AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor,
};
use std::sync::Arc;

use crate::config::SmtpConfig;
use crate::errors::{AppError, AppResult};

/// An outgoing message: address envelope plus HTML body
#[derive(Debug, Clone)]
pub struct EmailMessage {
    pub from: String,
    pub to: String,
    pub subject: String,
    pub html: String,
}

/// Email delivery abstraction. One attempt, no retry; a failure is
/// surfaced to the caller as a delivery error.
#[async_trait]
pub trait Mailer: Send + Sync {
    async fn send(&self, message: EmailMessage) -> AppResult<()>;
}

/// SMTP mailer over lettre's tokio transport
pub struct SmtpMailer {
    transport: AsyncSmtpTransport<Tokio1Executor>,
}

impl SmtpMailer {
    /// Build the transport from SMTP settings.
    ///
    /// # Errors
    /// Fails when no SMTP host is configured or the relay is invalid.
    pub fn from_config(config: &SmtpConfig) -> AppResult<Self> {
        let host = config
            .host
            .as_deref()
            .ok_or_else(|| AppError::delivery("SMTP_HOST is not configured"))?;

        let mut builder = AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(host)
            .map_err(|e| AppError::delivery(format!("Invalid SMTP relay: {}", e)))?
            .port(config.port);

        if let (Some(user), Some(pass)) = (&config.user, &config.pass) {
            builder = builder.credentials(Credentials::new(user.clone(), pass.clone()));
        }

        Ok(Self {
            transport: builder.build(),
        })
    }
}

#[async_trait]
impl Mailer for SmtpMailer {
    async fn send(&self, message: EmailMessage) -> AppResult<()> {
        let email = Message::builder()
            .from(
                message
                    .from
                    .parse()
                    .map_err(|e| AppError::delivery(format!("Invalid sender address: {}", e)))?,
            )
            .to(message
                .to
                .parse()
                .map_err(|e| AppError::delivery(format!("Invalid recipient address: {}", e)))?)
            .subject(&message.subject)
            .header(ContentType::TEXT_HTML)
            .body(message.html)
            .map_err(|e| AppError::delivery(format!("Could not build message: {}", e)))?;

        self.transport
            .send(email)
            .await
            .map_err(|e| AppError::delivery(e.to_string()))?;

        tracing::debug!(to = %message.to, "Email sent");
        Ok(())
    }
}

/// Development mailer that logs instead of sending
pub struct LogMailer;

#[async_trait]
impl Mailer for LogMailer {
    async fn send(&self, message: EmailMessage) -> AppResult<()> {
        tracing::warn!("SMTP not configured - logging email instead of sending");
        tracing::info!(
            "=== EMAIL (not sent) ===\n\
             From: {}\n\
             To: {}\n\
             Subject: {}\n\
             Body:\n{}\n\
             ========================",
            message.from,
            message.to,
            message.subject,
            message.html
        );
        Ok(())
    }
}

/// Pick the mailer implementation for the current configuration
pub fn mailer_from_config(config: &SmtpConfig) -> Arc<dyn Mailer> {
    if config.is_configured() {
        match SmtpMailer::from_config(config) {
            Ok(mailer) => return Arc::new(mailer),
            Err(e) => {
                tracing::error!("Falling back to log mailer: {}", e);
            }
        }
    }
    Arc::new(LogMailer)
}
