//! Outbound email.
//!
//! When SMTP credentials are configured the mailer delivers over STARTTLS;
//! otherwise it logs the message instead of sending it, which is what local
//! development wants.

use lettre::message::Mailbox;
use lettre::message::header::ContentType;
use lettre::transport::smtp::authentication::Credentials;
use lettre::{AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};
use secrecy::ExposeSecret;
use thiserror::Error;

use cartwheel_core::Email;

use crate::config::SmtpConfig;

/// Errors from sending mail.
#[derive(Debug, Error)]
pub enum MailError {
    /// An address could not be parsed into a mailbox.
    #[error("invalid mail address: {0}")]
    InvalidAddress(#[from] lettre::address::AddressError),

    /// The message could not be built.
    #[error("failed to build message: {0}")]
    Message(#[from] lettre::error::Error),

    /// SMTP delivery failed.
    #[error("smtp transport error: {0}")]
    Transport(#[from] lettre::transport::smtp::Error),
}

/// Email delivery backend.
pub enum Mailer {
    /// Deliver over SMTP.
    Smtp {
        transport: AsyncSmtpTransport<Tokio1Executor>,
        from: Mailbox,
    },
    /// Log the message instead of sending it.
    LogOnly,
}

impl Mailer {
    /// Build a mailer from optional SMTP configuration.
    ///
    /// # Errors
    ///
    /// Returns `MailError` if the relay host or from-address is invalid.
    pub fn from_config(smtp: Option<&SmtpConfig>) -> Result<Self, MailError> {
        let Some(smtp) = smtp else {
            tracing::info!("SMTP not configured; outbound mail will be logged only");
            return Ok(Self::LogOnly);
        };

        let credentials = Credentials::new(
            smtp.username.clone(),
            smtp.password.expose_secret().to_string(),
        );

        let transport = AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&smtp.host)?
            .credentials(credentials)
            .build();

        let from: Mailbox = smtp.from.parse()?;

        Ok(Self::Smtp { transport, from })
    }

    /// Send a password-reset email containing the reset link.
    ///
    /// # Errors
    ///
    /// Returns `MailError` if the message cannot be built or delivered.
    pub async fn send_password_reset(&self, to: &Email, reset_url: &str) -> Result<(), MailError> {
        let subject = "Reset your Cartwheel password";
        let body = format!(
            "Hello,\n\n\
             Someone requested a password reset for this address. If that was\n\
             you, open the link below within the next hour:\n\n\
             {reset_url}\n\n\
             If you didn't request this, you can ignore this email.\n"
        );

        match self {
            Self::Smtp { transport, from } => {
                let message = Message::builder()
                    .from(from.clone())
                    .to(to.as_ref().parse()?)
                    .subject(subject)
                    .header(ContentType::TEXT_PLAIN)
                    .body(body)?;

                transport.send(message).await?;
                tracing::info!(to = %to, "password reset email sent");
            }
            Self::LogOnly => {
                tracing::info!(to = %to, reset_url, "password reset email (log-only mailer)");
            }
        }

        Ok(())
    }
}

impl std::fmt::Debug for Mailer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Smtp { from, .. } => f.debug_struct("Smtp").field("from", from).finish(),
            Self::LogOnly => write!(f, "LogOnly"),
        }
    }
}
