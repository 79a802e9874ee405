//! SMTP delivery.

use crate::error::{MailError, MailResult};
use crate::transport::{MailEnvelope, MailTransport};
use async_trait::async_trait;
use lettre::message::header::ContentType;
use lettre::message::Mailbox;
use lettre::transport::smtp::authentication::Credentials;
use lettre::{AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};
use std::time::Duration;
use tracing::{debug, error};

/// Submission port used when none is configured.
pub const DEFAULT_SMTP_PORT: u16 = 587;

const SMTP_TIMEOUT: Duration = Duration::from_secs(30);

/// Where and as whom to submit mail.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SmtpSettings {
    pub host: String,
    pub port: u16,
    pub user: String,
    pub pass: String,
    /// Sender address. Falls back to `user` when empty.
    pub from: String,
    /// Upgrade the connection with STARTTLS. Plaintext otherwise.
    pub tls: bool,
}

/// Sends each mail over an SMTP submission server.
#[derive(Clone)]
pub struct SmtpMailTransport {
    mailer: AsyncSmtpTransport<Tokio1Executor>,
    from: Mailbox,
}

impl SmtpMailTransport {
    pub fn new(settings: &SmtpSettings) -> MailResult<Self> {
        let host = settings.host.trim();
        if host.is_empty() {
            return Err(MailError::Config("SMTP host is empty".to_string()));
        }
        let sender = if settings.from.trim().is_empty() {
            settings.user.trim()
        } else {
            settings.from.trim()
        };
        let from: Mailbox = sender.parse()?;

        let builder = if settings.tls {
            AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(host)?
        } else {
            AsyncSmtpTransport::<Tokio1Executor>::builder_dangerous(host)
        };
        let mut builder = builder.port(settings.port).timeout(Some(SMTP_TIMEOUT));
        if !settings.user.is_empty() {
            builder = builder.credentials(Credentials::new(
                settings.user.clone(),
                settings.pass.clone(),
            ));
        }

        Ok(Self {
            mailer: builder.build(),
            from,
        })
    }

    pub fn sender(&self) -> &Mailbox {
        &self.from
    }

    fn message(&self, envelope: &MailEnvelope) -> MailResult<Message> {
        Ok(Message::builder()
            .from(self.from.clone())
            .to(envelope.to.parse()?)
            .subject(envelope.subject.as_str())
            .header(ContentType::TEXT_HTML)
            .body(envelope.html.clone())?)
    }
}

#[async_trait]
impl MailTransport for SmtpMailTransport {
    async fn deliver(&self, envelope: &MailEnvelope) -> MailResult<()> {
        debug!(recipient = %envelope.to, subject = %envelope.subject, "Submitting mail over SMTP");

        let message = self.message(envelope)?;
        self.mailer.send(message).await.map_err(|e| {
            error!(recipient = %envelope.to, error = %e, "SMTP submission failed");
            MailError::from(e)
        })?;
        Ok(())
    }
}
