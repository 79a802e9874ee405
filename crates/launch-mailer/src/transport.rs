//! Mail transports.

use crate::error::{MailError, MailResult};
use async_trait::async_trait;
use serde::Serialize;
use std::time::Duration;
use tracing::{debug, error, info};

const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);
const ERROR_BODY_LIMIT: usize = 512;

/// One rendered mail for one recipient.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MailEnvelope {
    pub to: String,
    pub subject: String,
    pub html: String,
}

/// Moves a rendered mail to its recipient.
#[async_trait]
pub trait MailTransport: Send + Sync {
    async fn deliver(&self, envelope: &MailEnvelope) -> MailResult<()>;
}

#[derive(Debug, Serialize)]
struct SendMailRequest<'a> {
    from: &'a str,
    to: &'a str,
    subject: &'a str,
    html: &'a str,
}

/// Posts mail as JSON to an HTTP mail API with a bearer key.
#[derive(Clone)]
pub struct HttpMailTransport {
    http_client: reqwest::Client,
    endpoint: String,
    api_key: String,
    from: String,
}

impl HttpMailTransport {
    pub fn new(
        endpoint: impl Into<String>,
        api_key: impl Into<String>,
        from: impl Into<String>,
    ) -> MailResult<Self> {
        let endpoint = endpoint.into();
        if endpoint.trim().is_empty() {
            return Err(MailError::Config("mail endpoint is empty".to_string()));
        }
        let http_client = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()?;
        Ok(Self {
            http_client,
            endpoint,
            api_key: api_key.into(),
            from: from.into(),
        })
    }

    fn request(&self, envelope: &MailEnvelope) -> reqwest::RequestBuilder {
        self.http_client
            .post(&self.endpoint)
            .bearer_auth(&self.api_key)
            .json(&SendMailRequest {
                from: &self.from,
                to: &envelope.to,
                subject: &envelope.subject,
                html: &envelope.html,
            })
    }
}

#[async_trait]
impl MailTransport for HttpMailTransport {
    async fn deliver(&self, envelope: &MailEnvelope) -> MailResult<()> {
        debug!(recipient = %envelope.to, subject = %envelope.subject, "Posting mail");

        let response = self.request(envelope).send().await?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            error!(recipient = %envelope.to, status = %status, "Mail API rejected message");
            return Err(MailError::Api {
                status: status.as_u16(),
                message: body.chars().take(ERROR_BODY_LIMIT).collect(),
            });
        }
        Ok(())
    }
}

/// Logs mail instead of sending it.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogTransport;

#[async_trait]
impl MailTransport for LogTransport {
    async fn deliver(&self, envelope: &MailEnvelope) -> MailResult<()> {
        info!(
            recipient = %envelope.to,
            subject = %envelope.subject,
            html_bytes = envelope.html.len(),
            "Mail not sent (log transport)"
        );
        Ok(())
    }
}
