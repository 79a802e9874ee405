//! [`Notifier`] backed by a [`MailTransport`].

use crate::render::render_message;
use crate::transport::{MailEnvelope, MailTransport};
use async_trait::async_trait;
use launch_sync_core::{Notifier, OutgoingMessage, SendError};
use std::sync::Arc;
use tracing::debug;

/// Renders routed messages and hands them to a transport.
#[derive(Clone)]
pub struct Mailer {
    transport: Arc<dyn MailTransport>,
}

impl Mailer {
    pub fn new(transport: Arc<dyn MailTransport>) -> Self {
        Self { transport }
    }
}

#[async_trait]
impl Notifier for Mailer {
    async fn send(&self, recipient: &str, message: &OutgoingMessage) -> Result<(), SendError> {
        let rendered = render_message(message);
        let envelope = MailEnvelope {
            to: recipient.to_string(),
            subject: rendered.subject,
            html: rendered.html,
        };
        self.transport.deliver(&envelope).await?;
        debug!(recipient, kind = message.kind.as_str(), "Mail delivered");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{MailError, MailResult};
    use chrono::{TimeZone, Utc};
    use launch_sync_core::{ChangeEvent, ChangeKind, LaunchRecord, MessageBody, MessageKind};
    use std::sync::Mutex;

    #[derive(Default)]
    struct CapturingTransport {
        sent: Mutex<Vec<MailEnvelope>>,
        reject: Option<String>,
    }

    #[async_trait]
    impl MailTransport for CapturingTransport {
        async fn deliver(&self, envelope: &MailEnvelope) -> MailResult<()> {
            if self.reject.as_deref() == Some(envelope.to.as_str()) {
                return Err(MailError::Api {
                    status: 422,
                    message: "bad address".into(),
                });
            }
            self.sent.lock().unwrap().push(envelope.clone());
            Ok(())
        }
    }

    fn update() -> OutgoingMessage {
        let record = LaunchRecord::new(
            "a",
            "Alpha",
            Utc.with_ymd_and_hms(2025, 3, 10, 9, 0, 0).unwrap(),
            "Go",
        );
        OutgoingMessage {
            kind: MessageKind::Update,
            recipients: vec!["a@example.com".into(), "b@example.com".into()],
            body: MessageBody::Changes(vec![ChangeEvent::new(ChangeKind::New, record)]),
        }
    }

    #[tokio::test]
    async fn renders_and_addresses_one_recipient() {
        let transport = Arc::new(CapturingTransport::default());
        let mailer = Mailer::new(transport.clone());

        mailer.send("b@example.com", &update()).await.unwrap();

        let sent = transport.sent.lock().unwrap();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].to, "b@example.com");
        assert_eq!(sent[0].subject, "Rocket Launch Updates For Next Week");
        assert!(sent[0].html.contains(ChangeKind::New.label()));
    }

    #[tokio::test]
    async fn transport_failure_becomes_send_error() {
        let transport = Arc::new(CapturingTransport {
            reject: Some("a@example.com".into()),
            ..Default::default()
        });
        let mailer = Mailer::new(transport);

        let err = mailer.send("a@example.com", &update()).await.unwrap_err();
        assert!(err.to_string().contains("422"));
    }
}
