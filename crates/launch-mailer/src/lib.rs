//! Launch summary mail.
//!
//! [`render`] turns routed messages into HTML, a [`MailTransport`] (HTTP API
//! or SMTP) moves the result, and [`Mailer`] glues the two behind the core
//! `Notifier` trait.

mod error;
mod mailer;
pub mod render;
mod smtp;
mod transport;

pub use error::{MailError, MailResult};
pub use mailer::Mailer;
pub use render::{render_message, RenderedMail};
pub use smtp::{SmtpMailTransport, SmtpSettings, DEFAULT_SMTP_PORT};
pub use transport::{HttpMailTransport, LogTransport, MailEnvelope, MailTransport};
