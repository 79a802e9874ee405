//! Configuration, file system layout and logging setup for the notifier.

mod config;
mod error;
mod logging;
mod paths;

pub use config::{
    parse_weekday, Config, HttpMailConfig, MailConfig, SmtpMailConfig, DEFAULT_BROADCAST_DAY,
    DEFAULT_LOG_LEVEL, ENV_FEED_URL, ENV_LOG_LEVEL, ENV_MAIL_API_KEY, ENV_SMTP_PASSWORD,
};
pub use error::{CoreError, CoreResult};
pub use logging::init_logging;
pub use paths::Paths;
