//! `run` command.

use chrono::Utc;
use clap::Args;
use launch_config_and_utils::{Config, MailConfig, Paths};
use launch_database::{AsyncDatabase, SqliteStore};
use launch_feed::{JsonFileFeed, JsonSubscriptionSource, LaunchLibraryClient};
use launch_mailer::{
    HttpMailTransport, LogTransport, MailResult, MailTransport, Mailer, SmtpMailTransport,
    SmtpSettings,
};
use launch_sync_core::{AudienceRouter, FeedSource, RunContext, RunMode, RunReport};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{info, warn};

#[derive(Debug, Default, Args)]
pub struct RunArgs {
    /// Classify and route against the stored snapshot without writing or sending
    #[arg(long)]
    pub dry_run: bool,

    /// Read launches from a saved API response instead of the network
    #[arg(long, value_name = "PATH")]
    pub feed_file: Option<PathBuf>,

    /// Subscription list. Defaults to <base-dir>/subscribers.json
    #[arg(long, value_name = "PATH")]
    pub subscribers: Option<PathBuf>,
}

impl RunArgs {
    fn mode(&self) -> RunMode {
        if self.dry_run {
            RunMode::DryRun
        } else {
            RunMode::Live
        }
    }
}

pub async fn run(
    config: Config,
    paths: Paths,
    args: RunArgs,
) -> Result<(), Box<dyn std::error::Error>> {
    config.validate()?;
    let mode = args.mode();
    let context = build_context(&config, &paths, &args).await?;

    let report = context.run_once(Utc::now(), mode).await?;
    print_report(&report, mode);
    Ok(())
}

/// Wire the concrete collaborators for one run.
pub(crate) async fn build_context(
    config: &Config,
    paths: &Paths,
    args: &RunArgs,
) -> Result<RunContext, Box<dyn std::error::Error>> {
    let store = Arc::new(SqliteStore::new(
        AsyncDatabase::open(&paths.database_file()).await?,
    ));

    let feed: Arc<dyn FeedSource> = match &args.feed_file {
        Some(path) => {
            info!(path = %path.display(), "Using feed file");
            Arc::new(JsonFileFeed::new(path))
        }
        None => Arc::new(LaunchLibraryClient::new(&config.feed_url)?),
    };

    let subscriptions = JsonSubscriptionSource::new(
        args.subscribers
            .clone()
            .unwrap_or_else(|| paths.subscribers_file()),
    );

    let transport = mail_transport(config, args.mode())?;

    Ok(RunContext {
        feed,
        launches: store.clone(),
        subscribers: store,
        subscriptions: Arc::new(subscriptions),
        notifier: Arc::new(Mailer::new(transport)),
        router: AudienceRouter::new(config.broadcast_weekday()?),
        duplicate_policy: config.duplicate_policy,
    })
}

fn mail_transport(config: &Config, mode: RunMode) -> MailResult<Arc<dyn MailTransport>> {
    match (&config.mail, mode) {
        (Some(MailConfig::Http(http)), RunMode::Live) => Ok(Arc::new(HttpMailTransport::new(
            &http.endpoint,
            &http.api_key,
            &http.from,
        )?)),
        (Some(MailConfig::Smtp(smtp)), RunMode::Live) => {
            info!(host = %smtp.host, port = smtp.port, tls = smtp.tls, "Sending mail over SMTP");
            Ok(Arc::new(SmtpMailTransport::new(&SmtpSettings {
                host: smtp.host.clone(),
                port: smtp.port,
                user: smtp.user.clone(),
                pass: smtp.pass.clone(),
                from: smtp.from.clone(),
                tls: smtp.tls,
            })?))
        }
        (None, RunMode::Live) => {
            warn!("No mail settings in config.json, mail will only be logged");
            Ok(Arc::new(LogTransport))
        }
        (_, RunMode::DryRun) => Ok(Arc::new(LogTransport)),
    }
}

fn print_report(report: &RunReport, mode: RunMode) {
    if mode == RunMode::DryRun {
        println!("Dry run: nothing was written or sent");
    }
    println!("Changes: {}", report.events.len());
    for event in &report.events {
        println!(
            "  {:<15} {} ({})",
            event.kind.as_str(),
            event.record.name,
            event.id()
        );
    }
    if report.subscribers_added + report.subscribers_removed > 0 {
        println!(
            "Subscribers: +{} -{}",
            report.subscribers_added, report.subscribers_removed
        );
    }
    let kinds: Vec<&str> = report.messages.iter().map(|k| k.as_str()).collect();
    if kinds.is_empty() {
        println!("Messages: none");
    } else {
        println!("Messages: {}", kinds.join(", "));
    }
    println!("Delivered: {}", report.delivered);

    if let Some(error) = &report.subscriber_failure {
        println!("  subscriber reconciliation failure: {error}");
    }
    for failure in &report.store_failures {
        println!(
            "  store failure: {} {}: {}",
            failure.mutation.verb(),
            failure.mutation.launch_id(),
            failure.error
        );
    }
    for failure in &report.delivery_failures {
        println!(
            "  delivery failure: {} ({}): {}",
            failure.recipient,
            failure.kind.as_str(),
            failure.error
        );
    }
}
