#[macro_use]
extern crate log;

use std::time::Duration;

use clap::Parser;
use dotenv::dotenv;
use garmin_status::{BotError, Browser, GarminSession, Notifier, WebDriverBrowser};
use garmin_status_format::EmojiPalette;
use tokio::time::sleep;

const POLL_INTERVAL: Duration = Duration::from_secs(60 * 60);

#[derive(Parser)]
pub struct GarminStatusCli {
    /// Garmin Connect account mail address
    #[arg(env = "GARMIN_MAIL_ADDRESS", long)]
    pub garmin_mail_address: Option<String>,
    /// Garmin Connect account password
    #[arg(env = "GARMIN_PASSWORD", long)]
    pub garmin_password: Option<String>,
    /// Legacy token for the profile status update
    #[arg(env = "SLACK_LEGACY_TOKEN", long)]
    pub slack_legacy_token: Option<String>,
    /// Token for the push notification channel
    #[arg(env = "LINE_NOTIFY_TOKEN", long)]
    pub line_notify_token: Option<String>,
    /// Battery bucket emoji names, colon or whitespace separated
    #[arg(env = "EMOJIS", long)]
    pub emojis: Option<String>,
    /// Run the browser visibly instead of headless
    #[arg(env = "DEBUG", long, value_parser = clap::builder::FalseyValueParser::new())]
    pub debug: bool,
    /// Run a single fetch-and-notify pass, then exit
    #[arg(env = "CI", long, value_parser = clap::builder::FalseyValueParser::new())]
    pub ci: bool,
    /// WebDriver endpoint that drives the browser
    #[arg(env = "WEBDRIVER_URL", long, default_value = "http://localhost:9515")]
    pub webdriver_url: String,
}

/// Secrets resolved once at startup, immutable afterwards.
#[derive(Debug)]
struct Credentials {
    mail_address: String,
    password: String,
    slack_token: String,
    line_token: String,
    emojis: Option<String>,
}

impl Credentials {
    fn resolve(cli: &GarminStatusCli) -> Result<Self, BotError> {
        fn required(value: &Option<String>, key: &'static str) -> Result<String, BotError> {
            value
                .clone()
                .filter(|v| !v.is_empty())
                .ok_or(BotError::MissingConfig(key))
        }

        Ok(Self {
            mail_address: required(&cli.garmin_mail_address, "GARMIN_MAIL_ADDRESS")?,
            password: required(&cli.garmin_password, "GARMIN_PASSWORD")?,
            slack_token: required(&cli.slack_legacy_token, "SLACK_LEGACY_TOKEN")?,
            line_token: required(&cli.line_notify_token, "LINE_NOTIFY_TOKEN")?,
            emojis: cli.emojis.clone(),
        })
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    if let Err(error) = dotenv() {
        println!("{}", error);
    }

    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = GarminStatusCli::parse();
    let credentials = Credentials::resolve(&cli)?;

    let palette = EmojiPalette::from_config(credentials.emojis.as_deref());
    let mut notifier = Notifier::new(&credentials.slack_token, &credentials.line_token, palette);

    let new_session =
        || GarminSession::new(WebDriverBrowser::new(&cli.webdriver_url, !cli.debug));
    let mut session = new_session();

    if cli.ci {
        let result = run_cycle(&mut session, &mut notifier, &credentials).await;
        session.close().await;
        return result;
    }

    loop {
        if let Err(error) = run_cycle(&mut session, &mut notifier, &credentials).await {
            error!("cycle failed: {error:#}");
            session = recover_session(session, &new_session).await;
        }

        sleep(POLL_INTERVAL).await;
    }
}

/// Error recovery for the daemon loop: release the failed session and start
/// the next cycle from a fresh, logged-out one.
async fn recover_session<B: Browser>(
    mut session: GarminSession<B>,
    new_session: impl Fn() -> GarminSession<B>,
) -> GarminSession<B> {
    session.close().await;
    new_session()
}

async fn run_cycle<B: Browser>(
    session: &mut GarminSession<B>,
    notifier: &mut Notifier,
    credentials: &Credentials,
) -> anyhow::Result<()> {
    if !session.is_logged_in() {
        session
            .login(&credentials.mail_address, &credentials.password)
            .await?;
    }

    let values = session.latest_values().await?;
    notifier.update_status(&values).await?;
    notifier.push_alert(&values).await?;
    Ok(())
}
