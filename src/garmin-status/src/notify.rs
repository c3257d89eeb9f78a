use anyhow::Context;
use chrono::Local;
use garmin_status_format::{AlertState, EmojiPalette, format_status};
use garmin_status_types::DailyValues;
use serde::{Deserialize, Serialize};

use crate::error::BotError;

const PROFILE_SET_URL: &str = "https://slack.com/api/users.profile.set";
const PUSH_NOTIFY_URL: &str = "https://notify-api.line.me/api/notify";

#[derive(Serialize)]
struct StatusProfile {
    status_emoji: String,
    status_text: String,
}

#[derive(Deserialize)]
struct ProfileSetResponse {
    ok: bool,
}

/// Outbound side of the bot: the chat status field and the push channel.
/// Owns the once-per-day alert state.
pub struct Notifier {
    client: reqwest::Client,
    slack_token: String,
    line_token: String,
    palette: EmojiPalette,
    alert: AlertState,
}

impl Notifier {
    pub fn new(
        slack_token: impl Into<String>,
        line_token: impl Into<String>,
        palette: EmojiPalette,
    ) -> Self {
        Self {
            client: reqwest::Client::new(),
            slack_token: slack_token.into(),
            line_token: line_token.into(),
            palette,
            alert: AlertState::default(),
        }
    }

    /// Pushes the current snapshot into the chat profile status.
    pub async fn update_status(&self, values: &DailyValues) -> anyhow::Result<()> {
        let profile = StatusProfile {
            status_emoji: self.palette.pick(values.body_battery.latest()),
            status_text: format_status(values),
        };

        let profile_json = serde_json::to_string(&profile)?;
        let body = self
            .client
            .post(PROFILE_SET_URL)
            .form(&[
                ("token", self.slack_token.as_str()),
                ("profile", profile_json.as_str()),
            ])
            .send()
            .await
            .context("failed to reach the profile status endpoint")?
            .text()
            .await?;

        check_profile_response(&body)?;
        info!("status set to {} {}", profile.status_emoji, profile.status_text);
        Ok(())
    }

    /// Sends the alert message for the snapshot, if there is one. Runs the
    /// daily reset first so the sent flag survives at most one calendar day.
    pub async fn push_alert(&mut self, values: &DailyValues) -> anyhow::Result<()> {
        let today = Local::now().date_naive();
        self.alert.reset_if_new_day(today);

        let message = self.alert.alert_message(values, today);
        if message.is_empty() {
            debug!("no alert conditions met");
            return Ok(());
        }

        let response = self
            .client
            .post(PUSH_NOTIFY_URL)
            .bearer_auth(&self.line_token)
            .form(&[("message", message.as_str())])
            .send()
            .await
            .context("failed to reach the push endpoint")?;

        if !response.status().is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(BotError::Notify(body).into());
        }

        info!("push alert sent");
        Ok(())
    }
}

/// The profile endpoint reports failures inside a successful HTTP
/// response; only an `ok: true` body counts.
fn check_profile_response(body: &str) -> Result<(), BotError> {
    match serde_json::from_str::<ProfileSetResponse>(body) {
        Ok(response) if response.ok => Ok(()),
        _ => Err(BotError::Notify(body.to_owned())),
    }
}
