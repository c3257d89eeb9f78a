use std::time::Duration;

use anyhow::Context;
use chrono::Local;
use garmin_status_types::{DailyHeartRate, DailyStress, DailyValues};
use serde::de::DeserializeOwned;

use crate::{browser::Browser, error::BotError};

const SIGN_IN_URL: &str =
    "https://sso.garmin.com/sso/signin?service=https%3A%2F%2Fconnect.garmin.com%2Fmodern%2F";
const WELLNESS_BASE: &str = "https://connect.garmin.com/modern/proxy/wellness-service/wellness";

const LOGIN_FORM_SELECTOR: &str = "input#email";
const PASSWORD_SELECTOR: &str = "input#password";
const SUBMIT_SELECTOR: &str = "button[type=\"submit\"]";
const DASHBOARD_SELECTOR: &str = ".main-nav";

const FORM_WAIT: Duration = Duration::from_secs(20);
const NAV_WAIT: Duration = Duration::from_secs(30);

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SessionState {
    #[default]
    LoggedOut,
    LoggingIn,
    LoggedIn,
}

/// One authenticated Garmin Connect browser session. Dropped and rebuilt by
/// the run loop whenever a cycle fails.
pub struct GarminSession<B> {
    browser: B,
    state: SessionState,
}

impl<B: Browser> GarminSession<B> {
    pub fn new(browser: B) -> Self {
        Self {
            browser,
            state: SessionState::LoggedOut,
        }
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn is_logged_in(&self) -> bool {
        self.state == SessionState::LoggedIn
    }

    /// Signs in through the SSO page. Ends in `LoggedIn` on success and back
    /// in `LoggedOut` on any failure.
    pub async fn login(&mut self, mail_address: &str, password: &str) -> anyhow::Result<()> {
        self.state = SessionState::LoggingIn;
        let result = self.submit_sign_in(mail_address, password).await;
        self.state = match result {
            Ok(()) => SessionState::LoggedIn,
            Err(_) => SessionState::LoggedOut,
        };
        result
    }

    async fn submit_sign_in(&mut self, mail_address: &str, password: &str) -> anyhow::Result<()> {
        info!("signing in to Garmin Connect");
        self.browser
            .goto(SIGN_IN_URL)
            .await
            .context("failed to open the sign-in page")?;

        if !self.browser.wait_for(LOGIN_FORM_SELECTOR, FORM_WAIT).await? {
            return Err(BotError::AuthFormNotFound.into());
        }

        self.browser.fill(LOGIN_FORM_SELECTOR, mail_address).await?;
        self.browser.fill(PASSWORD_SELECTOR, password).await?;
        self.browser.click(SUBMIT_SELECTOR).await?;

        if !self.browser.wait_for(DASHBOARD_SELECTOR, NAV_WAIT).await? {
            anyhow::bail!("sign-in submitted but the dashboard never appeared");
        }

        info!("signed in");
        Ok(())
    }

    /// Fetches today's wellness snapshot. A payload that is missing or does
    /// not parse leaves its series empty instead of failing the fetch.
    pub async fn latest_values(&mut self) -> anyhow::Result<DailyValues> {
        if self.state != SessionState::LoggedIn {
            return Err(BotError::NotLoggedIn.into());
        }

        let date = Local::now().format("%Y-%m-%d").to_string();

        let stress: Option<DailyStress> = self
            .fetch_json(&format!("{WELLNESS_BASE}/dailyStress/{date}"))
            .await?;
        let heart_rate: Option<DailyHeartRate> = self
            .fetch_json(&format!("{WELLNESS_BASE}/dailyHeartRate?date={date}"))
            .await?;

        let (stress, body_battery) = stress
            .map(|payload| {
                (
                    payload.stress_values_array.unwrap_or_default(),
                    payload.body_battery_values_array.unwrap_or_default(),
                )
            })
            .unwrap_or_default();

        Ok(DailyValues {
            stress,
            body_battery,
            heart_rate: heart_rate
                .and_then(|payload| payload.heart_rate_values)
                .unwrap_or_default(),
        })
    }

    async fn fetch_json<T: DeserializeOwned>(&mut self, url: &str) -> anyhow::Result<Option<T>> {
        self.browser
            .goto(url)
            .await
            .with_context(|| format!("failed to open {url}"))?;
        let body = self.browser.body_text().await?;

        match serde_json::from_str(&body) {
            Ok(payload) => Ok(Some(payload)),
            Err(error) => {
                warn!("unparseable wellness payload from {url}: {error}");
                Ok(None)
            }
        }
    }

    /// Releases the browser and forgets the login. Safe to call repeatedly.
    pub async fn close(&mut self) {
        if let Err(error) = self.browser.close().await {
            warn!("failed to close the browser session: {error:#}");
        }
        self.state = SessionState::LoggedOut;
    }
}

#[cfg(test)]
mod tests {
    use std::{collections::VecDeque, time::Duration};

    use super::{Browser, GarminSession, LOGIN_FORM_SELECTOR, SessionState};
    use crate::error::BotError;

    #[derive(Default)]
    struct MockBrowser {
        visited: Vec<String>,
        form_present: bool,
        nav_succeeds: bool,
        bodies: VecDeque<String>,
        closed: bool,
    }

    impl Browser for MockBrowser {
        async fn goto(&mut self, url: &str) -> anyhow::Result<()> {
            self.visited.push(url.to_owned());
            Ok(())
        }

        async fn wait_for(&mut self, selector: &str, _timeout: Duration) -> anyhow::Result<bool> {
            if selector == LOGIN_FORM_SELECTOR {
                Ok(self.form_present)
            } else {
                Ok(self.nav_succeeds)
            }
        }

        async fn fill(&mut self, _selector: &str, _text: &str) -> anyhow::Result<()> {
            Ok(())
        }

        async fn click(&mut self, _selector: &str) -> anyhow::Result<()> {
            Ok(())
        }

        async fn body_text(&mut self) -> anyhow::Result<String> {
            Ok(self.bodies.pop_front().unwrap_or_default())
        }

        async fn close(&mut self) -> anyhow::Result<()> {
            self.closed = true;
            Ok(())
        }
    }

    fn logged_in_session(bodies: &[&str]) -> GarminSession<MockBrowser> {
        GarminSession {
            browser: MockBrowser {
                bodies: bodies.iter().map(|&b| b.to_owned()).collect(),
                ..MockBrowser::default()
            },
            state: SessionState::LoggedIn,
        }
    }

    #[tokio::test]
    async fn test_missing_form_fails_login() {
        let mut session = GarminSession::new(MockBrowser {
            form_present: false,
            nav_succeeds: true,
            ..MockBrowser::default()
        });

        let error = session.login("mail", "secret").await.unwrap_err();
        assert!(matches!(
            error.downcast_ref::<BotError>(),
            Some(BotError::AuthFormNotFound)
        ));
        assert_eq!(session.state(), SessionState::LoggedOut);
    }

    #[tokio::test]
    async fn test_login_reaches_logged_in() {
        let mut session = GarminSession::new(MockBrowser {
            form_present: true,
            nav_succeeds: true,
            ..MockBrowser::default()
        });

        session.login("mail", "secret").await.unwrap();
        assert!(session.is_logged_in());
    }

    #[tokio::test]
    async fn test_fetch_requires_login() {
        let mut session = GarminSession::new(MockBrowser::default());
        let error = session.latest_values().await.unwrap_err();
        assert!(matches!(
            error.downcast_ref::<BotError>(),
            Some(BotError::NotLoggedIn)
        ));
        assert!(session.browser.visited.is_empty());
    }

    #[tokio::test]
    async fn test_fetch_parses_both_payloads() {
        let mut session = logged_in_session(&[
            r#"{"stressValuesArray": [[0, 60]], "bodyBatteryValuesArray": [[0, "DRAINED", 50, 1.0]]}"#,
            r#"{"heartRateValues": [[0, 70]]}"#,
        ]);

        let values = session.latest_values().await.unwrap();
        assert_eq!(values.stress.latest(), Some(60.0));
        assert_eq!(values.body_battery.latest(), Some(50.0));
        assert_eq!(values.heart_rate.latest(), Some(70.0));
        assert_eq!(session.browser.visited.len(), 2);
    }

    #[tokio::test]
    async fn test_malformed_payload_yields_empty_series() {
        let mut session = logged_in_session(&[
            "<html>maintenance</html>",
            r#"{"heartRateValues": [[0, 70]]}"#,
        ]);

        let values = session.latest_values().await.unwrap();
        assert!(values.stress.is_empty());
        assert!(values.body_battery.is_empty());
        assert_eq!(values.heart_rate.latest(), Some(70.0));
    }

    #[tokio::test]
    async fn test_close_is_idempotent_and_logs_out() {
        let mut session = logged_in_session(&[]);
        session.close().await;
        session.close().await;
        assert!(session.browser.closed);
        assert_eq!(session.state(), SessionState::LoggedOut);
    }
}
