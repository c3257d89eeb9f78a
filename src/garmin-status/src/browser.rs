use std::time::Duration;

use anyhow::{Context, anyhow};
use fantoccini::{Client, ClientBuilder, Locator, error::CmdError};

/// The slice of browser automation this bot needs: open a URL, wait for a
/// selector, type, click, read the page text. Everything else stays inside
/// the implementation.
#[allow(async_fn_in_trait)]
pub trait Browser {
    async fn goto(&mut self, url: &str) -> anyhow::Result<()>;
    /// Waits until the selector matches, returning `false` on deadline.
    async fn wait_for(&mut self, selector: &str, timeout: Duration) -> anyhow::Result<bool>;
    async fn fill(&mut self, selector: &str, text: &str) -> anyhow::Result<()>;
    async fn click(&mut self, selector: &str) -> anyhow::Result<()>;
    async fn body_text(&mut self) -> anyhow::Result<String>;
    /// Releases the underlying session. No-op when none is open.
    async fn close(&mut self) -> anyhow::Result<()>;
}

/// WebDriver-backed browser. The session is opened lazily on first use so
/// that constructing one is free.
pub struct WebDriverBrowser {
    webdriver_url: String,
    headless: bool,
    client: Option<Client>,
}

impl WebDriverBrowser {
    pub fn new(webdriver_url: impl Into<String>, headless: bool) -> Self {
        Self {
            webdriver_url: webdriver_url.into(),
            headless,
            client: None,
        }
    }

    async fn client(&mut self) -> anyhow::Result<&mut Client> {
        if self.client.is_none() {
            let mut args = vec!["--disable-gpu", "--window-size=1280,1024"];
            if self.headless {
                args.push("--headless=new");
            }

            let mut capabilities = serde_json::Map::new();
            capabilities.insert(
                "goog:chromeOptions".to_owned(),
                serde_json::json!({ "args": args }),
            );

            let client = ClientBuilder::rustls()
                .context("failed to initialize the TLS backend")?
                .capabilities(capabilities)
                .connect(&self.webdriver_url)
                .await
                .with_context(|| {
                    format!("failed to reach the WebDriver at {}", self.webdriver_url)
                })?;
            self.client = Some(client);
        }

        self.client
            .as_mut()
            .ok_or_else(|| anyhow!("browser session vanished"))
    }
}

impl Browser for WebDriverBrowser {
    async fn goto(&mut self, url: &str) -> anyhow::Result<()> {
        self.client().await?.goto(url).await?;
        Ok(())
    }

    async fn wait_for(&mut self, selector: &str, timeout: Duration) -> anyhow::Result<bool> {
        let wait = self.client().await?.wait().at_most(timeout);
        match wait.for_element(Locator::Css(selector)).await {
            Ok(_) => Ok(true),
            Err(CmdError::WaitTimeout) => Ok(false),
            Err(error) => Err(error.into()),
        }
    }

    async fn fill(&mut self, selector: &str, text: &str) -> anyhow::Result<()> {
        let element = self.client().await?.find(Locator::Css(selector)).await?;
        element.clear().await?;
        element.send_keys(text).await?;
        Ok(())
    }

    async fn click(&mut self, selector: &str) -> anyhow::Result<()> {
        let element = self.client().await?.find(Locator::Css(selector)).await?;
        element.click().await?;
        Ok(())
    }

    async fn body_text(&mut self) -> anyhow::Result<String> {
        let body = self.client().await?.find(Locator::Css("body")).await?;
        Ok(body.text().await?)
    }

    async fn close(&mut self) -> anyhow::Result<()> {
        if let Some(client) = self.client.take() {
            client.close().await?;
        }
        Ok(())
    }
}
