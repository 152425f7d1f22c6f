use crate::{Error, Result};
use async_trait::async_trait;
use chromiumoxide::browser::Browser;
use chromiumoxide::page::Page;
use futures::StreamExt;
use std::time::Duration;
use tokio::task::JoinHandle;
use tubelinks_core::extractor;
use tubelinks_core::{AcquisitionError, LinkRecord, PageSnapshot, TabScripting, TabTarget};

const CONNECT_ATTEMPTS: u32 = 5;
const CONNECT_RETRY_DELAY: Duration = Duration::from_millis(500);

/// Address schemes whose contents the browser refuses to hand to scripts
const RESTRICTED_PREFIXES: &[&str] = &[
    "chrome://",
    "chrome-extension://",
    "devtools://",
    "edge://",
    "https://chrome.google.com/webstore",
    "https://chromewebstore.google.com",
];

/// A Chrome DevTools Protocol connection used to read tabs
pub struct CdpSession {
    browser: Browser,
    handler_task: JoinHandle<()>,
}

impl CdpSession {
    /// Connect to Chrome's remote debugging port, retrying while Chrome starts up
    pub async fn connect(debugging_port: u16) -> Result<Self> {
        let endpoint = format!("http://localhost:{}", debugging_port);
        tracing::info!("CDP session: connecting to Chrome on port {}", debugging_port);

        let mut attempts_left = CONNECT_ATTEMPTS;
        let (browser, mut handler) = loop {
            tracing::debug!("Attempting CDP connection to {}...", endpoint);
            match Browser::connect(&endpoint).await {
                Ok(connected) => break connected,
                Err(e) => {
                    attempts_left -= 1;
                    if attempts_left == 0 {
                        return Err(Error::Cdp(format!(
                            "Failed to connect to Chrome on port {} after {} attempts: {}",
                            debugging_port, CONNECT_ATTEMPTS, e
                        )));
                    }
                    tracing::debug!(
                        "CDP connection attempt failed, retrying... ({} left)",
                        attempts_left
                    );
                    tokio::time::sleep(CONNECT_RETRY_DELAY).await;
                }
            }
        };

        // The handler must be polled for any command on the browser to complete
        let handler_task = tokio::spawn(async move {
            while let Some(event) = handler.next().await {
                if let Err(e) = event {
                    tracing::debug!("CDP handler event error (continuing): {}", e);
                }
            }
        });

        // Give Chrome a moment to report its existing pages
        tokio::time::sleep(CONNECT_RETRY_DELAY).await;
        tracing::info!("CDP connection established");

        Ok(Self {
            browser,
            handler_task,
        })
    }

    /// Pick the page the extractor should run in
    pub async fn find_tab(&self, target: &TabTarget) -> Result<Page> {
        let pages = self.browser.pages().await?;
        tracing::debug!("CDP: {} pages open", pages.len());

        let mut first_page = None;
        for page in pages {
            let url = page.url().await?.unwrap_or_default();
            if url.starts_with("devtools://") {
                continue;
            }

            match target {
                TabTarget::UrlContains(needle) => {
                    if url.contains(needle.as_str()) {
                        return Ok(page);
                    }
                }
                TabTarget::Active => {
                    if is_visible(&page).await {
                        tracing::debug!("CDP: active tab is {}", url);
                        return Ok(page);
                    }
                    if first_page.is_none() {
                        first_page = Some(page);
                    }
                }
            }
        }

        match target {
            TabTarget::Active => first_page.ok_or_else(|| Error::TabNotFound("no open tabs".to_string())),
            TabTarget::UrlContains(needle) => Err(Error::TabNotFound(format!(
                "no tab address contains '{}'",
                needle
            ))),
        }
    }

    /// Serialize a tab's DOM together with its address and title
    pub async fn snapshot(&self, target: &TabTarget) -> Result<PageSnapshot> {
        let page = self.find_tab(target).await?;

        let url = page
            .url()
            .await?
            .ok_or_else(|| Error::Cdp("tab has no address".to_string()))?;
        check_scriptable(&url)?;

        let title = page.get_title().await?;
        let html = page.content().await?;
        tracing::debug!("CDP: snapshot of {} ({} bytes)", url, html.len());

        Ok(PageSnapshot::new(url, title, html))
    }
}

impl Drop for CdpSession {
    fn drop(&mut self) {
        self.handler_task.abort();
    }
}

#[async_trait]
impl TabScripting for CdpSession {
    async fn run_extractor(
        &self,
        target: &TabTarget,
    ) -> std::result::Result<Vec<LinkRecord>, AcquisitionError> {
        let snapshot = self.snapshot(target).await?;
        Ok(extractor::extract_from_snapshot(&snapshot))
    }
}

/// A Chrome debugging port; connects on first use
///
/// Connection failures surface as acquisition failures, the same as a tab
/// that cannot be scripted.
pub struct ChromeEndpoint {
    debugging_port: u16,
}

impl ChromeEndpoint {
    pub fn new(debugging_port: u16) -> Self {
        Self { debugging_port }
    }

    pub fn debugging_port(&self) -> u16 {
        self.debugging_port
    }
}

#[async_trait]
impl TabScripting for ChromeEndpoint {
    async fn run_extractor(
        &self,
        target: &TabTarget,
    ) -> std::result::Result<Vec<LinkRecord>, AcquisitionError> {
        let session = CdpSession::connect(self.debugging_port).await?;
        session.run_extractor(target).await
    }
}

async fn is_visible(page: &Page) -> bool {
    match page.evaluate("document.visibilityState").await {
        Ok(result) => result
            .into_value::<String>()
            .map(|state| state == "visible")
            .unwrap_or(false),
        Err(e) => {
            tracing::debug!("CDP: could not read visibility state: {}", e);
            false
        }
    }
}

/// Refuse pages the browser does not let extensions script
pub fn check_scriptable(url: &str) -> Result<()> {
    if RESTRICTED_PREFIXES.iter().any(|prefix| url.starts_with(prefix)) {
        return Err(Error::Browser(format!(
            "Cannot access contents of url \"{}\"",
            url
        )));
    }
    Ok(())
}
