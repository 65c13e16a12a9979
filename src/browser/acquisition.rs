use fantoccini::wd::TimeoutConfiguration;
use fantoccini::{Client, Locator};
use std::time::Duration;

use crate::browser::viewport::scroll_until_stable;
use crate::config::{ScraperConfig, ScrollConfig};
use crate::error::ScrapeError;

/// Extra time granted to the WebDriver before we stop waiting on navigation ourselves
const NAVIGATION_GRACE: Duration = Duration::from_secs(5);

/// Fragments of a navigation error that mean the browser was bounced around.
/// Narrower than the block signals: every WebDriver error reads "unknown error: ...".
const REDIRECT_ERROR_SIGNALS: [&str; 2] = ["too many", "redirect"];

/// Rendered state of a page, taken after scrolling
#[derive(Debug, Clone)]
pub struct PageSnapshot {
    /// URL the browser ended up on
    pub url: String,
    pub title: String,
    /// Rendered HTML source
    pub html: String,
    /// True when navigation timed out but the document root was present
    pub partial: bool,
}

/// Result of loading one listing page
#[derive(Debug)]
pub enum LoadOutcome {
    /// The page rendered, possibly partially
    Ready(PageSnapshot),
    /// The browser landed on a redirect, block or error page
    Redirected { url: String, title: String },
    /// Navigation timed out and not even the document root appeared
    TimedOut,
    /// Navigation or snapshotting failed outright
    Failed(ScrapeError),
}

/// Knobs for [`load`], derived from the run configuration
#[derive(Debug, Clone)]
pub struct LoadOptions {
    pub timeout: Duration,
    pub card_wait: Duration,
    /// Selector whose presence signals that product containers rendered
    pub card_marker: String,
    pub block_signals: Vec<String>,
    pub scroll: ScrollConfig,
}

impl LoadOptions {
    pub fn from_config(config: &ScraperConfig) -> Self {
        Self {
            timeout: config.page_load_timeout(),
            card_wait: config.card_wait(),
            card_marker: format!(
                r#"div[itemtype="{}"]"#,
                config.selectors.product_itemtype
            ),
            block_signals: config.block_signals.clone(),
            scroll: config.scroll.clone(),
        }
    }
}

/// Case-insensitive check of a title, URL or error message against the block signals
pub fn matches_block_signal(signals: &[String], text: &str) -> bool {
    let text = text.to_lowercase();
    signals
        .iter()
        .any(|signal| !signal.is_empty() && text.contains(&signal.to_lowercase()))
}

/// Timeouts for a session that only bound page loads
fn page_load_timeouts(timeout: Duration) -> TimeoutConfiguration {
    TimeoutConfiguration::new(None, Some(timeout), None)
}

/// A navigation error is a redirect only when its text says so; anything else is a failure
fn navigation_failure(url: &str, reason: String) -> LoadOutcome {
    let lowered = reason.to_lowercase();
    if REDIRECT_ERROR_SIGNALS
        .iter()
        .any(|signal| lowered.contains(signal))
    {
        ::log::warn!("Navigation to {} ended in a redirect: {}", url, reason);
        return LoadOutcome::Redirected {
            url: url.to_string(),
            title: String::new(),
        };
    }
    LoadOutcome::Failed(ScrapeError::Navigation {
        url: url.to_string(),
        reason,
    })
}

fn is_timeout_message(message: &str) -> bool {
    let message = message.to_lowercase();
    message.contains("timeout") || message.contains("timed out")
}

/// Loads `url` in the session and scrolls until lazy content stops appearing.
///
/// Never returns an error: every failure mode maps onto a [`LoadOutcome`].
pub async fn load(client: &Client, url: &str, options: &LoadOptions) -> LoadOutcome {
    if let Err(e) = client
        .update_timeouts(page_load_timeouts(options.timeout))
        .await
    {
        ::log::warn!("Could not set page load timeout: {}", e);
    }

    ::log::debug!("Loading page: {}", url);
    let mut partial = false;
    match tokio::time::timeout(options.timeout + NAVIGATION_GRACE, client.goto(url)).await {
        Ok(Ok(())) => {}
        Ok(Err(e)) if is_timeout_message(&e.to_string()) => {
            ::log::warn!("Page load timed out, continuing with partial content: {}", url);
            partial = true;
        }
        Ok(Err(e)) => return navigation_failure(url, e.to_string()),
        Err(_) => {
            ::log::warn!("WebDriver did not answer in time for {}, trying partial content", url);
            partial = true;
        }
    }

    let current_url = client
        .current_url()
        .await
        .map(|u| u.to_string())
        .unwrap_or_else(|_| url.to_string());
    let title = client.title().await.unwrap_or_default();

    if matches_block_signal(&options.block_signals, &title)
        || matches_block_signal(&options.block_signals, &current_url)
    {
        ::log::warn!(
            "Possible redirect or error page: url={} title={}",
            current_url,
            title
        );
        return LoadOutcome::Redirected {
            url: current_url,
            title,
        };
    }
    ::log::info!("Page loaded: {}", title);

    let root = client
        .wait()
        .at_most(options.timeout)
        .for_element(Locator::Css("body"))
        .await;
    if let Err(e) = root {
        if partial {
            ::log::error!("Timed out loading {} and no document body is present", url);
            return LoadOutcome::TimedOut;
        }
        ::log::warn!("Document body did not appear ({}), extracting best-effort", e);
    }

    match scroll_until_stable(client, &options.scroll).await {
        Ok(summary) => ::log::debug!(
            "Scrolling finished after {} probes at {}px",
            summary.probes,
            summary.final_height
        ),
        Err(e) => ::log::warn!("Scrolling failed, some products may be missing: {}", e),
    }

    if let Err(e) = client
        .wait()
        .at_most(options.card_wait)
        .for_element(Locator::Css(&options.card_marker))
        .await
    {
        ::log::warn!("No product containers appeared on {}: {}", url, e);
    }

    match client.source().await {
        Ok(html) => LoadOutcome::Ready(PageSnapshot {
            url: current_url,
            title,
            html,
            partial,
        }),
        Err(e) => LoadOutcome::Failed(e.into()),
    }
}
