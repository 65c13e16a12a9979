use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::Read;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::error::ScrapeError;

/// Configuration for a harvesting run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScraperConfig {
    /// URL for the WebDriver instance
    #[serde(default = "default_webdriver_url")]
    pub webdriver_url: String,

    /// Run the browser without a window
    #[serde(default = "default_headless")]
    pub headless: bool,

    /// User agent presented to the storefront
    #[serde(default = "default_user_agent")]
    pub user_agent: String,

    /// Page load timeout in seconds
    #[serde(default = "default_page_load_timeout")]
    pub page_load_timeout_secs: u64,

    /// How long to wait for product containers after scrolling
    #[serde(default = "default_card_wait")]
    pub card_wait_secs: u64,

    /// Maximum number of listing pages to visit
    #[serde(default = "default_max_pages")]
    pub max_pages: usize,

    /// Pause between two successful pages, in seconds
    #[serde(default = "default_inter_page_delay")]
    pub inter_page_delay_secs: u64,

    /// Pause after a redirect or throttle style failure, in seconds
    #[serde(default = "default_throttle_backoff")]
    pub throttle_backoff_secs: u64,

    /// Consecutive all-duplicate pages that end the run
    #[serde(default = "default_duplicate_page_limit")]
    pub duplicate_page_limit: usize,

    /// Origin used to absolutize relative product URLs (derived from the start URL if unset)
    #[serde(default)]
    pub site_origin: Option<String>,

    /// Directory the exporters write into
    #[serde(default = "default_output_dir")]
    pub output_dir: PathBuf,

    /// Case-insensitive title/URL fragments that mark a redirect or error page
    #[serde(default = "default_block_signals")]
    pub block_signals: Vec<String>,

    #[serde(default)]
    pub scroll: ScrollConfig,

    #[serde(default)]
    pub selectors: SiteSelectors,
}

/// Tuning for the lazy-loading scroll loop
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScrollConfig {
    /// Pause after each scroll to the bottom, in milliseconds
    #[serde(default = "default_scroll_pause")]
    pub pause_ms: u64,

    /// Pause around each supplementary nudge, in milliseconds
    #[serde(default = "default_nudge_pause")]
    pub nudge_pause_ms: u64,

    /// Pixels scrolled by a nudge
    #[serde(default = "default_nudge_px")]
    pub nudge_px: i64,

    /// Consecutive probes without height growth before the page counts as loaded
    #[serde(default = "default_max_idle_probes")]
    pub max_idle_probes: usize,

    /// Hard cap on probes, for pages that keep growing
    #[serde(default = "default_max_total_probes")]
    pub max_total_probes: usize,

    /// Pause after scrolling back to the top, in milliseconds
    #[serde(default = "default_settle")]
    pub settle_ms: u64,
}

/// Selectors and class names specific to the storefront markup.
///
/// The obfuscated class names change whenever the site is rebuilt; update
/// them here rather than in the locator code.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SiteSelectors {
    /// Obfuscated class of a product card
    pub card_class: String,
    /// Stable prefix of the card class, survives hash changes
    pub card_class_stem: String,
    /// Regex over the class attribute for loosely card-like ancestors
    pub card_like_pattern: String,
    /// Regex over the class attribute used when ascending from a name element
    pub container_like_pattern: String,
    /// Microdata link carrying the product URL
    pub url_link: String,
    /// Microdata element carrying the product name
    pub name: String,
    /// itemtype of a schema.org product container
    pub product_itemtype: String,
    /// Displayed price
    pub price: String,
    /// Microdata meta carrying the ISO currency code
    pub currency_meta: String,
    /// Span holding the currency symbol next to the price
    pub currency_marker: String,
    /// Availability text
    pub instock: String,
    /// Microdata availability URI
    pub availability: String,
    /// Last-resort card selector
    pub generic_card: String,
}

impl Default for ScraperConfig {
    fn default() -> Self {
        Self {
            webdriver_url: default_webdriver_url(),
            headless: default_headless(),
            user_agent: default_user_agent(),
            page_load_timeout_secs: default_page_load_timeout(),
            card_wait_secs: default_card_wait(),
            max_pages: default_max_pages(),
            inter_page_delay_secs: default_inter_page_delay(),
            throttle_backoff_secs: default_throttle_backoff(),
            duplicate_page_limit: default_duplicate_page_limit(),
            site_origin: None,
            output_dir: default_output_dir(),
            block_signals: default_block_signals(),
            scroll: ScrollConfig::default(),
            selectors: SiteSelectors::default(),
        }
    }
}

impl Default for ScrollConfig {
    fn default() -> Self {
        Self {
            pause_ms: default_scroll_pause(),
            nudge_pause_ms: default_nudge_pause(),
            nudge_px: default_nudge_px(),
            max_idle_probes: default_max_idle_probes(),
            max_total_probes: default_max_total_probes(),
            settle_ms: default_settle(),
        }
    }
}

impl Default for SiteSelectors {
    fn default() -> Self {
        Self {
            card_class: "ProductCardMain_card__KQzzn".to_string(),
            card_class_stem: "ProductCardMain_card".to_string(),
            card_like_pattern: "Product|Card".to_string(),
            container_like_pattern: "Product|Card|Item".to_string(),
            url_link: r#"link[itemprop="url"]"#.to_string(),
            name: r#"div[itemprop="name"]"#.to_string(),
            product_itemtype: "http://schema.org/Product".to_string(),
            price: r#"span[data-testid="price"]"#.to_string(),
            currency_meta: r#"meta[itemprop="priceCurrency"]"#.to_string(),
            currency_marker: r#"span[class*="ui-XXdez"]"#.to_string(),
            instock: "div.MainInfo_count__MmnNN".to_string(),
            availability: r#"[itemprop="availability"]"#.to_string(),
            generic_card: "div.ProductCard".to_string(),
        }
    }
}

impl ScraperConfig {
    /// Load configuration from a file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ScrapeError> {
        let mut file = File::open(path)?;
        let mut contents = String::new();
        file.read_to_string(&mut contents)?;

        Self::from_json(&contents)
    }

    /// Load configuration from a JSON string
    pub fn from_json(json: &str) -> Result<Self, ScrapeError> {
        let config: Self = serde_json::from_str(json)?;
        Ok(config)
    }

    /// Override the WebDriver URL with the WEBDRIVER_URL environment variable if set
    pub fn apply_env(&mut self) {
        if let Ok(webdriver_url) = std::env::var("WEBDRIVER_URL") {
            if !webdriver_url.is_empty() {
                self.webdriver_url = webdriver_url;
            }
        }
    }

    pub fn page_load_timeout(&self) -> Duration {
        Duration::from_secs(self.page_load_timeout_secs)
    }

    pub fn card_wait(&self) -> Duration {
        Duration::from_secs(self.card_wait_secs)
    }

    pub fn inter_page_delay(&self) -> Duration {
        Duration::from_secs(self.inter_page_delay_secs)
    }

    pub fn throttle_backoff(&self) -> Duration {
        Duration::from_secs(self.throttle_backoff_secs)
    }
}

fn default_webdriver_url() -> String {
    "http://localhost:4444".to_string()
}

fn default_headless() -> bool {
    true
}

fn default_user_agent() -> String {
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) \
     Chrome/120.0.0.0 Safari/537.36"
        .to_string()
}

fn default_page_load_timeout() -> u64 {
    60
}

fn default_card_wait() -> u64 {
    10
}

fn default_max_pages() -> usize {
    50
}

fn default_inter_page_delay() -> u64 {
    3
}

fn default_throttle_backoff() -> u64 {
    10
}

fn default_duplicate_page_limit() -> usize {
    1
}

fn default_output_dir() -> PathBuf {
    PathBuf::from("output")
}

fn default_block_signals() -> Vec<String> {
    vec![
        "too many".to_string(),
        "redirect".to_string(),
        "error".to_string(),
    ]
}

fn default_scroll_pause() -> u64 {
    2000
}

fn default_nudge_pause() -> u64 {
    1000
}

fn default_nudge_px() -> i64 {
    500
}

fn default_max_idle_probes() -> usize {
    10
}

fn default_max_total_probes() -> usize {
    60
}

fn default_settle() -> u64 {
    1000
}
