pub mod browser;
pub mod config;
pub mod crawlers;
pub mod error;
pub mod export;
pub mod parsers;
pub mod results;
pub mod utils;

// Re-export commonly used types for convenience
pub use config::ScraperConfig;
pub use crawlers::{PageSource, PaginationConfig, Paginator, RunReport, StopReason};
pub use error::ScrapeError;
pub use export::ExportPaths;
pub use results::{PLACEHOLDER, ProductRecord};

use std::path::PathBuf;

use crawlers::WebDriverSource;

/// Main builder for harvesting a category listing
#[derive(Debug, Clone)]
pub struct Catalog {
    url: String,
    config: ScraperConfig,
}

impl Catalog {
    /// Create a builder for the listing at `url` with default settings
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            config: ScraperConfig::default(),
        }
    }

    /// Set the maximum number of listing pages to visit
    pub fn with_max_pages(mut self, max_pages: usize) -> Self {
        self.config.max_pages = max_pages;
        self
    }

    /// Set the pause between pages in seconds
    pub fn with_delay(mut self, seconds: u64) -> Self {
        self.config.inter_page_delay_secs = seconds;
        self
    }

    /// Set the page load timeout in seconds
    pub fn with_timeout(mut self, seconds: u64) -> Self {
        self.config.page_load_timeout_secs = seconds;
        self
    }

    pub fn with_headless(mut self, headless: bool) -> Self {
        self.config.headless = headless;
        self
    }

    pub fn with_webdriver_url(mut self, webdriver_url: impl Into<String>) -> Self {
        self.config.webdriver_url = webdriver_url.into();
        self
    }

    pub fn with_output_dir(mut self, output_dir: impl Into<PathBuf>) -> Self {
        self.config.output_dir = output_dir.into();
        self
    }

    /// Replace the whole configuration
    pub fn with_config(mut self, config: ScraperConfig) -> Self {
        self.config = config;
        self
    }

    /// Load configuration from a file
    pub fn with_config_file(self, path: impl AsRef<std::path::Path>) -> Result<Self, ScrapeError> {
        let config = ScraperConfig::from_file(path)?;
        Ok(self.with_config(config))
    }

    /// Load configuration from a string
    pub fn with_config_str(self, config_str: &str) -> Result<Self, ScrapeError> {
        let config = ScraperConfig::from_json(config_str)?;
        Ok(self.with_config(config))
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    pub fn config(&self) -> &ScraperConfig {
        &self.config
    }

    /// Origin relative product URLs resolve against
    pub fn origin(&self) -> Result<String, ScrapeError> {
        match &self.config.site_origin {
            Some(origin) => Ok(origin.clone()),
            None => utils::site_origin(&self.url),
        }
    }

    fn source(&self) -> Result<WebDriverSource, ScrapeError> {
        let mut config = self.config.clone();
        config.apply_env();
        WebDriverSource::new(config, &self.origin()?)
    }

    /// Walk every listing page and collect unique records
    pub async fn scrape(&self) -> Result<Vec<ProductRecord>, ScrapeError> {
        Ok(self.scrape_with_report().await?.records)
    }

    pub async fn scrape_with_report(&self) -> Result<RunReport, ScrapeError> {
        let source = self.source()?;
        let mut paginator = Paginator::new(source, PaginationConfig::from_config(&self.config));
        Ok(paginator.run_with_report(&self.url).await)
    }

    /// Scrape only the configured URL, without pagination
    pub async fn scrape_single_page(&self) -> Result<Vec<ProductRecord>, ScrapeError> {
        let mut source = self.source()?;
        source.fetch_page(&self.url).await
    }

    /// Write `records` in every export format into the configured output directory
    pub fn save(&self, records: &[ProductRecord]) -> Result<ExportPaths, ScrapeError> {
        export::save_all(records, &self.config.output_dir)
    }
}
