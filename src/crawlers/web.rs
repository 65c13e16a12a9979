use crate::browser::{LoadOptions, LoadOutcome, load, with_session};
use crate::config::ScraperConfig;
use crate::crawlers::crawler::PageSource;
use crate::error::ScrapeError;
use crate::parsers::ProductParser;
use crate::results::ProductRecord;

/// Page source backed by a WebDriver browser, one fresh session per page
pub struct WebDriverSource {
    config: ScraperConfig,
    options: LoadOptions,
    parser: ProductParser,
}

impl WebDriverSource {
    /// Create a source resolving relative product URLs against `origin`
    pub fn new(config: ScraperConfig, origin: &str) -> Result<Self, ScrapeError> {
        let parser = ProductParser::new(&config.selectors, origin)?;
        let options = LoadOptions::from_config(&config);
        Ok(Self {
            config,
            options,
            parser,
        })
    }

    pub fn parser(&self) -> &ProductParser {
        &self.parser
    }
}

/// Records of one loaded page. Redirects and timeouts count as a page without data;
/// a failed load is an error for the caller to back off from.
fn outcome_records(
    outcome: LoadOutcome,
    parser: &ProductParser,
) -> Result<Vec<ProductRecord>, ScrapeError> {
    match outcome {
        LoadOutcome::Ready(snapshot) => {
            if snapshot.partial {
                ::log::warn!(
                    "Extracting from a partially loaded page: {} ({})",
                    snapshot.url,
                    snapshot.title
                );
            } else {
                ::log::debug!("Extracting from {} ({})", snapshot.url, snapshot.title);
            }
            Ok(parser.parse(&snapshot.html))
        }
        LoadOutcome::Redirected { url, title } => {
            ::log::warn!("Redirected to {} ({}), treating page as empty", url, title);
            Ok(Vec::new())
        }
        LoadOutcome::TimedOut => {
            ::log::warn!("Page timed out, treating it as empty");
            Ok(Vec::new())
        }
        LoadOutcome::Failed(e) => Err(e),
    }
}

impl PageSource for WebDriverSource {
    async fn fetch_page(&mut self, url: &str) -> Result<Vec<ProductRecord>, ScrapeError> {
        let started = std::time::Instant::now();
        let options = &self.options;

        let outcome = with_session(&self.config, |client| async move {
            load(&client, url, options).await
        })
        .await?;

        let records = outcome_records(outcome, &self.parser)?;

        ::log::debug!(
            "Processed {} in {:.2} seconds",
            url,
            started.elapsed().as_secs_f64()
        );
        Ok(records)
    }
}
