use std::collections::HashSet;
use std::time::Duration;

use crate::config::ScraperConfig;
use crate::crawlers::crawler::PageSource;
use crate::results::ProductRecord;
use crate::utils::paged_url;

/// Timing and stop limits for a paginated run
#[derive(Debug, Clone)]
pub struct PaginationConfig {
    pub max_pages: usize,
    pub inter_page_delay: Duration,
    pub throttle_backoff: Duration,
    /// Consecutive pages with no new URL after which the catalog is considered exhausted
    pub duplicate_page_limit: usize,
}

impl PaginationConfig {
    pub fn from_config(config: &ScraperConfig) -> Self {
        Self {
            max_pages: config.max_pages,
            inter_page_delay: config.inter_page_delay(),
            throttle_backoff: config.throttle_backoff(),
            duplicate_page_limit: config.duplicate_page_limit.max(1),
        }
    }
}

impl Default for PaginationConfig {
    fn default() -> Self {
        Self::from_config(&ScraperConfig::default())
    }
}

/// Records gathered so far, unique by URL in first-seen order
#[derive(Debug, Default)]
pub struct RunState {
    seen: HashSet<String>,
    records: Vec<ProductRecord>,
    duplicate_pages: usize,
}

impl RunState {
    /// Append the records whose URL has not been seen, returning how many were added.
    /// A page adding nothing advances the duplicate-page counter, any addition resets it.
    pub fn merge(&mut self, page: Vec<ProductRecord>) -> usize {
        let mut added = 0;
        for record in page {
            if self.seen.insert(record.url.clone()) {
                self.records.push(record);
                added += 1;
            }
        }

        if added == 0 {
            self.duplicate_pages += 1;
        } else {
            self.duplicate_pages = 0;
        }
        added
    }

    pub fn records(&self) -> &[ProductRecord] {
        &self.records
    }

    pub fn duplicate_pages(&self) -> usize {
        self.duplicate_pages
    }

    pub fn into_records(self) -> Vec<ProductRecord> {
        self.records
    }
}

/// Why a run ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopReason {
    /// A page yielded no records
    EmptyPage(usize),
    /// Pages stopped contributing new URLs
    DuplicatePages(usize),
    MaxPages,
}

#[derive(Debug)]
pub struct RunReport {
    pub records: Vec<ProductRecord>,
    pub pages_requested: usize,
    pub stop_reason: StopReason,
}

/// Walks `?page=N` listing pages until the catalog runs out
pub struct Paginator<S: PageSource> {
    source: S,
    config: PaginationConfig,
}

impl<S: PageSource> Paginator<S> {
    pub fn new(source: S, config: PaginationConfig) -> Self {
        Self { source, config }
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    /// Collect every unique record reachable from `base_url`
    pub async fn run(&mut self, base_url: &str) -> Vec<ProductRecord> {
        self.run_with_report(base_url).await.records
    }

    pub async fn run_with_report(&mut self, base_url: &str) -> RunReport {
        let mut state = RunState::default();
        let mut stop_reason = StopReason::MaxPages;
        let mut pages_requested = 0;

        for page in 0..self.config.max_pages {
            let url = paged_url(base_url, page);
            ::log::info!("Scraping page {}: {}", page, url);
            pages_requested += 1;

            match self.source.fetch_page(&url).await {
                Ok(records) => {
                    if records.is_empty() {
                        ::log::info!("No products on page {}, stopping", page);
                        stop_reason = StopReason::EmptyPage(page);
                        break;
                    }

                    let found = records.len();
                    let added = state.merge(records);
                    if added > 0 {
                        ::log::info!(
                            "Page {}: {} products, {} new (total {})",
                            page,
                            found,
                            added,
                            state.records().len()
                        );
                    } else {
                        ::log::info!("Page {}: all {} products already collected", page, found);
                        if page > 0 && state.duplicate_pages() >= self.config.duplicate_page_limit {
                            ::log::info!("Probably reached the end of the catalog");
                            stop_reason = StopReason::DuplicatePages(page);
                            break;
                        }
                    }

                    if page + 1 < self.config.max_pages {
                        pause(self.config.inter_page_delay).await;
                    }
                }
                Err(e) => {
                    ::log::error!("Failed to scrape page {}: {}", page, e);
                    let backoff = if e.is_throttle_like() {
                        ::log::warn!(
                            "Redirect or throttling suspected, waiting {}s",
                            self.config.throttle_backoff.as_secs()
                        );
                        self.config.throttle_backoff
                    } else {
                        self.config.inter_page_delay
                    };
                    pause(backoff).await;
                }
            }
        }

        ::log::info!(
            "Collected {} unique products from {} pages ({:?})",
            state.records().len(),
            pages_requested,
            stop_reason
        );

        RunReport {
            records: state.into_records(),
            pages_requested,
            stop_reason,
        }
    }
}

async fn pause(duration: Duration) {
    if !duration.is_zero() {
        tokio::time::sleep(duration).await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ScrapeError;

    enum FakePage {
        Records(Vec<&'static str>),
        Fail(&'static str),
    }

    /// Serves canned pages by request order
    struct FakeSource {
        pages: Vec<FakePage>,
        requested: Vec<String>,
    }

    impl FakeSource {
        fn new(pages: Vec<FakePage>) -> Self {
            Self {
                pages,
                requested: Vec::new(),
            }
        }
    }

    impl PageSource for FakeSource {
        async fn fetch_page(&mut self, url: &str) -> Result<Vec<ProductRecord>, ScrapeError> {
            let index = self.requested.len();
            self.requested.push(url.to_string());
            match self.pages.get(index) {
                Some(FakePage::Records(urls)) => {
                    Ok(urls.iter().map(|u| ProductRecord::new(u.to_string())).collect())
                }
                Some(FakePage::Fail(message)) => Err(ScrapeError::Session(message.to_string())),
                None => Ok(Vec::new()),
            }
        }
    }

    fn config(max_pages: usize) -> PaginationConfig {
        PaginationConfig {
            max_pages,
            inter_page_delay: Duration::ZERO,
            throttle_backoff: Duration::ZERO,
            duplicate_page_limit: 1,
        }
    }

    fn urls(records: &[ProductRecord]) -> Vec<&str> {
        records.iter().map(|r| r.url.as_str()).collect()
    }

    #[tokio::test]
    async fn test_duplicate_page_stops_run() {
        let source = FakeSource::new(vec![
            FakePage::Records(vec!["a", "b"]),
            FakePage::Records(vec!["a", "b"]),
            FakePage::Records(vec!["c"]),
        ]);
        let mut paginator = Paginator::new(source, config(10));

        let report = paginator.run_with_report("https://shop.test/category?sort=0").await;

        assert_eq!(urls(&report.records), ["a", "b"]);
        assert_eq!(report.stop_reason, StopReason::DuplicatePages(1));
        assert_eq!(paginator.source().requested.len(), 2);
    }

    #[tokio::test]
    async fn test_empty_page_stops_run() {
        let source = FakeSource::new(vec![
            FakePage::Records(vec!["a"]),
            FakePage::Records(vec![]),
            FakePage::Records(vec!["b"]),
        ]);
        let mut paginator = Paginator::new(source, config(10));

        let report = paginator.run_with_report("https://shop.test/category").await;

        assert_eq!(urls(&report.records), ["a"]);
        assert_eq!(report.stop_reason, StopReason::EmptyPage(1));
    }

    #[tokio::test]
    async fn test_empty_first_page_yields_nothing() {
        let mut paginator = Paginator::new(FakeSource::new(vec![]), config(5));
        assert!(paginator.run("https://shop.test/category").await.is_empty());
        assert_eq!(paginator.source().requested.len(), 1);
    }

    #[tokio::test]
    async fn test_merges_across_pages_in_first_seen_order() {
        let source = FakeSource::new(vec![
            FakePage::Records(vec!["a", "b"]),
            FakePage::Records(vec!["b", "c"]),
            FakePage::Records(vec!["d", "a"]),
        ]);
        let mut paginator = Paginator::new(source, config(10));

        let records = paginator.run("https://shop.test/category").await;
        assert_eq!(urls(&records), ["a", "b", "c", "d"]);
    }

    #[tokio::test]
    async fn test_failed_page_is_skipped() {
        let source = FakeSource::new(vec![
            FakePage::Records(vec!["a"]),
            FakePage::Fail("HTTP 429 too many requests"),
            FakePage::Records(vec!["b"]),
        ]);
        let mut paginator = Paginator::new(source, config(10));

        let report = paginator.run_with_report("https://shop.test/category").await;

        assert_eq!(urls(&report.records), ["a", "b"]);
        assert_eq!(report.stop_reason, StopReason::EmptyPage(3));
        assert_eq!(report.pages_requested, 4);
    }

    #[tokio::test]
    async fn test_max_pages_bounds_run() {
        let source = FakeSource::new(vec![
            FakePage::Records(vec!["a"]),
            FakePage::Records(vec!["b"]),
            FakePage::Records(vec!["c"]),
        ]);
        let mut paginator = Paginator::new(source, config(2));

        let report = paginator.run_with_report("https://shop.test/category").await;

        assert_eq!(urls(&report.records), ["a", "b"]);
        assert_eq!(report.stop_reason, StopReason::MaxPages);
        assert_eq!(paginator.source().requested.len(), 2);
    }

    #[tokio::test]
    async fn test_requests_numbered_pages_from_zero() {
        let source = FakeSource::new(vec![
            FakePage::Records(vec!["a"]),
            FakePage::Records(vec!["b"]),
        ]);
        let mut paginator = Paginator::new(source, config(10));
        paginator.run("https://shop.test/category?sort=0").await;

        assert_eq!(
            paginator.source().requested,
            [
                "https://shop.test/category?sort=0&page=0",
                "https://shop.test/category?sort=0&page=1",
                "https://shop.test/category?sort=0&page=2",
            ]
        );
    }

    #[tokio::test]
    async fn test_duplicate_limit_allows_recovery() {
        let source = FakeSource::new(vec![
            FakePage::Records(vec!["a"]),
            FakePage::Records(vec!["a"]),
            FakePage::Records(vec!["b"]),
            FakePage::Records(vec!["b"]),
            FakePage::Records(vec!["a"]),
        ]);
        let mut paginator = Paginator::new(
            source,
            PaginationConfig {
                duplicate_page_limit: 2,
                ..config(10)
            },
        );

        let report = paginator.run_with_report("https://shop.test/category").await;

        assert_eq!(urls(&report.records), ["a", "b"]);
        assert_eq!(report.stop_reason, StopReason::DuplicatePages(4));
    }

    #[test]
    fn test_run_state_counts_duplicate_pages() {
        let mut state = RunState::default();
        assert_eq!(state.merge(vec![ProductRecord::new("a".to_string())]), 1);
        assert_eq!(state.merge(vec![ProductRecord::new("a".to_string())]), 0);
        assert_eq!(state.duplicate_pages(), 1);
        assert_eq!(state.merge(vec![ProductRecord::new("b".to_string())]), 1);
        assert_eq!(state.duplicate_pages(), 0);
        assert_eq!(state.into_records().len(), 2);
    }

    #[test]
    fn test_config_from_scraper_config() {
        let scraper = ScraperConfig {
            max_pages: 7,
            duplicate_page_limit: 0,
            ..ScraperConfig::default()
        };
        let config = PaginationConfig::from_config(&scraper);
        assert_eq!(config.max_pages, 7);
        assert_eq!(config.duplicate_page_limit, 1);
        assert_eq!(config.throttle_backoff, Duration::from_secs(10));
    }
}
