use crate::error::ScrapeError;
use crate::results::ProductRecord;

/// Something that turns a listing page URL into product records
#[allow(async_fn_in_trait)]
pub trait PageSource {
    /// Fetch one page and extract its records.
    ///
    /// `Ok` with no records means the page has no data (empty, redirected or
    /// timed out); `Err` is reserved for failures worth retrying on the next page.
    async fn fetch_page(&mut self, url: &str) -> Result<Vec<ProductRecord>, ScrapeError>;
}
