use thiserror::Error;

/// Errors raised by the harvester
#[derive(Debug, Error)]
pub enum ScrapeError {
    /// A WebDriver command failed
    #[error("webdriver command failed: {0}")]
    WebDriver(#[from] fantoccini::error::CmdError),

    /// No WebDriver session could be opened
    #[error("could not open a webdriver session: {0}")]
    Session(String),

    /// Navigation failed for a reason other than a timeout
    #[error("navigation to {url} failed: {reason}")]
    Navigation { url: String, reason: String },

    /// A configured CSS selector does not compile
    #[error("invalid selector '{selector}': {reason}")]
    Selector { selector: String, reason: String },

    /// A configured class pattern does not compile
    #[error("invalid pattern: {0}")]
    Pattern(#[from] regex::Error),

    /// A card carries no product URL
    #[error("card has no product url")]
    MissingUrl,

    /// A product URL could not be made absolute
    #[error("cannot resolve url '{url}': {reason}")]
    UrlResolution { url: String, reason: String },

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("csv error: {0}")]
    Csv(#[from] csv::Error),

    #[error("spreadsheet error: {0}")]
    Spreadsheet(#[from] rust_xlsxwriter::XlsxError),
}

impl ScrapeError {
    /// Redirect or throttle style failures deserve a longer pause before the next page
    pub fn is_throttle_like(&self) -> bool {
        let message = self.to_string().to_lowercase();
        ["redirect", "too many", "throttl", "429"]
            .iter()
            .any(|term| message.contains(term))
    }
}
