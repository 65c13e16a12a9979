pub mod currency;
pub mod html;
pub mod locators;
pub mod product;

#[cfg(test)]
mod tests;

use scraper::Html;

use crate::config::SiteSelectors;
use crate::error::ScrapeError;
use crate::results::ProductRecord;

pub use locators::{Locators, STRATEGIES, Strategy, Trigger, locate_cards};
pub use product::{extract_records, project_card};

/// Extracts product records from rendered listing pages
#[derive(Debug, Clone)]
pub struct ProductParser {
    locators: Locators,
    origin: String,
}

impl ProductParser {
    /// Creates a parser for the given site markup, resolving relative URLs against `origin`
    pub fn new(selectors: &SiteSelectors, origin: &str) -> Result<Self, ScrapeError> {
        Ok(Self {
            locators: Locators::compile(selectors)?,
            origin: origin.trim_end_matches('/').to_string(),
        })
    }

    /// Parse a page source into records, unique by URL
    pub fn parse(&self, html: &str) -> Vec<ProductRecord> {
        let document = Html::parse_document(html);
        self.parse_document(&document)
    }

    /// Same as [`ProductParser::parse`] for an already parsed document
    pub fn parse_document(&self, document: &Html) -> Vec<ProductRecord> {
        extract_records(document, &self.locators, &self.origin)
    }

    pub fn origin(&self) -> &str {
        &self.origin
    }
}
