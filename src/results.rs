use serde::{Deserialize, Serialize};

/// Value stored in any field the page did not provide
pub const PLACEHOLDER: &str = "нет данных";

/// One product listing scraped from a category page
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductRecord {
    /// Product title
    pub name: String,

    /// Displayed price, whitespace-normalized
    pub price: String,

    /// Currency symbol or code
    pub currency: String,

    /// Absolute product URL, the identity of the record
    pub url: String,

    /// Availability as shown to the shopper
    pub instock_text: String,

    /// schema.org availability URI
    pub instock_schema: String,
}

impl ProductRecord {
    /// Create a record for `url` with every other field set to the placeholder
    pub fn new(url: String) -> Self {
        Self {
            name: PLACEHOLDER.to_string(),
            price: PLACEHOLDER.to_string(),
            currency: PLACEHOLDER.to_string(),
            url,
            instock_text: PLACEHOLDER.to_string(),
            instock_schema: PLACEHOLDER.to_string(),
        }
    }

    /// Field values in export column order
    pub fn fields(&self) -> [&str; 6] {
        [
            &self.name,
            &self.price,
            &self.currency,
            &self.url,
            &self.instock_text,
            &self.instock_schema,
        ]
        .map(|value| or_placeholder(value))
    }
}

/// Substitute the placeholder for empty values
pub fn or_placeholder(value: &str) -> &str {
    if value.trim().is_empty() {
        PLACEHOLDER
    } else {
        value
    }
}
