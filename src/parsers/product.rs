use scraper::{ElementRef, Html};
use std::collections::HashSet;

use crate::error::ScrapeError;
use crate::parsers::currency::resolve_currency;
use crate::parsers::html::{element_text, first_attr, first_text};
use crate::parsers::locators::{Locators, locate_cards};
use crate::results::{PLACEHOLDER, ProductRecord};
use crate::utils::resolve_product_url;

/// Projects one card into a record. Only a missing or unresolvable URL is an error.
pub fn project_card(
    card: ElementRef<'_>,
    locators: &Locators,
    origin: &str,
) -> Result<ProductRecord, ScrapeError> {
    let href = locators.url_of(card).ok_or(ScrapeError::MissingUrl)?;
    let url = resolve_product_url(&href, origin)?;

    let price_element = card.select(&locators.price).next();
    let price = price_element
        .map(element_text)
        .filter(|price| !price.is_empty());

    let placeholder = || PLACEHOLDER.to_string();
    Ok(ProductRecord {
        name: first_text(card, &locators.name).unwrap_or_else(placeholder),
        price: price.unwrap_or_else(placeholder),
        currency: resolve_currency(card, price_element, locators).unwrap_or_else(placeholder),
        url,
        instock_text: first_text(card, &locators.instock).unwrap_or_else(placeholder),
        instock_schema: first_attr(card, &locators.availability, &["href", "content"])
            .unwrap_or_else(placeholder),
    })
}

/// Locates the cards of a document and projects them, keeping the first record per URL
pub fn extract_records(document: &Html, locators: &Locators, origin: &str) -> Vec<ProductRecord> {
    let cards = locate_cards(document, locators);
    let mut seen_urls = HashSet::new();
    let mut records = Vec::with_capacity(cards.len());

    for (index, card) in cards.into_iter().enumerate() {
        let record = match project_card(card, locators, origin) {
            Ok(record) => record,
            Err(e) => {
                ::log::warn!("Skipping card {}: {}", index, e);
                continue;
            }
        };

        if !seen_urls.insert(record.url.clone()) {
            ::log::debug!("Skipping duplicate card: {}", record.url);
            continue;
        }

        ::log::trace!("Extracted {} ({})", record.name, record.url);
        records.push(record);
    }

    ::log::info!("Extracted {} products", records.len());
    records
}
