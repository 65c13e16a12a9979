use scraper::ElementRef;

use crate::parsers::html::{first_attr, first_text};
use crate::parsers::locators::Locators;

/// Display symbol for an ISO currency code; unknown codes pass through unchanged
pub fn currency_symbol(code: &str) -> String {
    let code = code.trim();
    match code {
        "RUB" => "руб.".to_string(),
        "USD" => "$".to_string(),
        "EUR" => "€".to_string(),
        _ => code.to_string(),
    }
}

/// Currency of a card: microdata code first, then the marker span inside the
/// price, then a marker span anywhere in the card
pub fn resolve_currency(
    card: ElementRef<'_>,
    price: Option<ElementRef<'_>>,
    locators: &Locators,
) -> Option<String> {
    if let Some(code) = first_attr(card, &locators.currency_meta, &["content"]) {
        return Some(currency_symbol(&code));
    }

    price
        .and_then(|price| first_text(price, &locators.currency_marker))
        .or_else(|| first_text(card, &locators.currency_marker))
}
