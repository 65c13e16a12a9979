//! Card locator strategies.
//!
//! The storefront marks its product cards in several partly redundant ways
//! (an obfuscated class, schema.org microdata, looser class names), none of
//! which is reliable on its own. Each strategy below is a pure function over
//! the parsed document; [`locate_cards`] runs them in order and keeps the
//! first acceptable result.

use regex::Regex;
use scraper::{ElementRef, Html, Selector};
use std::collections::HashSet;

use crate::config::SiteSelectors;
use crate::error::ScrapeError;
use crate::parsers::html::{first_attr, nearest_ancestor};

/// Compiled form of [`SiteSelectors`]
#[derive(Debug, Clone)]
pub struct Locators {
    pub card: Selector,
    pub card_class: String,
    pub card_class_stem: String,
    pub card_like: Regex,
    pub container_like: Regex,
    pub url_link: Selector,
    pub name: Selector,
    pub product_itemtype: String,
    pub product_container: Selector,
    pub price: Selector,
    pub currency_meta: Selector,
    pub currency_marker: Selector,
    pub instock: Selector,
    pub availability: Selector,
    pub generic_card: Selector,
    pub itemtype_any: Selector,
    pub itemprop_any: Selector,
}

fn compile_selector(selector: &str) -> Result<Selector, ScrapeError> {
    Selector::parse(selector).map_err(|e| ScrapeError::Selector {
        selector: selector.to_string(),
        reason: format!("{:?}", e),
    })
}

impl Locators {
    /// Compile every selector and class pattern of the site configuration
    pub fn compile(selectors: &SiteSelectors) -> Result<Self, ScrapeError> {
        Ok(Self {
            card: compile_selector(&format!("div.{}", selectors.card_class))?,
            card_class: selectors.card_class.clone(),
            card_class_stem: selectors.card_class_stem.clone(),
            card_like: Regex::new(&selectors.card_like_pattern)?,
            container_like: Regex::new(&selectors.container_like_pattern)?,
            url_link: compile_selector(&selectors.url_link)?,
            name: compile_selector(&selectors.name)?,
            product_itemtype: selectors.product_itemtype.clone(),
            product_container: compile_selector(&format!(
                r#"div[itemtype="{}"]"#,
                selectors.product_itemtype
            ))?,
            price: compile_selector(&selectors.price)?,
            currency_meta: compile_selector(&selectors.currency_meta)?,
            currency_marker: compile_selector(&selectors.currency_marker)?,
            instock: compile_selector(&selectors.instock)?,
            availability: compile_selector(&selectors.availability)?,
            generic_card: compile_selector(&selectors.generic_card)?,
            itemtype_any: compile_selector("[itemtype]")?,
            itemprop_any: compile_selector("[itemprop]")?,
        })
    }

    /// Card class itself, or any class sharing its stable stem
    fn has_card_class(&self, element: &ElementRef<'_>) -> bool {
        element.value().classes().any(|class| {
            class == self.card_class
                || (!self.card_class_stem.is_empty() && class.starts_with(&self.card_class_stem))
        })
    }

    fn is_product_container(&self, element: &ElementRef<'_>) -> bool {
        is_div(element)
            && element
                .value()
                .attr("itemtype")
                .is_some_and(|itemtype| itemtype.trim() == self.product_itemtype)
    }

    /// First product URL inside `scope`, as written in the markup
    pub fn url_of(&self, scope: ElementRef<'_>) -> Option<String> {
        first_attr(scope, &self.url_link, &["href"])
    }
}

fn is_div(element: &ElementRef<'_>) -> bool {
    element.value().name() == "div"
}

fn class_matches(element: &ElementRef<'_>, pattern: &Regex) -> bool {
    element
        .value()
        .attr("class")
        .is_some_and(|class| pattern.is_match(class))
}

/// A function returning candidate card elements of a document
pub type LocateFn = for<'a> fn(&'a Html, &Locators) -> Vec<ElementRef<'a>>;

/// When a strategy is consulted
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Trigger {
    /// Only while no cards were found; any result is accepted
    WhenEmpty,
    /// While at most one card was found; accepted only if it finds more
    WhenAmbiguous,
}

/// One entry of the locator chain
#[derive(Clone, Copy)]
pub struct Strategy {
    pub name: &'static str,
    pub trigger: Trigger,
    pub locate: LocateFn,
}

/// The locator chain, most specific marker first
pub const STRATEGIES: [Strategy; 5] = [
    Strategy {
        name: "card class",
        trigger: Trigger::WhenEmpty,
        locate: by_card_class,
    },
    Strategy {
        name: "url link ascent",
        trigger: Trigger::WhenEmpty,
        locate: by_url_link_ascent,
    },
    Strategy {
        name: "product microdata",
        trigger: Trigger::WhenEmpty,
        locate: by_product_microdata,
    },
    Strategy {
        name: "name ascent",
        trigger: Trigger::WhenAmbiguous,
        locate: by_name_ascent,
    },
    Strategy {
        name: "generic card",
        trigger: Trigger::WhenEmpty,
        locate: by_generic_card,
    },
];

/// Cards carrying the obfuscated card class
pub fn by_card_class<'a>(document: &'a Html, locators: &Locators) -> Vec<ElementRef<'a>> {
    document.select(&locators.card).collect()
}

/// Microdata URL links walked up to their card, one card per distinct URL
pub fn by_url_link_ascent<'a>(document: &'a Html, locators: &Locators) -> Vec<ElementRef<'a>> {
    let mut seen_urls = HashSet::new();
    let mut cards = Vec::new();

    for link in document.select(&locators.url_link) {
        let Some(href) = link.value().attr("href").map(str::trim) else {
            continue;
        };
        if href.is_empty() || !seen_urls.insert(href.to_string()) {
            continue;
        }

        let card = nearest_ancestor(link, |el| is_div(el) && locators.has_card_class(el))
            .or_else(|| nearest_ancestor(link, |el| is_div(el) && class_matches(el, &locators.card_like)));

        match card {
            Some(card) => cards.push(card),
            None => ::log::trace!("No card-like ancestor for {}", href),
        }
    }

    cards
}

/// Generic schema.org Product containers
pub fn by_product_microdata<'a>(document: &'a Html, locators: &Locators) -> Vec<ElementRef<'a>> {
    document.select(&locators.product_container).collect()
}

/// Name elements walked up to their product container, one per distinct URL
pub fn by_name_ascent<'a>(document: &'a Html, locators: &Locators) -> Vec<ElementRef<'a>> {
    let mut seen_urls = HashSet::new();
    let mut cards = Vec::new();

    for name in document.select(&locators.name) {
        let container = nearest_ancestor(name, |el| locators.is_product_container(el)).or_else(
            || nearest_ancestor(name, |el| is_div(el) && class_matches(el, &locators.container_like)),
        );
        let Some(container) = container else {
            continue;
        };
        let Some(url) = locators.url_of(container) else {
            continue;
        };
        if seen_urls.insert(url) {
            cards.push(container);
        }
    }

    cards
}

/// Last resort: the generic card class
pub fn by_generic_card<'a>(document: &'a Html, locators: &Locators) -> Vec<ElementRef<'a>> {
    document.select(&locators.generic_card).collect()
}

/// Runs the locator chain over `document` and returns the chosen cards
pub fn locate_cards<'a>(document: &'a Html, locators: &Locators) -> Vec<ElementRef<'a>> {
    let mut cards: Vec<ElementRef<'a>> = Vec::new();

    for strategy in STRATEGIES.iter() {
        let consult = match strategy.trigger {
            Trigger::WhenEmpty => cards.is_empty(),
            Trigger::WhenAmbiguous => cards.len() <= 1,
        };
        if !consult {
            continue;
        }

        let found = (strategy.locate)(document, locators);
        ::log::debug!("Strategy '{}' found {} cards", strategy.name, found.len());

        let accept = match strategy.trigger {
            Trigger::WhenEmpty => !found.is_empty(),
            Trigger::WhenAmbiguous => found.len() > cards.len(),
        };
        if accept {
            ::log::debug!("Using cards from strategy '{}'", strategy.name);
            cards = found;
        }
    }

    if cards.len() <= 1 {
        log_diagnostics(document, locators, cards.len());
    }

    ::log::info!("Found {} product cards", cards.len());
    cards
}

/// Logs marker counts when the chain comes back (nearly) empty, to help update selectors
fn log_diagnostics(document: &Html, locators: &Locators, found: usize) {
    ::log::warn!(
        "Only {} product cards located: {} name elements, {} itemtype elements, {} itemprop elements, {} url links",
        found,
        document.select(&locators.name).count(),
        document.select(&locators.itemtype_any).count(),
        document.select(&locators.itemprop_any).count(),
        document.select(&locators.url_link).count(),
    );
}
