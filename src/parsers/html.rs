use scraper::{ElementRef, Selector};

/// Collapses runs of whitespace into single spaces and trims the ends
pub fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Rendered text of an element, whitespace-collapsed
pub fn element_text(element: ElementRef<'_>) -> String {
    collapse_whitespace(&element.text().collect::<String>())
}

/// Text of the first descendant of `scope` matching `selector`, if non-empty
pub fn first_text(scope: ElementRef<'_>, selector: &Selector) -> Option<String> {
    scope
        .select(selector)
        .next()
        .map(element_text)
        .filter(|text| !text.is_empty())
}

/// First non-empty attribute among `attrs` on the first descendant matching `selector`
pub fn first_attr(scope: ElementRef<'_>, selector: &Selector, attrs: &[&str]) -> Option<String> {
    let element = scope.select(selector).next()?;
    attrs
        .iter()
        .filter_map(|attr| element.value().attr(attr))
        .map(str::trim)
        .find(|value| !value.is_empty())
        .map(str::to_string)
}

/// Closest ancestor of `element` satisfying `predicate`
pub fn nearest_ancestor<'a, P>(element: ElementRef<'a>, predicate: P) -> Option<ElementRef<'a>>
where
    P: Fn(&ElementRef<'a>) -> bool,
{
    element
        .ancestors()
        .filter_map(ElementRef::wrap)
        .find(|ancestor| predicate(ancestor))
}
