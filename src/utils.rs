use url::Url;

use crate::error::ScrapeError;

/// Append the zero-based `page` parameter to a listing URL
pub fn paged_url(base_url: &str, page: usize) -> String {
    let separator = if base_url.contains('?') { '&' } else { '?' };
    format!("{}{}page={}", base_url, separator, page)
}

/// Scheme and host of a URL, e.g. `https://www.divan.ru`
pub fn site_origin(url: &str) -> Result<String, ScrapeError> {
    let parsed = Url::parse(url).map_err(|e| ScrapeError::UrlResolution {
        url: url.to_string(),
        reason: e.to_string(),
    })?;
    Ok(parsed.origin().ascii_serialization())
}

/// Make a product href absolute against the site origin
pub fn resolve_product_url(href: &str, origin: &str) -> Result<String, ScrapeError> {
    let href = href.trim();
    if href.is_empty() {
        return Err(ScrapeError::MissingUrl);
    }

    if href.starts_with("http://") || href.starts_with("https://") {
        return Url::parse(href)
            .map(|url| url.to_string())
            .map_err(|e| ScrapeError::UrlResolution {
                url: href.to_string(),
                reason: e.to_string(),
            });
    }

    let base = Url::parse(origin).map_err(|e| ScrapeError::UrlResolution {
        url: origin.to_string(),
        reason: format!("invalid origin: {}", e),
    })?;

    let relative = if href.starts_with('/') {
        href.to_string()
    } else {
        format!("/{}", href)
    };

    base.join(&relative)
        .map(|url| url.to_string())
        .map_err(|e| ScrapeError::UrlResolution {
            url: href.to_string(),
            reason: e.to_string(),
        })
}
