//! URL handling for the catalog crawl
//!
//! Base URL normalization, page URL construction and image path resolution.
//! Page and image URLs are built by string concatenation against the
//! normalized base, mirroring how the catalog lays out its links.

use crate::{UrlError, UrlResult};
use url::Url;

/// Validates a base URL and strips any trailing slashes
///
/// # Example
///
/// ```
/// use catalog_harvest::url::normalize_base_url;
///
/// let base = normalize_base_url("https://books.toscrape.com/").unwrap();
/// assert_eq!(base, "https://books.toscrape.com");
/// ```
pub fn normalize_base_url(raw: &str) -> UrlResult<String> {
    let trimmed = raw.trim();
    let parsed = Url::parse(trimmed).map_err(|e| UrlError::Parse(format!("{}: {}", trimmed, e)))?;

    if parsed.scheme() != "http" && parsed.scheme() != "https" {
        return Err(UrlError::InvalidScheme(parsed.scheme().to_string()));
    }

    if parsed.host_str().is_none() {
        return Err(UrlError::MissingHost(trimmed.to_string()));
    }

    Ok(trimmed.trim_end_matches('/').to_string())
}

/// Returns the URL of catalog page `page`
///
/// Page 1 is the catalog root itself; later pages live under
/// `catalogue/page-{n}.html`.
pub fn catalogue_page_url(base_url: &str, page: u32) -> String {
    if page <= 1 {
        base_url.to_string()
    } else {
        format!("{}/catalogue/page-{}.html", base_url, page)
    }
}

/// Resolves an image `src` against the crawl's base URL
///
/// Root-relative paths are appended to the base. Anything else is joined
/// through `/../`, matching the depth of the catalog's listing pages.
pub fn resolve_image_url(base_url: &str, src: &str) -> String {
    if src.starts_with('/') {
        format!("{}{}", base_url, src)
    } else {
        format!("{}/../{}", base_url, src)
    }
}
