// src/utils/url.rs

//! URL manipulation utilities.

use url::Url;

use crate::error::{AppError, Result};

/// Derive the canonical origin (scheme + host) from a page URL.
pub fn origin_of(page_url: &str) -> Result<String> {
    let parsed = Url::parse(page_url)?;
    let origin = parsed.origin().ascii_serialization();
    if origin == "null" {
        return Err(AppError::validation(format!(
            "URL '{page_url}' has no usable origin"
        )));
    }
    Ok(origin)
}

/// Normalize a raw listing link against the site origin.
///
/// # Examples
/// ```
/// use wgwatch::utils::url::normalize;
///
/// assert_eq!(
///     normalize("https://example.test", "/s-anzeige/123"),
///     "https://example.test/s-anzeige/123"
/// );
/// ```
pub fn normalize(origin: &str, href: &str) -> String {
    // Already absolute
    if href.starts_with("http://") || href.starts_with("https://") {
        return href.to_string();
    }

    // Absolute path - combine with site origin
    if href.starts_with('/') {
        return format!("{}{}", origin.trim_end_matches('/'), href);
    }

    // Relative path - treat as rooted at the origin
    format!("{}/{}", origin.trim_end_matches('/'), href)
}
