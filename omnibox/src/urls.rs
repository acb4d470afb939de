//! URL normalization helpers used for scoring and deduplication
//!
//! The "naked" form drops the scheme, a leading `www.` and one trailing
//! slash, so `http://duckduckgo.com` and `https://www.duckduckgo.com/`
//! collapse to the same key.

use url::Url;

/// Scheme prepended to navigational remote phrases
pub const NAVIGATIONAL_SCHEME: &str = "http://";

const WWW_PREFIX: &str = "www.";

/// Parse a stored URL string. Relative or malformed strings yield `None`.
pub fn parse(raw: &str) -> Option<Url> {
    Url::parse(raw.trim()).ok()
}

/// Build the URL for a navigational remote suggestion phrase
pub fn navigational_url(phrase: &str) -> Option<Url> {
    Url::parse(&format!("{NAVIGATIONAL_SCHEME}{phrase}")).ok()
}

/// URL string without scheme, leading `www.` and trailing slash
pub fn naked_string(url: &Url) -> String {
    let serialized = url.as_str();
    let without_scheme = serialized
        .strip_prefix(url.scheme())
        .and_then(|rest| rest.strip_prefix(':'))
        .unwrap_or(serialized);
    let without_slashes = without_scheme.strip_prefix("//").unwrap_or(without_scheme);
    let without_www = drop_www_prefix(without_slashes);
    without_www.strip_suffix('/').unwrap_or(without_www).to_string()
}

/// Deduplication key: naked URL, falling back to the absolute string
pub fn dedup_key(url: &Url) -> String {
    let naked = naked_string(url);
    if naked.is_empty() {
        url.as_str().to_string()
    } else {
        naked
    }
}

/// Host without a leading `www.`. Empty when the URL has no host.
pub fn domain(url: &Url) -> &str {
    url.host_str().map(drop_www_prefix).unwrap_or("")
}

/// Root URL: empty or `/` path, no query, no fragment
pub fn is_root(url: &Url) -> bool {
    let path = url.path();
    (path.is_empty() || path == "/") && url.query().is_none() && url.fragment().is_none()
}

fn drop_www_prefix(s: &str) -> &str {
    s.strip_prefix(WWW_PREFIX).unwrap_or(s)
}
