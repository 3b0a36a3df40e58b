/// Property identifier derivation
///
/// A card's id comes from the first step of this chain that yields a value:
/// 1. the profile's raw id attribute, cleaned by the id regex when it matches
/// 2. the raw attribute as-is
/// 3. the id regex applied to the canonical listing URL
/// 4. a short hash of the canonical URL
///
/// Every step is a pure function of the card markup and the URL, so repeated
/// scans of the same card always produce the same id.
use regex::Regex;
use std::hash::Hasher;
use twox_hash::XxHash64;
use url::Url;

/// Length of the hex id produced by the hash fallback.
pub const HASH_ID_LEN: usize = 12;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IdSource {
    AttributeRegex,
    Attribute,
    UrlRegex,
    UrlHash,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DerivedId {
    pub value: String,
    pub source: IdSource,
}

/// Walk the fallback chain. Never fails: the hash step always produces an id.
pub fn derive_id(attribute: Option<&str>, pattern: Option<&Regex>, url: &str) -> DerivedId {
    if let Some(raw) = attribute.map(str::trim).filter(|raw| !raw.is_empty()) {
        if let Some(cleaned) = pattern.and_then(|re| first_capture(re, raw)) {
            return DerivedId {
                value: cleaned,
                source: IdSource::AttributeRegex,
            };
        }
        return DerivedId {
            value: raw.to_string(),
            source: IdSource::Attribute,
        };
    }

    if let Some(from_url) = pattern.and_then(|re| first_capture(re, url)) {
        return DerivedId {
            value: from_url,
            source: IdSource::UrlRegex,
        };
    }

    DerivedId {
        value: url_hash(url),
        source: IdSource::UrlHash,
    }
}

fn first_capture(pattern: &Regex, haystack: &str) -> Option<String> {
    pattern
        .captures(haystack)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().to_string())
        .filter(|id| !id.is_empty())
}

/// First `HASH_ID_LEN` hex digits of the xxHash64 of the URL.
pub fn url_hash(url: &str) -> String {
    let mut hasher = XxHash64::with_seed(0);
    hasher.write(url.as_bytes());
    let digest = format!("{:016x}", hasher.finish());
    digest[..HASH_ID_LEN].to_string()
}

/// Resolve `href` against the page URL and drop the fragment.
pub fn canonical_url(base: &Url, href: &str) -> Option<String> {
    let href = href.trim();
    if href.is_empty() || href.starts_with("javascript:") {
        return None;
    }
    let mut url = base.join(href).ok()?;
    url.set_fragment(None);
    Some(url.to_string())
}
