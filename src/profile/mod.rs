/// Site profiles: how to find cards and read listing data on each supported site
mod imobiliare;
mod olx;
mod storia;

use crate::dom::ElementView;
use regex::Regex;
use std::sync::LazyLock;
use url::Url;

/// Custom field reader: `(element, property_id) -> value`.
pub type FieldFn = fn(&dyn ElementView, &str) -> Option<String>;

/// How a single field is read: a selector resolved by the extractor, or a
/// site-specific procedure for markup a selector can't express.
#[derive(Clone, Copy)]
pub enum FieldRule {
    Selector(&'static str),
    Extractor(FieldFn),
}

/// Supported sites.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Site {
    Imobiliare,
    Storia,
    Olx,
}

/// Extraction rules for listing cards on one site.
pub struct SiteProfile {
    pub site: Site,
    /// Matched by substring containment against the page hostname.
    pub domain: &'static str,
    pub card: &'static str,
    pub link: &'static str,
    pub title: FieldRule,
    pub price: FieldRule,
    pub thumbnail: FieldRule,
    /// One capture group; applied to the id attribute, then to the link URL.
    pub id_pattern: Regex,
    pub id_attribute: Option<&'static str>,
    /// Result list roots to observe. Any subset may be present.
    pub list_containers: &'static [&'static str],
    /// Subtree whose changes re-render the list (e.g. a results map).
    pub map_container: Option<&'static str>,
    pub detail: Option<DetailProfile>,
}

/// Rules for a single listing's full page.
pub struct DetailProfile {
    /// The page is a detail page only when its path matches.
    pub path: Regex,
    pub id: fn(&dyn ElementView, &Url) -> Option<String>,
    /// Controls are appended inside this element.
    pub anchor: &'static str,
    pub title: FieldRule,
    pub price: FieldRule,
    pub thumbnail: FieldRule,
    /// Must be present before injecting.
    pub ready: Option<&'static str>,
    /// Overlays that must be absent before injecting.
    pub blockers: &'static [&'static str],
    /// Subtree to watch while waiting for the anchor.
    pub watch: Option<&'static str>,
}

impl DetailProfile {
    pub fn applies_to(&self, url: &Url) -> bool {
        self.path.is_match(url.path())
    }
}

static PROFILES: LazyLock<Vec<SiteProfile>> =
    LazyLock::new(|| vec![imobiliare::profile(), storia::profile(), olx::profile()]);

/// Profile for `hostname`, or `None` when the site is not supported.
///
/// First containment match wins; the known domains are disjoint strings.
pub fn resolve_profile(hostname: &str) -> Option<&'static SiteProfile> {
    let hostname = hostname.to_ascii_lowercase();
    PROFILES.iter().find(|profile| hostname.contains(profile.domain))
}

/// Compile a pattern that is part of the binary.
fn pattern(source: &str) -> Regex {
    Regex::new(source).expect("site profile pattern")
}

/// `og:*` meta content, the common fallback for detail pages.
fn meta_property(document: &dyn ElementView, property: &str) -> Option<String> {
    crate::dom::attribute_of(document, &format!("meta[property=\"{}\"]", property), "content")
}
