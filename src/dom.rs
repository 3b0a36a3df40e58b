/// Read-only view over a DOM element, shared by the live page and static snapshots
use crate::error::SnapshotError;
use scraper::{ElementRef, Html, Selector};
use url::Url;

/// The subset of element queries the extractor needs.
///
/// Object safe so site profiles can hold plain `fn(&dyn ElementView, ..)`
/// extractors that work against both a live `web_sys::Element` and a
/// `scraper` snapshot.
pub trait ElementView {
    fn attribute(&self, name: &str) -> Option<String>;

    /// Concatenated text of the element and all descendants.
    fn text_content(&self) -> String;

    /// Direct text-node children only, in document order.
    fn own_text(&self) -> Vec<String>;

    fn is_match(&self, selector: &str) -> bool;

    /// First descendant matching `selector` (the element itself excluded).
    fn select_one(&self, selector: &str) -> Option<Box<dyn ElementView + '_>>;
}

/// Trimmed text of the first descendant matching `selector`, if non-empty.
pub fn text_of(root: &dyn ElementView, selector: &str) -> Option<String> {
    root.select_one(selector)
        .map(|el| el.text_content().trim().to_string())
        .filter(|text| !text.is_empty())
}

/// Attribute of the first descendant matching `selector`, if non-empty.
pub fn attribute_of(root: &dyn ElementView, selector: &str, name: &str) -> Option<String> {
    root.select_one(selector)
        .and_then(|el| el.attribute(name))
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}

/// Image source, preferring `src` and falling back to lazy-load attributes.
pub fn image_source(img: &dyn ElementView) -> Option<String> {
    ["src", "data-src", "data-lazy"]
        .iter()
        .filter_map(|name| img.attribute(name))
        .map(|value| value.trim().to_string())
        .find(|value| !value.is_empty() && !value.starts_with("data:"))
}

impl ElementView for ElementRef<'_> {
    fn attribute(&self, name: &str) -> Option<String> {
        self.value().attr(name).map(str::to_string)
    }

    fn text_content(&self) -> String {
        self.text().collect()
    }

    fn own_text(&self) -> Vec<String> {
        self.children()
            .filter_map(|child| child.value().as_text().map(|text| (**text).to_string()))
            .collect()
    }

    fn is_match(&self, selector: &str) -> bool {
        Selector::parse(selector)
            .map(|parsed| parsed.matches(self))
            .unwrap_or(false)
    }

    fn select_one(&self, selector: &str) -> Option<Box<dyn ElementView + '_>> {
        let parsed = Selector::parse(selector).ok()?;
        let found = self.select(&parsed).next()?;
        Some(Box::new(found))
    }
}

/// A parsed HTML page plus the URL it was served from.
pub struct Snapshot {
    html: Html,
    url: Url,
}

impl Snapshot {
    pub fn parse(html: &str, page_url: &str) -> Result<Snapshot, SnapshotError> {
        let url = Url::parse(page_url)?;
        if url.host_str().is_none() {
            return Err(SnapshotError::MissingHost(page_url.to_string()));
        }
        Ok(Snapshot {
            html: Html::parse_document(html),
            url,
        })
    }

    pub fn url(&self) -> &Url {
        &self.url
    }

    pub fn hostname(&self) -> &str {
        self.url.host_str().unwrap_or_default()
    }

    pub fn root(&self) -> ElementRef<'_> {
        self.html.root_element()
    }

    /// All elements matching `selector`, in document order.
    pub fn select_all(&self, selector: &str) -> Vec<ElementRef<'_>> {
        match Selector::parse(selector) {
            Ok(parsed) => self.html.select(&parsed).collect(),
            Err(_) => Vec::new(),
        }
    }
}
