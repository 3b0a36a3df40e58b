use super::{DetailProfile, FieldRule, Site, SiteProfile, meta_property, pattern};
use crate::dom::{ElementView, image_source, text_of};
use regex::Regex;
use std::sync::LazyLock;
use url::Url;

static URL_ID: LazyLock<Regex> = LazyLock::new(|| pattern(r"-ID([A-Za-z0-9]+)\.html"));

static FOOTER_ID: LazyLock<Regex> = LazyLock::new(|| pattern(r"(\d{5,})"));

pub(super) fn profile() -> SiteProfile {
    SiteProfile {
        site: Site::Olx,
        domain: "olx.ro",
        card: r#"div[data-cy="l-card"]"#,
        link: r#"a[href*="/d/oferta/"]"#,
        title: FieldRule::Selector(r#"[data-cy="ad-card-title"] h4, [data-cy="ad-card-title"] h6"#),
        price: FieldRule::Extractor(card_price),
        thumbnail: FieldRule::Extractor(card_thumbnail),
        // Card ids are numeric attributes; the regex only cleans prefixed
        // attribute values and covers cards without one via the URL.
        id_pattern: pattern(r"ID([A-Za-z0-9]+)(?:\.html)?$"),
        id_attribute: Some("id"),
        list_containers: &[r#"div[data-testid="listing-grid"]"#],
        map_container: None,
        detail: Some(DetailProfile {
            path: pattern(r"^/d/oferta/"),
            id: detail_id,
            anchor: r#"div[data-testid="ad-price-container"]"#,
            title: FieldRule::Extractor(detail_title),
            price: FieldRule::Selector(r#"div[data-testid="ad-price-container"] h3"#),
            thumbnail: FieldRule::Extractor(og_image),
            ready: Some(r#"div[data-testid="main"]"#),
            blockers: &[r#"[data-testid="modal-root"]"#, ".css-1p2v1a9", ".css-1b8l6p7"],
            watch: Some("body"),
        }),
    }
}

/// The price paragraph appends a "negotiable" label as a sibling text node.
fn card_price(card: &dyn ElementView, _id: &str) -> Option<String> {
    let price = card.select_one(r#"p[data-testid="ad-price"]"#)?;
    price
        .own_text()
        .into_iter()
        .map(|text| text.trim().to_string())
        .find(|text| text.chars().any(|c| c.is_ascii_digit()))
        .or_else(|| Some(price.text_content().trim().to_string()))
}

fn card_thumbnail(card: &dyn ElementView, _id: &str) -> Option<String> {
    card.select_one("img")
        .and_then(|img| image_source(img.as_ref()))
}

/// The footer shows the same numeric id the result cards carry; the URL
/// token is used when the footer hasn't rendered yet.
fn detail_id(document: &dyn ElementView, url: &Url) -> Option<String> {
    text_of(document, r#"[data-cy="ad-footer-bar-section"] span"#)
        .and_then(|text| FOOTER_ID.captures(&text).map(|caps| caps[1].to_string()))
        .or_else(|| URL_ID.captures(url.path()).map(|caps| caps[1].to_string()))
}

fn detail_title(document: &dyn ElementView, _id: &str) -> Option<String> {
    text_of(document, r#"[data-cy="ad_title"] h4, [data-testid="offer_title"] h4"#)
        .or_else(|| meta_property(document, "og:title"))
}

fn og_image(document: &dyn ElementView, _id: &str) -> Option<String> {
    meta_property(document, "og:image")
}
