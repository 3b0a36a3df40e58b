use super::{DetailProfile, FieldRule, Site, SiteProfile, meta_property, pattern};
use crate::dom::{ElementView, image_source, text_of};
use regex::Regex;
use std::sync::LazyLock;
use url::Url;

static LEADING_EURO_PRICE: LazyLock<Regex> =
    LazyLock::new(|| pattern(r"^([\d.,]+\s*€)"));

static DETAIL_ID: LazyLock<Regex> = LazyLock::new(|| pattern(r"([A-Za-z0-9]+)/?$"));

pub(super) fn profile() -> SiteProfile {
    SiteProfile {
        site: Site::Imobiliare,
        domain: "imobiliare.ro",
        card: r#"[id^="listing-"], .listing-card"#,
        link: r#"a[href*="/oferta/"]"#,
        title: FieldRule::Selector("h3 span"),
        price: FieldRule::Extractor(card_price),
        thumbnail: FieldRule::Extractor(gallery_thumbnail),
        id_pattern: pattern(r"-(\d+)$"),
        id_attribute: None,
        list_containers: &["#scrollableList"],
        map_container: Some("#map"),
        detail: Some(DetailProfile {
            path: pattern(r"(?i)^/oferta/"),
            id: detail_id,
            anchor: "div.agent-contact-enquiry.mt-0",
            title: FieldRule::Extractor(detail_title),
            price: FieldRule::Selector(r#"span[aria-label="price"]"#),
            thumbnail: FieldRule::Extractor(og_image),
            ready: None,
            blockers: &[],
            watch: None,
        }),
    }
}

/// The price container mixes a bold amount, loose text nodes and badges.
fn card_price(card: &dyn ElementView, _id: &str) -> Option<String> {
    let container = card.select_one(r#"[data-cy="card-price"]"#)?;
    if let Some(strong) = text_of(container.as_ref(), "strong") {
        return Some(strong);
    }

    let loose = container
        .own_text()
        .into_iter()
        .map(|text| text.trim().to_string())
        .find(|text| !text.is_empty());
    if let Some(text) = loose.filter(|text| text.contains('€')) {
        return Some(text);
    }

    let full = container.text_content().trim().to_string();
    match LEADING_EURO_PRICE.captures(&full) {
        Some(caps) => Some(caps[1].to_string()),
        None => Some(full),
    }
}

/// First slide of the card's own gallery, keyed by the listing id.
fn gallery_thumbnail(card: &dyn ElementView, id: &str) -> Option<String> {
    let selector = format!("#gallery_slider_{} .swiper-slide img", id);
    card.select_one(&selector)
        .and_then(|img| image_source(img.as_ref()))
}

fn detail_id(_document: &dyn ElementView, url: &Url) -> Option<String> {
    DETAIL_ID
        .captures(url.path())
        .map(|caps| caps[1].to_string())
}

fn detail_title(document: &dyn ElementView, _id: &str) -> Option<String> {
    text_of(document, "h1.titlu-anunt").or_else(|| meta_property(document, "og:title"))
}

fn og_image(document: &dyn ElementView, _id: &str) -> Option<String> {
    meta_property(document, "og:image")
}
