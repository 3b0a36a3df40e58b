/// Turns card and detail-page markup into `PropertyRecord`s using a site profile
use crate::dom::{ElementView, Snapshot, image_source, text_of};
use crate::identity::{canonical_url, derive_id};
use crate::price::normalize_price;
use crate::profile::{FieldRule, SiteProfile};
use crate::property::PropertyRecord;
use log::debug;
use url::Url;

/// What a selector rule reads from the element it finds.
#[derive(Clone, Copy)]
enum Read {
    Text,
    Image,
}

/// The single dispatch point for `FieldRule`s.
fn read_field(rule: &FieldRule, root: &dyn ElementView, id: &str, read: Read) -> Option<String> {
    let value = match (rule, read) {
        (FieldRule::Extractor(extract), _) => extract(root, id),
        (FieldRule::Selector(selector), Read::Text) => text_of(root, selector),
        (FieldRule::Selector(selector), Read::Image) => root
            .select_one(selector)
            .and_then(|img| image_source(img.as_ref())),
    };
    value
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}

/// Build a record from one listing card.
///
/// Returns `None` when the card has no usable link; such cards are skipped,
/// not reported. Every other field degrades to an empty string.
pub fn extract_card(card: &dyn ElementView, profile: &SiteProfile, page: &Url) -> Option<PropertyRecord> {
    let Some(href) = card
        .select_one(profile.link)
        .and_then(|link| link.attribute("href"))
    else {
        debug!("card without a listing link skipped");
        return None;
    };
    let url = canonical_url(page, &href)?;

    let attribute = profile.id_attribute.and_then(|name| card.attribute(name));
    let id = derive_id(attribute.as_deref(), Some(&profile.id_pattern), &url).value;

    let title = read_field(&profile.title, card, &id, Read::Text).unwrap_or_default();
    let price = read_field(&profile.price, card, &id, Read::Text)
        .map(|raw| normalize_price(&raw))
        .unwrap_or_default();
    let thumbnail = read_field(&profile.thumbnail, card, &id, Read::Image)
        .and_then(|src| canonical_url(page, &src))
        .unwrap_or_default();

    Some(PropertyRecord {
        id,
        title,
        url,
        thumbnail,
        hostname: page.host_str().unwrap_or_default().to_string(),
        price,
        saved_at: None,
    })
}

/// Build a record for the listing shown on a detail page.
///
/// `None` when the site has no detail rules, the URL isn't a detail page or
/// no id can be read yet.
pub fn extract_detail(document: &dyn ElementView, profile: &SiteProfile, page: &Url) -> Option<PropertyRecord> {
    let detail = profile.detail.as_ref()?;
    if !detail.applies_to(page) {
        return None;
    }
    let id = (detail.id)(document, page)?;

    let mut url = page.clone();
    url.set_fragment(None);

    Some(PropertyRecord {
        title: read_field(&detail.title, document, &id, Read::Text).unwrap_or_default(),
        price: read_field(&detail.price, document, &id, Read::Text)
            .map(|raw| normalize_price(&raw))
            .unwrap_or_default(),
        thumbnail: read_field(&detail.thumbnail, document, &id, Read::Image)
            .and_then(|src| canonical_url(page, &src))
            .unwrap_or_default(),
        id,
        url: url.to_string(),
        hostname: page.host_str().unwrap_or_default().to_string(),
        saved_at: None,
    })
}

/// Extract every card on a saved page.
pub fn extract_snapshot(snapshot: &Snapshot, profile: &SiteProfile) -> Vec<PropertyRecord> {
    snapshot
        .select_all(profile.card)
        .iter()
        .filter_map(|card| extract_card(card, profile, snapshot.url()))
        .collect()
}
