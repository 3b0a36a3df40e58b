use super::{DetailProfile, FieldRule, Site, SiteProfile, meta_property, pattern};
use crate::dom::{ElementView, image_source, text_of};
use regex::Regex;
use std::sync::LazyLock;
use url::Url;

static DETAIL_ID: LazyLock<Regex> = LazyLock::new(|| pattern(r"/ro/oferta/([\w-]+)"));

pub(super) fn profile() -> SiteProfile {
    SiteProfile {
        site: Site::Storia,
        domain: "storia.ro",
        // Search results, agency listings and development unit cards.
        card: concat!(
            r#"article[data-sentry-element="Wrapper"][data-sentry-component="AdvertCard"], "#,
            r#"article[data-cy="listing-item"], "#,
            r#"article[data-sentry-component="UnitCard"]"#,
        ),
        link: r#"a[href^="/ro/oferta/"]"#,
        title: FieldRule::Selector(r#"p[data-cy="listing-item-title"], p.css-u3orbr"#),
        price: FieldRule::Selector(r#"span[data-sentry-component="Price"], span.css-2bt9f1"#),
        thumbnail: FieldRule::Extractor(card_thumbnail),
        id_pattern: pattern(r"(?i)/ro/oferta/([\w-]+)"),
        id_attribute: None,
        list_containers: &[
            r#"div[data-cy="search.listing.promoted"] ul"#,
            r#"div[data-cy="search.listing.organic"] ul"#,
            r#"div[data-cy="search.map.listing.organic"] ul"#,
            "ul.css-yd8sa2",
        ],
        map_container: None,
        detail: Some(DetailProfile {
            path: pattern(r"^/ro/oferta/"),
            id: detail_id,
            anchor: r#"div[data-sentry-element="ActionButtonsContainer"]"#,
            title: FieldRule::Extractor(detail_title),
            price: FieldRule::Selector(r#"strong[data-cy="adPageHeaderPrice"]"#),
            thumbnail: FieldRule::Extractor(og_image),
            ready: None,
            blockers: &[],
            watch: None,
        }),
    }
}

/// Classic result cards tag their image; agency and unit cards don't.
fn card_thumbnail(card: &dyn ElementView, _id: &str) -> Option<String> {
    card.select_one(r#"img[data-cy="listing-item-image-source"]"#)
        .or_else(|| card.select_one("img"))
        .and_then(|img| image_source(img.as_ref()))
}

fn detail_id(_document: &dyn ElementView, url: &Url) -> Option<String> {
    DETAIL_ID
        .captures(url.path())
        .map(|caps| caps[1].to_string())
}

fn detail_title(document: &dyn ElementView, _id: &str) -> Option<String> {
    text_of(document, r#"h1[data-cy="adPage__title"]"#)
        .or_else(|| meta_property(document, "og:title"))
}

fn og_image(document: &dyn ElementView, _id: &str) -> Option<String> {
    meta_property(document, "og:image")
}
