/// Scan-context: finds listing cards, binds controls and keeps them in sync
///
/// The context never touches timers or observers itself. Each event method
/// returns the `Directive`s the driver must arm, so the whole lifecycle runs
/// natively against a fake page in tests.
pub mod controls;
pub mod host;
pub mod session;

#[cfg(test)]
pub(crate) mod testing;

pub use host::{ControlState, Host, Messenger, Placement, PressHandler, ReplyHandler};
pub use session::Session;

use crate::dom::ElementView;
use crate::extract::{extract_card, extract_detail};
use crate::profile::{DetailProfile, SiteProfile, resolve_profile};
use crate::property::PropertyKey;
use crate::relay::StateUpdate;
use crate::settings::ScanSettings;
use log::{debug, info};
use std::collections::HashMap;
use std::time::Duration;
use url::Url;

/// Work for the driver. Observers and timers live until the context is torn down.
#[derive(Debug, Clone, PartialEq)]
pub enum Directive<N> {
    /// Report added nodes under this list container.
    ObserveContainer(N),
    /// Rescan when this subtree changes.
    ObserveMap(N),
    /// Report subtree changes while the detail anchor is missing.
    WatchDetail(N),
    /// Call `on_scroll_settled` after scrolling stops for the debounce delay.
    WatchScroll(Duration),
    /// Call `on_interval` at this period.
    StartInterval(Duration),
    RetryContainersAfter(Duration),
    RetryDetailAfter(Duration),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Uninitialized,
    /// No list container found yet.
    Scanning,
    Observing,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CardOutcome {
    AlreadyBound,
    /// No listing link; left untouched until the next trigger.
    Skipped,
    Bound,
}

#[derive(Debug, Default)]
struct DetailState {
    injected: bool,
    retries: u32,
    last_mutation_ms: Option<f64>,
}

struct Binding<N> {
    node: N,
    placement: Placement,
}

/// One loaded page or SPA route. Discarded on navigation.
pub struct ScanContext<H: Host, M: Messenger> {
    host: H,
    messenger: M,
    profile: &'static SiteProfile,
    page: Url,
    settings: ScanSettings,
    phase: Phase,
    bound: HashMap<PropertyKey, Vec<Binding<H::Node>>>,
    detail: DetailState,
}

impl<H: Host, M: Messenger> ScanContext<H, M> {
    /// `None` on unsupported sites, which are left alone.
    pub fn new(host: H, messenger: M, settings: ScanSettings) -> Option<Self> {
        let page = Url::parse(&host.page_url()).ok()?;
        let Some(profile) = page.host_str().and_then(resolve_profile) else {
            info!("no site profile for {}", page.host_str().unwrap_or_default());
            return None;
        };

        Some(ScanContext {
            host,
            messenger,
            profile,
            page,
            settings,
            phase: Phase::Uninitialized,
            bound: HashMap::new(),
            detail: DetailState::default(),
        })
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn profile(&self) -> &'static SiteProfile {
        self.profile
    }

    pub fn start(&mut self) -> Vec<Directive<H::Node>> {
        info!("scanning {:?} page {}", self.profile.site, self.page);
        self.phase = Phase::Scanning;
        let mut directives = self.locate_containers();
        directives.extend(self.start_detail());
        directives
    }

    pub fn on_retry_containers(&mut self) -> Vec<Directive<H::Node>> {
        if self.phase != Phase::Scanning {
            return Vec::new();
        }
        self.locate_containers()
    }

    fn locate_containers(&mut self) -> Vec<Directive<H::Node>> {
        let containers: Vec<H::Node> = self
            .profile
            .list_containers
            .iter()
            .filter_map(|selector| self.host.query(selector))
            .collect();

        if containers.is_empty() {
            debug!("no list container yet, retrying in {:?}", self.settings.container_retry());
            return vec![Directive::RetryContainersAfter(self.settings.container_retry())];
        }

        debug!("found {} list container(s)", containers.len());
        self.phase = Phase::Observing;
        let mut directives = Vec::new();
        for container in containers {
            for card in self.host.query_within(&container, self.profile.card) {
                self.process_card(card);
            }
            directives.push(Directive::ObserveContainer(container));
        }
        if let Some(map) = self.profile.map_container.and_then(|selector| self.host.query(selector)) {
            directives.push(Directive::ObserveMap(map));
        }
        directives.push(Directive::WatchScroll(self.settings.scroll_debounce()));
        directives.push(Directive::StartInterval(self.settings.rescan_interval()));
        directives
    }

    /// Idempotent per card: a marked card never gets a second set of controls.
    /// Controls left over from an earlier route are adopted so broadcasts
    /// still reach them.
    pub fn process_card(&mut self, card: H::Node) -> CardOutcome {
        let marked = self.host.has_controls(&card, Placement::Card);
        let Some(record) = extract_card(&card, self.profile, &self.page) else {
            return if marked { CardOutcome::AlreadyBound } else { CardOutcome::Skipped };
        };

        let key = record.key();
        if marked {
            self.adopt(key, card, Placement::Card);
            return CardOutcome::AlreadyBound;
        }
        controls::bind(&self.host, &self.messenger, &card, Placement::Card, record);
        self.remember(key, card, Placement::Card);
        CardOutcome::Bound
    }

    fn remember(&mut self, key: PropertyKey, node: H::Node, placement: Placement) {
        self.bound.entry(key).or_default().push(Binding { node, placement });
    }

    fn adopt(&mut self, key: PropertyKey, node: H::Node, placement: Placement) {
        let bindings = self.bound.entry(key).or_default();
        if !bindings.iter().any(|binding| binding.node == node) {
            bindings.push(Binding { node, placement });
        }
    }

    /// Mutation batch from an observed container. Returns how many cards were bound.
    pub fn on_nodes_added(&mut self, nodes: Vec<H::Node>) -> usize {
        let mut bound = 0;
        for node in nodes {
            let mut candidates = Vec::new();
            if node.is_match(self.profile.card) {
                candidates.push(node.clone());
            }
            candidates.extend(self.host.query_within(&node, self.profile.card));

            for card in candidates {
                if self.process_card(card) == CardOutcome::Bound {
                    bound += 1;
                }
            }
        }
        bound
    }

    pub fn on_map_changed(&mut self) -> usize {
        self.rescan()
    }

    pub fn on_scroll_settled(&mut self) -> usize {
        self.rescan()
    }

    /// Safety-net sweep, skipped while the page is hidden.
    pub fn on_interval(&mut self) -> usize {
        if !self.host.is_visible() {
            return 0;
        }
        self.rescan()
    }

    /// Process every card on the page and drop bindings whose nodes are gone.
    pub fn rescan(&mut self) -> usize {
        let host = &self.host;
        self.bound.retain(|_, bindings| {
            bindings.retain(|binding| host.is_connected(&binding.node));
            !bindings.is_empty()
        });

        let cards = self.host.query_all(self.profile.card);
        cards
            .into_iter()
            .filter(|card| self.process_card(card.clone()) == CardOutcome::Bound)
            .count()
    }

    fn detail_profile(&self) -> Option<&'static DetailProfile> {
        self.profile.detail.as_ref().filter(|detail| detail.applies_to(&self.page))
    }

    fn start_detail(&mut self) -> Vec<Directive<H::Node>> {
        let Some(detail) = self.detail_profile() else {
            return Vec::new();
        };
        if self.try_inject_detail() {
            return Vec::new();
        }

        let mut directives = Vec::new();
        if let Some(root) = detail.watch.and_then(|selector| self.host.query(selector)) {
            directives.push(Directive::WatchDetail(root));
        }
        directives.push(Directive::RetryDetailAfter(self.settings.detail_retry()));
        directives
    }

    /// Timer-driven detail attempt. Stops once injected or out of retries.
    pub fn on_detail_retry(&mut self) -> Vec<Directive<H::Node>> {
        if self.detail.injected || self.detail_profile().is_none() {
            return Vec::new();
        }
        self.detail.retries += 1;
        if self.try_inject_detail() {
            return Vec::new();
        }
        if self.detail.retries >= self.settings.detail_retry_limit {
            debug!("giving up on detail controls after {} retries", self.detail.retries);
            return Vec::new();
        }
        vec![Directive::RetryDetailAfter(self.settings.detail_retry())]
    }

    /// Mutation-driven detail attempt, throttled. Returns whether controls are in place.
    pub fn on_detail_mutation(&mut self, now_ms: f64) -> bool {
        if self.detail.injected {
            return true;
        }
        if self.detail_profile().is_none() {
            return false;
        }
        let throttle = f64::from(self.settings.detail_throttle_ms);
        if self.detail.last_mutation_ms.is_some_and(|last| now_ms - last < throttle) {
            return false;
        }
        self.detail.last_mutation_ms = Some(now_ms);
        self.try_inject_detail()
    }

    pub fn detail_injected(&self) -> bool {
        self.detail.injected
    }

    fn try_inject_detail(&mut self) -> bool {
        let Some(detail) = self.detail_profile() else {
            return false;
        };
        if detail.ready.is_some_and(|selector| self.host.query(selector).is_none()) {
            return false;
        }
        if detail.blockers.iter().any(|selector| self.host.query(selector).is_some()) {
            return false;
        }
        let Some(anchor) = self.host.query(detail.anchor) else {
            return false;
        };
        let marked = self.host.has_controls(&anchor, Placement::Detail);
        let record = self
            .host
            .root()
            .and_then(|root| extract_detail(&root, self.profile, &self.page));
        if marked {
            if let Some(record) = record {
                self.adopt(record.key(), anchor, Placement::Detail);
            }
            self.detail.injected = true;
            return true;
        }
        let Some(record) = record else {
            debug!("detail anchor present but no id yet");
            return false;
        };

        info!("detail controls for {}", record.id);
        let key = record.key();
        controls::bind(&self.host, &self.messenger, &anchor, Placement::Detail, record);
        self.remember(key, anchor, Placement::Detail);
        self.detail.injected = true;
        true
    }

    /// Re-render every live control bound to the updated record.
    pub fn apply_state(&mut self, update: &StateUpdate) -> usize {
        let hostname = update
            .hostname
            .clone()
            .unwrap_or_else(|| self.page.host_str().unwrap_or_default().to_string());
        let key = PropertyKey::new(&update.property_id, &hostname);

        let Some(bindings) = self.bound.get_mut(&key) else {
            return 0;
        };
        let host = &self.host;
        bindings.retain(|binding| host.is_connected(&binding.node));
        for binding in bindings.iter() {
            controls::sync(host, &binding.node, binding.placement, update);
        }
        bindings.len()
    }
}

#[cfg(test)]
mod tests {
    use super::testing::{FakeHost, FakeMessenger};
    use super::*;
    use crate::property::{Collection, PropertyRecord};
    use crate::store::ToggleTarget;
    use futures::executor::block_on;

    const IMOBILIARE_URL: &str = "https://www.imobiliare.ro/vanzare-apartamente/bucuresti";

    fn imobiliare_card(id: &str) -> String {
        format!(
            r#"<div id="listing-{id}">
                 <a href="https://www.imobiliare.ro/oferta/apartament-{id}"><h3><span>Apartament {id}</span></h3></a>
                 <div><strong>{id}.000 €</strong></div>
               </div>"#
        )
    }

    fn imobiliare_page(ids: &[&str]) -> String {
        let cards: String = ids.iter().map(|id| imobiliare_card(id)).collect();
        format!(r#"<html><body><div id="map"></div><div id="scrollableList">{cards}</div></body></html>"#)
    }

    fn context(host: &FakeHost, messenger: &FakeMessenger) -> ScanContext<FakeHost, FakeMessenger> {
        ScanContext::new(host.clone(), messenger.clone(), ScanSettings::default()).unwrap()
    }

    fn stored(id: &str) -> PropertyRecord {
        PropertyRecord {
            id: id.to_string(),
            title: String::new(),
            url: format!("https://www.imobiliare.ro/oferta/apartament-{}", id),
            thumbnail: String::new(),
            hostname: "www.imobiliare.ro".to_string(),
            price: String::new(),
            saved_at: None,
        }
    }

    #[test]
    fn test_start_binds_cards_and_arms_observers() {
        let host = FakeHost::new(IMOBILIARE_URL, &imobiliare_page(&["1", "2"]));
        let messenger = FakeMessenger::new();
        let mut context = context(&host, &messenger);

        let directives = context.start();

        assert_eq!(context.phase(), Phase::Observing);
        assert_eq!(host.bound_count(), 2);
        assert!(matches!(directives[0], Directive::ObserveContainer(_)));
        assert!(matches!(directives[1], Directive::ObserveMap(_)));
        assert!(directives.contains(&Directive::WatchScroll(Duration::from_millis(300))));
        assert!(directives.contains(&Directive::StartInterval(Duration::from_secs(10))));
    }

    #[test]
    fn test_every_trigger_is_idempotent() {
        let host = FakeHost::new(IMOBILIARE_URL, &imobiliare_page(&["1", "2"]));
        let messenger = FakeMessenger::new();
        let mut context = context(&host, &messenger);
        context.start();

        let cards = host.query_all(context.profile().card);
        assert_eq!(context.on_nodes_added(cards.clone()), 0);
        assert_eq!(context.on_map_changed(), 0);
        assert_eq!(context.on_scroll_settled(), 0);
        assert_eq!(context.on_interval(), 0);
        assert_eq!(context.rescan(), 0);
        assert_eq!(context.process_card(cards[0].clone()), CardOutcome::AlreadyBound);

        for card in &cards {
            assert_eq!(host.attach_count(card), 1);
        }
    }

    #[test]
    fn test_appended_cards_are_bound_once() {
        let host = FakeHost::new(IMOBILIARE_URL, &imobiliare_page(&["1"]));
        let messenger = FakeMessenger::new();
        let mut context = context(&host, &messenger);
        context.start();

        let added = host.append(&format!("<div>{}{}</div>", imobiliare_card("2"), imobiliare_card("3")));

        assert_eq!(context.on_nodes_added(added.clone()), 2);
        assert_eq!(context.on_nodes_added(added), 0);
        assert_eq!(context.on_interval(), 0);
        assert_eq!(host.bound_count(), 3);
    }

    #[test]
    fn test_card_without_link_gets_no_controls() {
        let page = r#"<html><body><div id="scrollableList">
            <div id="listing-9"><h3><span>Teren</span></h3></div>
          </div></body></html>"#;
        let host = FakeHost::new(IMOBILIARE_URL, page);
        let messenger = FakeMessenger::new();
        let mut context = context(&host, &messenger);

        context.start();

        assert_eq!(host.bound_count(), 0);
        assert!(messenger.sent().is_empty());
    }

    #[test]
    fn test_pending_until_store_replies() {
        let host = FakeHost::new(IMOBILIARE_URL, &imobiliare_page(&["1", "2"]));
        let messenger = FakeMessenger::new();
        block_on(messenger.relay().store().toggle(Collection::Ignored, ToggleTarget::Record(stored("2")))).unwrap();
        messenger.defer_replies(true);
        let mut context = context(&host, &messenger);

        context.start();
        let cards = host.query_all(context.profile().card);
        assert_eq!(host.state(&cards[0], Collection::Favorites), Some(ControlState::Pending));
        assert_eq!(host.state(&cards[1], Collection::Ignored), Some(ControlState::Pending));

        messenger.flush();

        assert_eq!(host.state(&cards[0], Collection::Favorites), Some(ControlState::Inactive));
        assert_eq!(host.state(&cards[1], Collection::Ignored), Some(ControlState::Active));
        assert!(host.is_dimmed(&cards[1]));
        assert!(!host.is_dimmed(&cards[0]));
    }

    #[test]
    fn test_failed_membership_query_stays_pending() {
        let host = FakeHost::new(IMOBILIARE_URL, &imobiliare_page(&["1"]));
        let messenger = FakeMessenger::new();
        messenger.fail_sends(true);
        let mut context = context(&host, &messenger);

        context.start();

        let card = &host.query_all(context.profile().card)[0];
        assert_eq!(host.state(card, Collection::Favorites), Some(ControlState::Pending));
    }

    #[test]
    fn test_press_toggles_only_that_control() {
        let host = FakeHost::new(IMOBILIARE_URL, &imobiliare_page(&["1", "2"]));
        let messenger = FakeMessenger::new();
        let mut context = context(&host, &messenger);
        context.start();
        let cards = host.query_all(context.profile().card);

        host.press(&cards[0], Collection::Ignored);

        assert_eq!(host.state(&cards[0], Collection::Ignored), Some(ControlState::Active));
        assert!(host.is_dimmed(&cards[0]));
        assert_eq!(host.state(&cards[1], Collection::Ignored), Some(ControlState::Inactive));
        assert_eq!(host.feedback_count(&cards[0]), 1);
        assert_eq!(host.attach_count(&cards[0]), 1);

        host.press(&cards[0], Collection::Ignored);
        assert_eq!(host.state(&cards[0], Collection::Ignored), Some(ControlState::Inactive));
        assert!(!host.is_dimmed(&cards[0]));
    }

    #[test]
    fn test_failed_toggle_keeps_previous_state() {
        let host = FakeHost::new(IMOBILIARE_URL, &imobiliare_page(&["1"]));
        let messenger = FakeMessenger::new();
        let mut context = context(&host, &messenger);
        context.start();
        let card = host.query_all(context.profile().card)[0].clone();
        host.press(&card, Collection::Favorites);

        messenger.relay().store().storage().set_fail_writes(true);
        host.press(&card, Collection::Favorites);
        assert_eq!(host.state(&card, Collection::Favorites), Some(ControlState::Active));

        messenger.fail_sends(true);
        host.press(&card, Collection::Favorites);
        assert_eq!(host.state(&card, Collection::Favorites), Some(ControlState::Active));
    }

    #[test]
    fn test_broadcast_resyncs_bound_card() {
        let host = FakeHost::new(IMOBILIARE_URL, &imobiliare_page(&["1", "2"]));
        let messenger = FakeMessenger::new();
        let mut context = context(&host, &messenger);
        context.start();
        let cards = host.query_all(context.profile().card);
        let sent = messenger.sent().len();

        let synced = context.apply_state(&StateUpdate {
            property_id: "2".to_string(),
            hostname: Some("www.imobiliare.ro".to_string()),
            is_favorite: true,
            is_ignored: true,
        });

        assert_eq!(synced, 1);
        assert_eq!(host.state(&cards[1], Collection::Favorites), Some(ControlState::Active));
        assert!(host.is_dimmed(&cards[1]));
        assert_eq!(host.state(&cards[0], Collection::Favorites), Some(ControlState::Inactive));
        assert_eq!(messenger.sent().len(), sent);
    }

    #[test]
    fn test_broadcast_for_other_site_is_ignored() {
        let host = FakeHost::new(IMOBILIARE_URL, &imobiliare_page(&["1"]));
        let messenger = FakeMessenger::new();
        let mut context = context(&host, &messenger);
        context.start();

        let synced = context.apply_state(&StateUpdate {
            property_id: "1".to_string(),
            hostname: Some("www.storia.ro".to_string()),
            is_favorite: true,
            is_ignored: false,
        });

        assert_eq!(synced, 0);
    }

    #[test]
    fn test_detached_cards_are_pruned() {
        let host = FakeHost::new(IMOBILIARE_URL, &imobiliare_page(&[]));
        let messenger = FakeMessenger::new();
        let mut context = context(&host, &messenger);
        context.start();
        let added = host.append(&imobiliare_card("7"));
        context.on_nodes_added(added);

        host.detach_last();
        context.rescan();

        let synced = context.apply_state(&StateUpdate {
            property_id: "7".to_string(),
            hostname: None,
            is_favorite: true,
            is_ignored: false,
        });
        assert_eq!(synced, 0);
    }

    #[test]
    fn test_retries_until_container_appears() {
        let host = FakeHost::new(IMOBILIARE_URL, "<html><body></body></html>");
        let messenger = FakeMessenger::new();
        let mut context = context(&host, &messenger);

        let directives = context.start();
        assert_eq!(context.phase(), Phase::Scanning);
        assert_eq!(directives, vec![Directive::RetryContainersAfter(Duration::from_secs(3))]);
        assert_eq!(
            context.on_retry_containers(),
            vec![Directive::RetryContainersAfter(Duration::from_secs(3))]
        );

        host.append(&format!(r#"<div id="scrollableList">{}</div>"#, imobiliare_card("1")));
        let directives = context.on_retry_containers();

        assert_eq!(context.phase(), Phase::Observing);
        assert!(matches!(directives[0], Directive::ObserveContainer(_)));
        assert_eq!(host.bound_count(), 1);
        assert!(context.on_retry_containers().is_empty());
    }

    #[test]
    fn test_hidden_page_skips_interval_sweep() {
        let host = FakeHost::new(IMOBILIARE_URL, &imobiliare_page(&["1"]));
        let messenger = FakeMessenger::new();
        let mut context = context(&host, &messenger);
        context.start();
        host.append(&imobiliare_card("2"));

        host.set_visible(false);
        assert_eq!(context.on_interval(), 0);

        host.set_visible(true);
        assert_eq!(context.on_interval(), 1);
    }

    #[test]
    fn test_unsupported_site_has_no_context() {
        let host = FakeHost::new("https://www.example.com/", "<html></html>");

        assert!(ScanContext::new(host, FakeMessenger::new(), ScanSettings::default()).is_none());
    }

    const STORIA_DETAIL: &str = "https://www.storia.ro/ro/oferta/apartament-2-camere-IDabc1";

    #[test]
    fn test_detail_controls_wait_for_anchor() {
        let host = FakeHost::new(
            STORIA_DETAIL,
            r#"<html><head><meta property="og:title" content="Apartament 2 camere"></head><body></body></html>"#,
        );
        let messenger = FakeMessenger::new();
        let mut context = context(&host, &messenger);

        let directives = context.start();
        assert!(directives.contains(&Directive::RetryDetailAfter(Duration::from_millis(1500))));
        assert!(!context.detail_injected());

        host.append(r#"<div data-sentry-element="ActionButtonsContainer"></div>"#);
        assert!(context.on_detail_retry().is_empty());
        assert!(context.detail_injected());

        assert!(context.on_detail_retry().is_empty());
        assert!(context.on_detail_mutation(0.0));
        let anchor = host.query(r#"div[data-sentry-element="ActionButtonsContainer"]"#).unwrap();
        assert_eq!(host.attach_count(&anchor), 1);
        assert_eq!(host.placement(&anchor), Some(Placement::Detail));

        let synced = context.apply_state(&StateUpdate {
            property_id: "apartament-2-camere-IDabc1".to_string(),
            hostname: Some("www.storia.ro".to_string()),
            is_favorite: true,
            is_ignored: true,
        });
        assert_eq!(synced, 1);
        assert_eq!(host.state(&anchor, Collection::Favorites), Some(ControlState::Active));
        assert!(!host.is_dimmed(&anchor));
    }

    #[test]
    fn test_fresh_context_adopts_existing_detail_controls() {
        let host = FakeHost::new(
            STORIA_DETAIL,
            r#"<html><body><div data-sentry-element="ActionButtonsContainer"></div></body></html>"#,
        );
        let messenger = FakeMessenger::new();
        context(&host, &messenger).start();
        let anchor = host.query(r#"div[data-sentry-element="ActionButtonsContainer"]"#).unwrap();

        let mut next = context(&host, &messenger);
        let directives = next.start();
        assert!(!directives.iter().any(|d| matches!(d, Directive::RetryDetailAfter(_))));
        assert!(next.detail_injected());
        assert_eq!(host.attach_count(&anchor), 1);

        let synced = next.apply_state(&StateUpdate {
            property_id: "apartament-2-camere-IDabc1".to_string(),
            hostname: Some("www.storia.ro".to_string()),
            is_favorite: false,
            is_ignored: true,
        });
        assert_eq!(synced, 1);
        assert_eq!(host.state(&anchor, Collection::Ignored), Some(ControlState::Active));
    }

    #[test]
    fn test_detail_retries_are_bounded() {
        let host = FakeHost::new(STORIA_DETAIL, "<html><body></body></html>");
        let messenger = FakeMessenger::new();
        let mut context = context(&host, &messenger);
        context.start();

        let mut retries = 0;
        while !context.on_detail_retry().is_empty() {
            retries += 1;
            assert!(retries < 100);
        }

        assert_eq!(retries, 9);
        assert!(!context.detail_injected());
    }

    #[test]
    fn test_olx_detail_waits_for_overlay_and_throttles() {
        let host = FakeHost::new(
            "https://www.olx.ro/d/oferta/garsoniera-centru-IDk3Lp9.html",
            r#"<html><body>
                 <div data-testid="main"><div data-testid="ad-price-container"><h3>62.000 €</h3></div></div>
                 <div data-testid="modal-root"></div>
               </body></html>"#,
        );
        let messenger = FakeMessenger::new();
        let mut context = context(&host, &messenger);

        let directives = context.start();
        assert!(matches!(directives[directives.len() - 2], Directive::WatchDetail(_)));
        assert!(!context.on_detail_mutation(10_000.0));

        host.remove_matching(r#"[data-testid="modal-root"]"#);
        assert!(!context.on_detail_mutation(10_500.0));
        assert!(context.on_detail_mutation(11_000.0));

        let sent = messenger.sent();
        assert!(sent.iter().any(|message| *message
            == crate::relay::Message::get(Collection::Favorites, Some("www.olx.ro"))));
    }

    #[test]
    fn test_list_page_never_retries_detail() {
        let host = FakeHost::new(IMOBILIARE_URL, &imobiliare_page(&["1"]));
        let messenger = FakeMessenger::new();
        let mut context = context(&host, &messenger);

        let directives = context.start();

        assert!(!directives.iter().any(|d| matches!(d, Directive::RetryDetailAfter(_))));
        assert!(context.on_detail_retry().is_empty());
        assert!(!context.on_detail_mutation(0.0));
    }
}
