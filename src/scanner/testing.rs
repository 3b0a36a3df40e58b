/// In-memory page and transport for scanner tests
use super::host::{ControlState, Host, Messenger, Placement, PressHandler, ReplyHandler};
use crate::dom::ElementView;
use crate::error::RelayError;
use crate::property::Collection;
use crate::relay::{Message, Relay};
use crate::storage::MemoryStorage;
use crate::store::CollectionStore;
use futures::executor::block_on;
use scraper::{ElementRef, Html, Selector};
use std::cell::{Cell, RefCell};
use std::collections::{HashMap, HashSet, VecDeque};
use std::rc::Rc;

type NodeId = (usize, usize);

/// Element `index` (pre-order among elements) of page chunk `chunk`.
#[derive(Clone)]
pub struct FakeNode {
    html: Rc<Html>,
    chunk: usize,
    index: usize,
}

impl FakeNode {
    fn id(&self) -> NodeId {
        (self.chunk, self.index)
    }

    fn element(&self) -> ElementRef<'_> {
        elements(&self.html).nth(self.index).expect("node index")
    }
}

impl PartialEq for FakeNode {
    fn eq(&self, other: &Self) -> bool {
        self.id() == other.id()
    }
}

impl std::fmt::Debug for FakeNode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "FakeNode({}, {})", self.chunk, self.index)
    }
}

impl ElementView for FakeNode {
    fn attribute(&self, name: &str) -> Option<String> {
        self.element().attribute(name)
    }

    fn text_content(&self) -> String {
        self.element().text_content()
    }

    fn own_text(&self) -> Vec<String> {
        self.element().own_text()
    }

    fn is_match(&self, selector: &str) -> bool {
        self.element().is_match(selector)
    }

    fn select_one(&self, selector: &str) -> Option<Box<dyn ElementView + '_>> {
        let parsed = Selector::parse(selector).ok()?;
        let found = self.element().select(&parsed).next()?;
        Some(Box::new(found))
    }
}

fn elements(html: &Html) -> impl Iterator<Item = ElementRef<'_>> {
    html.root_element().descendants().filter_map(ElementRef::wrap)
}

struct Controls {
    placement: Placement,
    on_press: PressHandler,
    attached: usize,
    states: HashMap<Collection, ControlState>,
    feedback: usize,
}

struct Page {
    url: String,
    visible: bool,
    chunks: Vec<Rc<Html>>,
    detached: HashSet<usize>,
    removed: HashSet<NodeId>,
    controls: HashMap<NodeId, Controls>,
    dimmed: HashSet<NodeId>,
}

/// A page made of an initial document plus appended fragments. Recorded
/// controls stand in for injected markup.
#[derive(Clone)]
pub struct FakeHost {
    page: Rc<RefCell<Page>>,
}

impl FakeHost {
    pub fn new(url: &str, document: &str) -> Self {
        FakeHost {
            page: Rc::new(RefCell::new(Page {
                url: url.to_string(),
                visible: true,
                chunks: vec![Rc::new(Html::parse_document(document))],
                detached: HashSet::new(),
                removed: HashSet::new(),
                controls: HashMap::new(),
                dimmed: HashSet::new(),
            })),
        }
    }

    pub fn set_url(&self, url: &str) {
        self.page.borrow_mut().url = url.to_string();
    }

    pub fn set_visible(&self, visible: bool) {
        self.page.borrow_mut().visible = visible;
    }

    /// Insert a fragment and return its top-level elements, as a mutation
    /// record would.
    pub fn append(&self, fragment: &str) -> Vec<FakeNode> {
        let html = Rc::new(Html::parse_fragment(fragment));
        let mut page = self.page.borrow_mut();
        let chunk = page.chunks.len();
        page.chunks.push(html.clone());

        let top: Vec<_> = html.root_element().children().filter_map(ElementRef::wrap).map(|el| el.id()).collect();
        elements(&html)
            .enumerate()
            .filter(|(_, el)| top.contains(&el.id()))
            .map(|(index, _)| FakeNode { html: html.clone(), chunk, index })
            .collect()
    }

    /// Remove the most recently appended fragment from the page.
    pub fn detach_last(&self) {
        let mut page = self.page.borrow_mut();
        let last = page.chunks.len() - 1;
        page.detached.insert(last);
    }

    /// Remove every element matching `selector`, with its subtree.
    pub fn remove_matching(&self, selector: &str) {
        let doomed: Vec<NodeId> = self
            .query_all(selector)
            .iter()
            .flat_map(|node| {
                let mut subtree = self.query_within(node, "*");
                subtree.push(node.clone());
                subtree
            })
            .map(|node| node.id())
            .collect();
        self.page.borrow_mut().removed.extend(doomed);
    }

    fn nodes(&self) -> Vec<FakeNode> {
        let page = self.page.borrow();
        page.chunks
            .iter()
            .enumerate()
            .filter(|(chunk, _)| !page.detached.contains(chunk))
            .flat_map(|(chunk, html)| {
                (0..elements(html).count()).map(move |index| FakeNode {
                    html: html.clone(),
                    chunk,
                    index,
                })
            })
            .filter(|node| !page.removed.contains(&node.id()))
            .collect()
    }

    /// Simulate a click on one of the node's buttons.
    pub fn press(&self, node: &FakeNode, collection: Collection) {
        let on_press = self.page.borrow().controls.get(&node.id()).map(|c| c.on_press.clone());
        (on_press.expect("controls attached"))(collection);
    }

    pub fn bound_count(&self) -> usize {
        self.page.borrow().controls.len()
    }

    pub fn attach_count(&self, node: &FakeNode) -> usize {
        self.page.borrow().controls.get(&node.id()).map_or(0, |c| c.attached)
    }

    pub fn placement(&self, node: &FakeNode) -> Option<Placement> {
        self.page.borrow().controls.get(&node.id()).map(|c| c.placement)
    }

    pub fn state(&self, node: &FakeNode, collection: Collection) -> Option<ControlState> {
        self.page
            .borrow()
            .controls
            .get(&node.id())
            .and_then(|c| c.states.get(&collection).copied())
    }

    pub fn is_dimmed(&self, node: &FakeNode) -> bool {
        self.page.borrow().dimmed.contains(&node.id())
    }

    pub fn feedback_count(&self, node: &FakeNode) -> usize {
        self.page.borrow().controls.get(&node.id()).map_or(0, |c| c.feedback)
    }
}

impl Host for FakeHost {
    type Node = FakeNode;

    fn page_url(&self) -> String {
        self.page.borrow().url.clone()
    }

    fn is_visible(&self) -> bool {
        self.page.borrow().visible
    }

    fn root(&self) -> Option<FakeNode> {
        let html = self.page.borrow().chunks[0].clone();
        Some(FakeNode { html, chunk: 0, index: 0 })
    }

    fn query(&self, selector: &str) -> Option<FakeNode> {
        self.query_all(selector).into_iter().next()
    }

    fn query_all(&self, selector: &str) -> Vec<FakeNode> {
        self.nodes().into_iter().filter(|node| node.is_match(selector)).collect()
    }

    fn query_within(&self, root: &FakeNode, selector: &str) -> Vec<FakeNode> {
        let Ok(parsed) = Selector::parse(selector) else {
            return Vec::new();
        };
        let found: Vec<_> = root.element().select(&parsed).map(|el| el.id()).collect();
        let removed = self.page.borrow().removed.clone();
        elements(&root.html)
            .enumerate()
            .filter(|(_, el)| found.contains(&el.id()))
            .map(|(index, _)| FakeNode {
                html: root.html.clone(),
                chunk: root.chunk,
                index,
            })
            .filter(|node| !removed.contains(&node.id()))
            .collect()
    }

    fn has_controls(&self, node: &FakeNode, placement: Placement) -> bool {
        self.page
            .borrow()
            .controls
            .get(&node.id())
            .is_some_and(|c| c.placement == placement)
    }

    fn attach_controls(&self, node: &FakeNode, placement: Placement, on_press: PressHandler) {
        let mut page = self.page.borrow_mut();
        let controls = page.controls.entry(node.id()).or_insert_with(|| Controls {
            placement,
            on_press: on_press.clone(),
            attached: 0,
            states: HashMap::new(),
            feedback: 0,
        });
        controls.attached += 1;
        controls.on_press = on_press;
    }

    fn render(&self, node: &FakeNode, _placement: Placement, collection: Collection, state: ControlState) {
        if let Some(controls) = self.page.borrow_mut().controls.get_mut(&node.id()) {
            controls.states.insert(collection, state);
        }
    }

    fn set_dimmed(&self, node: &FakeNode, dimmed: bool) {
        let mut page = self.page.borrow_mut();
        if dimmed {
            page.dimmed.insert(node.id());
        } else {
            page.dimmed.remove(&node.id());
        }
    }

    fn press_feedback(&self, node: &FakeNode, _placement: Placement, _collection: Collection) {
        if let Some(controls) = self.page.borrow_mut().controls.get_mut(&node.id()) {
            controls.feedback += 1;
        }
    }

    fn is_connected(&self, node: &FakeNode) -> bool {
        let page = self.page.borrow();
        !page.detached.contains(&node.chunk) && !page.removed.contains(&node.id())
    }
}

/// Routes messages to a real relay over in-memory storage.
#[derive(Clone)]
pub struct FakeMessenger {
    relay: Rc<Relay<MemoryStorage>>,
    deferred: Rc<Cell<bool>>,
    failing: Rc<Cell<bool>>,
    queue: Rc<RefCell<VecDeque<(Message, ReplyHandler)>>>,
    sent: Rc<RefCell<Vec<Message>>>,
}

impl FakeMessenger {
    pub fn new() -> Self {
        FakeMessenger {
            relay: Rc::new(Relay::new(CollectionStore::new(MemoryStorage::new(), || 0.0))),
            deferred: Rc::new(Cell::new(false)),
            failing: Rc::new(Cell::new(false)),
            queue: Rc::new(RefCell::new(VecDeque::new())),
            sent: Rc::new(RefCell::new(Vec::new())),
        }
    }

    pub fn relay(&self) -> &Relay<MemoryStorage> {
        &self.relay
    }

    /// Hold replies until `flush`.
    pub fn defer_replies(&self, deferred: bool) {
        self.deferred.set(deferred);
    }

    /// Reject every send as if the store context were gone.
    pub fn fail_sends(&self, failing: bool) {
        self.failing.set(failing);
    }

    pub fn flush(&self) {
        loop {
            let next = self.queue.borrow_mut().pop_front();
            let Some((message, on_reply)) = next else {
                break;
            };
            self.deliver(message, on_reply);
        }
    }

    pub fn sent(&self) -> Vec<Message> {
        self.sent.borrow().clone()
    }

    fn deliver(&self, message: Message, on_reply: ReplyHandler) {
        let dispatch = block_on(self.relay.dispatch(message));
        on_reply(Ok(dispatch.reply));
    }
}

impl Messenger for FakeMessenger {
    fn send(&self, message: Message, on_reply: ReplyHandler) {
        self.sent.borrow_mut().push(message.clone());
        if self.failing.get() {
            on_reply(Err(RelayError::Disconnected("store context unavailable".to_string())));
        } else if self.deferred.get() {
            self.queue.borrow_mut().push_back((message, on_reply));
        } else {
            self.deliver(message, on_reply);
        }
    }
}
