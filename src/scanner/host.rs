/// The page and transport seams a scan-context drives
use crate::dom::ElementView;
use crate::error::RelayError;
use crate::property::Collection;
use crate::relay::{Message, Reply};
use std::rc::Rc;

/// Where a control group is attached. Each placement has its own marker.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Placement {
    Card,
    Detail,
}

/// Visual state of one button.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ControlState {
    /// Membership not known yet.
    Pending,
    Active,
    Inactive,
}

impl ControlState {
    pub fn from_member(member: bool) -> ControlState {
        if member {
            ControlState::Active
        } else {
            ControlState::Inactive
        }
    }
}

/// Called with the pressed button's collection.
pub type PressHandler = Rc<dyn Fn(Collection)>;

pub type ReplyHandler = Box<dyn FnOnce(Result<Reply, RelayError>)>;

/// DOM operations the scanner needs from a live or simulated page.
pub trait Host: Clone + 'static {
    type Node: ElementView + Clone + PartialEq + 'static;

    fn page_url(&self) -> String;

    /// Whether the document is currently visible to the user.
    fn is_visible(&self) -> bool;

    /// Document root element, read by detail extraction.
    fn root(&self) -> Option<Self::Node>;

    fn query(&self, selector: &str) -> Option<Self::Node>;

    fn query_all(&self, selector: &str) -> Vec<Self::Node>;

    /// Descendants of `root` matching `selector`, `root` excluded.
    fn query_within(&self, root: &Self::Node, selector: &str) -> Vec<Self::Node>;

    /// Synchronous marker check. Must see controls attached a moment ago.
    fn has_controls(&self, node: &Self::Node, placement: Placement) -> bool;

    /// Attach both buttons and the marker. Presses must not reach the site's
    /// own handlers.
    fn attach_controls(&self, node: &Self::Node, placement: Placement, on_press: PressHandler);

    fn render(&self, node: &Self::Node, placement: Placement, collection: Collection, state: ControlState);

    /// Dimmed presentation of an ignored card.
    fn set_dimmed(&self, node: &Self::Node, dimmed: bool);

    /// Transient press animation on one button.
    fn press_feedback(&self, node: &Self::Node, placement: Placement, collection: Collection);

    fn is_connected(&self, node: &Self::Node) -> bool;
}

/// Request/response channel to the store context.
pub trait Messenger: Clone + 'static {
    /// Never calls `on_reply` before returning on a real transport; fakes may.
    fn send(&self, message: Message, on_reply: ReplyHandler);
}
