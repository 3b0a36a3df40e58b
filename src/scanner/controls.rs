/// Favorite / hide controls bound to one record
use super::host::{ControlState, Host, Messenger, Placement};
use crate::property::{Collection, PropertyRecord};
use crate::relay::{Message, Reply, StateUpdate, ToggleRequest};
use log::{debug, warn};
use std::rc::Rc;

/// Attach controls in the pending state and ask the store for membership.
///
/// Attaching is synchronous so the marker is in place before any reply
/// can arrive.
pub fn bind<H: Host, M: Messenger>(host: &H, messenger: &M, node: &H::Node, placement: Placement, record: PropertyRecord) {
    let on_press = {
        let host = host.clone();
        let messenger = messenger.clone();
        let node = node.clone();
        let record = record.clone();
        Rc::new(move |collection: Collection| toggle(&host, &messenger, &node, placement, &record, collection))
    };
    host.attach_controls(node, placement, on_press);

    for collection in Collection::ALL {
        host.render(node, placement, collection, ControlState::Pending);
    }
    refresh(host, messenger, node, placement, &record);
}

/// Query both collections and render the answers as they arrive.
/// A failed query leaves the button pending.
pub fn refresh<H: Host, M: Messenger>(host: &H, messenger: &M, node: &H::Node, placement: Placement, record: &PropertyRecord) {
    for collection in Collection::ALL {
        let host = host.clone();
        let node = node.clone();
        let key = record.key();
        messenger.send(
            Message::get(collection, Some(&record.hostname)),
            Box::new(move |result| match result {
                Ok(Reply::Properties { properties }) => {
                    let member = properties.iter().any(|p| p.same_entity(&key));
                    show(&host, &node, placement, collection, member);
                }
                Ok(reply) => warn!("membership query for {} failed: {:?}", key.id, reply),
                Err(error) => warn!("membership query for {} failed: {}", key.id, error),
            }),
        );
    }
}

/// Press handler body. Only this control changes; the card isn't reprocessed.
fn toggle<H: Host, M: Messenger>(
    host: &H,
    messenger: &M,
    node: &H::Node,
    placement: Placement,
    record: &PropertyRecord,
    collection: Collection,
) {
    host.press_feedback(node, placement, collection);

    let host = host.clone();
    let node = node.clone();
    let id = record.id.clone();
    messenger.send(
        Message::toggle(collection, ToggleRequest::record(record.clone())),
        Box::new(move |result| match result {
            Ok(reply) => match reply.toggled(collection) {
                Some(member) => show(&host, &node, placement, collection, member),
                None => warn!("toggle of {} on {} rejected: {:?}", id, collection.storage_key(), reply),
            },
            Err(error) => warn!("toggle of {} on {} failed: {}", id, collection.storage_key(), error),
        }),
    );
}

/// Re-render from a state broadcast.
pub fn sync<H: Host>(host: &H, node: &H::Node, placement: Placement, update: &StateUpdate) {
    debug!("re-sync {} from broadcast", update.property_id);
    show(host, node, placement, Collection::Favorites, update.is_favorite);
    show(host, node, placement, Collection::Ignored, update.is_ignored);
}

fn show<H: Host>(host: &H, node: &H::Node, placement: Placement, collection: Collection, member: bool) {
    host.render(node, placement, collection, ControlState::from_member(member));
    if collection == Collection::Ignored && placement == Placement::Card {
        host.set_dimmed(node, member);
    }
}
