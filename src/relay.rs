/// Message envelope between scan contexts, the popup and the background store
use crate::error::StoreError;
use crate::property::{Collection, PropertyKey, PropertyRecord};
use crate::storage::Storage;
use crate::store::{CollectionStore, ToggleTarget};
use log::{debug, warn};
use serde::{Deserialize, Serialize};

/// Requests and the state-change broadcast, tagged by `type` on the wire.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Message {
    GetFavoriteProperties {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        hostname: Option<String>,
    },
    GetIgnoredProperties {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        hostname: Option<String>,
    },
    ToggleFavoriteProperty(ToggleRequest),
    ToggleIgnoreProperty(ToggleRequest),
    PropertyStateUpdated(StateUpdate),
}

impl Message {
    pub fn get(collection: Collection, hostname: Option<&str>) -> Message {
        let hostname = hostname.map(str::to_string);
        match collection {
            Collection::Favorites => Message::GetFavoriteProperties { hostname },
            Collection::Ignored => Message::GetIgnoredProperties { hostname },
        }
    }

    pub fn toggle(collection: Collection, request: ToggleRequest) -> Message {
        match collection {
            Collection::Favorites => Message::ToggleFavoriteProperty(request),
            Collection::Ignored => Message::ToggleIgnoreProperty(request),
        }
    }
}

/// Toggle payload: `propertyInfo` for a full record, or `propertyId`
/// (plus an optional `hostname`) for a record the store already holds.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ToggleRequest {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub property_info: Option<PropertyRecord>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub property_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hostname: Option<String>,
}

impl ToggleRequest {
    pub fn record(record: PropertyRecord) -> Self {
        ToggleRequest {
            property_info: Some(record),
            ..Default::default()
        }
    }

    pub fn by_key(key: &PropertyKey) -> Self {
        ToggleRequest {
            property_id: Some(key.id.clone()),
            hostname: Some(key.hostname.clone()),
            ..Default::default()
        }
    }

    fn target(self) -> Option<ToggleTarget> {
        match (self.property_info, self.property_id) {
            (Some(record), _) => Some(ToggleTarget::Record(record)),
            (None, Some(id)) => Some(ToggleTarget::Id {
                id,
                hostname: self.hostname,
            }),
            (None, None) => None,
        }
    }
}

/// `PROPERTY_STATE_UPDATED` payload.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct StateUpdate {
    pub property_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hostname: Option<String>,
    pub is_favorite: bool,
    pub is_ignored: bool,
}

/// Response envelope. Untagged: the variant is recognized by its fields.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(untagged)]
pub enum Reply {
    Properties {
        properties: Vec<PropertyRecord>,
    },
    Favorite {
        success: bool,
        #[serde(rename = "isFavorite")]
        is_favorite: bool,
    },
    Ignore {
        success: bool,
        #[serde(rename = "isIgnored")]
        is_ignored: bool,
    },
    Failure {
        success: bool,
        error: String,
    },
    Ack {
        success: bool,
    },
}

impl Reply {
    pub fn failure(error: impl ToString) -> Reply {
        Reply::Failure {
            success: false,
            error: error.to_string(),
        }
    }

    /// Membership reported by a successful toggle of `collection`.
    pub fn toggled(&self, collection: Collection) -> Option<bool> {
        match (self, collection) {
            (Reply::Favorite { success: true, is_favorite }, Collection::Favorites) => Some(*is_favorite),
            (Reply::Ignore { success: true, is_ignored }, Collection::Ignored) => Some(*is_ignored),
            _ => None,
        }
    }

    pub fn properties(&self) -> Option<&[PropertyRecord]> {
        match self {
            Reply::Properties { properties } => Some(properties),
            _ => None,
        }
    }
}

/// Result of handling one message in the store context.
#[derive(Debug, Clone, PartialEq)]
pub struct Dispatch {
    pub reply: Reply,
    /// Sent to every tab after a successful toggle.
    pub broadcast: Option<Message>,
}

/// Background-side request handler in front of the store.
pub struct Relay<S: Storage> {
    store: CollectionStore<S>,
}

impl<S: Storage> Relay<S> {
    pub fn new(store: CollectionStore<S>) -> Self {
        Relay { store }
    }

    pub fn store(&self) -> &CollectionStore<S> {
        &self.store
    }

    pub async fn dispatch(&self, message: Message) -> Dispatch {
        debug!("relay received {:?}", message);
        match message {
            Message::GetFavoriteProperties { hostname } => self.list(Collection::Favorites, hostname).await,
            Message::GetIgnoredProperties { hostname } => self.list(Collection::Ignored, hostname).await,
            Message::ToggleFavoriteProperty(request) => self.toggle(Collection::Favorites, request).await,
            Message::ToggleIgnoreProperty(request) => self.toggle(Collection::Ignored, request).await,
            // Broadcasts are for scan contexts; the store only acknowledges.
            Message::PropertyStateUpdated(_) => Dispatch {
                reply: Reply::Ack { success: true },
                broadcast: None,
            },
        }
    }

    async fn list(&self, collection: Collection, hostname: Option<String>) -> Dispatch {
        let reply = match self.store.get(collection, hostname.as_deref()).await {
            Ok(properties) => Reply::Properties { properties },
            Err(error) => {
                warn!("failed to read {}: {}", collection.storage_key(), error);
                Reply::failure(error)
            }
        };
        Dispatch { reply, broadcast: None }
    }

    async fn toggle(&self, collection: Collection, request: ToggleRequest) -> Dispatch {
        let Some(target) = request.target() else {
            return Dispatch {
                reply: Reply::failure("Missing propertyInfo or propertyId"),
                broadcast: None,
            };
        };

        let outcome = match self.store.toggle(collection, target).await {
            Ok(outcome) => outcome,
            Err(error) => {
                if !matches!(error, StoreError::NotFound { .. }) {
                    warn!("toggle on {} failed: {}", collection.storage_key(), error);
                }
                return Dispatch {
                    reply: Reply::failure(error),
                    broadcast: None,
                };
            }
        };

        let reply = match collection {
            Collection::Favorites => Reply::Favorite {
                success: true,
                is_favorite: outcome.member_now,
            },
            Collection::Ignored => Reply::Ignore {
                success: true,
                is_ignored: outcome.member_now,
            },
        };

        let key = outcome.record.key();
        let broadcast = match self.store.membership(&key).await {
            Ok(membership) => Some(Message::PropertyStateUpdated(StateUpdate {
                property_id: key.id,
                hostname: Some(key.hostname),
                is_favorite: membership.is_favorite,
                is_ignored: membership.is_ignored,
            })),
            Err(error) => {
                debug!("no broadcast for {}: {}", key.id, error);
                None
            }
        };

        Dispatch { reply, broadcast }
    }
}
