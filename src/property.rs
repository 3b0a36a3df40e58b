/// Data structures for ImobiliarePlus
use serde::{Deserialize, Serialize};

/// A listing as extracted from a card or detail page, and as persisted.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PropertyRecord {
    pub id: String,
    #[serde(default)]
    pub title: String,
    pub url: String,
    #[serde(default)]
    pub thumbnail: String,
    pub hostname: String,
    #[serde(default)]
    pub price: String,
    /// Milliseconds since epoch, stamped when the record enters a collection.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub saved_at: Option<f64>,
}

impl PropertyRecord {
    pub fn key(&self) -> PropertyKey {
        PropertyKey::new(&self.id, &self.hostname)
    }

    /// Same listing on the same site. `id` alone is not globally unique.
    pub fn same_entity(&self, key: &PropertyKey) -> bool {
        self.id == key.id && self.hostname == key.hostname
    }
}

/// Identity of a record: `(id, hostname)`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PropertyKey {
    pub id: String,
    pub hostname: String,
}

impl PropertyKey {
    pub fn new(id: &str, hostname: &str) -> PropertyKey {
        PropertyKey {
            id: id.to_string(),
            hostname: hostname.to_string(),
        }
    }
}

/// The two persisted lists.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Collection {
    Favorites,
    Ignored,
}

impl Collection {
    pub const ALL: [Collection; 2] = [Collection::Favorites, Collection::Ignored];

    /// Top-level key in extension storage.
    pub fn storage_key(self) -> &'static str {
        match self {
            Collection::Favorites => "favoriteProperties",
            Collection::Ignored => "ignoredProperties",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Collection::Favorites => "Favorite",
            Collection::Ignored => "Hide",
        }
    }
}

/// Membership of one record in both collections. Both flags may be set.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Membership {
    pub is_favorite: bool,
    pub is_ignored: bool,
}

impl Membership {
    pub fn get(&self, collection: Collection) -> bool {
        match collection {
            Collection::Favorites => self.is_favorite,
            Collection::Ignored => self.is_ignored,
        }
    }

    pub fn set(&mut self, collection: Collection, member: bool) {
        match collection {
            Collection::Favorites => self.is_favorite = member,
            Collection::Ignored => self.is_ignored = member,
        }
    }
}
