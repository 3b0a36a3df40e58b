/// Persisted collections and the storage backend seam
use crate::error::StoreError;
use crate::property::{Collection, PropertyKey, PropertyRecord};
use serde::{Deserialize, Serialize};
use std::cell::{Cell, RefCell};
use std::collections::HashMap;

/// Root storage structure, laid out as two top-level entries.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Collections {
    #[serde(default)]
    pub favorite_properties: Vec<PropertyRecord>,
    #[serde(default)]
    pub ignored_properties: Vec<PropertyRecord>,
}

impl Collections {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn list(&self, collection: Collection) -> &[PropertyRecord] {
        match collection {
            Collection::Favorites => &self.favorite_properties,
            Collection::Ignored => &self.ignored_properties,
        }
    }

    fn list_mut(&mut self, collection: Collection) -> &mut Vec<PropertyRecord> {
        match collection {
            Collection::Favorites => &mut self.favorite_properties,
            Collection::Ignored => &mut self.ignored_properties,
        }
    }

    pub fn contains(&self, collection: Collection, key: &PropertyKey) -> bool {
        self.list(collection).iter().any(|p| p.same_entity(key))
    }

    /// Remove the record if present, append it otherwise. Returns the new
    /// membership. Insertion order of the remaining records is preserved.
    pub fn toggle(&mut self, collection: Collection, record: PropertyRecord) -> bool {
        let key = record.key();
        let list = self.list_mut(collection);
        match list.iter().position(|p| p.same_entity(&key)) {
            Some(index) => {
                list.remove(index);
                false
            }
            None => {
                list.push(record);
                true
            }
        }
    }

    /// Look up a stored record by bare id, narrowed by hostname when given.
    pub fn find(&self, collection: Collection, id: &str, hostname: Option<&str>) -> Option<&PropertyRecord> {
        self.list(collection)
            .iter()
            .find(|p| p.id == id && hostname.is_none_or(|host| p.hostname == host))
    }

    pub fn replace(&mut self, collection: Collection, records: Vec<PropertyRecord>) {
        *self.list_mut(collection) = records;
    }
}

/// Extension key-value storage. `write` resolves only once the value is durable.
#[allow(async_fn_in_trait)]
pub trait Storage {
    /// `Ok(None)` when the key has never been written.
    async fn read(&self, collection: Collection) -> Result<Option<Vec<PropertyRecord>>, StoreError>;

    async fn write(&self, collection: Collection, records: &[PropertyRecord]) -> Result<(), StoreError>;
}

/// In-memory backend for tests and for running the store outside a browser.
#[derive(Debug, Default)]
pub struct MemoryStorage {
    entries: RefCell<HashMap<Collection, Vec<PropertyRecord>>>,
    fail_writes: Cell<bool>,
    writes: Cell<usize>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make subsequent writes fail, simulating a rejected storage call.
    pub fn set_fail_writes(&self, fail: bool) {
        self.fail_writes.set(fail);
    }

    pub fn write_count(&self) -> usize {
        self.writes.get()
    }

    pub fn snapshot(&self, collection: Collection) -> Option<Vec<PropertyRecord>> {
        self.entries.borrow().get(&collection).cloned()
    }
}

impl Storage for MemoryStorage {
    async fn read(&self, collection: Collection) -> Result<Option<Vec<PropertyRecord>>, StoreError> {
        Ok(self.entries.borrow().get(&collection).cloned())
    }

    async fn write(&self, collection: Collection, records: &[PropertyRecord]) -> Result<(), StoreError> {
        if self.fail_writes.get() {
            return Err(StoreError::Backend(format!(
                "write to {} rejected",
                collection.storage_key()
            )));
        }
        self.entries.borrow_mut().insert(collection, records.to_vec());
        self.writes.set(self.writes.get() + 1);
        Ok(())
    }
}
