/// The sole owner of the favorite / ignored collections
use crate::error::StoreError;
use crate::property::{Collection, Membership, PropertyKey, PropertyRecord};
use crate::storage::{Collections, Storage};
use futures::lock::Mutex;
use log::{info, warn};

/// What to toggle: a full record, or the id of a record already stored.
#[derive(Debug, Clone, PartialEq)]
pub enum ToggleTarget {
    Record(PropertyRecord),
    Id { id: String, hostname: Option<String> },
}

#[derive(Debug, Clone, PartialEq)]
pub struct ToggleOutcome {
    pub member_now: bool,
    pub record: PropertyRecord,
}

/// Serializes every read-modify-write so concurrent requests can't interleave
/// between loading a collection and persisting it.
pub struct CollectionStore<S: Storage> {
    storage: S,
    lock: Mutex<()>,
    clock: Box<dyn Fn() -> f64>,
}

impl<S: Storage> CollectionStore<S> {
    pub fn new(storage: S, clock: impl Fn() -> f64 + 'static) -> Self {
        CollectionStore {
            storage,
            lock: Mutex::new(()),
            clock: Box::new(clock),
        }
    }

    pub fn storage(&self) -> &S {
        &self.storage
    }

    /// Write empty lists for any collection that has never been stored.
    pub async fn initialize(&self) -> Result<(), StoreError> {
        let _guard = self.lock.lock().await;
        for collection in Collection::ALL {
            if self.storage.read(collection).await?.is_none() {
                self.storage.write(collection, &[]).await?;
                info!("initialized empty {}", collection.storage_key());
            }
        }
        Ok(())
    }

    async fn load(&self) -> Result<Collections, StoreError> {
        let mut collections = Collections::new();
        for collection in Collection::ALL {
            let records = self.storage.read(collection).await?.unwrap_or_default();
            collections.replace(collection, records);
        }
        Ok(collections)
    }

    /// Records of one collection in insertion order, optionally only one site's.
    pub async fn get(&self, collection: Collection, hostname: Option<&str>) -> Result<Vec<PropertyRecord>, StoreError> {
        let records = self.storage.read(collection).await?.unwrap_or_default();
        Ok(match hostname {
            Some(host) => records.into_iter().filter(|p| p.hostname == host).collect(),
            None => records,
        })
    }

    /// The only mutation: remove when present, append otherwise.
    ///
    /// The new state is persisted before this resolves. Toggling a bare id
    /// that isn't stored fails with `StoreError::NotFound`.
    pub async fn toggle(&self, collection: Collection, target: ToggleTarget) -> Result<ToggleOutcome, StoreError> {
        let _guard = self.lock.lock().await;
        let mut collections = self.load().await?;

        let mut record = match target {
            ToggleTarget::Record(record) => record,
            ToggleTarget::Id { id, hostname } => collections
                .find(collection, &id, hostname.as_deref())
                .cloned()
                .ok_or(StoreError::NotFound { id })?,
        };
        if !collections.contains(collection, &record.key()) {
            record.saved_at = Some((self.clock)());
        }

        let member_now = collections.toggle(collection, record.clone());
        if let Err(error) = self.storage.write(collection, collections.list(collection)).await {
            warn!("failed to persist {}: {}", collection.storage_key(), error);
            return Err(error);
        }

        Ok(ToggleOutcome { member_now, record })
    }

    /// Membership of one record in both collections.
    pub async fn membership(&self, key: &PropertyKey) -> Result<Membership, StoreError> {
        let collections = self.load().await?;
        Ok(Membership {
            is_favorite: collections.contains(Collection::Favorites, key),
            is_ignored: collections.contains(Collection::Ignored, key),
        })
    }
}
