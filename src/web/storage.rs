/// chrome.storage.local backend
use super::bridge::{getStorage, setStorage};
use crate::error::StoreError;
use crate::property::{Collection, PropertyRecord};
use crate::settings::{SETTINGS_KEY, ScanSettings};
use crate::storage::Storage;
use log::warn;

#[derive(Debug, Clone, Copy, Default)]
pub struct ChromeStorage;

impl Storage for ChromeStorage {
    async fn read(&self, collection: Collection) -> Result<Option<Vec<PropertyRecord>>, StoreError> {
        let key = collection.storage_key();
        let value = getStorage(key)
            .await
            .map_err(|e| StoreError::Backend(format!("Failed to get {}: {:?}", key, e)))?;

        if value.is_null() || value.is_undefined() {
            return Ok(None);
        }
        serde_wasm_bindgen::from_value(value)
            .map(Some)
            .map_err(|e| StoreError::Corrupt {
                key: key.to_string(),
                reason: e.to_string(),
            })
    }

    async fn write(&self, collection: Collection, records: &[PropertyRecord]) -> Result<(), StoreError> {
        let key = collection.storage_key();
        let value = serde_wasm_bindgen::to_value(records)
            .map_err(|e| StoreError::Backend(format!("Failed to serialize {}: {:?}", key, e)))?;

        setStorage(key, value)
            .await
            .map_err(|e| StoreError::Backend(format!("Failed to save {}: {:?}", key, e)))
    }
}

/// Stored timing overrides, or the defaults.
pub async fn load_settings() -> ScanSettings {
    let value = match getStorage(SETTINGS_KEY).await {
        Ok(value) if !value.is_null() && !value.is_undefined() => value,
        Ok(_) => return ScanSettings::default(),
        Err(e) => {
            warn!("Failed to read {}: {:?}", SETTINGS_KEY, e);
            return ScanSettings::default();
        }
    };

    serde_wasm_bindgen::from_value(value).unwrap_or_else(|e| {
        warn!("Ignoring malformed {}: {}", SETTINGS_KEY, e);
        ScanSettings::default()
    })
}
