/// Timing configuration for a scan-context
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Storage key of the optional override in `chrome.storage.local`.
pub const SETTINGS_KEY: &str = "scanSettings";

/// Every delay the scanner schedules. Missing fields keep their defaults.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase", default)]
pub struct ScanSettings {
    /// Delay between lookups while no list container is on the page.
    pub container_retry_ms: u32,
    pub scroll_debounce_ms: u32,
    /// Safety-net rescan, skipped while the tab is hidden.
    pub rescan_interval_ms: u32,
    /// Wait after an SPA route change before the new context starts.
    pub navigation_settle_ms: u32,
    pub detail_retry_ms: u32,
    pub detail_retry_limit: u32,
    /// Minimum gap between detail injection attempts driven by mutations.
    pub detail_throttle_ms: u32,
}

impl Default for ScanSettings {
    fn default() -> Self {
        ScanSettings {
            container_retry_ms: 3000,
            scroll_debounce_ms: 300,
            rescan_interval_ms: 10_000,
            navigation_settle_ms: 1000,
            detail_retry_ms: 1500,
            detail_retry_limit: 10,
            detail_throttle_ms: 1000,
        }
    }
}

impl ScanSettings {
    pub fn container_retry(&self) -> Duration {
        Duration::from_millis(self.container_retry_ms.into())
    }

    pub fn scroll_debounce(&self) -> Duration {
        Duration::from_millis(self.scroll_debounce_ms.into())
    }

    pub fn rescan_interval(&self) -> Duration {
        Duration::from_millis(self.rescan_interval_ms.into())
    }

    pub fn navigation_settle(&self) -> Duration {
        Duration::from_millis(self.navigation_settle_ms.into())
    }

    pub fn detail_retry(&self) -> Duration {
        Duration::from_millis(self.detail_retry_ms.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let settings = ScanSettings::default();
        assert_eq!(settings.container_retry(), Duration::from_secs(3));
        assert_eq!(settings.rescan_interval(), Duration::from_secs(10));
        assert_eq!(settings.detail_retry_limit, 10);
    }

    #[test]
    fn test_partial_override() {
        let settings: ScanSettings = serde_json::from_str(r#"{"scrollDebounceMs": 150}"#).unwrap();

        assert_eq!(settings.scroll_debounce_ms, 150);
        assert_eq!(settings.container_retry_ms, 3000);
    }

    #[test]
    fn test_malformed_override_is_rejected() {
        assert!(serde_json::from_str::<ScanSettings>(r#"{"scrollDebounceMs": "fast"}"#).is_err());
    }
}
