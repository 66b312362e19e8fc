//! Cookie store configuration.

use std::time::Duration;

/// Store identity used when none is configured.
pub const DEFAULT_STORE_ID: &str = "default";

/// Configuration for [`KvCookieStore`](super::kvstore::KvCookieStore).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KvCookieStoreConfig {
    /// Logical store identity; namespaces every key.
    pub id: String,
    /// `COUNT` hint passed with every `SCAN` call
    pub scan_count: usize,
    /// Wall-clock ceiling for one full scan loop
    pub scan_timeout: Duration,
}

impl Default for KvCookieStoreConfig {
    fn default() -> Self {
        Self {
            id: DEFAULT_STORE_ID.to_string(),
            scan_count: 100,
            scan_timeout: Duration::from_secs(10),
        }
    }
}

impl KvCookieStoreConfig {
    /// Create a new config with defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the store identity. An empty id keeps the default.
    pub fn id(mut self, id: impl Into<String>) -> Self {
        let id = id.into();
        if !id.is_empty() {
            self.id = id;
        }
        self
    }

    /// Set the `SCAN` count hint.
    pub fn scan_count(mut self, count: usize) -> Self {
        self.scan_count = count.max(1);
        self
    }

    /// Set the scan wall-clock ceiling.
    pub fn scan_timeout(mut self, timeout: Duration) -> Self {
        self.scan_timeout = timeout;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = KvCookieStoreConfig::default();
        assert_eq!(config.id, "default");
        assert_eq!(config.scan_count, 100);
        assert_eq!(config.scan_timeout, Duration::from_secs(10));
    }

    #[test]
    fn test_builder_pattern() {
        let config = KvCookieStoreConfig::new()
            .id("tenant-42")
            .scan_count(10)
            .scan_timeout(Duration::from_secs(2));

        assert_eq!(config.id, "tenant-42");
        assert_eq!(config.scan_count, 10);
        assert_eq!(config.scan_timeout, Duration::from_secs(2));
    }

    #[test]
    fn test_empty_id_keeps_default() {
        let config = KvCookieStoreConfig::new().id("").scan_count(0);
        assert_eq!(config.id, DEFAULT_STORE_ID);
        assert_eq!(config.scan_count, 1);
    }
}
