//! Session-scoped key-value storage
//!
//! All persistence in this crate goes through [`KeyValueStore`]: a
//! string-only store with session lifetime, addressed by fixed keys. The
//! contract deliberately mirrors a browser session store: values survive a
//! reload but not the end of the session, writes can fail (quota, disabled
//! storage), and corrupt or missing entries default to empty at every call
//! site.
//!
//! Services treat the store as best-effort: a failed write must never change
//! a service's verdict, only whether that verdict survives a reload.

use std::collections::HashMap;
use std::sync::RwLock;

use crate::error::StorageError;

/// A string-only key-value store with session lifetime.
pub trait KeyValueStore: Send + Sync + 'static {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError>;
    fn set(&self, key: &str, value: &str) -> Result<(), StorageError>;
    fn remove(&self, key: &str) -> Result<(), StorageError>;
}

/// In-memory store backing a single session.
///
/// An optional byte quota reproduces the exhaustion behavior of real session
/// storage: once the total size of keys and values would exceed the quota,
/// writes fail with [`StorageError::QuotaExceeded`] while reads keep working.
pub struct MemoryStore {
    entries: RwLock<HashMap<String, String>>,
    quota_bytes: Option<usize>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self {
            entries: RwLock::new(HashMap::new()),
            quota_bytes: None,
        }
    }

    /// A store that rejects writes once `quota_bytes` of keys + values are
    /// held.
    pub fn with_quota(quota_bytes: usize) -> Self {
        Self {
            entries: RwLock::new(HashMap::new()),
            quota_bytes: Some(quota_bytes),
        }
    }

    fn used_bytes(entries: &HashMap<String, String>) -> usize {
        entries.iter().map(|(k, v)| k.len() + v.len()).sum()
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        let entries = self
            .entries
            .read()
            .map_err(|e| StorageError::Unavailable(e.to_string()))?;
        Ok(entries.get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        let mut entries = self
            .entries
            .write()
            .map_err(|e| StorageError::Unavailable(e.to_string()))?;

        if let Some(quota) = self.quota_bytes {
            let existing = entries.get(key).map(|v| key.len() + v.len()).unwrap_or(0);
            let used = Self::used_bytes(&entries) - existing;
            if used + key.len() + value.len() > quota {
                return Err(StorageError::QuotaExceeded);
            }
        }

        entries.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), StorageError> {
        let mut entries = self
            .entries
            .write()
            .map_err(|e| StorageError::Unavailable(e.to_string()))?;
        entries.remove(key);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_roundtrip() {
        let store = MemoryStore::new();
        assert_eq!(store.get("missing").unwrap(), None);

        store.set("csrf_token", "abc123").unwrap();
        assert_eq!(store.get("csrf_token").unwrap().as_deref(), Some("abc123"));

        store.remove("csrf_token").unwrap();
        assert_eq!(store.get("csrf_token").unwrap(), None);
    }

    #[test]
    fn test_overwrite_replaces_value() {
        let store = MemoryStore::new();
        store.set("visit_count", "1").unwrap();
        store.set("visit_count", "2").unwrap();
        assert_eq!(store.get("visit_count").unwrap().as_deref(), Some("2"));
    }

    #[test]
    fn test_quota_rejects_oversized_writes() {
        let store = MemoryStore::with_quota(16);
        store.set("a", "0123456789").unwrap();

        let err = store.set("b", "0123456789").unwrap_err();
        assert!(matches!(err, StorageError::QuotaExceeded));

        // Reads and removals still work after quota exhaustion
        assert_eq!(store.get("a").unwrap().as_deref(), Some("0123456789"));
        store.remove("a").unwrap();
        store.set("b", "0123456789").unwrap();
    }

    #[test]
    fn test_quota_accounts_for_replaced_value() {
        let store = MemoryStore::with_quota(12);
        store.set("key", "12345678").unwrap();
        // Replacing a value frees its old footprint first
        store.set("key", "87654321").unwrap();
        assert_eq!(store.get("key").unwrap().as_deref(), Some("87654321"));
    }
}
