//! Two-tier asset storage.
//!
//! A session-scoped in-memory map sits over a persistent string-keyed
//! store. Reads check memory first and promote persistent hits; writes go
//! to both tiers, but a persistent failure never propagates — the asset
//! stays usable from memory for the rest of the session.

use crate::asset::Asset;
use parking_lot::Mutex;
use std::collections::HashMap;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, warn};

/// Errors from persistent-store writes.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("store capacity exceeded: {used} + {incoming} bytes over {capacity}")]
    Full {
        used: usize,
        incoming: usize,
        capacity: usize,
    },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// A synchronous string-keyed persistent store.
///
/// The trait is object-safe and uses `&self`; implementations rely on
/// interior mutability. `set` may fail (a full or unavailable store) and
/// must never panic the caller.
pub trait KeyValueStore: Send + Sync {
    /// Read a value. `None` if the key is absent or unreadable.
    fn get(&self, key: &str) -> Option<String>;

    /// Write a value to both the store and its backing medium.
    fn set(&self, key: &str, value: &str) -> Result<(), StoreError>;

    /// Remove a key. Removing an absent key is a no-op.
    fn remove(&self, key: &str);
}

/// In-memory [`KeyValueStore`] with an optional byte budget.
///
/// The byte budget emulates a finite store so tests can exercise
/// write-failure paths.
pub struct MemoryKv {
    entries: Mutex<HashMap<String, String>>,
    capacity: Option<usize>,
}

impl MemoryKv {
    pub fn new() -> Self {
        Self {
            entries: Mutex::new(HashMap::new()),
            capacity: None,
        }
    }

    /// Limit the total size of keys plus values to `bytes`.
    pub fn with_capacity(bytes: usize) -> Self {
        Self {
            entries: Mutex::new(HashMap::new()),
            capacity: Some(bytes),
        }
    }

    pub fn len(&self) -> usize {
        self.entries.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Default for MemoryKv {
    fn default() -> Self {
        Self::new()
    }
}

fn used_bytes(entries: &HashMap<String, String>, replacing: &str) -> usize {
    entries
        .iter()
        .filter(|(k, _)| k.as_str() != replacing)
        .map(|(k, v)| k.len() + v.len())
        .sum()
}

impl KeyValueStore for MemoryKv {
    fn get(&self, key: &str) -> Option<String> {
        self.entries.lock().get(key).cloned()
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StoreError> {
        let mut entries = self.entries.lock();
        if let Some(capacity) = self.capacity {
            let used = used_bytes(&entries, key);
            let incoming = key.len() + value.len();
            if used + incoming > capacity {
                return Err(StoreError::Full {
                    used,
                    incoming,
                    capacity,
                });
            }
        }
        entries.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) {
        self.entries.lock().remove(key);
    }
}

/// File-backed [`KeyValueStore`] holding a single JSON map.
///
/// Writes go through a temp file in the same directory and are renamed
/// into place, so a crash mid-write leaves the previous file intact.
pub struct FileKv {
    path: PathBuf,
    entries: Mutex<HashMap<String, String>>,
    capacity: Option<usize>,
}

impl FileKv {
    /// Open a store at `path`, loading any existing contents.
    ///
    /// An unreadable or unparsable file falls back to an empty map with a
    /// warning; it is overwritten on the next successful `set`.
    pub fn open(path: impl AsRef<Path>) -> Self {
        let path = path.as_ref().to_path_buf();
        let entries = match std::fs::read_to_string(&path) {
            Ok(raw) => serde_json::from_str(&raw).unwrap_or_else(|e| {
                warn!(path = %path.display(), error = %e, "discarding unparsable store file");
                HashMap::new()
            }),
            Err(_) => HashMap::new(),
        };

        Self {
            path,
            entries: Mutex::new(entries),
            capacity: None,
        }
    }

    /// Limit the total size of keys plus values to `bytes`.
    pub fn with_capacity(mut self, bytes: usize) -> Self {
        self.capacity = Some(bytes);
        self
    }

    fn flush(&self, entries: &HashMap<String, String>) -> Result<(), StoreError> {
        let parent = self.path.parent().unwrap_or_else(|| Path::new("."));
        std::fs::create_dir_all(parent)?;

        let mut temp = tempfile::NamedTempFile::new_in(parent)?;
        temp.write_all(serde_json::to_string(entries)?.as_bytes())?;
        temp.persist(&self.path).map_err(|e| e.error)?;
        Ok(())
    }
}

impl KeyValueStore for FileKv {
    fn get(&self, key: &str) -> Option<String> {
        self.entries.lock().get(key).cloned()
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StoreError> {
        let mut entries = self.entries.lock();
        if let Some(capacity) = self.capacity {
            let used = used_bytes(&entries, key);
            let incoming = key.len() + value.len();
            if used + incoming > capacity {
                return Err(StoreError::Full {
                    used,
                    incoming,
                    capacity,
                });
            }
        }
        entries.insert(key.to_string(), value.to_string());
        self.flush(&entries)
    }

    fn remove(&self, key: &str) {
        let mut entries = self.entries.lock();
        if entries.remove(key).is_some() {
            if let Err(e) = self.flush(&entries) {
                warn!(key, error = %e, "failed to flush store after remove");
            }
        }
    }
}

/// The two-tier store: session memory over a persistent tier.
pub struct TieredStore {
    session: Mutex<HashMap<String, Asset>>,
    persistent: Arc<dyn KeyValueStore>,
}

impl TieredStore {
    pub fn new(persistent: Arc<dyn KeyValueStore>) -> Self {
        Self {
            session: Mutex::new(HashMap::new()),
            persistent,
        }
    }

    /// Look up an asset, checking the session tier first.
    ///
    /// A persistent hit is decoded and promoted into the session tier.
    /// An undecodable persisted value is logged and treated as a miss.
    pub fn get(&self, key: &str) -> Option<Asset> {
        if let Some(asset) = self.session.lock().get(key).cloned() {
            return Some(asset);
        }

        let raw = self.persistent.get(key)?;
        match Asset::decode(&raw) {
            Ok(asset) => {
                self.session.lock().insert(key.to_string(), asset.clone());
                Some(asset)
            }
            Err(e) => {
                warn!(key, error = %e, "ignoring undecodable persisted asset");
                None
            }
        }
    }

    /// Write an asset to both tiers.
    ///
    /// A persistent-tier failure is logged and swallowed; the asset is
    /// still served from the session tier afterwards.
    pub fn put(&self, key: &str, asset: Asset) {
        match asset.encode() {
            Ok(raw) => {
                if let Err(e) = self.persistent.set(key, &raw) {
                    warn!(key, error = %e, "persistent store write failed; keeping session copy");
                }
            }
            Err(e) => {
                warn!(key, error = %e, "could not encode asset for persistence");
            }
        }
        self.session.lock().insert(key.to_string(), asset);
    }

    /// Remove an asset from both tiers.
    pub fn remove(&self, key: &str) {
        self.session.lock().remove(key);
        self.persistent.remove(key);
    }

    /// Empty the session tier only. The persistent tier is untouched, so
    /// prior work is still reusable after a fresh-session reset.
    pub fn clear_session(&self) {
        debug!("session caches cleared");
        self.session.lock().clear();
    }

    /// Whether the session tier currently holds `key`.
    pub fn session_contains(&self, key: &str) -> bool {
        self.session.lock().contains_key(key)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::asset::Asset;

    fn image(data: &str) -> Asset {
        Asset::Image(format!("data:image/png;base64,{data}"))
    }

    #[test]
    fn test_memory_kv_round_trip() {
        let kv = MemoryKv::new();
        kv.set("a", "1").unwrap();
        assert_eq!(kv.get("a"), Some("1".to_string()));
        kv.remove("a");
        assert_eq!(kv.get("a"), None);
    }

    #[test]
    fn test_memory_kv_capacity() {
        let kv = MemoryKv::with_capacity(8);
        kv.set("ab", "cd").unwrap();
        // Replacing an existing key does not double-count it.
        kv.set("ab", "cdef").unwrap();
        let err = kv.set("xy", "0123456789").unwrap_err();
        assert!(matches!(err, StoreError::Full { .. }));
        // The failed write must not clobber existing data.
        assert_eq!(kv.get("ab"), Some("cdef".to_string()));
    }

    #[test]
    fn test_tiered_get_prefers_session() {
        let persistent = Arc::new(MemoryKv::new());
        let store = TieredStore::new(persistent.clone());

        store.put("k", image("AAAA"));
        persistent.remove("k");

        // Still served from the session tier.
        assert_eq!(store.get("k"), Some(image("AAAA")));
    }

    #[test]
    fn test_tiered_promotion() {
        let persistent = Arc::new(MemoryKv::new());
        persistent
            .set("k", &image("BBBB").encode().unwrap())
            .unwrap();

        let store = TieredStore::new(persistent);
        assert!(!store.session_contains("k"));
        assert_eq!(store.get("k"), Some(image("BBBB")));
        assert!(store.session_contains("k"));
    }

    #[test]
    fn test_tiered_put_survives_persistent_failure() {
        let persistent = Arc::new(MemoryKv::with_capacity(4));
        let store = TieredStore::new(persistent.clone());

        store.put("k", image("CCCC"));
        assert_eq!(persistent.get("k"), None);
        assert_eq!(store.get("k"), Some(image("CCCC")));
    }

    #[test]
    fn test_clear_session_scope() {
        let persistent = Arc::new(MemoryKv::new());
        let store = TieredStore::new(persistent);

        store.put("k", image("DDDD"));
        store.clear_session();

        assert!(!store.session_contains("k"));
        // Re-promoted from the persistent tier.
        assert_eq!(store.get("k"), Some(image("DDDD")));
        assert!(store.session_contains("k"));
    }

    #[test]
    fn test_undecodable_persisted_value_is_a_miss() {
        let persistent = Arc::new(MemoryKv::new());
        persistent.set("k", "garbage").unwrap();

        let store = TieredStore::new(persistent);
        assert_eq!(store.get("k"), None);
    }

    #[test]
    fn test_file_kv_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("store.json");

        {
            let kv = FileKv::open(&path);
            kv.set("word", "bee").unwrap();
        }

        let reopened = FileKv::open(&path);
        assert_eq!(reopened.get("word"), Some("bee".to_string()));
    }

    #[test]
    fn test_file_kv_corrupt_file_falls_back_empty() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("store.json");
        std::fs::write(&path, "{ not json").unwrap();

        let kv = FileKv::open(&path);
        assert_eq!(kv.get("anything"), None);
        kv.set("a", "1").unwrap();
        assert_eq!(kv.get("a"), Some("1".to_string()));
    }
}
