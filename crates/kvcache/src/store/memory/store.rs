//! In-memory store implementation with LRU eviction.
//!
//! Expiration is lazy: expired entries read as missing and are removed on
//! the access that finds them.

use std::num::NonZeroUsize;
use std::sync::Arc;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use lru::LruCache;
use tokio::sync::RwLock;

use kvcache_core::cache::{CacheError, ConnectionState, KeyTtl, KeyValueStore, Result, Ttl};

use crate::store::status::ConnectionStatus;

/// A single stored value with optional expiration.
#[derive(Debug, Clone)]
struct StoredValue {
    value: String,
    expires_at: Option<Instant>,
}

/// Deadline `ttl` from `now`, or `InvalidTtl` if it does not fit in an `Instant`.
fn deadline(now: Instant, ttl: Ttl) -> Result<Instant> {
    now.checked_add(ttl.as_duration()).ok_or_else(|| {
        CacheError::InvalidTtl(format!("{}s is beyond the representable range", ttl.as_secs()))
    })
}

impl StoredValue {
    fn persistent(value: &str) -> Self {
        Self {
            value: value.to_string(),
            expires_at: None,
        }
    }

    fn expiring(value: &str, ttl: Ttl) -> Result<Self> {
        Ok(Self {
            value: value.to_string(),
            expires_at: Some(deadline(Instant::now(), ttl)?),
        })
    }

    fn is_expired(&self, now: Instant) -> bool {
        self.expires_at.is_some_and(|exp| now >= exp)
    }
}

/// In-memory store with LRU eviction.
///
/// Clones share the same entries and connection flag.
#[derive(Debug, Clone)]
pub struct MemoryStore {
    entries: Arc<RwLock<LruCache<String, StoredValue>>>,
    status: Arc<ConnectionStatus>,
}

impl MemoryStore {
    /// Creates a new in-memory store.
    ///
    /// # Arguments
    ///
    /// * `max_entries` - Maximum number of entries before LRU eviction kicks in.
    ///   Zero is treated as one.
    pub fn new(max_entries: usize) -> Self {
        let capacity = NonZeroUsize::new(max_entries).unwrap_or(NonZeroUsize::MIN);
        Self {
            entries: Arc::new(RwLock::new(LruCache::new(capacity))),
            status: Arc::new(ConnectionStatus::new("memory", ConnectionState::Connected)),
        }
    }

    /// Simulates a dropped connection. Operations fail until `restore` is called.
    pub fn sever(&self) {
        self.status.mark_disconnected("connection severed");
    }

    /// Re-establishes a severed connection. Stored entries are kept.
    pub fn restore(&self) {
        self.status.mark_connected();
    }

    fn ensure_connected(&self) -> Result<()> {
        if self.status.is_connected() {
            Ok(())
        } else {
            Err(CacheError::ConnectionFailed(
                "memory store connection is severed".to_string(),
            ))
        }
    }

    /// Looks up a live entry, dropping it if it has expired.
    async fn live_entry(&self, key: &str) -> Option<StoredValue> {
        let mut entries = self.entries.write().await;
        let now = Instant::now();
        if entries.peek(key).is_some_and(|entry| entry.is_expired(now)) {
            entries.pop(key);
            return None;
        }
        entries.get(key).cloned()
    }
}

#[async_trait]
impl KeyValueStore for MemoryStore {
    fn is_connected(&self) -> bool {
        self.status.is_connected()
    }

    async fn get(&self, key: &str) -> Result<Option<String>> {
        self.ensure_connected()?;
        Ok(self.live_entry(key).await.map(|entry| entry.value))
    }

    async fn set(&self, key: &str, value: &str) -> Result<()> {
        self.ensure_connected()?;
        let mut entries = self.entries.write().await;
        entries.put(key.to_string(), StoredValue::persistent(value));
        Ok(())
    }

    async fn set_with_expiry(&self, key: &str, value: &str, ttl: Ttl) -> Result<()> {
        self.ensure_connected()?;
        let stored = StoredValue::expiring(value, ttl)?;
        let mut entries = self.entries.write().await;
        entries.put(key.to_string(), stored);
        Ok(())
    }

    async fn expire(&self, key: &str, ttl: Ttl) -> Result<bool> {
        self.ensure_connected()?;
        let mut entries = self.entries.write().await;
        let now = Instant::now();
        if entries.peek(key).is_some_and(|entry| entry.is_expired(now)) {
            entries.pop(key);
            return Ok(false);
        }
        let expires_at = deadline(now, ttl)?;
        match entries.get_mut(key) {
            Some(entry) => {
                entry.expires_at = Some(expires_at);
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn delete(&self, key: &str) -> Result<bool> {
        self.ensure_connected()?;
        let mut entries = self.entries.write().await;
        let now = Instant::now();
        Ok(entries.pop(key).is_some_and(|entry| !entry.is_expired(now)))
    }

    async fn time_to_live(&self, key: &str) -> Result<KeyTtl> {
        self.ensure_connected()?;
        let ttl = match self.live_entry(key).await {
            None => KeyTtl::Missing,
            Some(StoredValue { expires_at: None, .. }) => KeyTtl::Persistent,
            Some(StoredValue { expires_at: Some(at), .. }) => {
                let left = at.saturating_duration_since(Instant::now());
                // Report whole seconds like the Redis TTL command.
                KeyTtl::Expires(Duration::from_secs(left.as_secs()))
            }
        };
        Ok(ttl)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Default max entries for tests
    const TEST_MAX_ENTRIES: usize = 1000;

    fn ttl(seconds: u64) -> Ttl {
        Ttl::from_secs(seconds).unwrap()
    }

    #[tokio::test]
    async fn test_set_and_get() {
        let store = MemoryStore::new(TEST_MAX_ENTRIES);

        store.set("test:key", "test value").await.unwrap();

        assert_eq!(
            store.get("test:key").await.unwrap(),
            Some("test value".to_string())
        );
        assert_eq!(
            store.time_to_live("test:key").await.unwrap(),
            KeyTtl::Persistent
        );
    }

    #[tokio::test]
    async fn test_get_nonexistent() {
        let store = MemoryStore::new(TEST_MAX_ENTRIES);

        assert_eq!(store.get("nonexistent:key").await.unwrap(), None);
        assert_eq!(
            store.time_to_live("nonexistent:key").await.unwrap(),
            KeyTtl::Missing
        );
    }

    #[tokio::test]
    async fn test_set_with_expiry_reports_ttl() {
        let store = MemoryStore::new(TEST_MAX_ENTRIES);

        store
            .set_with_expiry("test:ttl", "value", ttl(60))
            .await
            .unwrap();

        match store.time_to_live("test:ttl").await.unwrap() {
            KeyTtl::Expires(left) => assert!(left.as_secs() >= 59 && left.as_secs() <= 60),
            other => panic!("expected an expiring key, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_entry_expires() {
        let store = MemoryStore::new(TEST_MAX_ENTRIES);

        store
            .set_with_expiry("test:expiring", "value", ttl(1))
            .await
            .unwrap();
        assert!(store.get("test:expiring").await.unwrap().is_some());

        tokio::time::sleep(Duration::from_millis(1100)).await;

        assert_eq!(store.get("test:expiring").await.unwrap(), None);
        assert_eq!(
            store.time_to_live("test:expiring").await.unwrap(),
            KeyTtl::Missing
        );
    }

    #[tokio::test]
    async fn test_expire_existing_and_missing() {
        let store = MemoryStore::new(TEST_MAX_ENTRIES);

        store.set("test:expire", "value").await.unwrap();
        assert!(store.expire("test:expire", ttl(30)).await.unwrap());
        assert!(matches!(
            store.time_to_live("test:expire").await.unwrap(),
            KeyTtl::Expires(_)
        ));

        assert!(!store.expire("test:absent", ttl(30)).await.unwrap());
        assert_eq!(store.get("test:absent").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_set_clears_previous_expiry() {
        let store = MemoryStore::new(TEST_MAX_ENTRIES);

        store
            .set_with_expiry("test:overwrite", "first", ttl(30))
            .await
            .unwrap();
        store.set("test:overwrite", "second").await.unwrap();

        assert_eq!(
            store.get("test:overwrite").await.unwrap(),
            Some("second".to_string())
        );
        assert_eq!(
            store.time_to_live("test:overwrite").await.unwrap(),
            KeyTtl::Persistent
        );
    }

    #[tokio::test]
    async fn test_delete() {
        let store = MemoryStore::new(TEST_MAX_ENTRIES);

        store.set("test:delete", "to be deleted").await.unwrap();

        assert!(store.delete("test:delete").await.unwrap());
        assert!(!store.delete("test:delete").await.unwrap());
        assert_eq!(store.get("test:delete").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_lru_eviction() {
        let store = MemoryStore::new(2);

        store.set("a", "1").await.unwrap();
        store.set("b", "2").await.unwrap();
        // Touch "a" so "b" becomes least recently used.
        store.get("a").await.unwrap();
        store.set("c", "3").await.unwrap();

        assert_eq!(store.get("a").await.unwrap(), Some("1".to_string()));
        assert_eq!(store.get("b").await.unwrap(), None);
        assert_eq!(store.get("c").await.unwrap(), Some("3".to_string()));
    }

    #[tokio::test]
    async fn test_out_of_range_ttl_is_rejected() {
        let store = MemoryStore::new(TEST_MAX_ENTRIES);
        let huge = ttl(u64::MAX);

        assert!(matches!(
            store.set_with_expiry("test:huge", "value", huge).await,
            Err(CacheError::InvalidTtl(_))
        ));
        assert_eq!(store.get("test:huge").await.unwrap(), None);

        store.set("test:huge", "value").await.unwrap();
        assert!(matches!(
            store.expire("test:huge", huge).await,
            Err(CacheError::InvalidTtl(_))
        ));
        assert_eq!(
            store.time_to_live("test:huge").await.unwrap(),
            KeyTtl::Persistent
        );
    }

    #[tokio::test]
    async fn test_sever_and_restore() {
        let store = MemoryStore::new(TEST_MAX_ENTRIES);
        store.set("test:sever", "kept").await.unwrap();

        store.sever();
        assert!(!store.is_connected());
        assert!(matches!(
            store.get("test:sever").await,
            Err(CacheError::ConnectionFailed(_))
        ));
        assert!(store.set("test:sever", "lost").await.is_err());
        assert!(store.delete("test:sever").await.is_err());

        store.restore();
        assert!(store.is_connected());
        assert_eq!(
            store.get("test:sever").await.unwrap(),
            Some("kept".to_string())
        );
    }

    #[tokio::test]
    async fn test_clones_share_state() {
        let store = MemoryStore::new(TEST_MAX_ENTRIES);
        let other = store.clone();

        store.set("test:shared", "value").await.unwrap();
        assert_eq!(
            other.get("test:shared").await.unwrap(),
            Some("value".to_string())
        );

        other.sever();
        assert!(!store.is_connected());
    }
}
